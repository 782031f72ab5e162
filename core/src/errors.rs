use thiserror::Error;

/// Client-visible class of an error. The transport layer maps classes to
/// status codes; the core only tags them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadRequest,
    NotFound,
    Internal,
}

/// Errors that can arise while creating or operating a signature device.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Unsupported algorithm {0}")]
    UnsupportedAlgorithm(String),
    #[error("Device with id {0} not found")]
    DeviceNotFound(String),
    #[error("device with id {0} already exists")]
    DeviceAlreadyExists(String),
    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),
    #[error("signing failed: {0}")]
    SigningFailed(String),
    #[error("private key does not match the requested algorithm")]
    UnsupportedKey,
    #[error("repository failure: {0}")]
    RepositoryFailure(String),
}

impl DeviceError {
    /// Class tag consumed by the transport when mapping to a status code.
    pub fn class(&self) -> ErrorClass {
        match self {
            DeviceError::UnsupportedAlgorithm(_) => ErrorClass::BadRequest,
            DeviceError::DeviceNotFound(_) => ErrorClass::NotFound,
            DeviceError::DeviceAlreadyExists(_)
            | DeviceError::KeyGenerationFailed(_)
            | DeviceError::SigningFailed(_)
            | DeviceError::UnsupportedKey
            | DeviceError::RepositoryFailure(_) => ErrorClass::Internal,
        }
    }
}

//! Signature device core: key generation, chained signing, and the device
//! service.
//!
//! Implements the engine behind the HTTP API:
//! - RSA (PKCS#1 v1.5 over SHA-256) and ECDSA (P-384 over SHA-256, DER `(r, s)`) signers
//! - Per-device monotonic signature counters and chained secured-data envelopes
//! - The build → sign → commit critical section that keeps chains gap-free
//!   under concurrency
//! - A narrow device storage port with an in-memory reference implementation

pub mod crypto;
pub mod device;
pub mod errors;
pub mod repository;
pub mod service;
pub mod traits;
pub mod types;

pub use crypto::{
    generate_ecc_key_pair, generate_key_pair, generate_rsa_key_pair, KeyPair, PrivateKey,
    PublicKey, Signer, RSA_KEY_BITS,
};
pub use device::SignatureDevice;
pub use errors::{DeviceError, ErrorClass};
pub use repository::InMemoryDeviceRepository;
pub use service::DeviceService;
pub use traits::DeviceRepository;
pub use types::Algorithm;

/// Library version string.
pub fn version() -> &'static str { "sigchain-core 0.1.0" }

#[cfg(test)]
mod tests;

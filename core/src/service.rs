use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use uuid::Uuid;

use crate::crypto::generate_key_pair;
use crate::device::SignatureDevice;
use crate::errors::DeviceError;
use crate::traits::DeviceRepository;

/// DeviceService coordinates device creation, lookup, and the sign
/// transaction workflow over the repository port.
pub struct DeviceService {
    repository: Arc<dyn DeviceRepository>,
}

impl DeviceService {
    /// Create a new `DeviceService` backed by the given repository.
    pub fn new(repository: Arc<dyn DeviceRepository>) -> Self {
        Self { repository }
    }

    /// Create a signature device for `algorithm` and store it. The algorithm
    /// string must name one of the supported variants; anything else,
    /// including the empty string, is rejected before any state is touched.
    pub fn create_device(
        &self,
        algorithm: &str,
        label: Option<String>,
    ) -> Result<Arc<SignatureDevice>, DeviceError> {
        let algorithm = algorithm.parse()?;
        let key_pair = generate_key_pair(algorithm)?;
        let device = Arc::new(SignatureDevice::new(Uuid::new_v4(), label, algorithm, key_pair)?);
        self.repository.save(&device.id().to_string(), Arc::clone(&device))?;
        Ok(device)
    }

    /// Retrieve a device by id.
    pub fn get_device(&self, id: &str) -> Option<Arc<SignatureDevice>> {
        self.repository.get_by_id(id)
    }

    /// All stored devices, in unspecified order.
    pub fn list_devices(&self) -> Result<Vec<Arc<SignatureDevice>>, DeviceError> {
        self.repository.get_all()
    }

    /// Sign `data` with the device identified by `device_id`. Returns the
    /// exact envelope string that was signed and the base64 of the raw
    /// signature bytes.
    pub fn sign_transaction(
        &self,
        device_id: &str,
        data: &str,
    ) -> Result<(String, String), DeviceError> {
        // 1) Resolve the device
        let device = self
            .repository
            .get_by_id(device_id)
            .ok_or_else(|| DeviceError::DeviceNotFound(device_id.to_string()))?;

        // 2) build → sign → commit under the device's own lock
        let (secured_data, signature) = device.sign(data)?;

        // 3) Write the mutated device through to the repository
        self.repository.update(&device)?;

        Ok((secured_data, B64.encode(signature)))
    }
}

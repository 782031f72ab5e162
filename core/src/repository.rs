use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::device::SignatureDevice;
use crate::errors::DeviceError;
use crate::traits::DeviceRepository;

/// Thread-safe in-memory device store. Writers (`save`, `update`) take the
/// write side of the lock; lookups take the read side, so signs on other
/// devices never contend here.
#[derive(Default)]
pub struct InMemoryDeviceRepository {
    inner: RwLock<HashMap<String, Arc<SignatureDevice>>>,
}

impl InMemoryDeviceRepository {
    /// Create a new, empty repository.
    pub fn new() -> Self {
        Self { inner: RwLock::new(HashMap::new()) }
    }
}

impl DeviceRepository for InMemoryDeviceRepository {
    fn save(&self, id: &str, device: Arc<SignatureDevice>) -> Result<(), DeviceError> {
        let mut devices = self.inner.write().unwrap();
        if devices.contains_key(id) {
            return Err(DeviceError::DeviceAlreadyExists(id.to_string()));
        }
        devices.insert(id.to_string(), device);
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> Option<Arc<SignatureDevice>> {
        self.inner.read().unwrap().get(id).cloned()
    }

    fn update(&self, device: &Arc<SignatureDevice>) -> Result<(), DeviceError> {
        let id = device.id().to_string();
        let mut devices = self.inner.write().unwrap();
        if !devices.contains_key(&id) {
            return Err(DeviceError::DeviceNotFound(id));
        }
        devices.insert(id, Arc::clone(device));
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<Arc<SignatureDevice>>, DeviceError> {
        Ok(self.inner.read().unwrap().values().cloned().collect())
    }
}

use std::sync::Arc;

use crate::device::SignatureDevice;
use crate::errors::DeviceError;

/// Storage port the core depends on. Any backend satisfying it is acceptable;
/// the reference implementation is an in-memory map. The repository stores
/// and hands out devices; it does not serialize signing on them, that is the
/// device's own job.
pub trait DeviceRepository: Send + Sync {
    /// Insert a new device under `id`. Fails with
    /// [`DeviceError::DeviceAlreadyExists`] when the id is taken.
    fn save(&self, id: &str, device: Arc<SignatureDevice>) -> Result<(), DeviceError>;

    /// Look up a device by id.
    fn get_by_id(&self, id: &str) -> Option<Arc<SignatureDevice>>;

    /// Write a device back after a committed signature. A no-op for the
    /// in-memory backend, but kept distinct from `save` so a write-through
    /// backend can observe the state transition.
    fn update(&self, device: &Arc<SignatureDevice>) -> Result<(), DeviceError>;

    /// All stored devices, in unspecified order.
    fn get_all(&self) -> Result<Vec<Arc<SignatureDevice>>, DeviceError>;
}

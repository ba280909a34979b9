use anyhow::Result;
use uuid::Uuid;

use crate::config::Config;
use crate::device::{ServiceDescriptor, ServiceGroupDescriptor};

/// Everything the helper reported in one discovery pass.
#[derive(Debug, Clone)]
pub struct DeviceReport {
    pub groups: Vec<ServiceGroupDescriptor>,
    pub services: Vec<ServiceDescriptor>,
    pub raw: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DoctorReport {
    pub ok: bool,
    pub message: String,
}

/// Supplies device and group descriptors at menu-build time.
pub trait DeviceSource {
    fn devices(&self) -> Result<DeviceReport>;
    fn doctor(&self) -> Result<DoctorReport>;
}

/// Live power-state reads and writes.
///
/// These are best-effort by contract: an operation that cannot produce a
/// result logs the underlying failure and yields nothing, and the caller is
/// expected to no-op. Nothing here propagates errors to the UI.
pub trait PowerBridge {
    /// Flips the device's power state.
    fn toggle_power(&self, id: Uuid);
    /// Reads the current on/off state; `None` when the bridge cannot answer.
    fn power_state(&self, id: Uuid) -> Option<bool>;
    /// Forces a specific on/off state.
    fn set_power(&self, id: Uuid, on: bool);
}

pub trait Bridge: DeviceSource + PowerBridge {}
impl<T: DeviceSource + PowerBridge> Bridge for T {}

mod helper;

pub use helper::HelperBridge;

pub fn from_config(config: Option<&Config>) -> Result<Box<dyn Bridge>> {
    let command = config.and_then(|c| c.helper.clone());
    Ok(Box::new(HelperBridge::new(command)))
}

//! Registry of input devices
//!
//! Devices live in generational slots. One of them may be marked active,
//! which is the device a single engine read callback is routed to. A read
//! through a removed id fails instead of reaching a dead device.

use lvport_core::{IndevData, InputDevice, PortError, Result};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a registered input device
    pub struct DeviceId;
}

/// Boxed device type used when a registry holds mixed devices
pub type DynDevice = Box<dyn InputDevice + Send>;

/// Registered input devices plus the active one
pub struct InputRegistry<D = DynDevice> {
    devices: SlotMap<DeviceId, D>,
    active: Option<DeviceId>,
}

impl<D> Default for InputRegistry<D> {
    fn default() -> Self {
        Self {
            devices: SlotMap::with_key(),
            active: None,
        }
    }
}

impl<D: InputDevice> InputRegistry<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, device: D) -> DeviceId {
        let id = self.devices.insert(device);
        tracing::debug!(?id, kind = ?self.devices[id].kind(), "Registered input device");
        id
    }

    /// Remove a device, clearing the active mark if it pointed at it
    pub fn deregister(&mut self, id: DeviceId) -> Result<D> {
        let device = self.devices.remove(id).ok_or(PortError::UnknownDevice)?;
        if self.active == Some(id) {
            self.active = None;
        }
        tracing::debug!(?id, "Deregistered input device");
        Ok(device)
    }

    /// Route active reads to `id`
    pub fn activate(&mut self, id: DeviceId) -> Result<()> {
        if !self.devices.contains_key(id) {
            return Err(PortError::UnknownDevice);
        }
        self.active = Some(id);
        Ok(())
    }

    pub fn active(&self) -> Option<DeviceId> {
        self.active
    }

    pub fn get(&self, id: DeviceId) -> Option<&D> {
        self.devices.get(id)
    }

    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut D> {
        self.devices.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Read a specific device
    pub fn read(&mut self, id: DeviceId, data: &mut IndevData) -> Result<bool> {
        let device = self.devices.get_mut(id).ok_or(PortError::UnknownDevice)?;
        Ok(device.read(data))
    }

    /// Read the active device
    pub fn read_active(&mut self, data: &mut IndevData) -> Result<bool> {
        let id = self.active.ok_or(PortError::NoActiveDevice)?;
        self.read(id, data)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &D)> {
        self.devices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::CallbackDevice;
    use lvport_core::IndevKind;

    fn key_device(key: u32) -> DynDevice {
        Box::new(CallbackDevice::new(IndevKind::Keypad, move |data| {
            data.key = key;
            false
        }))
    }

    #[test]
    fn test_read_routes_to_active() {
        let mut registry = InputRegistry::new();
        let a = registry.register(key_device(1));
        let b = registry.register(key_device(2));

        let mut data = IndevData::default();
        assert!(matches!(
            registry.read_active(&mut data),
            Err(PortError::NoActiveDevice)
        ));

        registry.activate(b).unwrap();
        registry.read_active(&mut data).unwrap();
        assert_eq!(data.key, 2);

        registry.read(a, &mut data).unwrap();
        assert_eq!(data.key, 1);
    }

    #[test]
    fn test_read_after_deregister_fails() {
        let mut registry = InputRegistry::new();
        let id = registry.register(key_device(7));
        registry.activate(id).unwrap();
        registry.deregister(id).unwrap();

        let mut data = IndevData::default();
        assert!(matches!(
            registry.read(id, &mut data),
            Err(PortError::UnknownDevice)
        ));
        assert!(matches!(
            registry.read_active(&mut data),
            Err(PortError::NoActiveDevice)
        ));
        assert!(registry.activate(id).is_err());
        assert_eq!(data.key, 0);
    }

    #[test]
    fn test_stale_id_does_not_alias_new_device() {
        let mut registry = InputRegistry::new();
        let old = registry.register(key_device(1));
        registry.deregister(old).unwrap();
        let new = registry.register(key_device(2));
        assert_ne!(old, new);
        assert!(registry.get(old).is_none());
    }
}

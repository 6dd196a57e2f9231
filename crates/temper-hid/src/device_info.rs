//! Device information for HID candidates

use serde::{Deserialize, Serialize};
use tempersensor_protocol::product_name;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HidDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub path: String,
    pub interface_number: Option<i32>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product_name: Option<String>,
}

impl HidDeviceInfo {
    pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
        Self {
            vendor_id,
            product_id,
            path: path.into(),
            interface_number: None,
            serial_number: None,
            manufacturer: None,
            product_name: None,
        }
    }

    pub fn from_hidapi(info: &hidapi::DeviceInfo) -> Self {
        let interface = info.interface_number();
        Self {
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            path: info.path().to_string_lossy().into_owned(),
            // hidapi reports -1 when the backend does not know
            interface_number: (interface >= 0).then_some(interface),
            serial_number: info.serial_number().map(str::to_string),
            manufacturer: info.manufacturer_string().map(str::to_string),
            product_name: info.product_string().map(str::to_string),
        }
    }

    pub fn with_interface(mut self, interface: i32) -> Self {
        self.interface_number = Some(interface);
        self
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    /// `vvvv:pppp` in lowercase hex.
    pub fn id_string(&self) -> String {
        format!("{:04x}:{:04x}", self.vendor_id, self.product_id)
    }

    pub fn display_name(&self) -> String {
        self.product_name
            .clone()
            .or_else(|| product_name(self.vendor_id, self.product_id).map(str::to_string))
            .or_else(|| self.manufacturer.clone())
            .unwrap_or_else(|| self.id_string())
    }
}

impl Default for HidDeviceInfo {
    fn default() -> Self {
        Self::new(0, 0, String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_creation() {
        let info = HidDeviceInfo::new(0x0c45, 0x7401, "/dev/hidraw0").with_interface(1);
        assert_eq!(info.vendor_id, 0x0c45);
        assert_eq!(info.product_id, 0x7401);
        assert_eq!(info.interface_number, Some(1));
        assert!(info.matches(0x0c45, 0x7401));
        assert!(!info.matches(0x0c45, 0x9999));
        assert_eq!(info.id_string(), "0c45:7401");
    }

    #[test]
    fn test_device_info_display_name() {
        let info = HidDeviceInfo::new(0x413d, 0x2107, "/dev/hidraw0").with_product_name("TEMPerX");
        assert_eq!(info.display_name(), "TEMPerX");

        let info = HidDeviceInfo::new(0x413d, 0x2107, "/dev/hidraw0");
        assert_eq!(info.display_name(), "TEMPerGold / TEMPerX / TEMPerHUM");

        let info = HidDeviceInfo::new(0x1234, 0x5678, "/dev/hidraw0").with_manufacturer("Test Co");
        assert_eq!(info.display_name(), "Test Co");

        let info = HidDeviceInfo::new(0x1234, 0x5678, "/dev/hidraw0");
        assert_eq!(info.display_name(), "1234:5678");
    }

    #[test]
    fn test_device_info_json() -> Result<(), serde_json::Error> {
        let info = HidDeviceInfo::new(0x1a86, 0xe025, "/dev/hidraw3").with_serial("A1");
        let json = serde_json::to_string(&info)?;
        let back: HidDeviceInfo = serde_json::from_str(&json)?;
        assert_eq!(back, info);
        Ok(())
    }
}

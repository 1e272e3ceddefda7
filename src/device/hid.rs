use std::ffi::CString;
use std::time::Duration;

use hidapi::{HidApi, HidDevice, HidDeviceInfo};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::broker::{DeviceSource, ScannerLink};
use crate::constants::{BARCODE_SCANNER_USAGE_PAGE, HONEYWELL_VID, VOYAGER_1200G_PID};
use crate::devices::{DeviceDescriptor, PosConnectionType};
use crate::error::ClaimError;

const READ_BUFFER_SIZE: usize = 64 * 4;

/// Enumerates USB HID POS scanners through hidapi.
///
/// Every HID device is locally attached, so the source yields no candidates
/// for filters that exclude [`PosConnectionType::Local`].
pub struct HidSource {
    api: Mutex<HidApi>,
}

impl HidSource {
    /// Initializes the hidapi.
    /// Will also initialize the currently available device list.
    #[tracing::instrument]
    pub fn new() -> Result<Self, ClaimError> {
        debug!("Initializing the hidapi.");
        let api = HidApi::new()?;
        Ok(HidSource {
            api: Mutex::new(api),
        })
    }
}

/// A device qualifies when it sits on the bar code scanner usage page, or
/// matches the known Voyager 1200G identity (some platforms report a zero
/// usage page over hidraw).
fn is_scanner(info: &HidDeviceInfo) -> bool {
    info.usage_page == BARCODE_SCANNER_USAGE_PAGE
        || (info.vendor_id == HONEYWELL_VID && info.product_id == VOYAGER_1200G_PID)
}

/// Get a formatted string composed of manufacturer string and product string.
fn full_device_name(info: &HidDeviceInfo) -> String {
    format!(
        "{} {}",
        info.manufacturer_string.as_ref().map_or("NA", |m| m.as_str()),
        info.product_string.as_ref().map_or("NA", |p| p.as_str()),
    )
}

impl DeviceSource for HidSource {
    fn enumerate(&self, filter: PosConnectionType) -> Result<Vec<DeviceDescriptor>, ClaimError> {
        if !filter.matches(PosConnectionType::Local) {
            return Ok(Vec::new());
        }

        let mut api = self.api.lock();
        api.refresh_devices()?;

        let mut descriptors = Vec::new();
        for device in api.devices().iter() {
            if !is_scanner(device) {
                continue;
            }
            descriptors.push(DeviceDescriptor {
                id: device.path.to_string_lossy().into_owned(),
                connection: PosConnectionType::Local,
                name: full_device_name(device),
            });
        }

        info!("Enumerated {} HID POS scanner(s).", descriptors.len());
        Ok(descriptors)
    }

    fn open(&self, descriptor: &DeviceDescriptor) -> Result<Box<dyn ScannerLink>, ClaimError> {
        let path = CString::new(descriptor.id.as_str()).map_err(|_| {
            ClaimError::Hid(format!("device path contains a NUL byte: {}", descriptor.id))
        })?;

        let device = self.api.lock().open_path(&path)?;
        info!("Opened HID link to {}", descriptor);
        Ok(Box::new(HidLink { device }))
    }
}

/// Raw report link over an open hidapi device handle.
pub struct HidLink {
    device: HidDevice,
}

impl ScannerLink for HidLink {
    fn read_report(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, ClaimError> {
        let mut buf = [0u8; READ_BUFFER_SIZE];
        let read_len = self.device.read_timeout(&mut buf, timeout.as_millis() as i32)?;

        if read_len == 0 {
            return Ok(None);
        }
        Ok(Some(buf[..read_len].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(vendor_id: u16, product_id: u16, usage_page: u16) -> HidDeviceInfo {
        HidDeviceInfo {
            path: CString::new("/dev/hidraw0").unwrap(),
            vendor_id,
            product_id,
            serial_number: None,
            release_number: 0,
            manufacturer_string: Some("Honeywell".to_string()),
            product_string: Some("Voyager 1200G".to_string()),
            usage_page,
            usage: 0,
            interface_number: 0,
        }
    }

    #[test]
    fn pos_usage_page_qualifies_any_vendor() {
        assert!(is_scanner(&info(0x1234, 0x5678, BARCODE_SCANNER_USAGE_PAGE)));
    }

    #[test]
    fn known_voyager_identity_qualifies_without_usage_page() {
        assert!(is_scanner(&info(HONEYWELL_VID, VOYAGER_1200G_PID, 0)));
        assert!(!is_scanner(&info(0x1234, 0x5678, 0)));
    }

    #[test]
    fn device_name_combines_manufacturer_and_product() {
        assert_eq!(
            full_device_name(&info(HONEYWELL_VID, VOYAGER_1200G_PID, 0)),
            "Honeywell Voyager 1200G"
        );
    }
}

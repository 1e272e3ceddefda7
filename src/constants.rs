/// Honeywell's Vendor ID.
pub static HONEYWELL_VID: u16 = 0x0c2e;

/// Honeywell Voyager 1200G Product ID.
pub static VOYAGER_1200G_PID: u16 = 0x0a07;

/// HID usage page assigned to bar code scanner (point of service) devices.
pub static BARCODE_SCANNER_USAGE_PAGE: u16 = 0x008c;

/// Anchored pattern every accepted serial number must match.
pub static SERIAL_NUMBER_PATTERN: &str = "^01BB2-[0-9]{5}$";

/// Environment variable holding a stable device ID. When set, discovery
/// matches that exact device instead of taking the first scanner found.
pub static DEVICE_ID_ENV_VAR: &str = "SCANNER_DEVICE_ID";

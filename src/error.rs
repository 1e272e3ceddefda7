use thiserror::Error;

/// Failures that can abort scanner acquisition.
///
/// `DeviceNotFound` and `ClaimDenied` are fatal to session initialization:
/// the workflow cannot proceed without a working scanner. Decode failures
/// and runtime hardware faults are not part of this taxonomy; they are
/// recovered locally and never tear the session down.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Discovery yielded no descriptor matching the criteria.
    #[error("no matching barcode scanner found")]
    DeviceNotFound,

    /// The broker refused exclusive ownership, usually because another
    /// session already holds the device.
    #[error("barcode scanner is already exclusively claimed")]
    ClaimDenied,

    /// The underlying HID layer failed.
    #[error("hidapi failure: {0}")]
    Hid(String),
}

impl From<hidapi::HidError> for ClaimError {
    fn from(e: hidapi::HidError) -> Self {
        ClaimError::Hid(format!("{:?}", e))
    }
}

use derive_more::Display;

use crate::constants::DEVICE_ID_ENV_VAR;

/// Connection classes a point-of-service peripheral can be attached over.
#[derive(Debug, Display, Eq, PartialEq, Clone, Copy)]
pub enum PosConnectionType {
    /// Locally attached, e.g. over USB.
    #[display(fmt = "Local")]
    Local,

    #[display(fmt = "Bluetooth")]
    Bluetooth,

    /// Any connection type.
    #[display(fmt = "All")]
    All,
}

impl PosConnectionType {
    /// Whether a device attached over `connection` passes this filter.
    pub fn matches(self, connection: PosConnectionType) -> bool {
        self == PosConnectionType::All || self == connection
    }
}

/// Identifies a physical scanner. Immutable once discovered.
#[derive(Debug, Display, Eq, PartialEq, Clone)]
#[display(fmt = "{} ({})", name, id)]
pub struct DeviceDescriptor {
    /// Stable unique device identifier, the platform device path.
    pub id: String,

    /// How the device is attached to the host.
    pub connection: PosConnectionType,

    /// Human-readable name, manufacturer plus product.
    pub name: String,
}

/// The two supported ways of selecting a scanner during discovery.
#[derive(Debug, Display, Eq, PartialEq, Clone)]
pub enum DiscoveryCriteria {
    /// Exact match against a known stable device ID, for environments where
    /// the specific scanner is pre-qualified.
    #[display(fmt = "ById {{ id: {} }}", id)]
    ById { id: String },

    /// First scanner of the capability class attached over the given
    /// connection, for environments where any compatible scanner will do.
    #[display(fmt = "FirstOfClass {{ connection: {} }}", connection)]
    FirstOfClass { connection: PosConnectionType },
}

impl DiscoveryCriteria {
    /// Builds the criteria from the process environment: an exact device ID
    /// when `SCANNER_DEVICE_ID` is set, otherwise the first locally attached
    /// scanner.
    pub fn from_env() -> Self {
        match std::env::var(DEVICE_ID_ENV_VAR) {
            Ok(id) => DiscoveryCriteria::ById { id },
            Err(_) => DiscoveryCriteria::FirstOfClass {
                connection: PosConnectionType::Local,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_filter_rejects_other_connections() {
        assert!(PosConnectionType::Local.matches(PosConnectionType::Local));
        assert!(!PosConnectionType::Local.matches(PosConnectionType::Bluetooth));
        assert!(PosConnectionType::All.matches(PosConnectionType::Bluetooth));
    }

    #[test]
    fn criteria_display_names_the_strategy() {
        let by_id = DiscoveryCriteria::ById {
            id: "usb#vid_0c2e".to_string(),
        };
        assert_eq!(by_id.to_string(), "ById { id: usb#vid_0c2e }");

        let first = DiscoveryCriteria::FirstOfClass {
            connection: PosConnectionType::Local,
        };
        assert_eq!(first.to_string(), "FirstOfClass { connection: Local }");
    }
}

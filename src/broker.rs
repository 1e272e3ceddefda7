use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::claim::{ClaimedScanner, ReleaseRequest, ScannerHandle};
use crate::devices::{DeviceDescriptor, DiscoveryCriteria, PosConnectionType};
use crate::error::ClaimError;

/// Enumerates and opens physical scanner devices.
///
/// The seam between claim mediation and the actual hardware layer; the
/// production implementation is [`crate::device::hid::HidSource`].
pub trait DeviceSource: Send + Sync {
    /// Lists every candidate scanner attached over a connection type
    /// accepted by `filter`. Re-enumerates on every call.
    fn enumerate(&self, filter: PosConnectionType) -> Result<Vec<DeviceDescriptor>, ClaimError>;

    /// Opens a raw report link to the described device.
    fn open(&self, descriptor: &DeviceDescriptor) -> Result<Box<dyn ScannerLink>, ClaimError>;
}

/// An open raw-report channel to one scanner.
pub trait ScannerLink: Send {
    /// Blocks up to `timeout` for the next raw report. `Ok(None)` means the
    /// timeout elapsed without data.
    fn read_report(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, ClaimError>;
}

struct ClaimRecord {
    /// Installed once the owner registers its notification sinks. Release
    /// requests arriving before that cannot be delivered and are dropped.
    release_tx: Option<Sender<ReleaseRequest>>,
}

/// Mediates exclusive ownership of scanners within this process.
///
/// At most one claim is live per device ID. A claim attempt against an
/// owned device asks the owner to release it; the owner's policy is always
/// to retain, so the attempt is denied.
pub struct ScannerBroker {
    source: Box<dyn DeviceSource>,
    claims: Mutex<HashMap<String, ClaimRecord>>,
}

impl ScannerBroker {
    pub fn new(source: Box<dyn DeviceSource>) -> Arc<Self> {
        Arc::new(ScannerBroker {
            source,
            claims: Mutex::new(HashMap::new()),
        })
    }

    /// Runs discovery and resolves `criteria` to a single unclaimed handle.
    #[tracing::instrument(skip(self))]
    pub fn find(&self, criteria: &DiscoveryCriteria) -> Result<ScannerHandle, ClaimError> {
        let candidates = match criteria {
            DiscoveryCriteria::ById { .. } => self.source.enumerate(PosConnectionType::All)?,
            DiscoveryCriteria::FirstOfClass { connection } => self.source.enumerate(*connection)?,
        };

        for candidate in &candidates {
            debug!("Discovered candidate scanner: {}", candidate);
        }

        let selected = match criteria {
            DiscoveryCriteria::ById { id } => candidates.into_iter().find(|d| d.id == *id),
            DiscoveryCriteria::FirstOfClass { .. } => candidates.into_iter().next(),
        };

        match selected {
            Some(descriptor) => {
                info!("Selected scanner: {}", descriptor);
                Ok(ScannerHandle::new(descriptor))
            }
            None => Err(ClaimError::DeviceNotFound),
        }
    }

    /// Requests exclusive ownership of the device behind `handle`.
    ///
    /// Fails with `ClaimDenied` when another claim is live for the same
    /// device; the current owner is notified of the attempt through its
    /// release-request channel and keeps the device.
    pub fn claim(self: Arc<Self>, handle: ScannerHandle) -> Result<ClaimedScanner, ClaimError> {
        let descriptor = handle.into_descriptor();

        {
            let mut claims = self.claims.lock();

            if let Some(record) = claims.get(&descriptor.id) {
                match &record.release_tx {
                    Some(release_tx) => {
                        let _ = release_tx.send(ReleaseRequest);
                    }
                    None => debug!("Owner of {} has no release sink yet.", descriptor),
                }
                warn!("Claim denied, scanner already owned: {}", descriptor);
                return Err(ClaimError::ClaimDenied);
            }

            claims.insert(descriptor.id.clone(), ClaimRecord { release_tx: None });
        }

        info!("Claimed scanner exclusively: {}", descriptor);
        Ok(ClaimedScanner::new(descriptor, self))
    }

    pub(crate) fn attach_release_sink(&self, device_id: &str, release_tx: Sender<ReleaseRequest>) {
        let mut claims = self.claims.lock();
        if let Some(record) = claims.get_mut(device_id) {
            record.release_tx = Some(release_tx);
        }
    }

    pub(crate) fn release(&self, device_id: &str) {
        if self.claims.lock().remove(device_id).is_some() {
            info!("Released scanner claim: {}", device_id);
        }
    }

    pub(crate) fn open_link(
        &self,
        descriptor: &DeviceDescriptor,
    ) -> Result<Box<dyn ScannerLink>, ClaimError> {
        self.source.open(descriptor)
    }
}

//! Scanner claim lifecycle.
//!
//! [`ScannerHandle`] (found, unclaimed) → [`ClaimedScanner`] (exclusive,
//! decode mode on) → [`RegisteredScanner`] (notification sinks attached) →
//! [`ActiveScanner`] (enabled, delivering reports). Enabling is only
//! reachable after registration, so a scan report can never arrive without
//! a sink to receive it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use tracing::{debug, info, warn};

use crate::broker::{ScannerBroker, ScannerLink};
use crate::decode::ScanEvent;
use crate::devices::DeviceDescriptor;
use crate::error::ClaimError;

/// How long a single blocking read waits before re-checking for shutdown.
const READ_TIMEOUT: Duration = Duration::from_millis(250);

/// Consecutive read failures tolerated before the link counts as lost.
const MAX_READ_ERRORS: u32 = 3;

/// A discovered but unclaimed scanner. Produced by
/// [`ScannerBroker::find`], consumed exactly once by
/// [`ScannerBroker::claim`].
#[derive(Debug)]
pub struct ScannerHandle {
    descriptor: DeviceDescriptor,
}

impl ScannerHandle {
    pub(crate) fn new(descriptor: DeviceDescriptor) -> Self {
        ScannerHandle { descriptor }
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    pub(crate) fn into_descriptor(self) -> DeviceDescriptor {
        self.descriptor
    }
}

/// External request to give up the device, forwarded by the broker when a
/// competing claim arrives. The owner always answers by retaining.
#[derive(Debug)]
pub struct ReleaseRequest;

/// Non-fatal hardware fault reported while the claim is live.
#[derive(Debug, Clone)]
pub struct ErrorNotice {
    pub message: String,

    /// The link is gone; no further reports will arrive.
    pub lost: bool,
}

/// The three notification channels every claim must register before it can
/// be enabled: scan data, errors, and release requests.
pub struct ScanSinks {
    pub data: Sender<ScanEvent>,
    pub error: Sender<ErrorNotice>,
    pub release: Sender<ReleaseRequest>,
}

/// Releases the broker claim when dropped, on every exit path.
struct ClaimGuard {
    device_id: String,
    broker: Arc<ScannerBroker>,
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        self.broker.release(&self.device_id);
    }
}

/// Exclusive ownership token over one physical scanner.
///
/// Decode mode is forced on at claim time: the device pre-decodes every
/// scan and delivers the text label instead of raw scan data.
pub struct ClaimedScanner {
    descriptor: DeviceDescriptor,
    guard: ClaimGuard,
    decode_data_enabled: bool,
}

impl ClaimedScanner {
    pub(crate) fn new(descriptor: DeviceDescriptor, broker: Arc<ScannerBroker>) -> Self {
        let guard = ClaimGuard {
            device_id: descriptor.id.clone(),
            broker,
        };
        ClaimedScanner {
            descriptor,
            guard,
            decode_data_enabled: true,
        }
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    pub fn is_decode_data_enabled(&self) -> bool {
        self.decode_data_enabled
    }

    /// Attaches the scan-data, error, and release-request sinks.
    ///
    /// Registration strictly precedes enabling: only the returned
    /// [`RegisteredScanner`] can enable the device.
    pub fn register(self, sinks: ScanSinks) -> RegisteredScanner {
        self.guard
            .broker
            .attach_release_sink(&self.descriptor.id, sinks.release.clone());
        debug!("Registered notification sinks for {}", self.descriptor);
        RegisteredScanner {
            descriptor: self.descriptor,
            guard: self.guard,
            sinks,
        }
    }
}

/// A claimed scanner with all notification sinks attached, ready to enable.
pub struct RegisteredScanner {
    descriptor: DeviceDescriptor,
    guard: ClaimGuard,
    sinks: ScanSinks,
}

impl RegisteredScanner {
    /// Opens the device link and starts delivering scan reports.
    pub fn enable(self) -> Result<ActiveScanner, ClaimError> {
        let link = self.guard.broker.open_link(&self.descriptor)?;

        let enabled = Arc::new(AtomicBool::new(true));
        let running = Arc::new(AtomicBool::new(true));
        let reader = spawn_reader(
            link,
            self.sinks.data,
            self.sinks.error,
            Arc::clone(&enabled),
            Arc::clone(&running),
            self.descriptor.clone(),
        );

        info!("Scanner enabled: {}", self.descriptor);
        Ok(ActiveScanner {
            descriptor: self.descriptor,
            guard: self.guard,
            enabled,
            running,
            reader: Some(reader),
        })
    }
}

/// An enabled, exclusively owned scanner delivering scan reports.
pub struct ActiveScanner {
    descriptor: DeviceDescriptor,
    guard: ClaimGuard,
    enabled: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl ActiveScanner {
    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    /// Pauses report delivery without giving up the claim.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        debug!("Scanner disabled: {}", self.descriptor);
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
        debug!("Scanner enabled: {}", self.descriptor);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Answers a broker release request. The device is never surrendered
    /// mid-session; competing claimants are refused.
    pub fn retain(&self) {
        info!("Retaining {} against a release request.", self.descriptor);
    }
}

impl Drop for ActiveScanner {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        // The guard field drops after this body and releases the claim.
    }
}

fn spawn_reader(
    mut link: Box<dyn ScannerLink>,
    data_tx: Sender<ScanEvent>,
    error_tx: Sender<ErrorNotice>,
    enabled: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    descriptor: DeviceDescriptor,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut num_read_errors = 0u32;

        while running.load(Ordering::SeqCst) {
            match link.read_report(READ_TIMEOUT) {
                Ok(Some(report)) => {
                    num_read_errors = 0;

                    if !enabled.load(Ordering::SeqCst) {
                        debug!("Scanner is disabled, dropping report.");
                        continue;
                    }

                    debug!("Received {} bytes: {:02x?}", report.len(), report);

                    if let Some(event) = ScanEvent::parse(&report) {
                        if data_tx.send(event).is_err() {
                            debug!("No sink for scan event, dropping it.");
                        }
                    }
                }
                Ok(None) => {
                    num_read_errors = 0;
                }
                Err(e) => {
                    num_read_errors += 1;
                    warn!("Error reading from {}: {}", descriptor, e);

                    if num_read_errors >= MAX_READ_ERRORS {
                        let _ = error_tx.send(ErrorNotice {
                            message: format!("lost contact with {}: {}", descriptor, e),
                            lost: true,
                        });
                        break;
                    }

                    let _ = error_tx.send(ErrorNotice {
                        message: format!("read failure on {}: {}", descriptor, e),
                        lost: false,
                    });
                }
            }
        }

        debug!("Reader thread for {} exiting.", descriptor);
    })
}

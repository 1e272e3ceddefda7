use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver};
use tracing::{debug, info};

use crate::broker::ScannerBroker;
use crate::claim::{ActiveScanner, ErrorNotice, ReleaseRequest, ScanSinks};
use crate::decode::{self, ScanEvent};
use crate::devices::DiscoveryCriteria;
use crate::error::ClaimError;
use crate::validate::{self, Validation};

/// Callback surfacing non-fatal error notices to the calling collaborator,
/// which typically shows them as a modal notice.
pub type ErrorNoticeFn = Box<dyn FnMut(&str) + Send>;

/// Observable session state: the current text, its classification, and
/// whether the scanner link is still up.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct SessionState {
    pub text: String,
    pub validation: Validation,
    pub connected: bool,
}

/// An exclusive scanning session over one claimed scanner.
///
/// All state mutation happens on the caller's thread inside
/// [`ScanSession::pump`]: reports arriving from the reader thread are
/// queued and applied one at a time, so two scans are never processed
/// concurrently and state is never observed mid-update.
///
/// Dropping the session releases the device claim; [`ScanSession::close`]
/// does the same explicitly.
pub struct ScanSession {
    scanner: Option<ActiveScanner>,
    data_rx: Receiver<ScanEvent>,
    error_rx: Receiver<ErrorNotice>,
    release_rx: Receiver<ReleaseRequest>,
    state: SessionState,
    on_error: ErrorNoticeFn,
}

impl ScanSession {
    /// Discovers, claims, and enables a scanner, then enters the ready
    /// state with empty text.
    ///
    /// `DeviceNotFound` and `ClaimDenied` are fatal: without a working
    /// scanner the workflow cannot proceed and the caller must abort. Any
    /// claim obtained before a later initialization failure is released.
    pub fn open(
        broker: &Arc<ScannerBroker>,
        criteria: &DiscoveryCriteria,
        on_error: ErrorNoticeFn,
    ) -> Result<ScanSession, ClaimError> {
        info!("Opening scan session with criteria: {}", criteria);

        let handle = broker.find(criteria)?;
        let claimed = Arc::clone(broker).claim(handle)?;

        let (data_tx, data_rx) = unbounded();
        let (error_tx, error_rx) = unbounded();
        let (release_tx, release_rx) = unbounded();

        let registered = claimed.register(ScanSinks {
            data: data_tx,
            error: error_tx,
            release: release_tx,
        });
        let scanner = registered.enable()?;

        info!("Scan session ready on {}", scanner.descriptor());
        Ok(ScanSession {
            scanner: Some(scanner),
            data_rx,
            error_rx,
            release_rx,
            state: SessionState {
                text: String::new(),
                validation: validate::validate(""),
                connected: true,
            },
            on_error,
        })
    }

    /// Replaces the current text and re-validates it. Used to seed a
    /// placeholder at session start and by non-scanner input paths.
    /// Idempotent: setting the same text twice leaves the state unchanged.
    pub fn set_text(&mut self, text: &str) {
        self.state.text = text.to_string();
        self.state.validation = validate::validate(&self.state.text);
        debug!("Text set to {:?}: {:?}", self.state.text, self.state.validation);
    }

    /// Drains every queued notification on the caller's thread and applies
    /// it to the session state. Returns how many decoded scans were
    /// applied; reports without a label change nothing and count nothing.
    pub fn pump(&mut self) -> usize {
        while self.release_rx.try_recv().is_ok() {
            if let Some(scanner) = &self.scanner {
                scanner.retain();
            }
        }

        while let Ok(notice) = self.error_rx.try_recv() {
            if notice.lost {
                self.state.connected = false;
            }
            (self.on_error)(&notice.message);
        }

        let mut applied = 0;
        while let Ok(event) = self.data_rx.try_recv() {
            match decode::decode(event) {
                Some(text) => {
                    self.set_text(&text);
                    applied += 1;
                }
                None => debug!("Scan report carried no label, ignoring it."),
            }
        }
        applied
    }

    /// Current session text; the final accepted value is read from here.
    pub fn current_text(&self) -> &str {
        &self.state.text
    }

    /// Whether the current text passes validation. Drives the caller's
    /// confirm control.
    pub fn is_accepted(&self) -> bool {
        self.state.validation.is_accepted()
    }

    pub fn is_connected(&self) -> bool {
        self.state.connected
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Ends the session and releases the exclusive device claim.
    pub fn close(mut self) {
        if let Some(scanner) = self.scanner.take() {
            info!("Closing scan session on {}", scanner.descriptor());
        }
    }
}

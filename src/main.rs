use std::process;
use std::thread::sleep;
use std::time::Duration;

use tracing::{error, info};

use serial_scan::broker::ScannerBroker;
use serial_scan::device::hid::HidSource;
use serial_scan::devices::DiscoveryCriteria;
use serial_scan::session::ScanSession;
use serial_scan::tools;

/// Placeholder serial pre-filled at session start, replaced by the first
/// accepted scan.
static SEED_SERIAL: &str = "01BB2-12345";

/// How often queued scanner notifications are applied to the session.
static PUMP_INTERVAL: Duration = Duration::from_millis(100);

fn main() {
    tools::initialize_logging(false);
    info!("Starting serial number capture.");

    let source = match HidSource::new() {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to initialize hidapi: {}", e);
            process::exit(1);
        }
    };
    let broker = ScannerBroker::new(Box::new(source));
    let criteria = DiscoveryCriteria::from_env();

    let on_error = Box::new(|message: &str| error!("Scanner error: {}", message));
    let mut session = match ScanSession::open(&broker, &criteria, on_error) {
        Ok(session) => session,
        Err(e) => {
            error!("Cannot acquire a barcode scanner: {}", e);
            process::exit(1);
        }
    };

    session.set_text(SEED_SERIAL);
    info!(
        "Seeded serial {:?}, accept enabled: {}",
        session.current_text(),
        session.is_accepted()
    );

    loop {
        let scans = session.pump();
        if scans > 0 {
            info!(
                "Scanned {:?}, accept enabled: {}",
                session.current_text(),
                session.is_accepted()
            );
            if session.is_accepted() {
                break;
            }
        }
        if !session.is_connected() {
            error!("Lost the scanner connection, aborting.");
            process::exit(1);
        }
        sleep(PUMP_INTERVAL);
    }

    let serial = session.current_text().to_string();
    session.close();
    println!("{}", serial);
}

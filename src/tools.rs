use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initializes the global logging facility.
///
/// If `RUST_LOG` is not set, this function will set the global default logging level to `info`,
/// and for `serial_scan` it will set the `trace` logging level.
///
/// Log messages are formatted and printed to standard output by `tracing_subscriber::FmtSubscriber`.
///
/// # Panics
///
/// Panics if the initialization was unsuccessful, likely because a global subscriber was already
/// installed by another call to try_init.
pub fn initialize_logging(json_output: bool) {
    // set default logging levels:
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info,serial_scan=trace");
    }
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE);
    if json_output {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

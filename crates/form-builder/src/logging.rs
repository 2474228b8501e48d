use tracing::Level;

/// Installs the stderr fmt subscriber. A subscriber installed earlier (tests,
/// embedding hosts) is left in place.
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

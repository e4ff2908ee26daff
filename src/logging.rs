use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;

/// Route diagnostics to stderr for as long as the guard lives.
///
/// Debug output only appears when `debug` is set; warnings and errors always do.
pub fn init(debug: bool) -> DefaultGuard {
    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .finish();

    tracing::subscriber::set_default(subscriber)
}

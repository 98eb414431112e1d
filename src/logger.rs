use log::LevelFilter;

/// Level for the given switches. Quiet wins over verbose.
pub fn level_for(quiet: bool, verbose: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install the stderr logger. `RUST_LOG` overrides the level picked by the switches.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(quiet: bool, verbose: bool) {
    let _ = env_logger::Builder::new()
        .filter_level(level_for(quiet, verbose))
        .parse_default_env()
        .format_timestamp_millis()
        .target(env_logger::Target::Stderr)
        .try_init();
}

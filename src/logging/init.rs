use log::LevelFilter;

pub fn init_logging(verbose: bool, debug: bool, quiet: bool) {
    let log_level = if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Trace
    } else if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
}

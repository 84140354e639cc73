/// Environment variable overriding the log filters, in `env_logger` syntax.
pub const LOG_ENV: &str = "PYTEMPLATOR_LOG";

/// Initializes the global logger: `Info` by default, `Debug` when verbose.
///
/// Messages are printed without timestamps or module targets, since they are
/// meant for the person running the command. `PYTEMPLATOR_LOG` takes
/// precedence over both levels.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_env(LOG_ENV)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

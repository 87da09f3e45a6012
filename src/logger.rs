use std::env;
use std::path::PathBuf;

const LIBS_DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Warn;
const LIBS_LOG_LEVEL_VAR: &str = "TETCONVERT_LIBS_LOG_LEVEL";
const LOG_FILE_VAR: &str = "TETCONVERT_LOG_FILE";

/// Initializes logger for current environment.
///
/// Messages go to stderr. If `TETCONVERT_LOG_FILE` is set, messages are also
/// appended to that file. A log file that can't be opened is skipped.
pub fn init() -> Result<(), log::SetLoggerError> {
    let base_logger = fern::Dispatch::new()
        .level(libs_log_level())
        .chain(std::io::stderr());
    let env_specific_logger = init_env_specific(base_logger);

    with_log_file(env_specific_logger).apply()
}

fn libs_log_level() -> log::LevelFilter {
    env::var(LIBS_LOG_LEVEL_VAR)
        .map(|libs_log_level| parse_level(&libs_log_level))
        .unwrap_or(LIBS_DEFAULT_LOG_LEVEL)
}

fn parse_level(level: &str) -> log::LevelFilter {
    match level {
        "error" => log::LevelFilter::Error,
        "warning" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        "off" => log::LevelFilter::Off,
        _ => LIBS_DEFAULT_LOG_LEVEL,
    }
}

#[cfg(debug_assertions)]
fn init_env_specific(base_logger: fern::Dispatch) -> fern::Dispatch {
    use fern::colors::{Color, ColoredLevelConfig};

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Cyan)
        .debug(Color::BrightWhite)
        .trace(Color::White);

    base_logger
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] [{}] {}",
                chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .level_for("tetconvert", log::LevelFilter::Debug)
}

#[cfg(not(debug_assertions))]
fn init_env_specific(base_logger: fern::Dispatch) -> fern::Dispatch {
    base_logger
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] [{}] {}",
                chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level_for("tetconvert", log::LevelFilter::Info)
}

fn with_log_file(logger: fern::Dispatch) -> fern::Dispatch {
    let path = match env::var_os(LOG_FILE_VAR) {
        Some(path) => PathBuf::from(path),
        None => return logger,
    };

    match fern::log_file(&path) {
        Ok(file) => logger.chain(file),
        Err(err) => {
            eprintln!("Can't open log file {}: {}", path.display(), err);
            logger
        }
    }
}

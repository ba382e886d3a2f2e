//! Agent log output.
//!
//! The agent logs through `tracing`. When the host application has not
//! installed a subscriber of its own, this module installs one according
//! to the `log.*` config section: level filtering always, plus a rolling
//! file writer when `log.file_path` is set. Installation is best-effort;
//! an already-installed global subscriber wins silently.

use std::path::Path;

use tracing::level_filters::LevelFilter;

use crate::config::LogConfig;

fn parse_level(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

pub(crate) fn init_logger(cfg: &LogConfig) {
    let level = parse_level(&cfg.level);

    if cfg.file_path.is_empty() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .try_init();
        return;
    }

    let path = Path::new(&cfg.file_path);
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pinpoint-agent.log".to_string());

    let appender = tracing_appender::rolling::daily(dir, file_name);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(appender)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing_accepts_known_names() {
        assert_eq!(parse_level("debug"), LevelFilter::DEBUG);
        assert_eq!(parse_level("WARN"), LevelFilter::WARN);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level("bogus"), LevelFilter::INFO);
    }

    #[test]
    fn init_is_best_effort_and_repeatable() {
        let cfg = LogConfig {
            level: "debug".to_string(),
            file_path: String::new(),
            max_file_size: 10,
        };
        init_logger(&cfg);
        // A second call must not panic even though a subscriber exists.
        init_logger(&cfg);
    }
}

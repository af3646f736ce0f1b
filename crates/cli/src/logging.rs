use mdintake_core::config::types::ResolvedConfig;
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Overrides the configured levels with a full filter, e.g. `mdintake_core::schema=trace`.
const LOG_ENV: &str = "MDI_LOG";

/// Targets that follow the configured level. Everything else is capped at `warn`.
const OWN_TARGETS: [&str; 2] = ["mdintake_core", "mdi"];

static LOG_GUARD: Mutex<Option<tracing_appender::non_blocking::WorkerGuard>> =
    Mutex::new(None);

pub fn init(cfg: &ResolvedConfig) {
    let stderr_level = parse_level(&cfg.logging.level).unwrap_or(LevelFilter::INFO);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_filter(filter_for(stderr_level));

    let registry = tracing_subscriber::registry().with(stderr_layer);

    if let Some(ref path) = cfg.logging.file {
        let file_level_str = cfg.logging.file_level.as_deref().unwrap_or(&cfg.logging.level);
        let file_level = parse_level(file_level_str).unwrap_or(LevelFilter::DEBUG);

        let file = File::create(path).unwrap_or_else(|e| {
            eprintln!("Failed to create log file {}: {}", path.display(), e);
            std::process::exit(1);
        });

        let (non_blocking, guard) = tracing_appender::non_blocking(file);

        // The guard flushes the file writer when dropped at exit.
        if let Ok(mut g) = LOG_GUARD.lock() {
            *g = Some(guard);
        }

        // The file keeps targets so schema and store events can be told apart.
        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true)
            .with_filter(filter_for(file_level));

        registry.with(file_layer).init();
    } else {
        registry.init();
    }
}

/// `MDI_LOG`, then `RUST_LOG`, then [`default_directives`]. Unparseable
/// variables fall through.
fn filter_for(level: LevelFilter) -> EnvFilter {
    if let Ok(directives) = std::env::var(LOG_ENV)
        && let Ok(filter) = EnvFilter::try_new(&directives)
    {
        return filter;
    }

    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    EnvFilter::builder().parse_lossy(default_directives(level))
}

/// `level` for mdintake's own targets, at most `warn` for dependencies.
fn default_directives(level: LevelFilter) -> String {
    let others = level.min(LevelFilter::WARN);
    let mut spec = others.to_string().to_lowercase();
    for target in OWN_TARGETS {
        spec.push_str(&format!(",{target}={}", level.to_string().to_lowercase()));
    }
    spec
}

fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.to_lowercase().as_str() {
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}

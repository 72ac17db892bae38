use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

/// Logging switches taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub verbose: bool,
    pub json: bool,
    pub dir: Option<String>,
}

impl LogOptions {
    /// Filter used when `RUST_LOG` is not set.
    pub fn default_directive(&self) -> &'static str {
        if self.verbose {
            "scheduledevent_exporter=debug,warn"
        } else {
            "scheduledevent_exporter=info,warn"
        }
    }
}

/// Initializes console logging and, when a directory is given, a JSON file log
/// rotated daily.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init_logging(options: &LogOptions) -> std::io::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.default_directive()));

    let console_layer = if options.json {
        fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stdout)
            .boxed()
    };

    let (file_layer, guard) = match &options.dir {
        Some(dir) => {
            ensure_log_dir(Path::new(dir))?;
            let file_appender = tracing_appender::rolling::daily(dir, "exporter.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            (Some(fmt::layer().json().with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn ensure_log_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

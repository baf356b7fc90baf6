use std::fs;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use petnamer::paths;

#[derive(Clone, Copy, Debug)]
pub enum JsonLogFormat {
    Pretty,
    Compact,
}

/// Initializes the tracing subscriber with layered output:
/// 1. Stdout: formatted according to the `log_json` and `verbose` flags.
/// 2. File: full JSON debug logs to `~/.petnamer/logs/<run_id>.log`.
///
/// Returns a WorkerGuard that must be held by main() so file logs are flushed.
pub fn init(
    verbose: bool,
    log_json: bool,
    json_format: JsonLogFormat,
    run_id: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_env_filter(verbose));

    let log_dir = paths::logs_dir();
    let (file_layer, guard) = match fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let file_appender =
                tracing_appender::rolling::never(&log_dir, format!("{run_id}.log"));
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(Targets::new().with_default(tracing::Level::DEBUG));
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("Warning: Failed to create log dir {}: {e}", log_dir.display());
            (None, None)
        }
    };

    let stdout_layer: Box<dyn Layer<Registry> + Send + Sync> = if log_json {
        match json_format {
            JsonLogFormat::Pretty => Box::new(
                fmt::layer()
                    .json()
                    .with_writer(|| PrettyJsonWriter::new(std::io::stdout()))
                    .with_filter(stdout_filter),
            ),
            JsonLogFormat::Compact => Box::new(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stdout)
                    .with_filter(stdout_filter),
            ),
        }
    } else if verbose {
        Box::new(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(stdout_filter),
        )
    } else {
        Box::new(
            fmt::layer()
                .with_writer(std::io::stdout)
                .without_time()
                .with_target(false)
                .with_filter(stdout_filter),
        )
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}

/// Re-indents single-line JSON records; anything else passes through untouched.
struct PrettyJsonWriter<W: std::io::Write> {
    inner: W,
}

impl<W: std::io::Write> PrettyJsonWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: std::io::Write> std::io::Write for PrettyJsonWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let parsed = std::str::from_utf8(buf)
            .ok()
            .map(str::trim)
            .filter(|line| line.starts_with('{') && line.ends_with('}'))
            .and_then(|line| serde_json::from_str::<serde_json::Value>(line).ok());
        if let Some(value) = parsed
            && serde_json::to_writer_pretty(&mut self.inner, &value).is_ok()
        {
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

fn default_env_filter(verbose: bool) -> EnvFilter {
    let spec = if verbose {
        "petnamer=debug,rig_core=warn,info"
    } else {
        "petnamer=info,rig_core=warn,warn"
    };
    EnvFilter::new(spec)
}

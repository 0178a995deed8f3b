//! Tracing setup.
//!
//! A bootstrap subscriber covers configuration loading, before the log
//! settings are known. After that, stderr always gets a layer, compact text
//! or JSON lines. When a log directory is configured, a daily-rolling file
//! gets JSON lines as well.
//! Verbosity comes from `RUST_LOG`, defaulting to `info`.

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::LoggingSettings;

/// File name prefix for rolled log files.
pub const LOG_FILE_PREFIX: &str = "port-out-validation.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Compact subscriber for startup, meant for `tracing::subscriber::with_default`.
pub fn bootstrap_subscriber<W>(make_writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt()
        .with_env_filter(env_filter())
        .with_writer(make_writer)
        .with_target(false)
        .compact()
        .finish()
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for the life of the process, otherwise
/// buffered file output is lost.
pub fn init_logging(settings: &LoggingSettings) -> Option<WorkerGuard> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);
    if settings.json {
        layers.push(stderr.json().with_filter(env_filter()).boxed());
    } else {
        layers.push(stderr.compact().with_filter(env_filter()).boxed());
    }

    let guard = settings.directory.as_ref().map(|directory| {
        let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .json()
                .with_filter(env_filter())
                .boxed(),
        );
        guard
    });

    tracing_subscriber::registry().with(layers).init();
    guard
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::ServiceConfig;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn ignored_override_is_logged_during_startup() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = bootstrap_subscriber(move || writer.clone());
        let lookup = |key: &str| (key == "PORT_OUT_PORT").then(|| "not-a-port".to_string());

        let config = tracing::subscriber::with_default(subscriber, || {
            let mut config = ServiceConfig::default();
            config.apply_overrides(lookup);
            config
        });

        assert_eq!(config.port, 3000);
        let text = logs.text();
        assert!(text.contains("Ignoring invalid PORT_OUT_PORT"), "{text}");
        assert!(text.contains("not-a-port"), "{text}");
    }
}

//! Tracing setup for hosts embedding the compiler.
//!
//! The filter comes from `OJC_LOG`, falling back to `RUST_LOG`, so a host
//! can turn on compiler spans without touching its own log level:
//!
//! ```text
//! OJC_LOG=ojc_gen=debug        generator rewrites
//! OJC_LOG=ojc_model=trace      builder and model preparation
//! ```

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Environment variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "OJC_LOG";

/// Where formatted events go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogWriter {
    /// Keeps stdout free for generated code.
    #[default]
    Stderr,
    Stdout,
}

/// Install a stderr subscriber when `OJC_LOG` or `RUST_LOG` is set.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_tracing() {
    init_tracing_with(LogWriter::Stderr);
}

/// Like [`init_tracing`], writing events to `writer`.
pub fn init_tracing_with(writer: LogWriter) {
    TRACING_INIT.call_once(|| {
        let Some(directives) = filter_directives(
            std::env::var(LOG_ENV).ok(),
            std::env::var("RUST_LOG").ok(),
        ) else {
            return;
        };
        let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"));
        let layer = fmt::layer().with_target(true).without_time();
        let registry = tracing_subscriber::registry().with(filter);
        let installed = match writer {
            LogWriter::Stderr => registry.with(layer.with_writer(std::io::stderr)).try_init(),
            LogWriter::Stdout => registry.with(layer.with_writer(std::io::stdout)).try_init(),
        };
        if let Err(error) = installed {
            tracing::debug!(%error, "host already installed a subscriber");
        }
    });
}

/// Pick the filter text: `OJC_LOG` wins, blank values count as unset.
fn filter_directives(ojc_log: Option<String>, rust_log: Option<String>) -> Option<String> {
    [ojc_log, rust_log]
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

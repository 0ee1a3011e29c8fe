//! Tracing setup and request-scoped trace ids for the board API.

use std::sync::OnceLock;

use log::LevelFilter;
use tokio::task_local;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::AppConfig;

/// Correlation id carried through one request's task. Error responses echo
/// it back as `trace_id` so a log line can be matched to its response body.
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub trace_id: String,
}

task_local! {
    static ACTIVE_TRACE_CONTEXT: TraceContext;
}

static SUBSCRIBER_INSTALLED: OnceLock<()> = OnceLock::new();

/// Installs the global tracing subscriber once per process.
///
/// The filter honors `RUST_LOG` when set and falls back to the configured
/// board log level. `TRIAGE_LOG_FORMAT=pretty` selects human-readable
/// output; anything else emits JSON lines. Legacy `log::` macros from
/// dependencies are bridged into the same pipeline. Calling this again, or
/// losing the install race to another subscriber, is a no-op.
pub fn init_tracing(config: &AppConfig) {
    SUBSCRIBER_INSTALLED.get_or_init(|| {
        // A failed bridge install means one is already registered.
        let _ = LogTracer::builder()
            .with_max_level(LevelFilter::Trace)
            .init();

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
        let format = match config.log_format.as_str() {
            "pretty" => fmt::layer().pretty().boxed(),
            _ => fmt::layer().json().boxed(),
        };
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(format)
            .try_init();
    });
}

/// Runs `future` with `context` installed as the task-local trace context.
pub async fn with_trace_context<Fut, R>(context: TraceContext, future: Fut) -> R
where
    Fut: std::future::Future<Output = R>,
{
    ACTIVE_TRACE_CONTEXT.scope(context, future).await
}

/// Trace id of the current request, if the task runs inside
/// [`with_trace_context`].
pub fn current_trace_id() -> Option<String> {
    ACTIVE_TRACE_CONTEXT
        .try_with(|ctx| ctx.trace_id.clone())
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trace_id_is_scoped_to_the_wrapped_future() {
        assert_eq!(current_trace_id(), None);

        let context = TraceContext {
            trace_id: "trace-1234".to_string(),
        };
        let seen = with_trace_context(context, async { current_trace_id() }).await;
        assert_eq!(seen.as_deref(), Some("trace-1234"));

        assert_eq!(current_trace_id(), None);
    }
}

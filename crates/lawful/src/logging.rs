// Purpose: Tracing initialization for binaries and tests that use the crate

use std::sync::Once;

use anyhow::Result;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    EnvFilter, Registry,
};

//-----------------------------------------------------------------------------
// Tracing Initialization
//-----------------------------------------------------------------------------

/// Initializes the global tracing subscriber.
///
/// # Arguments
///
/// * `log_level`: filter directives used when `RUST_LOG` is unset.
///                Defaults to "info". Derivation rules and replay forks log at
///                "debug", individual suspension points at "trace", e.g.
///                "lawful=trace".
/// * `json_output`: emit JSON lines on stdout instead of the human-readable
///                  format. Defaults to `false`.
///
/// Fails if the directives do not parse or a global subscriber is already set.
pub fn init_tracing(log_level: Option<&str>, json_output: Option<bool>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.unwrap_or("info")))?;

    let subscriber = build_subscriber(env_filter, json_output.unwrap_or(false), std::io::stdout);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// Registry with `filter` and one formatting layer writing to `writer`
fn build_subscriber<W>(
    filter: EnvFilter,
    json: bool,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let registry = Registry::default().with(filter);

    if json {
        let json_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(writer);
        Box::new(registry.with(json_layer))
    } else {
        let fmt_layer = fmt::layer()
            .pretty()
            .with_target(true)
            .with_level(true)
            .with_writer(writer);
        Box::new(registry.with(fmt_layer))
    }
}

static TEST_INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Later calls are no-ops, as is the first one when another subscriber
/// already won.
pub fn init_test_logging() {
    TEST_INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("lawful=debug"));
        let subscriber = Registry::default()
            .with(env_filter)
            .with(fmt::layer().with_test_writer().with_target(true));
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

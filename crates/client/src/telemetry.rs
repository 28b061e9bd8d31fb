//! Tracing subscriber setup.
//!
//! `RUST_LOG` controls filtering. Set `BILLFLOW_LOG_FORMAT=json` for
//! structured JSON output instead of the human-readable formatter.

use std::sync::Once;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "billflow_client=info,billflow_core=info";

static INIT: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops, as is a call made
/// after some other subscriber was installed.
pub fn init_tracing() {
    INIT.call_once(|| {
        let json = std::env::var("BILLFLOW_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

        let result = tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
            .with(json.then(|| fmt::layer().json()))
            .with((!json).then(|| fmt::layer()))
            .try_init();

        if result.is_ok() {
            tracing::debug!(json, "Tracing initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_tracing();
        init_tracing();
        tracing::info!("still logging");
    }
}

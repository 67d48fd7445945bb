//! stderr logging for the native build

use tracing_subscriber::{fmt, EnvFilter};

use crate::core::consts::env;

/// Session and CLI events at `info`; dependencies only when they warn.
pub const DEFAULT_FILTER: &str = "warn,cip30_session=info,cip30_inspect=info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn json_requested(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

/// Install the subscriber. `RUST_LOG` overrides [`DEFAULT_FILTER`];
/// `CIP30_LOG_JSON=1` switches to JSON lines. Later calls are no-ops.
pub fn init_logging() {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter())
        .with_writer(std::io::stderr);

    let json = json_requested(std::env::var(env::LOG_JSON).ok().as_deref());
    let _ = if json { builder.json().try_init() } else { builder.compact().with_target(false).try_init() };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn json_switch_values() {
        assert!(json_requested(Some("1")));
        assert!(json_requested(Some("true")));
        assert!(!json_requested(Some("0")));
        assert!(!json_requested(None));
    }

    #[test]
    fn second_init_is_harmless() {
        init_logging();
        init_logging();
    }
}

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Filter directive for this crate at `level`
pub fn directive(level: &str, verbose: bool) -> String {
    if verbose {
        "churn_advisor=debug,info".to_string()
    } else {
        format!("churn_advisor={},warn", level)
    }
}

/// Compact logs on stderr so stdout stays clean for JSON and CSV output.
/// Fails when a global subscriber is already installed.
pub fn init_logger(level: &str, verbose: bool) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(level, verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| {
            tracing::debug!(error = %e, "logger already installed");
            e
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive() {
        assert_eq!(directive("info", false), "churn_advisor=info,warn");
        assert_eq!(directive("warn", true), "churn_advisor=debug,info");
    }

    #[test]
    fn test_second_init_reports_error() {
        let _ = init_logger("info", false);
        assert!(init_logger("debug", true).is_err());
        tracing::info!("logger ready");
    }
}

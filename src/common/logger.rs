//! Logging setup utilities for the presence server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// This function sets up logging for both the library crate and the binary.
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use hanare::common::logger::setup_logger;
///
/// setup_logger("server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the fallback filter covering the library crate and the binary at
/// the same level.
fn default_filter(binary_name: &str, level: &str) -> String {
    let lib_target = env!("CARGO_PKG_NAME").replace('-', "_");
    format!("{lib_target}={level},{binary_name}={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_lib_and_binary() {
        // テスト項目: フォールバックのフィルタがライブラリとバイナリの
        //             両ターゲットを同じレベルで含む
        // when (操作):
        let filter = default_filter("server", "debug");

        // then (期待する結果):
        assert_eq!(filter, "hanare=debug,server=debug");
    }

    #[test]
    fn test_default_filter_uses_given_level() {
        // テスト項目: 指定したログレベルがそのまま反映される
        // when (操作):
        let filter = default_filter("worker", "warn");

        // then (期待する結果):
        assert_eq!(filter, "hanare=warn,worker=warn");
    }
}

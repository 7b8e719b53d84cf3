// # v6ddnsd - IPv6 DDNS Daemon
//
// Keeps one Cloudflare AAAA record pointing at this host's outbound IPv6
// address. The daemon is a thin integration layer: all DDNS logic lives in
// v6ddns-core.
//
// The daemon is responsible for:
// 1. Setting up logging
// 2. Reading configuration from environment variables
// 3. Wiring the socket IP source and the Cloudflare provider into the engine
// 4. Running the engine until SIGINT/SIGTERM
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Required
// - `CF_API_TOKEN`: Cloudflare API token (Zone:Read, DNS:Edit)
// - `DOMAIN`: Zone name, e.g. `example.com`
// - `RECORD_NAME`: AAAA record to manage, e.g. `home.example.com`
//
// ### Optional
// - `CHECK_INTERVAL`: Minutes between checks (default 5)
// - `CF_API_BASE_URL`: API root (default `https://api.cloudflare.com/client/v4`)
// - `DDNS_HTTP_TIMEOUT_SECS`: Per-request timeout (default 10)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `DDNS_LOG_FILE`: Append-only log file (default `ddns.log`)
//
// ## Example
//
// ```bash
// export CF_API_TOKEN=your_token
// export DOMAIN=example.com
// export RECORD_NAME=home.example.com
// export CHECK_INTERVAL=5
//
// v6ddnsd
// ```

mod logging;

use anyhow::Result;
use std::process::ExitCode;
use tracing::{error, info};
use v6ddns_core::{DdnsConfig, DdnsEngine, LogConfig, RunSummary};
use v6ddns_ip_socket::SocketIpSource;
use v6ddns_provider_cloudflare::CloudflareProvider;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    if let Err(e) = logging::init_logging(&LogConfig::from_env()) {
        eprintln!("{}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let engine = match prepare_engine(|key| std::env::var(key).ok()) {
        Ok(engine) => engine,
        Err(code) => return code.into(),
    };

    // One thread is enough: cycles run strictly one after another
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(engine).await {
            Ok(summary) => {
                info!(
                    "DDNS service stopped: {} cycle(s), {} updated, {} unchanged, {} failed",
                    summary.cycles, summary.updated, summary.unchanged, summary.failed
                );
                DdnsExitCode::CleanShutdown
            }
            Err(e) => {
                error!("Daemon error: {}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Load configuration through `lookup` and build the engine
///
/// Failures are logged here; the caller only turns them into an exit code.
/// No engine exists unless configuration is complete and valid.
fn prepare_engine<F>(lookup: F) -> std::result::Result<DdnsEngine, DdnsExitCode>
where
    F: Fn(&str) -> Option<String>,
{
    let config = DdnsConfig::from_lookup(lookup).map_err(|e| {
        error!("Configuration error: {}", e);
        exit_code_for(&e)
    })?;

    info!("DDNS service started");
    info!("Domain: {}", config.record_name);
    info!("Check interval: {} minutes", config.check_interval_mins);

    build_engine(&config).map_err(|e| {
        error!("Startup error: {}", e);
        exit_code_for(&e)
    })
}

fn exit_code_for(error: &v6ddns_core::Error) -> DdnsExitCode {
    if error.is_fatal() {
        DdnsExitCode::ConfigError
    } else {
        DdnsExitCode::RuntimeError
    }
}

/// Wire the concrete IP source and provider into an engine
fn build_engine(config: &DdnsConfig) -> v6ddns_core::Result<DdnsEngine> {
    let ip_source = SocketIpSource::new();
    let provider = CloudflareProvider::from_config(&config.provider)?;

    DdnsEngine::new(Box::new(ip_source), Box::new(provider), config)
}

/// Run the engine until a shutdown signal arrives
async fn run_daemon(engine: DdnsEngine) -> Result<RunSummary> {
    let shutdown = shutdown_signal()?;

    let summary = engine
        .run_until(async {
            let name = shutdown.await;
            info!("Received shutdown signal: {}", name);
        })
        .await;

    Ok(summary)
}

/// Future resolving on SIGTERM or SIGINT
///
/// Handlers are installed before this returns, so a signal arriving during
/// the startup cycle is not lost.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}

/// Future resolving on Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                error!("Failed to wait for CTRL-C: {}", e);
                std::future::pending().await
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use v6ddns_core::config::{ENV_API_TOKEN, ENV_CHECK_INTERVAL, ENV_DOMAIN, ENV_RECORD_NAME};

    /// Log sink shared between a scoped subscriber and the test
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn install() -> (Self, tracing::subscriber::DefaultGuard) {
            let logs = Self::default();
            let writer = logs.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_ansi(false)
                .with_writer(move || writer.clone())
                .finish();
            (logs, tracing::subscriber::set_default(subscriber))
        }

        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn complete_env(key: &str) -> Option<String> {
        match key {
            ENV_API_TOKEN => Some("test-token".to_string()),
            ENV_DOMAIN => Some("example.com".to_string()),
            ENV_RECORD_NAME => Some("home.example.com".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_missing_required_variable_stops_before_engine() {
        for missing in [ENV_API_TOKEN, ENV_DOMAIN, ENV_RECORD_NAME] {
            let (logs, _guard) = CapturedLogs::install();

            let result = prepare_engine(|key| {
                if key == missing {
                    None
                } else {
                    complete_env(key)
                }
            });

            assert_eq!(result.err(), Some(DdnsExitCode::ConfigError));

            let output = logs.contents();
            let error_line = output
                .lines()
                .find(|line| line.contains("Configuration error"))
                .unwrap_or_else(|| panic!("no configuration error logged: {:?}", output));
            assert!(error_line.contains("ERROR"));
            assert!(error_line.contains(missing));
            assert!(
                !output.contains("DDNS service started"),
                "startup must stop at the configuration error"
            );
        }
    }

    #[test]
    fn test_invalid_interval_is_config_error() {
        let (logs, _guard) = CapturedLogs::install();

        let result = prepare_engine(|key| match key {
            ENV_CHECK_INTERVAL => Some("soon".to_string()),
            _ => complete_env(key),
        });

        assert_eq!(result.err(), Some(DdnsExitCode::ConfigError));
        assert!(logs.contents().contains(ENV_CHECK_INTERVAL));
    }

    #[test]
    fn test_complete_config_logs_banner_and_builds_engine() {
        let (logs, _guard) = CapturedLogs::install();

        let engine = prepare_engine(complete_env)
            .unwrap_or_else(|code| panic!("unexpected exit code {:?}", code));
        assert_eq!(engine.check_interval(), std::time::Duration::from_secs(300));

        let output = logs.contents();
        assert!(output.contains("DDNS service started"));
        assert!(output.contains("Domain: home.example.com"));
        assert!(output.contains("Check interval: 5 minutes"));
        assert!(!output.contains("ERROR"));
    }

    #[test]
    fn test_exit_code_follows_error_kind() {
        assert_eq!(
            exit_code_for(&v6ddns_core::Error::configuration_missing("DOMAIN")),
            DdnsExitCode::ConfigError
        );
        assert_eq!(
            exit_code_for(&v6ddns_core::Error::config("bad interval")),
            DdnsExitCode::ConfigError
        );
        assert_eq!(
            exit_code_for(&v6ddns_core::Error::transport("connection reset")),
            DdnsExitCode::RuntimeError
        );
    }

    #[test]
    fn test_exit_code_values() {
        assert_eq!(DdnsExitCode::CleanShutdown as u8, 0);
        assert_eq!(DdnsExitCode::ConfigError as u8, 1);
        assert_eq!(DdnsExitCode::RuntimeError as u8, 2);
    }

    #[test]
    fn test_build_engine_from_config() {
        let config = DdnsConfig::new("test-token", "example.com", "home.example.com")
            .with_check_interval_mins(10);

        let engine = build_engine(&config).expect("engine builds");
        assert_eq!(engine.check_interval(), std::time::Duration::from_secs(600));
    }

    #[test]
    fn test_build_engine_rejects_bad_provider_settings() {
        let mut config = DdnsConfig::new("test-token", "example.com", "home.example.com");
        config.provider.api_base_url = "ftp://api.example.com".to_string();

        assert!(build_engine(&config).is_err());
    }
}

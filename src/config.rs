use crate::constants::DEFAULT_API_URL;
use crate::error::{ExporterError, Result};
use crate::logging::LogOptions;
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "scheduledevent-exporter")]
#[command(about = "Prometheus exporter for scheduled maintenance events")]
#[command(version)]
pub struct Config {
    /// Scheduled events endpoint
    #[arg(long = "api-url", env = "API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout for one poll (e.g. 500ms, 30s, 1m)
    #[arg(long = "api-timeout", env = "API_TIMEOUT", default_value = "30s", value_parser = parse_duration)]
    pub api_timeout: Duration,

    /// Consecutive failed polls tolerated before exiting; 0 or less never exits
    #[arg(
        long = "api-error-threshold",
        env = "API_ERROR_THRESHOLD",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    pub api_error_threshold: i64,

    /// Interval between polls
    #[arg(long = "scrape-time", env = "SCRAPE_TIME", default_value = "1m", value_parser = parse_duration)]
    pub scrape_time: Duration,

    /// Listen address for the scrape endpoint (":8080" binds all interfaces)
    #[arg(long = "bind", env = "SERVER_BIND", default_value = ":8080")]
    pub bind: String,

    /// Debug logging for the exporter
    #[arg(short, long, env = "VERBOSE")]
    pub verbose: bool,

    /// JSON console logs
    #[arg(long = "log-json", env = "LOG_JSON")]
    pub log_json: bool,

    /// Also write JSON logs to a daily rotated file in this directory
    #[arg(long = "log-dir", env = "LOG_DIR")]
    pub log_dir: Option<String>,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.scrape_time.is_zero() {
            return Err(ExporterError::Config("scrape time must be greater than zero".into()));
        }
        if self.api_timeout.is_zero() {
            return Err(ExporterError::Config("api timeout must be greater than zero".into()));
        }
        if self.api_url.trim().is_empty() {
            return Err(ExporterError::Config("api url must not be empty".into()));
        }
        self.bind_addr()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let bind = self.bind.trim();
        let full = if bind.starts_with(':') {
            format!("0.0.0.0{}", bind)
        } else {
            bind.to_string()
        };
        full.parse()
            .map_err(|e| ExporterError::Config(format!("invalid bind address '{}': {}", self.bind, e)))
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            verbose: self.verbose,
            json: self.log_json,
            dir: self.log_dir.clone(),
        }
    }
}

/// Parse `<n>[ms|s|m|h]`; a bare integer is seconds.
pub fn parse_duration(text: &str) -> std::result::Result<Duration, String> {
    let text = text.trim();
    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, unit) = text.split_at(split);
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration '{}'", text))?;

    let seconds = |factor: u64| {
        value
            .checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration '{}' is out of range", text))
    };

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "" | "s" => Ok(Duration::from_secs(value)),
        "m" => seconds(60),
        "h" => seconds(3600),
        other => Err(format!("unknown duration unit '{}' in '{}'", other, text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["scheduledevent-exporter"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("5d").is_err());
    }

    #[test]
    fn oversized_durations_are_rejected() {
        assert!(parse_duration("999999999999999999m").is_err());
        assert!(parse_duration("999999999999999999h").is_err());
        assert_eq!(
            parse_duration("999999999999999999s").unwrap(),
            Duration::from_secs(999_999_999_999_999_999)
        );
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--api-url",
            "http://127.0.0.1:1/events",
            "--scrape-time",
            "10s",
            "--api-timeout",
            "2s",
            "--api-error-threshold",
            "3",
            "--bind",
            "127.0.0.1:9100",
        ]);
        assert_eq!(config.api_url, "http://127.0.0.1:1/events");
        assert_eq!(config.scrape_time, Duration::from_secs(10));
        assert_eq!(config.api_timeout, Duration::from_secs(2));
        assert_eq!(config.api_error_threshold, 3);
        assert_eq!(config.bind_addr().unwrap(), "127.0.0.1:9100".parse().unwrap());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn negative_threshold_is_accepted() {
        let config = parse(&["--api-error-threshold", "-1"]);
        assert_eq!(config.api_error_threshold, -1);
    }

    #[test]
    fn bare_port_binds_all_interfaces() {
        let config = parse(&["--bind", ":8080"]);
        assert_eq!(config.bind_addr().unwrap(), "0.0.0.0:8080".parse().unwrap());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = parse(&["--scrape-time", "0s"]);
        assert!(matches!(config.validate(), Err(ExporterError::Config(_))));

        let config = parse(&["--bind", "not-an-addr"]);
        assert!(config.validate().is_err());
    }
}

use clap::Parser;
use clap::ValueEnum;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum,Debug)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Parser, Debug,Clone)]
#[command(version = "0.0.1", about = "Goal Storage")]
pub struct Opt {

    /// Enable telemetry data to be sent to jaeger or other endpoints
    /// that support otel data.
    /// Example: https://127.0.0.1:4317/api/traces
    #[clap(short, long, env = "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT")]
    pub otel_trace_endpoint: Option<String>,

    #[clap(short, long, default_value="info")]
    pub log_level: LogLevel,

    #[clap(short, long, env = "PORT", default_value="8000")]
    pub port: u16,

    /// Endpoint of the authentication api used to resolve bearer tokens into user ids.
    #[clap(short, long, env = "AUTH_URL", value_parser = parse_auth_url)]
    pub auth_url: reqwest::Url,

    /// Where the goal documents are persisted
    #[clap(long, env = "GOAL_DB_PATH", default_value=".goal_db")]
    pub db_path: std::path::PathBuf,

    #[clap(long, env = "GOAL_COLLECTION", default_value="ptrainer_goals")]
    pub collection: String,

    /// Upper bound for a single storage operation
    #[clap(long, default_value="10")]
    pub store_timeout_secs: u64,

    /// Upper bound for a single call to the authentication api
    #[clap(long, default_value="10")]
    pub auth_timeout_secs: u64,

}

// .env files tend to carry the url wrapped in single quotes
pub fn parse_auth_url(raw:&str) -> Result<reqwest::Url,String> {
    let trimmed = raw.trim().trim_matches('\'');
    let url = reqwest::Url::parse(trimmed).map_err(|e|format!("invalid auth url '{trimmed}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("invalid auth url '{trimmed}': unsupported scheme '{other}', must be http or https"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_url_quotes_are_trimmed() {
        let url = parse_auth_url("'http://localhost:9000/auth/me'").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/auth/me");
    }

    #[test]
    fn auth_url_must_be_http() {
        assert!(parse_auth_url("ftp://localhost/auth").is_err());
        assert!(parse_auth_url("not a url").is_err());
    }

    #[test]
    fn defaults_are_applied() {
        let opt = Opt::try_parse_from(["goal-storage","--auth-url","https://auth.example.com/me"]).unwrap();
        assert_eq!(opt.collection, "ptrainer_goals");
        assert_eq!(opt.store_timeout_secs, 10);
        assert_eq!(opt.log_level, LogLevel::Info);
    }
}

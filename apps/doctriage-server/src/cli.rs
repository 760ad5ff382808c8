//! Command-line argument parsing

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "doctriage-server",
    about = "Document classification server",
    version,
    long_about = "Accepts document uploads, extracts their text, assigns a category \
                  and priority, and notifies the responsible department."
)]
pub struct Args {
    /// Path to configuration file; environment variables only when omitted
    #[arg(short, long, env = "DOCTRIAGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// HTTP server port, overrides the configured one
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "LOG_LEVEL",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: String,

    /// Environment (dev, staging, prod)
    #[arg(
        short,
        long,
        env = "ENVIRONMENT",
        default_value = "dev",
        value_parser = ["dev", "staging", "prod"]
    )]
    pub env: String,

    /// Enable JSON log format (useful for production)
    #[arg(long, env = "JSON_LOGS")]
    pub json_logs: bool,
}

impl Args {
    /// Validate the arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.config {
            if !path.exists() {
                anyhow::bail!("config file not found: {}", path.display());
            }
        }
        if self.port == Some(0) {
            anyhow::bail!("port must be non-zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_flags() {
        let args = Args::try_parse_from([
            "doctriage-server",
            "--log-level",
            "debug",
            "--env",
            "prod",
            "--json-logs",
        ])
        .unwrap();
        assert_eq!(args.log_level, "debug");
        assert_eq!(args.env, "prod");
        assert!(args.json_logs);
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(Args::try_parse_from(["doctriage-server", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn test_validate() {
        let args = Args::try_parse_from(["doctriage-server", "--port", "8081"]).unwrap();
        assert!(args.validate().is_ok());

        let args =
            Args::try_parse_from(["doctriage-server", "--config", "/no/such/doctriage.toml"])
                .unwrap();
        assert!(args.validate().is_err());
    }
}

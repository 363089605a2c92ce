pub mod toml_config;

pub use toml_config::{DisplayConfig, ExtractorConfig, QuoterConfig};

#[cfg(feature = "cli")]
use crate::domain::model::PlanId;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "plan-quoter")]
#[command(about = "Health plan quoting tool with AI-assisted price table updates")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// API key for the extraction service
    #[arg(long, env = "API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Override the extraction service endpoint
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Override the extraction model
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Currency locale (es-AR or en-US)
    #[arg(long, global = true)]
    pub locale: Option<String>,

    /// Start from a pricing snapshot written by `update-prices --output`
    #[arg(long, global = true)]
    pub prices: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Quote a plan for a contribution and an age
    Quote {
        /// Raw monthly contribution (aportes)
        #[arg(long, default_value = "")]
        aportes: String,

        /// Member age (edad)
        #[arg(long)]
        edad: String,

        /// Plan: 200, 300, 400, 500 or "POR APORTES"
        #[arg(long, default_value = "200")]
        plan: PlanId,
    },
    /// Refresh the price table from a photo of the price grid
    UpdatePrices {
        /// PNG or JPEG image of the price table
        #[arg(long)]
        image: String,

        /// Write the new table as a JSON snapshot
        #[arg(long)]
        output: Option<String>,
    },
    /// Print the current price table
    Prices,
    /// Interactive quoting session
    Session,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 合併設定檔與命令列覆蓋設定
    pub fn resolve(&self) -> Result<QuoterConfig> {
        let mut config = match &self.config {
            Some(path) => QuoterConfig::from_file(path)?,
            None => QuoterConfig::default(),
        };

        if let Some(api_key) = &self.api_key {
            config.extractor.api_key = Some(api_key.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.extractor.endpoint = endpoint.clone();
        }
        if let Some(model) = &self.model {
            config.extractor.model = model.clone();
        }
        if let Some(locale) = &self.locale {
            config.display.locale = locale.clone();
        }

        Ok(config)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::core::ConfigProvider;

    #[test]
    fn test_parse_quote_command() {
        let cli = CliConfig::try_parse_from([
            "plan-quoter",
            "quote",
            "--aportes",
            "100000",
            "--edad",
            "35",
            "--plan",
            "POR APORTES",
        ])
        .unwrap();

        match cli.command {
            Command::Quote { aportes, edad, plan } => {
                assert_eq!(aportes, "100000");
                assert_eq!(edad, "35");
                assert_eq!(plan, PlanId::ByContribution);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_plan_is_rejected() {
        let parsed = CliConfig::try_parse_from([
            "plan-quoter",
            "quote",
            "--edad",
            "35",
            "--plan",
            "900",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = CliConfig::try_parse_from([
            "plan-quoter",
            "--api-key",
            "k-1",
            "--model",
            "gemini-test",
            "--locale",
            "en-US",
            "prices",
        ])
        .unwrap();

        let config = cli.resolve().unwrap();
        assert_eq!(config.extractor.api_key(), Some("k-1"));
        assert_eq!(config.extractor.model, "gemini-test");
        assert_eq!(config.display.locale, "en-US");
    }
}

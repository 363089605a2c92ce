use crate::adapters::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::core::currency::{CurrencyFormat, DEFAULT_LOCALE};
use crate::core::ConfigProvider;
use crate::domain::model::PricingTable;
use crate::utils::error::{QuoterError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoterConfig {
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    /// 啟動時使用的價格表；未設定時使用內建表
    pub pricing: Option<PricingTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
        }
    }
}

impl QuoterConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(QuoterError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| QuoterError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| QuoterError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Table the store is seeded with.
    pub fn initial_table(&self) -> PricingTable {
        self.pricing.clone().unwrap_or_else(PricingTable::builtin)
    }

    pub fn currency_format(&self) -> Result<CurrencyFormat> {
        CurrencyFormat::for_locale(&self.display.locale)
    }
}

impl ExtractorConfig {
    /// Key that is still a literal `${VAR}` placeholder counts as absent.
    fn resolved_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.starts_with("${"))
    }

    /// Checks needed before an extraction request can be sent.
    pub fn validate_for_extraction(&self) -> Result<()> {
        self.validate()?;
        validation::validate_required_field("extractor.api_key", &self.resolved_api_key())?;
        Ok(())
    }
}

impl ConfigProvider for ExtractorConfig {
    fn api_endpoint(&self) -> &str {
        &self.endpoint
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Option<&str> {
        self.resolved_api_key()
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl Validate for ExtractorConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("extractor.endpoint", &self.endpoint)?;
        validation::validate_non_empty_string("extractor.model", &self.model)?;
        validation::validate_range("extractor.timeout_seconds", self.timeout_seconds, 1, 600)?;
        Ok(())
    }
}

impl Validate for QuoterConfig {
    fn validate(&self) -> Result<()> {
        self.extractor.validate()?;
        self.currency_format()?;

        if let Some(table) = &self.pricing {
            validation::validate_prices("pricing", table)?;
        }

        Ok(())
    }
}

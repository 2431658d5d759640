use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

use crate::bom::ManufacturerProfile;
use crate::error::{ExviewError, ExviewResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub ocr: OcrConfig,
    pub table_extraction: TableExtractionConfig,
    pub extraction: ExtractionConfig,
    pub manufacturers: HashMap<String, ManufacturerProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

/// Google Vision text detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

/// ExtractTable trigger/result endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableExtractionConfig {
    pub trigger_url: String,
    pub result_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
    pub poll_interval_ms: u64,
    pub max_polls: u32,
}

/// Tunables of the candidate filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub stopwords: Vec<String>,
    pub english_zipf_threshold: f64,
    /// CSV of `word,zipf` rows. The wordfreq English corpus is used when unset.
    pub word_frequency_path: Option<String>,
    pub max_token_len: usize,
    pub max_numeric_len: usize,
    pub min_alnum_len: usize,
    pub max_alnum_len: usize,
    pub page_number_max_digits: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("EXVIEW").separator("__"));

        config.build()?.try_deserialize()
    }

    /// Startup checks; a bad manufacturer mapping must fail here rather than mid-request.
    pub fn validate(&self) -> ExviewResult<()> {
        if self.manufacturers.is_empty() {
            return Err(ExviewError::configuration("no manufacturer profiles configured"));
        }
        for (id, profile) in &self.manufacturers {
            profile.validate(id)?;
        }
        self.extraction.validate()
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> ExviewResult<()> {
        if self.max_token_len == 0 {
            return Err(ExviewError::configuration("extraction.max_token_len must be positive"));
        }
        if self.min_alnum_len == 0 || self.min_alnum_len > self.max_alnum_len {
            return Err(ExviewError::configuration(format!(
                "extraction alnum length range {}..={} is empty",
                self.min_alnum_len, self.max_alnum_len
            )));
        }
        if self.max_numeric_len == 0 || self.page_number_max_digits == 0 {
            return Err(ExviewError::configuration(
                "extraction numeric lengths must be positive",
            ));
        }
        if !self.english_zipf_threshold.is_finite() {
            return Err(ExviewError::configuration("extraction.english_zipf_threshold must be finite"));
        }
        Ok(())
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
            english_zipf_threshold: 2.0,
            word_frequency_path: None,
            max_token_len: 8,
            max_numeric_len: 4,
            min_alnum_len: 2,
            max_alnum_len: 8,
            page_number_max_digits: 2,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut manufacturers = HashMap::new();
        manufacturers.insert("liebherr".to_string(), ManufacturerProfile::liebherr());
        manufacturers.insert("viking".to_string(), ManufacturerProfile::viking());

        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8083,
                max_request_size: 64 * 1024 * 1024, // 64MB, page scans at 300 DPI
                timeout_seconds: 120,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                file_path: None,
            },
            ocr: OcrConfig {
                endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
                api_key: String::new(),
                timeout_seconds: 60,
            },
            table_extraction: TableExtractionConfig {
                trigger_url: "https://trigger.extracttable.com".to_string(),
                result_url: "https://getresult.extracttable.com".to_string(),
                api_key: String::new(),
                timeout_seconds: 120,
                poll_interval_ms: 2000,
                max_polls: 30,
            },
            extraction: ExtractionConfig::default(),
            manufacturers,
        }
    }
}

/// Boilerplate, legend and label words seen on exploded-view sheets.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "LG", "ELECTRONICS", "INC", "COPYRIGHT", "ALL", "RIGHTS", "RESERVED", "LGE",
    "TRAINING", "SERVICE", "PURPOSES", "ONLY", "INTERNAL", "USE",
    "2014", "2015", "2016", "2017", "2018", "2019", "2020", "2021", "2022",
    "LAN", "GENDER", "WHITE", "BLACK",
    "EXPLODED", "VIEW", "IMPORTANT", "SAFETY", "NOTICE", "MANY", "ELECTRICAL",
    "MECHANICAL", "PARTS", "IN", "THIS", "CHASSIS", "HAVE", "RELATED",
    "CHARACTERISTICS", "THESE", "ARE", "IDENTIFIED", "BY", "IT", "IS", "ESSENTIAL",
    "SPECIAL", "SHOULD", "BE", "REPLACED", "WITH", "SAME", "COMPONENTS", "AS",
    "RECOMMENDED", "MANUAL", "PREVENT", "FIRE", "OR", "OTHER", "HAZARDS", "DO",
    "NOT", "MODIFY", "THE", "ORIGINAL", "DESIGN", "WITHOUT", "PERMISSION", "OF",
    "MANUFACTURER", "SHOCK", "THAT", "TO", "MRC", "MODULE", "REPAIR", "CENTER",
    "OPTICAL", "SHEET", "ITEM", "LOCATION", "STATUS", "UNDER",
    "PANEL", "ASS'Y", "POL", "REAR", "FRONT", "COF", "SOURCE", "PCB",
    "LEFT", "RIGHT", "ASS", "FOR", "SIDE", "STAND", "SCREW", "BOARD",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.extraction.english_zipf_threshold, 2.0);
        assert!(config.extraction.stopwords.iter().any(|s| s == "EXPLODED"));
    }

    #[test]
    fn test_empty_manufacturer_registry_is_rejected() {
        let mut config = AppConfig::default();
        config.manufacturers.clear();

        let err = config.validate().unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_inverted_alnum_range_is_rejected() {
        let mut config = AppConfig::default();
        config.extraction.min_alnum_len = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_broken_profile_fails_startup_validation() {
        let mut config = AppConfig::default();
        let mut profile = ManufacturerProfile::viking();
        profile.description_column = 7;
        config.manufacturers.insert("acme".to_string(), profile);

        assert!(config.validate().is_err());
    }
}

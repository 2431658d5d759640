use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ExviewError {
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Unsupported manufacturer: {manufacturer}")]
    UnsupportedManufacturer { manufacturer: String },

    #[error("Table extraction error: {message}")]
    TableExtraction { message: String },

    #[error("OCR error: {message}")]
    Ocr { message: String },

    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ExviewError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn unsupported_manufacturer(manufacturer: impl Into<String>) -> Self {
        Self::UnsupportedManufacturer {
            manufacturer: manufacturer.into(),
        }
    }

    pub fn table_extraction(message: impl Into<String>) -> Self {
        Self::TableExtraction {
            message: message.into(),
        }
    }

    pub fn ocr(message: impl Into<String>) -> Self {
        Self::Ocr {
            message: message.into(),
        }
    }

    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::UnsupportedManufacturer { .. } => "UNSUPPORTED_MANUFACTURER",
            Self::TableExtraction { .. } => "TABLE_EXTRACTION_ERROR",
            Self::Ocr { .. } => "OCR_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::Configuration { .. } => 500,
            Self::UnsupportedManufacturer { .. } => 400,
            Self::TableExtraction { .. } => 502,
            Self::Ocr { .. } => 502,
            Self::ExternalService { .. } => 502,
            Self::Internal { .. } => 500,
        }
    }
}

pub type ExviewResult<T> = Result<T, ExviewError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<ExviewError> for ErrorResponse {
    fn from(error: ExviewError) -> Self {
        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: None,
        }
    }
}

// Conversion from common error types
impl From<reqwest::Error> for ExviewError {
    fn from(error: reqwest::Error) -> Self {
        Self::external_service("HTTP Client", error.to_string())
    }
}

impl From<serde_json::Error> for ExviewError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

impl From<config::ConfigError> for ExviewError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}

impl From<csv::Error> for ExviewError {
    fn from(error: csv::Error) -> Self {
        Self::configuration(format!("word frequency table: {}", error))
    }
}

impl From<regex::Error> for ExviewError {
    fn from(error: regex::Error) -> Self {
        Self::configuration(format!("token pattern: {}", error))
    }
}

impl From<std::io::Error> for ExviewError {
    fn from(error: std::io::Error) -> Self {
        Self::internal(error.to_string())
    }
}

use thiserror::Error;

/// 使用者看到的唯一一則更新失敗訊息
pub const EXTRACTION_FAILED_MESSAGE: &str = "No se pudieron actualizar los precios desde la imagen.";

#[derive(Error, Debug)]
pub enum QuoterError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Unsupported image '{path}': only PNG and JPEG are accepted")]
    UnsupportedImage { path: String },

    #[error("Upstream service returned {status}: {message}")]
    UpstreamError {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Malformed extraction response: {message}")]
    MalformedResponse { message: String },

    #[error("{}", EXTRACTION_FAILED_MESSAGE)]
    ExtractionFailed {
        #[source]
        source: Box<QuoterError>,
    },

    #[error("A price update is already in progress")]
    UpdateInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Io,
    Data,
    Configuration,
    Input,
    Extraction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl QuoterError {
    /// 將任何擷取錯誤收斂成單一的通用錯誤，保留原因供日誌使用
    pub fn extraction_failed(cause: QuoterError) -> Self {
        match cause {
            already @ QuoterError::ExtractionFailed { .. } => already,
            other => QuoterError::ExtractionFailed {
                source: Box::new(other),
            },
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            QuoterError::ApiError(_) | QuoterError::UpstreamError { .. } => ErrorCategory::Network,
            QuoterError::IoError(_) => ErrorCategory::Io,
            QuoterError::SerializationError(_) | QuoterError::MalformedResponse { .. } => {
                ErrorCategory::Data
            }
            QuoterError::ConfigError { .. }
            | QuoterError::MissingConfigError { .. }
            | QuoterError::InvalidConfigValueError { .. }
            | QuoterError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            QuoterError::UnsupportedImage { .. } => ErrorCategory::Input,
            QuoterError::ExtractionFailed { .. } | QuoterError::UpdateInProgress => {
                ErrorCategory::Extraction
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            QuoterError::UpdateInProgress => ErrorSeverity::Low,
            QuoterError::ApiError(_)
            | QuoterError::UpstreamError { .. }
            | QuoterError::ExtractionFailed { .. } => ErrorSeverity::Medium,
            QuoterError::SerializationError(_)
            | QuoterError::MalformedResponse { .. }
            | QuoterError::UnsupportedImage { .. }
            | QuoterError::IoError(_) => ErrorSeverity::High,
            QuoterError::ConfigError { .. }
            | QuoterError::MissingConfigError { .. }
            | QuoterError::InvalidConfigValueError { .. }
            | QuoterError::ConfigValidationError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            QuoterError::ExtractionFailed { .. }
            | QuoterError::ApiError(_)
            | QuoterError::UpstreamError { .. }
            | QuoterError::MalformedResponse { .. } => EXTRACTION_FAILED_MESSAGE.to_string(),
            QuoterError::UpdateInProgress => {
                "Ya hay una actualización de precios en curso.".to_string()
            }
            QuoterError::UnsupportedImage { path } => {
                format!("El archivo '{}' no es una imagen PNG o JPEG.", path)
            }
            QuoterError::MissingConfigError { field } => {
                format!("Falta la configuración requerida: {}", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Extraction => {
                "Retry with a clearer image of the price table once the service is reachable"
            }
            ErrorCategory::Io => "Check that the file exists and is readable",
            ErrorCategory::Data => "Check that the file or response contains a valid price table",
            ErrorCategory::Configuration => {
                "Check the configuration file and the API_KEY environment variable"
            }
            ErrorCategory::Input => "Select a .png, .jpg or .jpeg file",
        }
    }
}

pub type Result<T> = std::result::Result<T, QuoterError>;

// ⚠️ Error Layer - what can go wrong between the form and the model
// Configuration is fatal, validation is the caller's fault, inference is retryable

use thiserror::Error;

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
            context: "CustomerProfile".to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Every violation found in one record (never empty when returned as an error)
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(err: ValidationError) -> Self {
        ValidationErrors(vec![err])
    }
}

// ============================================================================
// CRATE ERROR
// ============================================================================

#[derive(Error, Debug)]
pub enum ChurnError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Inference error: {message}")]
    Inference { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChurnError {
    pub fn config(message: impl Into<String>) -> Self {
        ChurnError::Config { message: message.into() }
    }

    pub fn inference(message: impl Into<String>) -> Self {
        ChurnError::Inference { message: message.into() }
    }

    /// Fatal errors halt the process; the rest leave the form usable
    pub fn is_fatal(&self) -> bool {
        matches!(self, ChurnError::Config { .. })
    }
}

pub type Result<T> = std::result::Result<T, ChurnError>;

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("Contract", "unknown value 'Weekly'");
        assert_eq!(err.to_string(), "[CustomerProfile] Contract: unknown value 'Weekly'");
    }

    #[test]
    fn test_validation_errors_join() {
        let errs = ValidationErrors(vec![
            ValidationError::new("tenure", "out of range"),
            ValidationError::new("gender", "unknown value"),
        ]);

        assert_eq!(errs.len(), 2);
        assert_eq!(errs.fields(), vec!["tenure", "gender"]);
        assert!(errs.to_string().contains("; "));
    }

    #[test]
    fn test_only_config_is_fatal() {
        assert!(ChurnError::config("missing model").is_fatal());
        assert!(!ChurnError::inference("bad vector").is_fatal());

        let validation: ChurnError = ValidationErrors::from(ValidationError::new("x", "y")).into();
        assert!(!validation.is_fatal());
    }
}

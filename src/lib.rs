// Customer Churn Advisor - Core Library
// Exposes all modules for use in the CLI, the form UI, the API server, and tests

pub mod error;
pub mod profile;    // Customer Profile: raw input + validated record
pub mod encoder;    // Profile → fixed-order feature vector
pub mod advisor;    // Rule-based retention recommendations
pub mod model;      // Classifier boundary + process-wide handle
pub mod display;    // Banner, gauge, probability formatting
pub mod predictor;  // collect → encode → score → advise
pub mod batch;      // CSV batch scoring
pub mod config;
pub mod logger;

// Re-export commonly used types
pub use error::{ChurnError, Result, ValidationError, ValidationErrors};
pub use profile::{
    Categorical, Contract, CustomerProfile, Gender, InternetService, PaymentMethod,
    ProfileInput, YesNo,
};
pub use encoder::{encode, encode_input, FeatureVector, FieldSpec, FEATURE_COUNT, FEATURE_NAMES, FIELDS};
pub use advisor::{advise, recommendations, Advice, RETENTION_MESSAGE};
pub use model::{load_model, ChurnModel, LoadedModel, ModelArtifact};
pub use display::{format_probability, gauge_delta, gauge_value, Banner, BannerColor, RiskLevel};
pub use predictor::{Assessment, Predictor};
pub use batch::{score_csv, score_csv_file, BatchSummary};
pub use config::AppConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

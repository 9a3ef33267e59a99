// 🔮 Predictor - collect → encode → score → advise → display
// One assessment per request, nothing retained afterwards

use crate::advisor::advise;
use crate::display::{format_probability, gauge_delta, gauge_value, Banner, RiskLevel};
use crate::encoder::encode;
use crate::error::Result;
use crate::model::{ChurnModel, LoadedModel};
use crate::profile::{CustomerProfile, ProfileInput};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Everything a surface needs to render one prediction
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub will_churn: bool,
    /// p(churn)
    pub probability: f64,
    pub gauge_value: f64,
    /// Gauge value minus the 50 reference
    pub gauge_delta: f64,
    pub probability_display: String,
    pub risk_level: RiskLevel,
    pub banner: Banner,
    pub recommendations: Vec<String>,
    pub fired_rules: Vec<String>,
    pub model_fingerprint: String,
}

#[derive(Clone)]
pub struct Predictor {
    model: Arc<dyn ChurnModel>,
    fingerprint: String,
}

impl Predictor {
    pub fn new(model: Arc<dyn ChurnModel>, fingerprint: impl Into<String>) -> Self {
        Predictor {
            model,
            fingerprint: fingerprint.into(),
        }
    }

    pub fn from_loaded(model: Arc<LoadedModel>) -> Self {
        let fingerprint = model.fingerprint.clone();
        Predictor { model, fingerprint }
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn model_kind(&self) -> &'static str {
        self.model.kind()
    }

    /// Validate raw input, then score it
    pub fn assess(&self, input: &ProfileInput) -> Result<Assessment> {
        let profile = CustomerProfile::from_input(input).map_err(|errors| {
            tracing::warn!(errors = %errors, "profile rejected");
            errors
        })?;
        self.assess_profile(&profile)
    }

    pub fn assess_profile(&self, profile: &CustomerProfile) -> Result<Assessment> {
        let features = encode(profile);

        let proba = self.model.predict_proba(features.as_slice()).map_err(|e| {
            tracing::warn!(error = %e, "inference failed");
            e
        })?;
        let probability = proba[1];
        let will_churn = probability >= self.model.threshold();
        let advice = advise(profile, will_churn);
        let gauge = gauge_value(probability);

        let assessment = Assessment {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            will_churn,
            probability,
            gauge_value: gauge,
            gauge_delta: gauge_delta(gauge),
            probability_display: format_probability(probability),
            risk_level: RiskLevel::from_gauge(gauge),
            banner: Banner::for_prediction(will_churn, proba),
            recommendations: advice.recommendations,
            fired_rules: advice.fired_rules.iter().map(|r| r.to_string()).collect(),
            model_fingerprint: self.fingerprint.clone(),
        };

        tracing::debug!(
            id = %assessment.id,
            probability = assessment.probability,
            will_churn,
            fired = ?assessment.fired_rules,
            "assessment complete"
        );

        Ok(assessment)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::advisor::RETENTION_MESSAGE;
    use crate::encoder::FEATURE_COUNT;
    use crate::error::ChurnError;
    use crate::model::load_model;
    use crate::profile::{Contract, InternetService, YesNo};
    use std::path::Path;

    /// Always returns the same probability
    pub(crate) struct FixedModel(pub f64);

    impl ChurnModel for FixedModel {
        fn kind(&self) -> &'static str {
            "fixed"
        }

        fn predict_proba(&self, _features: &[f64]) -> Result<[f64; 2]> {
            Ok([1.0 - self.0, self.0])
        }
    }

    /// Fails every call
    pub(crate) struct BrokenModel;

    impl ChurnModel for BrokenModel {
        fn kind(&self) -> &'static str {
            "broken"
        }

        fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
            Err(ChurnError::inference(format!("cannot score {} features", features.len())))
        }
    }

    pub(crate) fn fixed(p: f64) -> Predictor {
        Predictor::new(Arc::new(FixedModel(p)), "test-fingerprint")
    }

    fn sample_predictor() -> Predictor {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("models/churn_model.json");
        Predictor::from_loaded(Arc::new(load_model(path).unwrap()))
    }

    fn risky_input() -> ProfileInput {
        ProfileInput::from(&CustomerProfile {
            contract: Contract::MonthToMonth,
            monthly_charges: 90.0,
            total_charges: 270.0,
            tenure: 3,
            tech_support: YesNo::No,
            internet_service: InternetService::Dsl,
            online_security: YesNo::No,
            ..CustomerProfile::default()
        })
    }

    fn safe_input() -> ProfileInput {
        ProfileInput::from(&CustomerProfile {
            contract: Contract::TwoYear,
            monthly_charges: 50.0,
            total_charges: 1800.0,
            tenure: 36,
            tech_support: YesNo::Yes,
            online_security: YesNo::Yes,
            partner: YesNo::Yes,
            dependents: YesNo::Yes,
            paperless_billing: YesNo::No,
            ..CustomerProfile::default()
        })
    }

    #[test]
    fn test_churn_assessment() {
        let assessment = fixed(0.8732).assess(&risky_input()).unwrap();

        assert!(assessment.will_churn);
        assert_eq!(assessment.probability_display, "87.32%");
        assert!((assessment.gauge_value - 87.32).abs() < 1e-9);
        assert!((assessment.gauge_delta - 37.32).abs() < 1e-9);
        assert_eq!(assessment.banner.detail, "Probability: 87.32%");
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert_eq!(assessment.recommendations.len(), 5);
        assert_eq!(assessment.fired_rules[0], "long_term_contract");
        assert_eq!(assessment.model_fingerprint, "test-fingerprint");
    }

    #[test]
    fn test_no_churn_gives_retention() {
        let assessment = fixed(0.12).assess(&risky_input()).unwrap();

        assert!(!assessment.will_churn);
        assert_eq!(assessment.recommendations, vec![RETENTION_MESSAGE.to_string()]);
        assert!(assessment.fired_rules.is_empty());
        assert_eq!(assessment.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(fixed(0.5).assess(&safe_input()).unwrap().will_churn);
    }

    #[test]
    fn test_invalid_input_is_validation_error() {
        let mut input = risky_input();
        input.internet_service = "Satellite".to_string();

        let err = fixed(0.9).assess(&input).unwrap_err();
        match err {
            ChurnError::Validation(errors) => assert_eq!(errors.fields(), vec!["InternetService"]),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_inference_error_is_not_fatal() {
        let predictor = Predictor::new(Arc::new(BrokenModel), "broken");
        let err = predictor.assess(&risky_input()).unwrap_err();

        assert!(matches!(err, ChurnError::Inference { .. }));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains(&FEATURE_COUNT.to_string()));
    }

    #[test]
    fn test_sample_model_separates_profiles() {
        let predictor = sample_predictor();
        assert_eq!(predictor.model_kind(), "logistic_regression");

        let risky = predictor.assess(&risky_input()).unwrap();
        assert!(risky.will_churn);
        assert!(risky.probability > 0.6);

        let safe = predictor.assess(&safe_input()).unwrap();
        assert!(!safe.will_churn);
        assert!(safe.probability < 0.1);
        assert_eq!(safe.recommendations, vec![RETENTION_MESSAGE.to_string()]);
    }

    #[test]
    fn test_each_assessment_is_fresh() {
        let predictor = fixed(0.7);
        let a = predictor.assess(&risky_input()).unwrap();
        let b = predictor.assess(&risky_input()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.recommendations, b.recommendations);
    }
}

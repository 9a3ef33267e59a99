// 🔢 Encoder - Customer Profile → feature vector
// Fixed column order, static label tables, numerics pass through

use crate::error::ValidationErrors;
use crate::profile::{
    Categorical, Contract, CustomerProfile, Gender, InternetService, NumericBounds, PaymentMethod,
    ProfileInput, YesNo, MONTHLY_CHARGES, TENURE, TOTAL_CHARGES,
};
use serde::Serialize;

/// Number of features the model consumes
pub const FEATURE_COUNT: usize = 19;

/// Column names in vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "gender",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "tenure",
    "PhoneService",
    "MultipleLines",
    "InternetService",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    "Contract",
    "PaperlessBilling",
    "PaymentMethod",
    "MonthlyCharges",
    "TotalCharges",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Look up a feature by column name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES.iter().position(|n| *n == name).map(|i| self.0[i])
    }
}

// ============================================================================
// FIELD TABLES
// ============================================================================

/// One form field: either a fixed label list or a numeric range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldSpec {
    Categorical {
        name: &'static str,
        description: &'static str,
        labels: &'static [&'static str],
    },
    Numeric {
        name: &'static str,
        description: &'static str,
        #[serde(flatten)]
        bounds: NumericBounds,
    },
}

impl FieldSpec {
    pub fn name(&self) -> &'static str {
        match self {
            FieldSpec::Categorical { name, .. } => *name,
            FieldSpec::Numeric { name, .. } => *name,
        }
    }

    /// Help text shown next to the widget
    pub fn description(&self) -> &'static str {
        match self {
            FieldSpec::Categorical { description, .. } => *description,
            FieldSpec::Numeric { description, .. } => *description,
        }
    }

    /// `(label, code)` pairs for a categorical field, empty for numerics
    pub fn codes(&self) -> Vec<(&'static str, u8)> {
        match self {
            FieldSpec::Categorical { labels, .. } => labels
                .iter()
                .enumerate()
                .map(|(i, l)| (*l, i as u8))
                .collect(),
            FieldSpec::Numeric { .. } => Vec::new(),
        }
    }
}

const fn categorical<T: Categorical>(name: &'static str, description: &'static str) -> FieldSpec {
    FieldSpec::Categorical { name, description, labels: T::LABELS }
}

const fn numeric(bounds: NumericBounds, description: &'static str) -> FieldSpec {
    FieldSpec::Numeric { name: bounds.field, description, bounds }
}

/// Every field, in feature-vector order
pub static FIELDS: [FieldSpec; FEATURE_COUNT] = [
    categorical::<Gender>("gender", "Customer gender"),
    categorical::<YesNo>("SeniorCitizen", "Whether customer is a senior citizen"),
    categorical::<YesNo>("Partner", "Whether customer has a partner"),
    categorical::<YesNo>("Dependents", "Whether customer has dependents"),
    numeric(TENURE, "Number of months customer has been with company"),
    categorical::<YesNo>("PhoneService", "Whether customer has phone service"),
    categorical::<YesNo>("MultipleLines", "Whether customer has multiple lines"),
    categorical::<InternetService>("InternetService", "Type of internet service"),
    categorical::<YesNo>("OnlineSecurity", "Whether customer has online security"),
    categorical::<YesNo>("OnlineBackup", "Whether customer has online backup"),
    categorical::<YesNo>("DeviceProtection", "Whether customer has device protection"),
    categorical::<YesNo>("TechSupport", "Whether customer has tech support"),
    categorical::<YesNo>("StreamingTV", "Whether customer has TV streaming"),
    categorical::<YesNo>("StreamingMovies", "Whether customer has movie streaming"),
    categorical::<Contract>("Contract", "Contract type"),
    categorical::<YesNo>("PaperlessBilling", "Whether customer uses paperless billing"),
    categorical::<PaymentMethod>("PaymentMethod", "Payment method"),
    numeric(MONTHLY_CHARGES, "Monthly charges in dollars"),
    numeric(TOTAL_CHARGES, "Total charges in dollars"),
];

pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name() == name)
}

// ============================================================================
// ENCODING
// ============================================================================

fn code<T: Categorical>(value: T) -> f64 {
    value.code() as f64
}

/// Encode a validated profile. Cannot fail: the types already carry the domain.
pub fn encode(p: &CustomerProfile) -> FeatureVector {
    FeatureVector([
        code(p.gender),
        code(p.senior_citizen),
        code(p.partner),
        code(p.dependents),
        p.tenure as f64,
        code(p.phone_service),
        code(p.multiple_lines),
        code(p.internet_service),
        code(p.online_security),
        code(p.online_backup),
        code(p.device_protection),
        code(p.tech_support),
        code(p.streaming_tv),
        code(p.streaming_movies),
        code(p.contract),
        code(p.paperless_billing),
        code(p.payment_method),
        p.monthly_charges,
        p.total_charges,
    ])
}

/// Validate then encode raw input
pub fn encode_input(input: &ProfileInput) -> Result<FeatureVector, ValidationErrors> {
    let profile = CustomerProfile::from_input(input)?;
    Ok(encode(&profile))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(field_name: &str, label: &str) -> Result<f64, ValidationErrors> {
        let mut input = ProfileInput::default();
        let slot = match field_name {
            "gender" => &mut input.gender,
            "SeniorCitizen" => &mut input.senior_citizen,
            "Partner" => &mut input.partner,
            "Dependents" => &mut input.dependents,
            "PhoneService" => &mut input.phone_service,
            "MultipleLines" => &mut input.multiple_lines,
            "InternetService" => &mut input.internet_service,
            "OnlineSecurity" => &mut input.online_security,
            "OnlineBackup" => &mut input.online_backup,
            "DeviceProtection" => &mut input.device_protection,
            "TechSupport" => &mut input.tech_support,
            "StreamingTV" => &mut input.streaming_tv,
            "StreamingMovies" => &mut input.streaming_movies,
            "Contract" => &mut input.contract,
            "PaperlessBilling" => &mut input.paperless_billing,
            "PaymentMethod" => &mut input.payment_method,
            other => panic!("not a categorical field: {}", other),
        };
        *slot = label.to_string();

        let vector = encode_input(&input)?;
        Ok(vector.get(field_name).unwrap())
    }

    #[test]
    fn test_documented_codes() {
        assert_eq!(encoded("InternetService", "None").unwrap(), 0.0);
        assert_eq!(encoded("InternetService", "DSL").unwrap(), 1.0);
        assert_eq!(encoded("InternetService", "Fiber optic").unwrap(), 2.0);

        assert_eq!(encoded("Contract", "Month-to-month").unwrap(), 0.0);
        assert_eq!(encoded("Contract", "One year").unwrap(), 1.0);
        assert_eq!(encoded("Contract", "Two year").unwrap(), 2.0);

        assert_eq!(encoded("PaymentMethod", "Bank transfer").unwrap(), 2.0);
        assert_eq!(encoded("PaymentMethod", "Credit card").unwrap(), 3.0);
        assert_eq!(encoded("gender", "Male").unwrap(), 0.0);
        assert_eq!(encoded("gender", "Female").unwrap(), 1.0);
        assert_eq!(encoded("TechSupport", "No").unwrap(), 0.0);
        assert_eq!(encoded("TechSupport", "Yes").unwrap(), 1.0);
    }

    #[test]
    fn test_every_label_encodes_to_its_position() {
        for def in FIELDS.iter() {
            for (label, expected) in def.codes() {
                let got = encoded(def.name(), label).unwrap();
                assert_eq!(got, expected as f64, "{} = {}", def.name(), label);
            }
        }
    }

    #[test]
    fn test_out_of_domain_rejected() {
        for def in FIELDS.iter().filter(|f| matches!(f, FieldSpec::Categorical { .. })) {
            let err = encoded(def.name(), "Maybe").unwrap_err();
            assert_eq!(err.fields(), vec![def.name()]);
        }
    }

    #[test]
    fn test_legacy_labels_rejected() {
        assert!(encoded("InternetService", "No").is_err());
        assert!(encoded("PaymentMethod", "Bank transfer (automatic)").is_err());
        assert!(encoded("PaymentMethod", "Credit card (automatic)").is_err());
    }

    #[test]
    fn test_every_field_has_description() {
        for def in FIELDS.iter() {
            assert!(!def.description().trim().is_empty(), "{} has no description", def.name());
        }
        assert_eq!(field("InternetService").unwrap().description(), "Type of internet service");
    }

    #[test]
    fn test_numerics_pass_through() {
        let mut input = ProfileInput::default();
        input.tenure = 3.0;
        input.monthly_charges = 89.95;
        input.total_charges = 269.85;

        let v = encode_input(&input).unwrap();
        assert_eq!(v.get("tenure"), Some(3.0));
        assert_eq!(v.get("MonthlyCharges"), Some(89.95));
        assert_eq!(v.get("TotalCharges"), Some(269.85));
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let profile = CustomerProfile::default();
        assert_eq!(encode(&profile), encode(&profile));
        assert_eq!(encode(&profile), encode_input(&ProfileInput::from(&profile)).unwrap());
    }

    #[test]
    fn test_field_table_matches_feature_names() {
        let names: Vec<&str> = FIELDS.iter().map(|f| f.name()).collect();
        assert_eq!(names, FEATURE_NAMES.to_vec());
        assert!(field("Contract").is_some());
        assert!(field("Nope").is_none());
    }
}

// 👤 Customer Profile - the one entity the form produces
// Raw input (labels + numbers) is validated into a strongly typed, immutable record

use crate::error::{ValidationError, ValidationErrors};
use serde::{Deserialize, Serialize};

// ============================================================================
// CATEGORICAL DOMAINS
// ============================================================================

/// A field whose values come from a fixed, ordered list of labels.
///
/// The position of a label in `LABELS` is the integer code the model sees,
/// so the order of `LABELS` must never change once a model has been trained.
pub trait Categorical: Copy + Sized + 'static {
    /// Labels in code order
    const LABELS: &'static [&'static str];

    fn code(self) -> u8;

    fn from_code(code: u8) -> Option<Self>;

    fn label(self) -> &'static str {
        Self::LABELS[self.code() as usize]
    }

    /// Exact, case-sensitive label lookup
    fn parse(field: &str, label: &str) -> Result<Self, ValidationError> {
        Self::LABELS
            .iter()
            .position(|l| *l == label)
            .and_then(|i| Self::from_code(i as u8))
            .ok_or_else(|| {
                ValidationError::new(
                    field,
                    format!("'{}' is not one of {:?}", label, Self::LABELS),
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Gender {
    #[default]
    Male = 0,
    Female = 1,
}

impl Categorical for Gender {
    const LABELS: &'static [&'static str] = &["Male", "Female"];

    fn code(self) -> u8 {
        self as u8
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Gender::Male),
            1 => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Binary flag: absent = 0, present = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum YesNo {
    #[default]
    No = 0,
    Yes = 1,
}

impl YesNo {
    pub fn is_yes(self) -> bool {
        self == YesNo::Yes
    }
}

impl Categorical for YesNo {
    const LABELS: &'static [&'static str] = &["No", "Yes"];

    fn code(self) -> u8 {
        self as u8
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(YesNo::No),
            1 => Some(YesNo::Yes),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum InternetService {
    #[default]
    None = 0,
    Dsl = 1,
    FiberOptic = 2,
}

impl InternetService {
    pub fn is_present(self) -> bool {
        self != InternetService::None
    }
}

impl Categorical for InternetService {
    const LABELS: &'static [&'static str] = &["None", "DSL", "Fiber optic"];

    fn code(self) -> u8 {
        self as u8
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(InternetService::None),
            1 => Some(InternetService::Dsl),
            2 => Some(InternetService::FiberOptic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Contract {
    #[default]
    MonthToMonth = 0,
    OneYear = 1,
    TwoYear = 2,
}

impl Categorical for Contract {
    const LABELS: &'static [&'static str] = &["Month-to-month", "One year", "Two year"];

    fn code(self) -> u8 {
        self as u8
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Contract::MonthToMonth),
            1 => Some(Contract::OneYear),
            2 => Some(Contract::TwoYear),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PaymentMethod {
    #[default]
    ElectronicCheck = 0,
    MailedCheck = 1,
    BankTransfer = 2,
    CreditCard = 3,
}

impl Categorical for PaymentMethod {
    const LABELS: &'static [&'static str] = &[
        "Electronic check",
        "Mailed check",
        "Bank transfer",
        "Credit card",
    ];

    fn code(self) -> u8 {
        self as u8
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PaymentMethod::ElectronicCheck),
            1 => Some(PaymentMethod::MailedCheck),
            2 => Some(PaymentMethod::BankTransfer),
            3 => Some(PaymentMethod::CreditCard),
            _ => None,
        }
    }
}

// ============================================================================
// NUMERIC BOUNDS
// ============================================================================

/// Inclusive bounds for a numeric field, plus the step the form widgets use
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericBounds {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub integer: bool,
}

impl NumericBounds {
    pub fn check(&self, value: f64) -> Result<f64, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::new(self.field, format!("must be a finite number, got {}", value)));
        }
        if value < self.min || value > self.max {
            return Err(ValidationError::new(
                self.field,
                format!("must be between {} and {}, got {}", self.min, self.max, value),
            ));
        }
        if self.integer && value.fract() != 0.0 {
            return Err(ValidationError::new(self.field, format!("must be a whole number, got {}", value)));
        }
        Ok(value)
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

pub const TENURE: NumericBounds = NumericBounds {
    field: "tenure",
    min: 0.0,
    max: 72.0,
    step: 1.0,
    integer: true,
};

pub const MONTHLY_CHARGES: NumericBounds = NumericBounds {
    field: "MonthlyCharges",
    min: 0.0,
    max: 120.0,
    step: 0.5,
    integer: false,
};

pub const TOTAL_CHARGES: NumericBounds = NumericBounds {
    field: "TotalCharges",
    min: 0.0,
    max: 10000.0,
    step: 10.0,
    integer: false,
};

// ============================================================================
// RAW INPUT
// ============================================================================

/// What arrives from a form, a JSON body, or a CSV row.
///
/// Column names follow the training data so CSV exports load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInput {
    #[serde(rename = "gender")]
    pub gender: String,

    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen: String,

    #[serde(rename = "Partner")]
    pub partner: String,

    #[serde(rename = "Dependents")]
    pub dependents: String,

    #[serde(rename = "tenure")]
    pub tenure: f64,

    #[serde(rename = "PhoneService")]
    pub phone_service: String,

    #[serde(rename = "MultipleLines")]
    pub multiple_lines: String,

    #[serde(rename = "InternetService")]
    pub internet_service: String,

    #[serde(rename = "OnlineSecurity")]
    pub online_security: String,

    #[serde(rename = "OnlineBackup")]
    pub online_backup: String,

    #[serde(rename = "DeviceProtection")]
    pub device_protection: String,

    #[serde(rename = "TechSupport")]
    pub tech_support: String,

    #[serde(rename = "StreamingTV")]
    pub streaming_tv: String,

    #[serde(rename = "StreamingMovies")]
    pub streaming_movies: String,

    #[serde(rename = "Contract")]
    pub contract: String,

    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: String,

    #[serde(rename = "PaymentMethod")]
    pub payment_method: String,

    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: f64,

    #[serde(rename = "TotalCharges")]
    pub total_charges: f64,
}

impl Default for ProfileInput {
    fn default() -> Self {
        ProfileInput::from(&CustomerProfile::default())
    }
}

// ============================================================================
// VALIDATED PROFILE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerProfile {
    // Demographics
    pub gender: Gender,
    pub senior_citizen: YesNo,
    pub partner: YesNo,
    pub dependents: YesNo,

    // Services
    pub phone_service: YesNo,
    pub multiple_lines: YesNo,
    pub internet_service: InternetService,
    pub online_security: YesNo,
    pub online_backup: YesNo,
    pub device_protection: YesNo,
    pub tech_support: YesNo,
    pub streaming_tv: YesNo,
    pub streaming_movies: YesNo,

    // Billing
    pub contract: Contract,
    pub paperless_billing: YesNo,
    pub payment_method: PaymentMethod,
    pub tenure: u32,
    pub monthly_charges: f64,
    pub total_charges: f64,
}

impl Default for CustomerProfile {
    /// Starting values for a fresh form
    fn default() -> Self {
        CustomerProfile {
            gender: Gender::Male,
            senior_citizen: YesNo::No,
            partner: YesNo::No,
            dependents: YesNo::No,
            phone_service: YesNo::Yes,
            multiple_lines: YesNo::No,
            internet_service: InternetService::Dsl,
            online_security: YesNo::No,
            online_backup: YesNo::No,
            device_protection: YesNo::No,
            tech_support: YesNo::No,
            streaming_tv: YesNo::No,
            streaming_movies: YesNo::No,
            contract: Contract::MonthToMonth,
            paperless_billing: YesNo::Yes,
            payment_method: PaymentMethod::ElectronicCheck,
            tenure: 12,
            monthly_charges: 65.0,
            total_charges: 1000.0,
        }
    }
}

/// Keep the first error per field, fall back to a placeholder so parsing continues
fn collect<T: Default>(result: Result<T, ValidationError>, errors: &mut Vec<ValidationError>) -> T {
    result.unwrap_or_else(|e| {
        errors.push(e);
        T::default()
    })
}

impl CustomerProfile {
    /// Validate raw input, reporting every bad field at once
    pub fn from_input(input: &ProfileInput) -> Result<Self, ValidationErrors> {
        let mut errors = Vec::new();
        let e = &mut errors;

        let profile = CustomerProfile {
            gender: collect(Gender::parse("gender", &input.gender), e),
            senior_citizen: collect(YesNo::parse("SeniorCitizen", &input.senior_citizen), e),
            partner: collect(YesNo::parse("Partner", &input.partner), e),
            dependents: collect(YesNo::parse("Dependents", &input.dependents), e),
            phone_service: collect(YesNo::parse("PhoneService", &input.phone_service), e),
            multiple_lines: collect(YesNo::parse("MultipleLines", &input.multiple_lines), e),
            internet_service: collect(InternetService::parse("InternetService", &input.internet_service), e),
            online_security: collect(YesNo::parse("OnlineSecurity", &input.online_security), e),
            online_backup: collect(YesNo::parse("OnlineBackup", &input.online_backup), e),
            device_protection: collect(YesNo::parse("DeviceProtection", &input.device_protection), e),
            tech_support: collect(YesNo::parse("TechSupport", &input.tech_support), e),
            streaming_tv: collect(YesNo::parse("StreamingTV", &input.streaming_tv), e),
            streaming_movies: collect(YesNo::parse("StreamingMovies", &input.streaming_movies), e),
            contract: collect(Contract::parse("Contract", &input.contract), e),
            paperless_billing: collect(YesNo::parse("PaperlessBilling", &input.paperless_billing), e),
            payment_method: collect(PaymentMethod::parse("PaymentMethod", &input.payment_method), e),
            tenure: collect(TENURE.check(input.tenure), e) as u32,
            monthly_charges: collect(MONTHLY_CHARGES.check(input.monthly_charges), e),
            total_charges: collect(TOTAL_CHARGES.check(input.total_charges), e),
        };

        if errors.is_empty() {
            Ok(profile)
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

impl TryFrom<&ProfileInput> for CustomerProfile {
    type Error = ValidationErrors;

    fn try_from(input: &ProfileInput) -> Result<Self, Self::Error> {
        CustomerProfile::from_input(input)
    }
}

impl From<&CustomerProfile> for ProfileInput {
    fn from(p: &CustomerProfile) -> Self {
        ProfileInput {
            gender: p.gender.label().to_string(),
            senior_citizen: p.senior_citizen.label().to_string(),
            partner: p.partner.label().to_string(),
            dependents: p.dependents.label().to_string(),
            tenure: p.tenure as f64,
            phone_service: p.phone_service.label().to_string(),
            multiple_lines: p.multiple_lines.label().to_string(),
            internet_service: p.internet_service.label().to_string(),
            online_security: p.online_security.label().to_string(),
            online_backup: p.online_backup.label().to_string(),
            device_protection: p.device_protection.label().to_string(),
            tech_support: p.tech_support.label().to_string(),
            streaming_tv: p.streaming_tv.label().to_string(),
            streaming_movies: p.streaming_movies.label().to_string(),
            contract: p.contract.label().to_string(),
            paperless_billing: p.paperless_billing.label().to_string(),
            payment_method: p.payment_method.label().to_string(),
            monthly_charges: p.monthly_charges,
            total_charges: p.total_charges,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

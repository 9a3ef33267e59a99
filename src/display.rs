// 🎨 Display Contract - banner, gauge value and probability text
// Shared by the terminal form, the web page and the CLI

use serde::Serialize;

/// Upper edges of the low and medium gauge bands
pub const LOW_BAND_MAX: f64 = 33.0;
pub const MEDIUM_BAND_MAX: f64 = 66.0;

/// Red marker line drawn across the gauge
pub const GAUGE_MARKER: f64 = 70.0;

/// The gauge delta is measured against this value
pub const GAUGE_REFERENCE: f64 = 50.0;

/// Churn probability as the gauge shows it: 0–100
pub fn gauge_value(probability: f64) -> f64 {
    (probability * 100.0).clamp(0.0, 100.0)
}

/// Signed distance from the reference, e.g. `87.32` → `37.32`
pub fn gauge_delta(gauge: f64) -> f64 {
    gauge - GAUGE_REFERENCE
}

/// `0.8732` → `"87.32%"`
pub fn format_probability(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_gauge(value: f64) -> Self {
        if value < LOW_BAND_MAX {
            RiskLevel::Low
        } else if value < MEDIUM_BAND_MAX {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerColor {
    Red,
    Green,
}

impl BannerColor {
    pub fn css(&self) -> &str {
        match self {
            BannerColor::Red => "#c0392b",
            BannerColor::Green => "#27ae60",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banner {
    pub title: String,
    /// `"Probability: 87.32%"` for the predicted class
    pub detail: String,
    pub color: BannerColor,
}

impl Banner {
    /// The banner quotes p(churn) when churn is predicted and p(stay) otherwise
    pub fn for_prediction(will_churn: bool, proba: [f64; 2]) -> Self {
        let [stay, churn] = proba;
        if will_churn {
            Banner {
                title: "⚠️ HIGH CHURN RISK".to_string(),
                detail: format!("Probability: {}", format_probability(churn)),
                color: BannerColor::Red,
            }
        } else {
            Banner {
                title: "✅ LOW CHURN RISK".to_string(),
                detail: format!("Probability: {}", format_probability(stay)),
                color: BannerColor::Green,
            }
        }
    }

    pub fn text(&self) -> String {
        format!("{} - {}", self.title, self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_two_decimals() {
        assert_eq!(format_probability(0.8732), "87.32%");
        assert_eq!(format_probability(0.0), "0.00%");
        assert_eq!(format_probability(1.0), "100.00%");
        assert_eq!(format_probability(0.123456), "12.35%");
    }

    #[test]
    fn test_gauge_is_clamped() {
        assert!((gauge_value(0.5) - 50.0).abs() < 1e-9);
        assert_eq!(gauge_value(1.2), 100.0);
        assert_eq!(gauge_value(-0.1), 0.0);
    }

    #[test]
    fn test_risk_bands() {
        assert_eq!(RiskLevel::from_gauge(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_gauge(32.99), RiskLevel::Low);
        assert_eq!(RiskLevel::from_gauge(33.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_gauge(65.99), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_gauge(66.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_gauge(100.0), RiskLevel::High);
    }

    #[test]
    fn test_gauge_delta() {
        assert!((gauge_delta(87.32) - 37.32).abs() < 1e-9);
        assert!((gauge_delta(12.0) + 38.0).abs() < 1e-9);
        assert!(GAUGE_MARKER > MEDIUM_BAND_MAX);
    }

    #[test]
    fn test_banner_quotes_predicted_class() {
        let churn = Banner::for_prediction(true, [0.1268, 0.8732]);
        assert_eq!(churn.color, BannerColor::Red);
        assert_eq!(churn.title, "⚠️ HIGH CHURN RISK");
        assert_eq!(churn.detail, "Probability: 87.32%");

        let stay = Banner::for_prediction(false, [0.88, 0.12]);
        assert_eq!(stay.color, BannerColor::Green);
        assert_eq!(stay.title, "✅ LOW CHURN RISK");
        assert_eq!(stay.detail, "Probability: 88.00%");
        assert_eq!(stay.text(), "✅ LOW CHURN RISK - Probability: 88.00%");
    }
}

// 💡 Advisor - Rules as Data
// Static threshold rules turned into retention recommendations

use crate::profile::{Contract, CustomerProfile};
use serde::Serialize;

/// Returned alone when churn is not predicted or nothing fires
pub const RETENTION_MESSAGE: &str = "✨ Customer shows strong retention indicators";

pub const HIGH_CHARGE_THRESHOLD: f64 = 80.0;
pub const NEW_CUSTOMER_MONTHS: u32 = 12;

// ============================================================================
// RULE DEFINITION
// ============================================================================

pub struct AdvisorRule {
    /// Stable id for API consumers
    pub id: &'static str,
    pub message: &'static str,
    pub applies: fn(&CustomerProfile) -> bool,
}

fn on_monthly_contract(p: &CustomerProfile) -> bool {
    p.contract == Contract::MonthToMonth
}

fn has_high_charges(p: &CustomerProfile) -> bool {
    p.monthly_charges > HIGH_CHARGE_THRESHOLD
}

fn is_new_customer(p: &CustomerProfile) -> bool {
    p.tenure < NEW_CUSTOMER_MONTHS
}

fn lacks_tech_support(p: &CustomerProfile) -> bool {
    !p.tech_support.is_yes()
}

fn lacks_online_security(p: &CustomerProfile) -> bool {
    !p.online_security.is_yes() && p.internet_service.is_present()
}

/// Priority order: the first entry is reported first
pub static RULES: [AdvisorRule; 5] = [
    AdvisorRule {
        id: "long_term_contract",
        message: "🔗 Consider offering a long-term contract with incentives",
        applies: on_monthly_contract,
    },
    AdvisorRule {
        id: "pricing_review",
        message: "💰 Review pricing; consider loyalty discounts",
        applies: has_high_charges,
    },
    AdvisorRule {
        id: "onboarding",
        message: "🎯 Improve onboarding and customer support",
        applies: is_new_customer,
    },
    AdvisorRule {
        id: "tech_support",
        message: "🛠️ Encourage subscription to Tech Support services",
        applies: lacks_tech_support,
    },
    AdvisorRule {
        id: "online_security",
        message: "🔒 Promote Online Security add-on",
        applies: lacks_online_security,
    },
];

// ============================================================================
// ADVICE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    pub recommendations: Vec<String>,
    /// Ids of the rules that produced `recommendations`; empty for the retention message
    pub fired_rules: Vec<&'static str>,
}

impl Advice {
    fn retention() -> Self {
        Advice {
            recommendations: vec![RETENTION_MESSAGE.to_string()],
            fired_rules: Vec::new(),
        }
    }

    pub fn is_retention(&self) -> bool {
        self.fired_rules.is_empty()
    }
}

/// Evaluate every rule in priority order
pub fn advise(profile: &CustomerProfile, will_churn: bool) -> Advice {
    if !will_churn {
        return Advice::retention();
    }

    let fired: Vec<&AdvisorRule> = RULES.iter().filter(|r| (r.applies)(profile)).collect();

    if fired.is_empty() {
        return Advice::retention();
    }

    Advice {
        recommendations: fired.iter().map(|r| r.message.to_string()).collect(),
        fired_rules: fired.iter().map(|r| r.id).collect(),
    }
}

/// Recommendation strings only
pub fn recommendations(profile: &CustomerProfile, will_churn: bool) -> Vec<String> {
    advise(profile, will_churn).recommendations
}

// ============================================================================
// TESTS
// ============================================================================

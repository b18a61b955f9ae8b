use super::classifier::{Classification, RiskLevel};
use serde::{Deserialize, Serialize};

/// Reminder-coupon template tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderTier {
    Normal,
    Warning,
    Urgent,
    Legal,
}

impl ReminderTier {
    pub const fn for_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => Self::Normal,
            RiskLevel::Medium => Self::Warning,
            RiskLevel::High => Self::Urgent,
            RiskLevel::Critical => Self::Legal,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Warning => "Warning",
            Self::Urgent => "Urgent",
            Self::Legal => "Legal",
        }
    }

    pub const fn alert_category(self) -> &'static str {
        match self {
            Self::Normal => "payment_reminder",
            Self::Warning => "overdue_notice",
            Self::Urgent => "final_notice",
            Self::Legal => "legal_action",
        }
    }
}

/// Advisory reminder suggestion; an operator confirms it before documents go out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRecommendation {
    pub tier: ReminderTier,
    pub tier_label: &'static str,
    pub alert_category: &'static str,
    pub requires_confirmation: bool,
    pub rationale: String,
}

pub(crate) fn recommend(level: RiskLevel, classification: &Classification) -> ReminderRecommendation {
    let (tier, rationale) = match classification {
        Classification::Fixed { level } => (
            ReminderTier::for_level(*level),
            format!("{} risk level", level.label()),
        ),
        Classification::Configured { band } => match band.tier {
            Some(tier) => (tier, format!("configured band '{}'", band.name)),
            None => (
                ReminderTier::for_level(level),
                format!(
                    "configured band '{}' without tier, using {} risk level",
                    band.name,
                    level.label()
                ),
            ),
        },
    };

    ReminderRecommendation {
        tier,
        tier_label: tier.label(),
        alert_category: tier.alert_category(),
        requires_confirmation: true,
        rationale,
    }
}

use super::reminder::ReminderTier;
use serde::{Deserialize, Serialize};

/// Categorical bucket of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const fn ordered() -> [Self; 4] {
        [Self::Low, Self::Medium, Self::High, Self::Critical]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub const fn from_score(score: u16) -> Self {
        if score >= 150 {
            Self::Critical
        } else if score >= 100 {
            Self::High
        } else if score >= 50 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Site-configured label over the payment rate, matched on `min <= rate < max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBand {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<ReminderTier>,
}

impl RiskBand {
    pub fn contains(&self, payment_rate: f64) -> bool {
        self.min <= payment_rate && payment_rate < self.max
    }
}

/// Strategy turning a score and payment rate into a label.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RiskClassifier {
    #[default]
    FixedBands,
    ConfiguredBands(Vec<RiskBand>),
}

impl RiskClassifier {
    /// Configured bands when a non-empty list is supplied, fixed bands otherwise.
    pub fn select(bands: Option<Vec<RiskBand>>) -> Self {
        match bands {
            Some(bands) if !bands.is_empty() => Self::ConfiguredBands(bands),
            _ => Self::FixedBands,
        }
    }

    pub fn classify(&self, score: u16, payment_rate: f64) -> Classification {
        let level = RiskLevel::from_score(score);
        match self {
            Self::FixedBands => Classification::Fixed { level },
            Self::ConfiguredBands(bands) => bands
                .iter()
                .find(|band| band.contains(payment_rate))
                .map(|band| Classification::Configured { band: band.clone() })
                .unwrap_or(Classification::Fixed { level }),
        }
    }
}

/// Label that drives alerting for a student.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Classification {
    Fixed { level: RiskLevel },
    Configured { band: RiskBand },
}

impl Classification {
    pub fn label(&self) -> &str {
        match self {
            Self::Fixed { level } => level.label(),
            Self::Configured { band } => &band.name,
        }
    }
}

mod classifier;
mod reminder;
mod rules;
mod settings;
mod signals;

pub use classifier::{Classification, RiskBand, RiskClassifier, RiskLevel};
pub use reminder::{ReminderRecommendation, ReminderTier};
pub use rules::{RiskFactor, ScoreComponent, MAX_SCORE};
pub use settings::{RiskSettings, RiskSettingsError};
pub use signals::{payment_rate, RiskInputs};

use crate::finance::domain::Amount;
use serde::Serialize;

/// Stateless evaluator applying the scoring table and a classification strategy.
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    classifier: RiskClassifier,
}

impl RiskEngine {
    pub fn new(classifier: RiskClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    pub fn assess(&self, inputs: &RiskInputs) -> RiskProfile {
        let inputs = inputs.sanitized();
        let (components, risk_score) = rules::score_inputs(&inputs);
        let risk_level = RiskLevel::from_score(risk_score);
        let classification = self.classifier.classify(risk_score, inputs.payment_rate);
        let reminder = reminder::recommend(risk_level, &classification);

        RiskProfile {
            risk_score,
            risk_level,
            days_late: inputs.days_late,
            payment_rate: inputs.payment_rate,
            outstanding: inputs.outstanding,
            total_due: inputs.total_due,
            extended_due_dates_count: inputs.extended_due_dates_count,
            components,
            classification,
            reminder,
        }
    }
}

/// Composite score, level and the trail that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub risk_score: u16,
    pub risk_level: RiskLevel,
    pub days_late: u32,
    pub payment_rate: f64,
    pub outstanding: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_due: Option<Amount>,
    pub extended_due_dates_count: u32,
    pub components: Vec<ScoreComponent>,
    pub classification: Classification,
    pub reminder: ReminderRecommendation,
}

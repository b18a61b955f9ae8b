use super::signals::RiskInputs;
use crate::finance::domain::Amount;
use serde::{Deserialize, Serialize};

/// Signal feeding the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    DaysLate,
    Outstanding,
    PaymentRate,
    ExtendedDueDates,
}

impl RiskFactor {
    pub const fn label(self) -> &'static str {
        match self {
            Self::DaysLate => "Days late",
            Self::Outstanding => "Outstanding balance",
            Self::PaymentRate => "Payment rate",
            Self::ExtendedDueDates => "Extended due dates",
        }
    }
}

/// Points contributed by one factor, kept for audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: RiskFactor,
    pub score: u16,
    pub notes: String,
}

// Bands are ordered high to low; the first threshold exceeded wins.
const DAYS_LATE_BANDS: [(u32, u16); 5] = [(90, 100), (60, 80), (30, 60), (15, 40), (7, 20)];
const OUTSTANDING_BANDS: [(Amount, u16); 5] = [
    (300_000, 100),
    (200_000, 80),
    (100_000, 60),
    (50_000, 40),
    (25_000, 20),
];
const PAYMENT_RATE_BANDS: [(f64, u16); 3] = [(10.0, 50), (25.0, 30), (50.0, 15)];
const EXTENSION_BANDS: [(u32, u16); 2] = [(2, 30), (0, 15)];

pub const MAX_SCORE: u16 = 280;

fn above<T: PartialOrd + Copy>(value: T, bands: &[(T, u16)]) -> Option<(T, u16)> {
    bands.iter().copied().find(|(threshold, _)| value > *threshold)
}

fn below(value: f64, bands: &[(f64, u16)]) -> Option<(f64, u16)> {
    bands.iter().copied().find(|(threshold, _)| value < *threshold)
}

pub(crate) fn score_inputs(inputs: &RiskInputs) -> (Vec<ScoreComponent>, u16) {
    let inputs = inputs.sanitized();
    let mut components = Vec::with_capacity(4);

    components.push(match above(inputs.days_late, &DAYS_LATE_BANDS) {
        Some((threshold, score)) => ScoreComponent {
            factor: RiskFactor::DaysLate,
            score,
            notes: format!("{} days late exceeds {threshold}", inputs.days_late),
        },
        None => ScoreComponent {
            factor: RiskFactor::DaysLate,
            score: 0,
            notes: format!("{} days late within grace period", inputs.days_late),
        },
    });

    components.push(match above(inputs.outstanding, &OUTSTANDING_BANDS) {
        Some((threshold, score)) => ScoreComponent {
            factor: RiskFactor::Outstanding,
            score,
            notes: format!("outstanding {} exceeds {threshold}", inputs.outstanding),
        },
        None => ScoreComponent {
            factor: RiskFactor::Outstanding,
            score: 0,
            notes: format!("outstanding {} below alert threshold", inputs.outstanding),
        },
    });

    let rate_band = if inputs.nothing_due() {
        None
    } else {
        below(inputs.payment_rate, &PAYMENT_RATE_BANDS)
    };
    components.push(match rate_band {
        Some((threshold, score)) => ScoreComponent {
            factor: RiskFactor::PaymentRate,
            score,
            notes: format!(
                "payment rate {:.1}% below {threshold:.0}%",
                inputs.payment_rate
            ),
        },
        None if inputs.nothing_due() => ScoreComponent {
            factor: RiskFactor::PaymentRate,
            score: 0,
            notes: "nothing due".to_string(),
        },
        None => ScoreComponent {
            factor: RiskFactor::PaymentRate,
            score: 0,
            notes: format!("payment rate {:.1}% on track", inputs.payment_rate),
        },
    });

    components.push(
        match above(inputs.extended_due_dates_count, &EXTENSION_BANDS) {
            Some((_, score)) => ScoreComponent {
                factor: RiskFactor::ExtendedDueDates,
                score,
                notes: format!(
                    "{} due date(s) extended",
                    inputs.extended_due_dates_count
                ),
            },
            None => ScoreComponent {
                factor: RiskFactor::ExtendedDueDates,
                score: 0,
                notes: "no extended due dates".to_string(),
            },
        },
    );

    let total = components.iter().map(|component| component.score).sum();
    (components, total)
}

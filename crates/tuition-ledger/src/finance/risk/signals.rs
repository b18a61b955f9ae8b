use crate::finance::allocation::LedgerRecap;
use crate::finance::domain::{lenient_amount, lenient_count, lenient_rate, Amount};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Aggregated financial signals for one student.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskInputs {
    #[serde(default, deserialize_with = "lenient_count")]
    pub days_late: u32,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub outstanding: Amount,
    #[serde(default, deserialize_with = "lenient_rate")]
    pub payment_rate: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub extended_due_dates_count: u32,
    /// Known only when the signals were derived from a balance; `Some(0)` means
    /// nothing is owed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_due: Option<Amount>,
}

impl RiskInputs {
    pub fn new(
        days_late: u32,
        outstanding: Amount,
        payment_rate: f64,
        extended_due_dates_count: u32,
    ) -> Self {
        Self {
            days_late,
            outstanding,
            payment_rate,
            extended_due_dates_count,
            total_due: None,
        }
        .sanitized()
    }

    /// Signals from an external balance source.
    pub fn from_balance(
        days_late: u32,
        outstanding: Amount,
        total_due: Amount,
        extended_due_dates_count: u32,
    ) -> Self {
        Self {
            days_late,
            outstanding,
            payment_rate: payment_rate(total_due, outstanding),
            extended_due_dates_count,
            total_due: Some(total_due.max(0)),
        }
        .sanitized()
    }

    /// Signals derived from an allocation recap as of `today`.
    pub fn from_recap(recap: &LedgerRecap, today: NaiveDate) -> Self {
        let days_late = recap
            .rows
            .iter()
            .map(|row| row.days_late(today))
            .max()
            .unwrap_or(0);
        let extended_due_dates_count = recap
            .rows
            .iter()
            .filter(|row| row.due_date_extended)
            .count()
            .min(u32::MAX as usize) as u32;

        Self::from_balance(
            days_late,
            recap.outstanding(),
            recap.total_due(),
            extended_due_dates_count,
        )
    }

    /// Coerce out-of-domain values so scoring stays total.
    pub fn sanitized(self) -> Self {
        let payment_rate = if self.payment_rate.is_finite() {
            self.payment_rate.clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            outstanding: self.outstanding.max(0),
            payment_rate,
            total_due: self.total_due.map(|total| total.max(0)),
            ..self
        }
    }

    pub(crate) fn nothing_due(&self) -> bool {
        self.total_due == Some(0)
    }
}

/// Share of `total_due` already settled, in percent.
pub fn payment_rate(total_due: Amount, outstanding: Amount) -> f64 {
    if total_due <= 0 {
        return 0.0;
    }
    let settled = (total_due - outstanding.max(0)) as f64;
    (settled / total_due as f64 * 100.0).clamp(0.0, 100.0)
}

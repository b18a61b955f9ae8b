use crate::finance::domain::{Amount, FeeItemId};
use chrono::NaiveDate;
use serde::Serialize;

pub const TOTALS_LABEL: &str = "TOTAUX";

/// Display state of a recap row relative to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    Settled,
    Upcoming,
    Late,
}

impl DueStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Settled => "Settled",
            Self::Upcoming => "Upcoming",
            Self::Late => "Late",
        }
    }
}

/// Paid/remaining breakdown for one fee item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRow {
    pub fee_item_id: FeeItemId,
    pub label: String,
    pub due_date: Option<NaiveDate>,
    pub due_date_display: String,
    pub due_date_extended: bool,
    pub tarif: Amount,
    pub deja: Amount,
    pub reste: Amount,
    /// Payments credited to this item by the matcher.
    pub direct_payments: Amount,
    /// Surplus brought forward from the previous items.
    pub carried_in: Amount,
}

impl AllocationRow {
    pub fn due_status(&self, today: NaiveDate) -> DueStatus {
        if self.reste == 0 {
            return DueStatus::Settled;
        }
        match self.due_date {
            Some(due) if due < today => DueStatus::Late,
            _ => DueStatus::Upcoming,
        }
    }

    /// Days elapsed since the due date while a balance remains, 0 otherwise.
    pub fn days_late(&self, today: NaiveDate) -> u32 {
        match (self.due_status(today), self.due_date) {
            (DueStatus::Late, Some(due)) => {
                (today - due).num_days().clamp(0, u32::MAX as i64) as u32
            }
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapTotals {
    pub label: &'static str,
    pub tarif: Amount,
    pub deja: Amount,
    pub reste: Amount,
}

/// Flat line handed to the document renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapLine {
    pub due_date_display: String,
    pub label: String,
    pub tarif: Amount,
    pub deja: Amount,
    pub reste: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DueStatus>,
}

/// Allocation of a payment history over a fee schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecap {
    pub rows: Vec<AllocationRow>,
    pub totals: RecapTotals,
    /// Sum of every strictly positive payment supplied.
    pub total_paid: Amount,
    /// Money recorded but not shown in any row: `total_paid - totals.deja`.
    pub unallocated_amount: Amount,
    /// Part of the unallocated amount no fee item claimed.
    pub unmatched_amount: Amount,
    /// Part of the unallocated amount left over after the last item.
    pub final_carryover: Amount,
}

impl LedgerRecap {
    pub fn row(&self, fee_item_id: &str) -> Option<&AllocationRow> {
        self.rows
            .iter()
            .find(|row| row.fee_item_id.as_str() == fee_item_id)
    }

    pub fn is_fully_allocated(&self) -> bool {
        self.unallocated_amount == 0
    }

    pub fn total_due(&self) -> Amount {
        self.totals.tarif
    }

    pub fn outstanding(&self) -> Amount {
        self.totals.reste
    }

    /// Rows followed by the totals line, ready for rendering.
    pub fn lines(&self, today: NaiveDate) -> Vec<RecapLine> {
        self.rows
            .iter()
            .map(|row| RecapLine {
                due_date_display: row.due_date_display.clone(),
                label: row.label.clone(),
                tarif: row.tarif,
                deja: row.deja,
                reste: row.reste,
                status: Some(row.due_status(today)),
            })
            .chain(std::iter::once(RecapLine {
                due_date_display: String::new(),
                label: self.totals.label.to_string(),
                tarif: self.totals.tarif,
                deja: self.totals.deja,
                reste: self.totals.reste,
                status: None,
            }))
            .collect()
    }
}

pub(crate) fn display_due_date(due_date: Option<NaiveDate>) -> String {
    due_date
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

mod matcher;
mod recap;

pub use matcher::{tranche_number, MatchOutcome, ReasonMatcher};
pub use recap::{AllocationRow, DueStatus, LedgerRecap, RecapLine, RecapTotals, TOTALS_LABEL};

use super::domain::{Amount, FeeItem, Payment};
use recap::display_due_date;
use tracing::{debug, warn};

/// Running state threaded through the schedule in declaration order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Ledger {
    carryover: Amount,
    total_tarif: Amount,
    total_deja: Amount,
    total_reste: Amount,
}

impl Ledger {
    fn apply(self, item: &FeeItem, direct_payments: Amount) -> (Self, AllocationRow) {
        let tarif = item.amount.max(0);
        let total_available = self.carryover.saturating_add(direct_payments);
        let deja = tarif.min(total_available);
        let reste = tarif - deja;

        let row = AllocationRow {
            fee_item_id: item.id.clone(),
            label: item.name.clone(),
            due_date: item.due_date,
            due_date_display: display_due_date(item.due_date),
            due_date_extended: item.due_date_extended,
            tarif,
            deja,
            reste,
            direct_payments,
            carried_in: self.carryover,
        };

        let next = Self {
            carryover: total_available - deja,
            total_tarif: self.total_tarif.saturating_add(tarif),
            total_deja: self.total_deja.saturating_add(deja),
            total_reste: self.total_reste.saturating_add(reste),
        };

        (next, row)
    }
}

/// Stateless engine distributing a payment history over an ordered fee schedule.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllocationEngine;

impl AllocationEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn allocate(&self, schedule: &[FeeItem], payments: &[Payment]) -> LedgerRecap {
        let matcher = ReasonMatcher::for_schedule(schedule);
        let mut direct = vec![0 as Amount; schedule.len()];
        let mut unmatched_amount: Amount = 0;
        let mut total_paid: Amount = 0;

        for payment in payments.iter().filter(|payment| payment.is_countable()) {
            total_paid = total_paid.saturating_add(payment.amount);
            match matcher.claim(payment) {
                Some(position) => {
                    direct[position] = direct[position].saturating_add(payment.amount);
                }
                None => {
                    debug!(
                        amount = payment.amount,
                        reason = %payment.reason,
                        "payment matches no fee item"
                    );
                    unmatched_amount = unmatched_amount.saturating_add(payment.amount);
                }
            }
        }

        let (ledger, rows) = schedule.iter().zip(direct).fold(
            (Ledger::default(), Vec::with_capacity(schedule.len())),
            |(ledger, mut rows), (item, direct_payments)| {
                let (next, row) = ledger.apply(item, direct_payments);
                rows.push(row);
                (next, rows)
            },
        );

        let unallocated_amount = total_paid - ledger.total_deja;
        if unallocated_amount > 0 {
            warn!(
                unallocated_amount,
                unmatched_amount,
                final_carryover = ledger.carryover,
                "recorded payments exceed the amount shown in the recap"
            );
        }

        LedgerRecap {
            rows,
            totals: RecapTotals {
                label: TOTALS_LABEL,
                tarif: ledger.total_tarif,
                deja: ledger.total_deja,
                reste: ledger.total_reste,
            },
            total_paid,
            unallocated_amount,
            unmatched_amount,
            final_carryover: ledger.carryover,
        }
    }
}

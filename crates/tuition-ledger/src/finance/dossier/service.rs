use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use super::sources::{FeeScheduleSource, PaymentHistorySource, SourceError};
use crate::finance::allocation::{AllocationEngine, LedgerRecap, RecapLine};
use crate::finance::domain::{FeeItem, Payment, StudentId};
use crate::finance::risk::{RiskClassifier, RiskEngine, RiskInputs, RiskProfile};

/// Financial dossier of one student: recap lines plus the risk profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDossier {
    pub student_id: StudentId,
    pub generated_on: NaiveDate,
    pub recap: LedgerRecap,
    pub lines: Vec<RecapLine>,
    pub risk: RiskProfile,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Service composing the upstream sources with both engines.
pub struct DossierService<F, P> {
    fees: Arc<F>,
    payments: Arc<P>,
    allocation: AllocationEngine,
    risk: RiskEngine,
}

impl<F, P> DossierService<F, P>
where
    F: FeeScheduleSource + 'static,
    P: PaymentHistorySource + 'static,
{
    pub fn new(fees: Arc<F>, payments: Arc<P>, classifier: RiskClassifier) -> Self {
        Self {
            fees,
            payments,
            allocation: AllocationEngine::new(),
            risk: RiskEngine::new(classifier),
        }
    }

    pub fn allocation(&self) -> &AllocationEngine {
        &self.allocation
    }

    pub fn risk(&self) -> &RiskEngine {
        &self.risk
    }

    /// Build the dossier. Source failures degrade to empty inputs and are listed
    /// in `warnings`, so a document can always be rendered.
    pub fn dossier(&self, student_id: &StudentId, today: NaiveDate) -> FinancialDossier {
        let mut warnings = Vec::new();

        let schedule = self
            .fees
            .fee_schedule(student_id)
            .unwrap_or_else(|err| degrade(student_id, "fee schedule", err, &mut warnings));
        let payments = self
            .payments
            .payments(student_id)
            .unwrap_or_else(|err| degrade(student_id, "payment history", err, &mut warnings));

        self.assemble(student_id.clone(), &schedule, &payments, today, warnings)
    }

    /// Build a dossier from records supplied by the caller.
    pub fn dossier_from_records(
        &self,
        student_id: StudentId,
        schedule: &[FeeItem],
        payments: &[Payment],
        today: NaiveDate,
    ) -> FinancialDossier {
        self.assemble(student_id, schedule, payments, today, Vec::new())
    }

    fn assemble(
        &self,
        student_id: StudentId,
        schedule: &[FeeItem],
        payments: &[Payment],
        today: NaiveDate,
        mut warnings: Vec<String>,
    ) -> FinancialDossier {
        let recap = self.allocation.allocate(schedule, payments);
        let risk = self.risk.assess(&RiskInputs::from_recap(&recap, today));

        if recap.unmatched_amount > 0 {
            warnings.push(format!(
                "{} of recorded payments match no fee item",
                recap.unmatched_amount
            ));
        }
        if recap.final_carryover > 0 {
            warnings.push(format!(
                "{} paid beyond the last fee item",
                recap.final_carryover
            ));
        }

        info!(
            student = %student_id,
            risk_score = risk.risk_score,
            risk_level = risk.risk_level.label(),
            outstanding = recap.outstanding(),
            "financial dossier assembled"
        );

        FinancialDossier {
            lines: recap.lines(today),
            student_id,
            generated_on: today,
            recap,
            risk,
            warnings,
        }
    }
}

fn degrade<T>(
    student_id: &StudentId,
    what: &str,
    err: SourceError,
    warnings: &mut Vec<String>,
) -> Vec<T> {
    warn!(student = %student_id, error = %err, "{what} unavailable, using empty records");
    warnings.push(format!("{what} unavailable: {err}"));
    Vec::new()
}

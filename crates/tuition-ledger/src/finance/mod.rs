//! School finance core: payment allocation over fee schedules, insolvency risk
//! scoring, and the dossier service that combines them.

pub mod allocation;
pub mod domain;
pub mod dossier;
pub mod import;
pub mod risk;

#[cfg(test)]
mod tests;

pub use allocation::{AllocationEngine, AllocationRow, LedgerRecap, MatchOutcome, ReasonMatcher};
pub use domain::{Amount, FeeItem, FeeItemId, Payment, StudentId};
pub use dossier::{
    finance_router, DossierService, FeeScheduleSource, FinancialDossier, PaymentHistorySource,
    SourceError,
};
pub use import::{PaymentImportError, PaymentLedgerImporter};
pub use risk::{
    RiskBand, RiskClassifier, RiskEngine, RiskInputs, RiskLevel, RiskProfile, RiskSettings,
    RiskSettingsError,
};

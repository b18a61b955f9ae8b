//! Financial dossier assembly: upstream sources, the dossier service and its
//! HTTP routes.

pub mod router;
pub mod service;
pub mod sources;

pub use router::finance_router;
pub use service::{DossierService, FinancialDossier};
pub use sources::{FeeScheduleSource, PaymentHistorySource, SourceError};

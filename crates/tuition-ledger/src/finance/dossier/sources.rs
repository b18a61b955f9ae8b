use crate::finance::domain::{FeeItem, Payment, StudentId};

/// Supplies the ordered fee schedule configured for a student.
pub trait FeeScheduleSource: Send + Sync {
    fn fee_schedule(&self, student: &StudentId) -> Result<Vec<FeeItem>, SourceError>;
}

/// Supplies the recorded payments of a student for the current school year.
pub trait PaymentHistorySource: Send + Sync {
    fn payments(&self, student: &StudentId) -> Result<Vec<Payment>, SourceError>;
}

/// Error enumeration for upstream lookups.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("student not found")]
    NotFound,
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

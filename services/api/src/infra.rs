use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tuition_ledger::error::AppError;
use tuition_ledger::finance::{
    FeeItem, FeeScheduleSource, Payment, PaymentHistorySource, RiskClassifier, RiskSettings,
    SourceError, StudentId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryFeeSchedules {
    schedules: Arc<Mutex<HashMap<StudentId, Vec<FeeItem>>>>,
}

impl InMemoryFeeSchedules {
    pub(crate) fn insert(&self, student: StudentId, schedule: Vec<FeeItem>) {
        let mut guard = self.schedules.lock().expect("fee schedule mutex poisoned");
        guard.insert(student, schedule);
    }

    pub(crate) fn students(&self) -> Vec<StudentId> {
        let guard = self.schedules.lock().expect("fee schedule mutex poisoned");
        let mut students: Vec<StudentId> = guard.keys().cloned().collect();
        students.sort();
        students
    }
}

impl FeeScheduleSource for InMemoryFeeSchedules {
    fn fee_schedule(&self, student: &StudentId) -> Result<Vec<FeeItem>, SourceError> {
        let guard = self.schedules.lock().expect("fee schedule mutex poisoned");
        guard.get(student).cloned().ok_or(SourceError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPaymentHistory {
    payments: Arc<Mutex<HashMap<StudentId, Vec<Payment>>>>,
}

impl InMemoryPaymentHistory {
    pub(crate) fn record(&self, student: StudentId, payment: Payment) {
        let mut guard = self.payments.lock().expect("payment mutex poisoned");
        guard.entry(student).or_default().push(payment);
    }
}

impl PaymentHistorySource for InMemoryPaymentHistory {
    fn payments(&self, student: &StudentId) -> Result<Vec<Payment>, SourceError> {
        let guard = self.payments.lock().expect("payment mutex poisoned");
        Ok(guard.get(student).cloned().unwrap_or_default())
    }
}

/// Fixed bands unless a settings file is configured.
pub(crate) fn load_classifier(path: Option<&Path>) -> Result<RiskClassifier, AppError> {
    match path {
        Some(path) => Ok(RiskSettings::from_path(path)?.classifier()),
        None => Ok(RiskClassifier::FixedBands),
    }
}

/// Sample school year used by `serve` and `demo` until a registrar backend is wired in.
pub(crate) fn seeded_sources() -> (InMemoryFeeSchedules, InMemoryPaymentHistory) {
    let fees = InMemoryFeeSchedules::default();
    let payments = InMemoryPaymentHistory::default();

    let schedule = sample_schedule();
    for student in ["stu-001", "stu-002", "stu-003"] {
        fees.insert(StudentId(student.to_string()), schedule.clone());
    }

    let on_time = StudentId("stu-001".to_string());
    payments.record(
        on_time.clone(),
        Payment::new(10_000, day(2025, 9, 2), "Paiement inscription"),
    );
    payments.record(
        on_time.clone(),
        Payment::new(50_000, day(2025, 10, 10), "Paiement Tranche 1 Scolarité 2025-2026"),
    );
    payments.record(
        on_time,
        Payment::new(40_000, day(2026, 1, 12), "Paiement Tranche 2 Scolarité 2025-2026"),
    );

    let partial = StudentId("stu-002".to_string());
    payments.record(
        partial.clone(),
        Payment::new(10_000, day(2025, 9, 4), "Paiement inscription"),
    );
    payments.record(
        partial.clone(),
        Payment::new(30_000, day(2025, 10, 1), "Paiement Tranche 1 Scolarité 2025-2026"),
    );
    payments.record(
        partial,
        Payment::new(5_000, day(2025, 11, 20), "Tenue scolaire"),
    );

    (fees, payments)
}

pub(crate) fn sample_schedule() -> Vec<FeeItem> {
    vec![
        FeeItem::registration("Inscription", 10_000),
        FeeItem::installment("1ère tranche", 50_000, day(2025, 10, 15)),
        FeeItem::installment("2ème tranche", 40_000, day(2026, 1, 15)).extended(),
        FeeItem::installment("3ème tranche", 30_000, day(2026, 4, 15)),
    ]
}

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

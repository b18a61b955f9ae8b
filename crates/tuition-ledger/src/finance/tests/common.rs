use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::finance::domain::{FeeItem, Payment, StudentId};
use crate::finance::dossier::{
    finance_router, DossierService, FeeScheduleSource, PaymentHistorySource, SourceError,
};
use crate::finance::risk::RiskClassifier;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn two_item_schedule() -> Vec<FeeItem> {
    vec![
        FeeItem::registration("Inscription", 10_000),
        FeeItem::installment("1ère tranche", 50_000, date(2025, 10, 15)),
    ]
}

pub(super) fn school_year_schedule() -> Vec<FeeItem> {
    vec![
        FeeItem::registration("Inscription", 10_000),
        FeeItem::installment("1ère tranche", 50_000, date(2025, 10, 15)),
        FeeItem::installment("2ème tranche", 40_000, date(2026, 1, 15)).extended(),
        FeeItem::installment("3ème tranche", 30_000, date(2026, 4, 15)),
    ]
}

pub(super) fn registration_payment(amount: i64) -> Payment {
    Payment::new(amount, date(2025, 9, 2), "Paiement inscription")
}

pub(super) fn tranche_payment(number: u32, amount: i64) -> Payment {
    Payment::new(
        amount,
        date(2025, 10, 1),
        format!("Paiement Tranche {number} Scolarité 2025-2026"),
    )
}

#[derive(Default)]
pub(super) struct MemoryFees {
    schedules: Mutex<HashMap<StudentId, Vec<FeeItem>>>,
}

impl MemoryFees {
    pub(super) fn with(student: &str, schedule: Vec<FeeItem>) -> Self {
        let fees = Self::default();
        fees.schedules
            .lock()
            .expect("fees mutex poisoned")
            .insert(StudentId(student.to_string()), schedule);
        fees
    }
}

impl FeeScheduleSource for MemoryFees {
    fn fee_schedule(&self, student: &StudentId) -> Result<Vec<FeeItem>, SourceError> {
        self.schedules
            .lock()
            .expect("fees mutex poisoned")
            .get(student)
            .cloned()
            .ok_or(SourceError::NotFound)
    }
}

#[derive(Default)]
pub(super) struct MemoryPayments {
    history: Mutex<HashMap<StudentId, Vec<Payment>>>,
}

impl MemoryPayments {
    pub(super) fn with(student: &str, payments: Vec<Payment>) -> Self {
        let source = Self::default();
        source
            .history
            .lock()
            .expect("payments mutex poisoned")
            .insert(StudentId(student.to_string()), payments);
        source
    }
}

impl PaymentHistorySource for MemoryPayments {
    fn payments(&self, student: &StudentId) -> Result<Vec<Payment>, SourceError> {
        Ok(self
            .history
            .lock()
            .expect("payments mutex poisoned")
            .get(student)
            .cloned()
            .unwrap_or_default())
    }
}

pub(super) struct OfflinePayments;

impl PaymentHistorySource for OfflinePayments {
    fn payments(&self, _student: &StudentId) -> Result<Vec<Payment>, SourceError> {
        Err(SourceError::Unavailable("cashier database offline".to_string()))
    }
}

pub(super) fn build_service() -> DossierService<MemoryFees, MemoryPayments> {
    DossierService::new(
        Arc::new(MemoryFees::with("stu-001", school_year_schedule())),
        Arc::new(MemoryPayments::with(
            "stu-001",
            vec![registration_payment(10_000), tranche_payment(1, 30_000)],
        )),
        RiskClassifier::FixedBands,
    )
}

pub(super) fn router_with_service(
    service: DossierService<MemoryFees, MemoryPayments>,
) -> axum::Router {
    finance_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

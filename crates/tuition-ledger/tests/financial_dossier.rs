use std::sync::Arc;

use chrono::NaiveDate;
use tuition_ledger::finance::{
    AllocationEngine, DossierService, FeeItem, FeeScheduleSource, Payment, PaymentHistorySource,
    RiskClassifier, RiskEngine, RiskInputs, RiskLevel, SourceError, StudentId,
};

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn schedule() -> Vec<FeeItem> {
    vec![
        FeeItem::registration("Inscription", 10_000),
        FeeItem::installment("1ère tranche", 50_000, day(2025, 10, 15)),
    ]
}

#[test]
fn inscription_and_partial_tranche() {
    let payments = vec![
        Payment::new(10_000, day(2025, 9, 2), "Paiement inscription"),
        Payment::new(30_000, day(2025, 10, 1), "Paiement Tranche 1 Scolarité 2025-2026"),
    ];

    let recap = AllocationEngine::new().allocate(&schedule(), &payments);

    let inscription = recap.row("Inscription").expect("inscription row");
    assert_eq!((inscription.deja, inscription.reste), (10_000, 0));
    let tranche = recap.row("1ère tranche").expect("tranche row");
    assert_eq!((tranche.deja, tranche.reste), (30_000, 20_000));
    assert_eq!(
        (recap.totals.tarif, recap.totals.deja, recap.totals.reste),
        (60_000, 40_000, 20_000)
    );
}

#[test]
fn overpaid_tranche_without_inscription() {
    let payments = vec![Payment::new(
        60_000,
        day(2025, 10, 1),
        "Paiement Tranche 1 Scolarité 2025-2026",
    )];

    let recap = AllocationEngine::new().allocate(&schedule(), &payments);

    let inscription = recap.row("Inscription").expect("inscription row");
    assert_eq!((inscription.deja, inscription.reste), (0, 10_000));
    let tranche = recap.row("1ère tranche").expect("tranche row");
    assert_eq!((tranche.deja, tranche.reste), (50_000, 0));
    assert_eq!(recap.final_carryover, 10_000);
    assert_eq!(recap.unallocated_amount, 10_000);
}

#[test]
fn worst_case_risk_signals() {
    let profile = RiskEngine::default().assess(&RiskInputs::new(95, 350_000, 5.0, 3));

    assert_eq!(profile.risk_score, 280);
    assert_eq!(profile.risk_level, RiskLevel::Critical);
}

#[test]
fn no_payments_leaves_full_schedule_due() {
    let schedule = vec![
        FeeItem::registration("Inscription", 15_000),
        FeeItem::installment("1ère tranche", 35_000, day(2025, 10, 15)),
        FeeItem::installment("2ème tranche", 25_000, day(2026, 1, 15)),
    ];

    let recap = AllocationEngine::new().allocate(&schedule, &[]);

    assert!(recap.rows.iter().all(|row| row.deja == 0 && row.reste == row.tarif));
    assert_eq!(recap.totals.reste, 75_000);
}

struct FixedSchedule;

impl FeeScheduleSource for FixedSchedule {
    fn fee_schedule(&self, _student: &StudentId) -> Result<Vec<FeeItem>, SourceError> {
        Ok(schedule())
    }
}

struct NoPayments;

impl PaymentHistorySource for NoPayments {
    fn payments(&self, _student: &StudentId) -> Result<Vec<Payment>, SourceError> {
        Ok(Vec::new())
    }
}

#[test]
fn dossier_for_a_student_who_never_paid() {
    let service = DossierService::new(
        Arc::new(FixedSchedule),
        Arc::new(NoPayments),
        RiskClassifier::FixedBands,
    );

    let dossier = service.dossier(&StudentId("stu-042".to_string()), day(2025, 11, 14));

    assert_eq!(dossier.recap.totals.reste, 60_000);
    assert_eq!(dossier.risk.days_late, 30);
    // 40 (days) + 40 (outstanding) + 50 (rate) + 0 (extensions)
    assert_eq!(dossier.risk.risk_score, 130);
    assert_eq!(dossier.risk.risk_level, RiskLevel::High);
    assert!(dossier.warnings.is_empty());
}

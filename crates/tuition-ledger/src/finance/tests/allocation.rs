use super::common::*;
use crate::finance::allocation::{AllocationEngine, DueStatus, TOTALS_LABEL};
use crate::finance::domain::{FeeItem, Payment};

#[test]
fn partial_tranche_payment_leaves_remainder() {
    let engine = AllocationEngine::new();
    let payments = vec![registration_payment(10_000), tranche_payment(1, 30_000)];

    let recap = engine.allocate(&two_item_schedule(), &payments);

    let inscription = recap.row("Inscription").expect("registration row");
    assert_eq!((inscription.deja, inscription.reste), (10_000, 0));
    let tranche = recap.row("1ère tranche").expect("tranche row");
    assert_eq!((tranche.deja, tranche.reste), (30_000, 20_000));
    assert_eq!(recap.totals.label, TOTALS_LABEL);
    assert_eq!(
        (recap.totals.tarif, recap.totals.deja, recap.totals.reste),
        (60_000, 40_000, 20_000)
    );
    assert!(recap.is_fully_allocated());
}

#[test]
fn surplus_on_last_item_is_reported_as_unallocated() {
    let engine = AllocationEngine::new();
    let payments = vec![tranche_payment(1, 60_000)];

    let recap = engine.allocate(&two_item_schedule(), &payments);

    let inscription = recap.row("Inscription").expect("registration row");
    assert_eq!((inscription.deja, inscription.reste), (0, 10_000));
    let tranche = recap.row("1ère tranche").expect("tranche row");
    assert_eq!((tranche.deja, tranche.reste), (50_000, 0));
    assert_eq!(recap.final_carryover, 10_000);
    assert_eq!(recap.unmatched_amount, 0);
    assert_eq!(recap.unallocated_amount, 10_000);
}

#[test]
fn carry_over_feeds_the_next_item() {
    let engine = AllocationEngine::new();
    let schedule = vec![
        FeeItem::installment("1ère tranche", 50_000, date(2025, 10, 15)),
        FeeItem::installment("2ème tranche", 40_000, date(2026, 1, 15)),
    ];
    let payments = vec![tranche_payment(1, 70_000), tranche_payment(2, 15_000)];

    let recap = engine.allocate(&schedule, &payments);

    let second = recap.row("2ème tranche").expect("second row");
    assert_eq!(second.carried_in, 20_000);
    assert_eq!(second.direct_payments, 15_000);
    assert_eq!(second.deja, 35_000);
    assert_eq!(second.reste, 5_000);
    assert_eq!(recap.final_carryover, 0);
}

#[test]
fn registration_surplus_flows_into_first_tranche() {
    let engine = AllocationEngine::new();
    let payments = vec![registration_payment(15_000)];

    let recap = engine.allocate(&two_item_schedule(), &payments);

    let tranche = recap.row("1ère tranche").expect("tranche row");
    assert_eq!(tranche.carried_in, 5_000);
    assert_eq!(tranche.deja, 5_000);
    assert_eq!(tranche.reste, 45_000);
}

#[test]
fn allocation_depends_on_schedule_order() {
    let engine = AllocationEngine::new();
    let first = FeeItem::installment("1ère tranche", 50_000, date(2025, 10, 15));
    let second = FeeItem::installment("2ème tranche", 40_000, date(2026, 1, 15));
    let payments = vec![tranche_payment(1, 70_000)];

    let forward = engine.allocate(&[first.clone(), second.clone()], &payments);
    let swapped = engine.allocate(&[second, first], &payments);

    assert_eq!(forward.row("2ème tranche").map(|row| row.deja), Some(20_000));
    assert_eq!(swapped.row("2ème tranche").map(|row| row.deja), Some(0));
    assert_eq!(forward.totals.deja, 70_000);
    assert_eq!(swapped.totals.deja, 50_000);
    assert_eq!(swapped.final_carryover, 20_000);
}

#[test]
fn per_item_bounds_hold_for_mixed_histories() {
    let engine = AllocationEngine::new();
    let payments = vec![
        registration_payment(4_000),
        registration_payment(9_000),
        tranche_payment(1, 80_000),
        tranche_payment(3, 1_000),
        Payment::new(7_500, date(2025, 11, 3), "Tenue scolaire"),
        Payment::new(-2_000, date(2025, 11, 4), "Paiement inscription"),
        Payment::new(0, date(2025, 11, 5), "Paiement Tranche 2 Scolarité"),
    ];

    let recap = engine.allocate(&school_year_schedule(), &payments);

    for row in &recap.rows {
        assert!(row.deja >= 0 && row.deja <= row.tarif, "{row:?}");
        assert_eq!(row.reste, row.tarif - row.deja);
        assert!(row.carried_in >= 0);
    }
    assert_eq!(recap.total_paid, 101_500);
    assert_eq!(recap.unmatched_amount, 7_500);
    assert!(recap.totals.deja <= recap.total_paid - recap.unmatched_amount);
    assert_eq!(
        recap.unallocated_amount,
        recap.unmatched_amount + recap.final_carryover
    );
}

#[test]
fn a_payment_is_credited_once() {
    let engine = AllocationEngine::new();
    let payments = vec![Payment::new(
        10_000,
        date(2025, 9, 2),
        "Inscription + Tranche 1 Scolarité",
    )];

    let recap = engine.allocate(&two_item_schedule(), &payments);

    assert_eq!(recap.row("Inscription").map(|row| row.direct_payments), Some(10_000));
    assert_eq!(recap.row("1ère tranche").map(|row| row.direct_payments), Some(0));
}

#[test]
fn explicit_links_are_preferred_over_reasons() {
    let engine = AllocationEngine::new();
    let payments = vec![Payment::new(20_000, date(2025, 9, 2), "Versement guichet").for_item("1ère tranche")];

    let recap = engine.allocate(&two_item_schedule(), &payments);

    assert_eq!(recap.row("1ère tranche").map(|row| row.deja), Some(20_000));
    assert!(recap.is_fully_allocated());
}

#[test]
fn empty_history_leaves_every_item_outstanding() {
    let engine = AllocationEngine::new();
    let schedule = vec![
        FeeItem::registration("Inscription", 15_000),
        FeeItem::installment("1ère tranche", 35_000, date(2025, 10, 15)),
        FeeItem::installment("2ème tranche", 25_000, date(2026, 1, 15)),
    ];

    let recap = engine.allocate(&schedule, &[]);

    assert!(recap.rows.iter().all(|row| row.deja == 0 && row.reste == row.tarif));
    assert_eq!(recap.totals.tarif, 75_000);
    assert_eq!(recap.totals.reste, 75_000);
    assert_eq!(recap.total_paid, 0);
}

#[test]
fn empty_schedule_yields_zero_totals() {
    let engine = AllocationEngine::new();

    let recap = engine.allocate(&[], &[registration_payment(10_000)]);

    assert!(recap.rows.is_empty());
    assert_eq!(
        (recap.totals.tarif, recap.totals.deja, recap.totals.reste),
        (0, 0, 0)
    );
    assert_eq!(recap.unmatched_amount, 10_000);
}

#[test]
fn repeated_allocation_is_identical() {
    let engine = AllocationEngine::new();
    let payments = vec![registration_payment(10_000), tranche_payment(1, 65_000)];

    let first = engine.allocate(&school_year_schedule(), &payments);
    let second = engine.allocate(&school_year_schedule(), &payments);

    assert_eq!(first, second);
}

#[test]
fn lines_end_with_totals_and_flag_late_rows() {
    let engine = AllocationEngine::new();
    let payments = vec![registration_payment(10_000), tranche_payment(1, 30_000)];

    let recap = engine.allocate(&two_item_schedule(), &payments);
    let lines = recap.lines(date(2025, 11, 1));

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].due_date_display, "-");
    assert_eq!(lines[0].status, Some(DueStatus::Settled));
    assert_eq!(lines[1].due_date_display, "15/10/2025");
    assert_eq!(lines[1].status, Some(DueStatus::Late));
    assert_eq!(lines[2].label, "TOTAUX");
    assert_eq!(lines[2].reste, 20_000);
    assert!(lines[2].status.is_none());
    assert_eq!(recap.rows[1].days_late(date(2025, 11, 1)), 17);
}

#[test]
fn generic_reason_stays_unmatched() {
    let engine = AllocationEngine::new();
    let mut schedule = two_item_schedule();
    schedule.push(FeeItem::installment("Frais de cantine", 15_000, date(2025, 11, 1)));
    let payments = vec![Payment::new(15_000, date(2025, 10, 3), "Frais")];

    let recap = engine.allocate(&schedule, &payments);

    assert_eq!(recap.row("Frais de cantine").map(|row| row.deja), Some(0));
    assert_eq!(recap.unmatched_amount, 15_000);
    assert_eq!(recap.unallocated_amount, 15_000);
}

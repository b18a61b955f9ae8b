use crate::infra::{load_classifier, seeded_sources};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tuition_ledger::error::AppError;
use tuition_ledger::finance::domain::parse_date;
use tuition_ledger::finance::allocation::RecapLine;
use tuition_ledger::finance::{
    AllocationEngine, DossierService, FeeItem, FinancialDossier, LedgerRecap,
    PaymentLedgerImporter, RiskEngine, RiskInputs, RiskProfile,
};

#[derive(Args, Debug)]
pub(crate) struct RecapArgs {
    /// Fee schedule as a JSON array of `{ name, amount, dueDate }` items
    #[arg(long)]
    pub(crate) schedule: PathBuf,
    /// Payment ledger export (CSV with Date, Montant, Motif, Tranche columns)
    #[arg(long)]
    pub(crate) payments: PathBuf,
    /// Reference date for due statuses (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Optional JSON file of risk bands overriding the fixed classification
    #[arg(long)]
    pub(crate) risk_settings: Option<PathBuf>,
    /// Print the recap and risk profile as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RiskArgs {
    /// Days elapsed since the oldest unpaid due date
    #[arg(long, default_value_t = 0)]
    pub(crate) days_late: u32,
    /// Outstanding balance
    #[arg(long, default_value_t = 0)]
    pub(crate) outstanding: i64,
    /// Share of the schedule already paid, in percent
    #[arg(long, default_value_t = 0.0)]
    pub(crate) payment_rate: f64,
    /// Number of fee items whose due date was extended
    #[arg(long, default_value_t = 0)]
    pub(crate) extended_due_dates: u32,
    /// Optional JSON file of risk bands overriding the fixed classification
    #[arg(long)]
    pub(crate) risk_settings: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Optional JSON file of risk bands overriding the fixed classification
    #[arg(long)]
    pub(crate) risk_settings: Option<PathBuf>,
}

pub(crate) fn run_recap(args: RecapArgs) -> Result<(), AppError> {
    let RecapArgs {
        schedule,
        payments,
        today,
        risk_settings,
        json,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let schedule = load_schedule(&schedule)?;
    let payments = PaymentLedgerImporter::from_reader(File::open(&payments)?)?;
    let classifier = load_classifier(risk_settings.as_deref())?;

    let recap = AllocationEngine::new().allocate(&schedule, &payments);
    let lines = recap.lines(today);
    let profile = RiskEngine::new(classifier).assess(&RiskInputs::from_recap(&recap, today));

    if json {
        let payload = serde_json::json!({
            "today": today,
            "recap": recap,
            "lines": lines,
            "risk": profile,
        });
        print_json(&payload);
        return Ok(());
    }

    println!("Financial recap as of {}", today.format("%d/%m/%Y"));
    render_lines(&lines);
    render_unallocated(&recap);
    render_profile(&profile);
    Ok(())
}

pub(crate) fn run_risk(args: RiskArgs) -> Result<(), AppError> {
    let classifier = load_classifier(args.risk_settings.as_deref())?;
    let inputs = RiskInputs::new(
        args.days_late,
        args.outstanding,
        args.payment_rate,
        args.extended_due_dates,
    );

    let profile = RiskEngine::new(classifier).assess(&inputs);
    render_profile(&profile);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let classifier = load_classifier(args.risk_settings.as_deref())?;
    let (fees, payments) = seeded_sources();
    let students = fees.students();
    let service = DossierService::new(Arc::new(fees), Arc::new(payments), classifier);

    println!("Tuition ledger demo ({})", today.format("%d/%m/%Y"));
    for student in students {
        let dossier = service.dossier(&student, today);
        render_dossier(&dossier);
    }
    Ok(())
}

fn load_schedule(path: &Path) -> Result<Vec<FeeItem>, AppError> {
    let file = File::open(path)?;
    let schedule = serde_json::from_reader(file).map_err(std::io::Error::from)?;
    Ok(schedule)
}

fn render_dossier(dossier: &FinancialDossier) {
    println!("\nStudent {}", dossier.student_id);
    render_lines(&dossier.lines);
    render_unallocated(&dossier.recap);
    render_profile(&dossier.risk);
    for warning in &dossier.warnings {
        println!("  ! {}", warning);
    }
}

fn render_lines(lines: &[RecapLine]) {
    println!(
        "  {:<10} {:<24} {:>10} {:>10} {:>10}  Status",
        "Due", "Item", "Tarif", "Deja", "Reste"
    );
    for line in lines {
        println!(
            "  {:<10} {:<24} {:>10} {:>10} {:>10}  {}",
            line.due_date_display,
            line.label,
            line.tarif,
            line.deja,
            line.reste,
            line.status.map(|status| status.label()).unwrap_or("")
        );
    }
}

fn render_unallocated(recap: &LedgerRecap) {
    if recap.unallocated_amount > 0 {
        println!(
            "  Unallocated: {} (unmatched {}, beyond last item {})",
            recap.unallocated_amount, recap.unmatched_amount, recap.final_carryover
        );
    }
}

fn render_profile(profile: &RiskProfile) {
    println!(
        "  Risk: {} ({}/{}) -> {}",
        profile.classification.label(),
        profile.risk_score,
        tuition_ledger::finance::risk::MAX_SCORE,
        profile.reminder.tier_label
    );
    for component in &profile.components {
        println!(
            "    - {}: {} ({})",
            component.factor.label(),
            component.score,
            component.notes
        );
    }
    println!("  Suggested reminder: {}", profile.reminder.rationale);
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(err) => println!("recap payload unavailable: {}", err),
    }
}

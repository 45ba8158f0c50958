use crate::infra::seed_reference_data;
use accreditation::catalog::{CatalogService, CriteriaFilter, CriterionId};
use accreditation::config::AppConfig;
use accreditation::error::AppError;
use accreditation::evaluation::{
    AccreditationService, CriterionResolution, HistoryPolicy, ScoreSubmission, ScoringPolicy,
};
use accreditation::facility::{
    AccreditationStatus, Facility, FacilityId, FacilityKind, OperationalStatus,
};
use accreditation::geography::AreaId;
use accreditation::reporting::{DateRange, ReportingService, StatusCountQuery};
use accreditation::storage::{AccreditationStore, FacilityStore, MemoryStore, SqliteStore};
use accreditation::telemetry;
use chrono::{NaiveDate, Utc};
use clap::Args;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct SeedArgs {
    /// SQLite database to seed (defaults to APP_DATABASE_PATH)
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
    /// Additional criteria CSV to import after the reference catalog
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// SQLite database to read (defaults to APP_DATABASE_PATH)
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
    /// First day of the reporting range (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start: Option<NaiveDate>,
    /// Last day of the reporting range, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) end: Option<NaiveDate>,
    /// Reference date for the trailing window (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Leave facilities pending registration out of the status counts
    #[arg(long)]
    pub(crate) exclude_pending: bool,
    /// Break the monthly evolution down by facility type
    #[arg(long)]
    pub(crate) split_by_type: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for the trailing window (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Reject checked ids that are not in the applicable catalog
    #[arg(long)]
    pub(crate) strict: bool,
    /// Keep every evaluation instead of overwriting the latest one
    #[arg(long)]
    pub(crate) append: bool,
}

pub(crate) fn run_seed(args: SeedArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let path = args.database.unwrap_or(config.storage.database_path);
    let store = Arc::new(SqliteStore::open(&path)?);
    let summary = seed_reference_data(&store)?;
    println!(
        "Seeded {}: {} criteria inserted, {} already present",
        path.display(),
        summary.inserted,
        summary.skipped
    );

    if let Some(csv) = args.catalog {
        let file = File::open(&csv)?;
        let imported = CatalogService::new(store).import_criteria(file)?;
        println!(
            "Imported {}: {} criteria inserted, {} skipped",
            csv.display(),
            imported.inserted,
            imported.skipped
        );
    }

    Ok(())
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        database,
        start,
        end,
        today,
        exclude_pending,
        split_by_type,
    } = args;

    let config = AppConfig::load()?;
    let path = database.unwrap_or(config.storage.database_path);
    let store = Arc::new(SqliteStore::open(&path)?);
    let range = match (start, end) {
        (None, None) => None,
        (start, end) => Some(DateRange::new(start, end)?),
    };
    let today = today.unwrap_or_else(|| Utc::now().date_naive());

    println!("Accreditation report for {}", path.display());
    render_reports(
        &ReportingService::new(store),
        range,
        today,
        exclude_pending,
        split_by_type,
    )
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        strict,
        append,
    } = args;
    let today = today.unwrap_or_else(|| Utc::now().date_naive());
    let policy = ScoringPolicy {
        criterion_resolution: if strict {
            CriterionResolution::Strict
        } else {
            CriterionResolution::Lenient
        },
        history: if append {
            HistoryPolicy::Append
        } else {
            HistoryPolicy::Overwrite
        },
    };

    println!("Facility accreditation demo");
    let store = Arc::new(MemoryStore::new());
    let summary = seed_reference_data(&store)?;
    println!("- Reference catalog loaded: {} criteria", summary.inserted);
    register_demo_facilities(store.as_ref())?;

    let catalog = CatalogService::new(store.clone());
    let health = catalog.list_criteria(FacilityKind::Ess, &CriteriaFilter::default())?;
    let distribution = catalog.list_criteria(FacilityKind::Epvg, &CriteriaFilter::default())?;
    println!(
        "- ESS grid: {} criteria in {} categories ({} mandatory)",
        health.total,
        health.grouped.len(),
        health.mandatory_count
    );
    println!(
        "- EPVG grid: {} criteria in {} categories ({} mandatory)",
        distribution.total,
        distribution.grouped.len(),
        distribution.mandatory_count
    );

    let every_health: BTreeSet<CriterionId> =
        health.criteria.iter().map(|c| c.id.clone()).collect();
    let mandatory_health: BTreeSet<CriterionId> = health
        .criteria
        .iter()
        .filter(|c| c.mandatory)
        .map(|c| c.id.clone())
        .collect();
    let half_distribution: BTreeSet<CriterionId> = distribution
        .criteria
        .iter()
        .step_by(2)
        .map(|c| c.id.clone())
        .collect();

    let scoring = AccreditationService::new(store.clone(), policy);
    let visits = [
        ("fac-hgr-kinshasa", every_health),
        ("fac-cs-limete", mandatory_health),
        ("fac-depot-gombe", half_distribution),
    ];

    println!("\nScoring visits");
    for (facility_id, checked) in visits {
        let submission = ScoreSubmission {
            checked_criterion_ids: checked,
            observations: Some("Demo inspection".to_string()),
        };
        match scoring.score_facility(&FacilityId::new(facility_id), &submission) {
            Ok(result) => println!(
                "- {} -> {}/{} ({:.2}%) conforming={} status={}",
                result.evaluation.reference,
                result.score_total,
                result.score_maximum,
                result.percentage,
                result.conforming,
                result.accreditation_status.label()
            ),
            Err(err) => println!("- {facility_id}: scoring rejected ({err})"),
        }
    }

    println!("\nCertificates");
    for facility_id in ["fac-hgr-kinshasa", "fac-cs-limete", "fac-depot-gombe"] {
        match scoring.certificate(&FacilityId::new(facility_id), today) {
            Ok(certificate) => println!(
                "- {} issued to {} ({}), valid until {}",
                certificate.accreditation_number,
                certificate.facility_name,
                certificate.area.as_deref().unwrap_or("no health area"),
                certificate.expires_on.date_naive()
            ),
            Err(err) => println!("- {facility_id}: {err}"),
        }
    }

    println!();
    render_reports(&ReportingService::new(store), None, today, false, true)
}

fn register_demo_facilities<S: FacilityStore>(store: &S) -> Result<(), AppError> {
    let facilities = [
        (
            "fac-hgr-kinshasa",
            "ESS-KIN-001",
            "Hôpital Général de Référence",
            FacilityKind::Ess,
            Some("zs-kin-gom-as1"),
            OperationalStatus::Active,
        ),
        (
            "fac-cs-limete",
            "ESS-KIN-014",
            "Centre de Santé Limete",
            FacilityKind::Ess,
            Some("zs-kin-lim-as2"),
            OperationalStatus::Active,
        ),
        (
            "fac-depot-gombe",
            "EPVG-KIN-003",
            "Dépôt Pharmaceutique Gombe",
            FacilityKind::Epvg,
            Some("zs-kin-gom-as3"),
            OperationalStatus::Active,
        ),
        (
            "fac-pharma-matadi",
            "EPVG-KOC-001",
            "Grossiste Matadi",
            FacilityKind::Epvg,
            None,
            OperationalStatus::Pending,
        ),
    ];

    for (id, code, name, kind, area, operational_status) in facilities {
        store.insert_facility(Facility {
            id: FacilityId::new(id),
            code: code.to_string(),
            name: name.to_string(),
            kind,
            operational_status,
            accreditation_status: AccreditationStatus::NotAccredited,
            area_id: area.map(|area| AreaId(area.to_string())),
            address: None,
            contact: None,
            capacity: None,
            created_at: Utc::now(),
        })?;
    }
    Ok(())
}

fn render_reports<S>(
    reporting: &ReportingService<S>,
    range: Option<DateRange>,
    today: NaiveDate,
    exclude_pending: bool,
    split_by_type: bool,
) -> Result<(), AppError>
where
    S: AccreditationStore + 'static,
{
    let counts = reporting.status_counts(&StatusCountQuery {
        range,
        exclude_pending,
    })?;
    println!(
        "Facilities: {} total ({} ESS, {} EPVG)",
        counts.totals.total, counts.totals.ess, counts.totals.epvg
    );
    for entry in &counts.accreditation {
        println!(
            "  - {}: {} ({} ESS / {} EPVG)",
            entry.status, entry.counts.total, entry.counts.ess, entry.counts.epvg
        );
    }

    let overview = reporting.accreditation_overview()?;
    println!(
        "Evaluations: {} across {} facilities, average {:.1}%",
        overview.total_evaluations, overview.evaluated_facilities, overview.average_percentage
    );
    println!(
        "  Tranches: {} excellent | {} good | {} weak | {} unevaluated",
        overview.tranches.excellent,
        overview.tranches.good,
        overview.tranches.weak,
        overview.tranches.unevaluated
    );

    println!("Monthly evolution");
    for bucket in reporting.evolution(range, split_by_type, today)? {
        if bucket.counts.evaluations == 0 {
            continue;
        }
        let split = bucket
            .by_kind
            .map(|split| {
                format!(
                    " [ESS {} / EPVG {}]",
                    split.ess.evaluations, split.epvg.evaluations
                )
            })
            .unwrap_or_default();
        println!(
            "  - {}: {} evaluations, {:.1}% average, {} conforming{}",
            bucket.label,
            bucket.counts.evaluations,
            bucket.counts.average_percentage,
            bucket.counts.conforming,
            split
        );
    }

    let rollup = reporting.province_rollup(range)?;
    println!("Provinces");
    for entry in &rollup.provinces {
        println!(
            "  - {} ({}): {} facilities, {} accredited",
            entry.name, entry.code, entry.facilities.total, entry.accredited.total
        );
    }
    if rollup.unplaced.total > 0 {
        println!("  - without health area: {}", rollup.unplaced.total);
    }

    Ok(())
}

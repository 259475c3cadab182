use crate::infra::load_catalog_file;
use admission_radar::admissions::{
    default_institutions, wire, EligibilityService, InMemoryCatalogStore, InstitutionMatch,
    IntakeGuard, MatchReport, ResultQuery, StatusFilter, StudentProfile, StudentSubmission,
    YearInput,
};
use admission_radar::error::AppError;
use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Year the SSC exam was passed
    #[arg(long)]
    pub(crate) ssc_year: String,
    /// Year the HSC exam was passed
    #[arg(long)]
    pub(crate) hsc_year: String,
    /// SSC GPA (0.00 - 5.00)
    #[arg(long)]
    pub(crate) ssc_gpa: f64,
    /// HSC GPA (0.00 - 5.00)
    #[arg(long)]
    pub(crate) hsc_gpa: f64,
    /// Science, Business Studies, or Humanities
    #[arg(long)]
    pub(crate) track: String,
    /// Catalog export to match against instead of the built-in catalog
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Evaluation instant (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_now)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Only show institutions whose name contains this text
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// all, open, or closed
    #[arg(long, default_value = "all", value_parser = crate::infra::parse_status)]
    pub(crate) status: StatusFilter,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogExportArgs {
    /// Write to this file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let MatchArgs {
        ssc_year,
        hsc_year,
        ssc_gpa,
        hsc_gpa,
        track,
        catalog,
        now,
        search,
        status,
        json,
    } = args;

    let student = IntakeGuard.profile_from_submission(StudentSubmission {
        ssc_year: YearInput::Text(ssc_year),
        hsc_year: YearInput::Text(hsc_year),
        ssc_gpa,
        hsc_gpa,
        track,
    })?;

    let institutions = match catalog {
        Some(path) => load_catalog_file(&path)?.institutions,
        None => default_institutions(),
    };
    let store = Arc::new(InMemoryCatalogStore::from_institutions(institutions));
    let service = EligibilityService::new(store);

    let now = now.unwrap_or_else(Utc::now);
    let report = service.check_profile(&student, now)?;
    let query = ResultQuery {
        text: search,
        status,
    };
    let shown = report.filtered(&query);

    if json {
        let view = MatchReport {
            evaluated_at: report.evaluated_at,
            ranked: shown,
            summary: report.summary,
        };
        match serde_json::to_string_pretty(&view) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Report payload unavailable: {err}"),
        }
        return Ok(());
    }

    render_report(&student, &report, &shown, &query);
    Ok(())
}

fn render_report(
    student: &StudentProfile,
    report: &MatchReport,
    shown: &[InstitutionMatch],
    query: &ResultQuery,
) {
    println!(
        "Admission matches for SSC {} / HSC {} ({}, total GPA {})",
        student.ssc_year,
        student.hsc_year,
        student.track,
        student.total_gpa()
    );
    println!(
        "Evaluated at {} | status filter: {}",
        wire::format_instant(&report.evaluated_at),
        query.status
    );

    if report.is_catalog_empty() {
        println!("\nThe catalog has no institutions yet.");
        return;
    }

    let summary = &report.summary;
    println!(
        "- {} of {} institutions admit you | {} eligible units ({} open, {} closed)",
        summary.matched_institutions,
        summary.total_institutions,
        summary.total_eligible_units,
        summary.open_units,
        summary.closed_units
    );

    if shown.is_empty() {
        println!("\nNo institutions match the current filters.");
        return;
    }

    let countdowns = report.countdowns(report.evaluated_at);
    for (position, entry) in shown.iter().enumerate() {
        let institution = &entry.institution;
        println!(
            "\n{}. {} [{}] - {} eligible unit(s)",
            position + 1,
            institution.name,
            institution.kind.label(),
            entry.total_eligible_units
        );
        if !institution.admission_portal_url.is_empty() {
            println!("   Apply: {}", institution.admission_portal_url);
        }
        if let Some(countdown) = countdowns
            .iter()
            .find(|countdown| countdown.institution_id == institution.id)
        {
            if countdown.countdown.expired {
                println!("   Deadline passed");
            } else {
                println!(
                    "   Next deadline in {}d {}h {}m",
                    countdown.countdown.days, countdown.countdown.hours, countdown.countdown.minutes
                );
            }
        }
        for unit_match in &entry.eligible_units {
            let unit = &unit_match.unit;
            println!(
                "   - {}: {} | {} days | deadline {} | min total GPA {}",
                unit.unit_name,
                unit_match.status.label(),
                unit_match.days_until_deadline,
                wire::format_instant(&unit.apply_deadline),
                unit.min_total_gpa
            );
            if !unit.notes.is_empty() {
                println!("     {}", unit.notes);
            }
        }
    }
}

pub(crate) fn run_catalog_export(args: CatalogExportArgs) -> Result<(), AppError> {
    let catalog = default_institutions();
    let json = match serde_json::to_string_pretty(&catalog) {
        Ok(json) => json,
        Err(err) => {
            println!("Catalog payload unavailable: {err}");
            return Ok(());
        }
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, json)?;
            println!("Wrote {} institutions to {}", catalog.len(), path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

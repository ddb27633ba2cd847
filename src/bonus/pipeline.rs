//! One bonus period end to end: load, aggregate, classify, review.

use chrono::NaiveDate;
use tracing::info;

use crate::{
    bonus::{
        batch::{BatchProcessor, BatchSummary},
        eligibility::EligibilityChecker,
        review::{apply_decisions, load_decisions_file, ReviewOutcome},
    },
    config::BonusConfig,
    error::Result,
    records::{aggregate_absences, load_absences_file, load_roster_file},
    run_log::RunLog,
    storage::LeaveCategoryTable,
};

/// Files and options for one processing run.
#[derive(Debug, Clone, Default)]
pub struct PeriodInputs {
    pub roster: String,
    pub absences: String,
    pub decisions: Option<String>,
    pub admission_cutoff: Option<NaiveDate>,
}

pub struct PeriodRun {
    pub summary: BatchSummary,
    pub log: RunLog,
    pub review: Option<ReviewOutcome>,
}

/// Run the whole period against an already-loaded category table.
///
/// File and schema problems abort the run; row-level problems end up in the
/// returned run log.
pub fn run_period(
    inputs: &PeriodInputs,
    config: &BonusConfig,
    categories: LeaveCategoryTable,
) -> Result<PeriodRun> {
    let mut log = RunLog::new();

    let roster = load_roster_file(&inputs.roster, &mut log)?;
    let skipped_rows = roster.skipped();
    let absence_rows = load_absences_file(&inputs.absences)?;
    let absences = aggregate_absences(&absence_rows, &categories, &mut log);
    info!(
        "{} absence rows folded into {} employee summaries",
        absence_rows.len(),
        absences.len()
    );

    let processor = BatchProcessor::new(
        EligibilityChecker::new(config.clone(), categories),
        inputs.admission_cutoff,
    );
    let mut summary = processor.process(roster.records, &absences, &mut log);
    summary.skipped_rows = skipped_rows;

    let review = match &inputs.decisions {
        Some(path) => {
            let decisions = load_decisions_file(path, &mut log)?;
            let outcome = apply_decisions(&mut summary.results, &decisions, config, &mut log);
            summary.recount();
            Some(outcome)
        }
        None => None,
    };

    Ok(PeriodRun { summary, log, review })
}

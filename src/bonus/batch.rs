use chrono::NaiveDate;
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::info;

use crate::{
    bonus::{
        eligibility::EligibilityChecker,
        types::{BonusStatus, ClassificationResult, Outcome},
    },
    records::{AbsenceSummary, EmployeeId, EmployeeRecord},
    run_log::{LogSource, RunLog},
    utils::format_brl,
};

/// One roster record with the absence picture it was judged on and the
/// verdict.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedEmployee {
    pub employee: EmployeeRecord,
    pub absence: AbsenceSummary,
    pub result: ClassificationResult,
}

/// Classifies a whole roster for one bonus period.
pub struct BatchProcessor {
    checker: EligibilityChecker,
    admission_cutoff: Option<NaiveDate>,
}

impl BatchProcessor {
    pub fn new(checker: EligibilityChecker, admission_cutoff: Option<NaiveDate>) -> Self {
        Self {
            checker,
            admission_cutoff,
        }
    }

    /// Classify every roster record admitted on or before the cutoff, in
    /// roster order.
    pub fn process(
        &self,
        employees: Vec<EmployeeRecord>,
        absences: &HashMap<EmployeeId, AbsenceSummary>,
        log: &mut RunLog,
    ) -> BatchSummary {
        info!("Classifying {} employees", employees.len());

        let mut summary = BatchSummary {
            total_records: employees.len(),
            ..BatchSummary::default()
        };
        let mut roster_ids = HashSet::new();

        for employee in employees {
            roster_ids.insert(employee.employee_id.clone());

            if let Some(cutoff) = self.admission_cutoff {
                match employee.admission_date {
                    Some(admitted) if admitted > cutoff => {
                        info!(
                            "Employee {} admitted {} after cutoff {}; excluded",
                            employee.employee_id, admitted, cutoff
                        );
                        summary.excluded_by_admission += 1;
                        continue;
                    }
                    Some(_) => {}
                    None => log.warn_employee(
                        LogSource::Batch,
                        employee.employee_id.as_str(),
                        "no admission date; cannot apply the admission cutoff, classified anyway",
                    ),
                }
            }

            let absence = absences.get(&employee.employee_id).cloned().unwrap_or_default();
            let result = self.checker.classify(&employee, &absence);
            summary.results.push(ClassifiedEmployee {
                employee,
                absence,
                result,
            });
        }

        let mut orphaned: Vec<&EmployeeId> = absences
            .keys()
            .filter(|id| !roster_ids.contains(*id))
            .collect();
        orphaned.sort();
        for id in &orphaned {
            log.warn_employee(
                LogSource::Batch,
                id.as_str(),
                "absence records found for an employee not on the roster",
            );
        }
        summary.orphaned_absences = orphaned.len();

        summary.recount();

        info!(
            "Batch complete: {} to pay, {} not paid, {} to evaluate, {} payable",
            summary.count(Outcome::Pay),
            summary.count(Outcome::DoNotPay),
            summary.count(Outcome::Evaluate),
            summary.total_payable
        );

        summary
    }
}

/// Results of one batch run and the counts reported to the operator.
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub total_records: usize,
    pub excluded_by_admission: usize,
    /// Roster rows the loader could not turn into records.
    pub skipped_rows: usize,
    pub orphaned_absences: usize,
    pub status_counts: BTreeMap<BonusStatus, usize>,
    pub outcome_counts: BTreeMap<Outcome, usize>,
    pub total_payable: Decimal,
    pub results: Vec<ClassifiedEmployee>,
}

impl BatchSummary {
    /// Rebuild counts and totals from `results`, e.g. after manual review.
    pub fn recount(&mut self) {
        self.status_counts.clear();
        self.outcome_counts.clear();
        self.total_payable = Decimal::ZERO;

        for classified in &self.results {
            let status = classified.result.status;
            *self.status_counts.entry(status).or_insert(0) += 1;
            *self.outcome_counts.entry(status.outcome()).or_insert(0) += 1;
            if status.outcome() == Outcome::Pay {
                self.total_payable += classified.result.amount;
            }
        }
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcome_counts.get(&outcome).copied().unwrap_or(0)
    }

    pub fn status_count(&self, status: BonusStatus) -> usize {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }

    pub fn classified(&self) -> usize {
        self.results.len()
    }

    pub fn pending_review(&self) -> impl Iterator<Item = &ClassifiedEmployee> {
        self.results.iter().filter(|c| c.result.status.needs_review())
    }

    /// Print a formatted summary to console
    pub fn print_summary(&self) {
        println!("\n{}", "=== Attendance Bonus Summary ===".cyan().bold());
        println!("Roster records:      {}", self.total_records + self.skipped_rows);
        println!("Classified:          {}", self.classified());
        println!("Pay:                 {}", self.count(Outcome::Pay).to_string().green());
        println!("Do not pay:          {}", self.count(Outcome::DoNotPay).to_string().red());
        println!("Evaluate:            {}", self.count(Outcome::Evaluate).to_string().yellow());
        println!("Total payable:       {}", format_brl(self.total_payable).bold());

        if self.excluded_by_admission > 0 {
            println!("Excluded (admission): {}", self.excluded_by_admission);
        }
        if self.skipped_rows > 0 {
            println!("Skipped rows:        {}", self.skipped_rows.to_string().red());
        }
        if self.orphaned_absences > 0 {
            println!("Orphaned absences:   {}", self.orphaned_absences.to_string().yellow());
        }

        println!("\nBy status:");
        for (status, count) in &self.status_counts {
            println!("  {:<34} {}", status.label(), count);
        }
        println!("{}", "================================".cyan());
    }
}

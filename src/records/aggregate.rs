use std::collections::HashMap;
use tracing::debug;

use crate::{
    records::{
        models::{AbsenceRow, AbsenceSummary, EmployeeId},
        parse::parse_decimal,
    },
    run_log::{LogSource, RunLog},
    storage::{Disposition, LeaveCategoryTable},
    text::{non_empty, normalize_key},
};

/// Fold the absence log into at most one summary per employee.
///
/// When an employee has several distinct leave types the summary keeps the
/// most restrictive one (blocking, then unknown, then needing a decision,
/// then granting); the first one seen wins a tie.
pub fn aggregate_absences(
    rows: &[AbsenceRow],
    categories: &LeaveCategoryTable,
    log: &mut RunLog,
) -> HashMap<EmployeeId, AbsenceSummary> {
    let mut summaries: HashMap<EmployeeId, AbsenceSummary> = HashMap::new();

    for row in rows {
        let Some(employee_id) = &row.employee_id else {
            log.warn_line(LogSource::Absences, row.line, "absence row has no employee id; ignored");
            continue;
        };

        let summary = summaries.entry(employee_id.clone()).or_default();
        summary.occurrences += 1;

        if let Some(raw) = row.falta.as_deref().and_then(non_empty) {
            match parse_falta(raw) {
                Some(marked) => summary.has_unexcused_absence |= marked,
                None => {
                    log.warn_line(
                        LogSource::Absences,
                        row.line,
                        format!("unrecognised Falta value '{}'; treated as an absence", raw),
                    );
                    summary.has_unexcused_absence = true;
                }
            }
        }

        match row.leave_type.as_deref().and_then(non_empty) {
            Some(leave_type) => merge_leave_type(summary, leave_type, categories, employee_id),
            None => {
                let has_duration = is_duration_marker(row.full_absence.as_deref())
                    || is_duration_marker(row.partial_absence.as_deref());
                summary.has_partial_or_full_leave_marker |= has_duration;
            }
        }
    }

    summaries
}

fn merge_leave_type(
    summary: &mut AbsenceSummary,
    leave_type: &str,
    categories: &LeaveCategoryTable,
    employee_id: &EmployeeId,
) {
    match summary.leave_type.as_deref() {
        None => summary.leave_type = Some(leave_type.to_string()),
        Some(current) if normalize_key(current) == normalize_key(leave_type) => {}
        Some(current) => {
            if severity(leave_type, categories) > severity(current, categories) {
                debug!(
                    "Employee {}: leave type '{}' supersedes '{}'",
                    employee_id, leave_type, current
                );
                summary.leave_type = Some(leave_type.to_string());
            } else {
                debug!(
                    "Employee {}: keeping leave type '{}' over '{}'",
                    employee_id, current, leave_type
                );
            }
        }
    }
}

fn severity(leave_type: &str, categories: &LeaveCategoryTable) -> u8 {
    match categories.lookup(leave_type) {
        Some(Disposition::BlocksBonus) => 3,
        None => 2,
        Some(Disposition::RequiresDecision) => 1,
        Some(Disposition::GrantsBonus) => 0,
    }
}

/// A filled duration cell, unless it says `não`, `0` or similar.
fn is_duration_marker(cell: Option<&str>) -> bool {
    match cell.and_then(non_empty) {
        Some(raw) => parse_falta(raw) != Some(false),
        None => false,
    }
}

/// `x`, `sim` or a positive count mark an absence; `0` or `não` do not.
/// `None` for anything else.
fn parse_falta(raw: &str) -> Option<bool> {
    match normalize_key(raw).as_str() {
        "x" | "sim" | "s" | "yes" | "true" => return Some(true),
        "nao" | "n" | "no" | "false" => return Some(false),
        _ => {}
    }
    parse_decimal(raw).map(|count| count > rust_decimal::Decimal::ZERO)
}

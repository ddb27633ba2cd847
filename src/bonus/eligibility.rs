use tracing::debug;

use crate::{
    bonus::types::{BonusStatus, ClassificationResult},
    config::BonusConfig,
    records::{AbsenceSummary, EmployeeRecord},
    storage::{Disposition, LeaveCategoryTable},
};

/// Classify one employee for the bonus period.
///
/// Rules are checked in order and the first match wins:
/// 1. Excluded role
/// 2. Salary at or above the limit
/// 3. Unexcused absence (beats any leave type recorded alongside it)
/// 4. Leave type: blocking, needing a decision, or unknown stop here;
///    granting falls through to the hours rule
/// 5. Absence-duration marker with no leave type
/// 6. Contracted hours decide the amount, or need evaluation
pub fn classify(
    employee: &EmployeeRecord,
    absence: &AbsenceSummary,
    leave_categories: &LeaveCategoryTable,
    config: &BonusConfig,
) -> ClassificationResult {
    if config.is_excluded_role(&employee.role) {
        return ClassificationResult::withheld(
            BonusStatus::DoNotPayRole,
            format!("Role '{}' is excluded from the bonus", employee.role.trim()),
        );
    }

    if employee.monthly_salary >= config.salary_limit {
        return ClassificationResult::withheld(
            BonusStatus::DoNotPaySalary,
            format!(
                "Salary {} is at or above the limit of {}",
                employee.monthly_salary, config.salary_limit
            ),
        );
    }

    if absence.has_unexcused_absence {
        return ClassificationResult::withheld(
            BonusStatus::DoNotPayAbsence,
            "Unexcused absence in the period",
        );
    }

    let mut granted_leave = None;
    if let Some(leave_type) = absence.leave_type.as_deref() {
        match leave_categories.lookup(leave_type) {
            Some(Disposition::BlocksBonus) => {
                return ClassificationResult::withheld(
                    BonusStatus::DoNotPayLeave,
                    format!("Leave type '{}' blocks the bonus", leave_type),
                );
            }
            Some(Disposition::RequiresDecision) => {
                return ClassificationResult::withheld(
                    BonusStatus::EvaluateLeave,
                    format!("Leave type '{}' requires a manual decision", leave_type),
                );
            }
            Some(Disposition::GrantsBonus) => granted_leave = Some(leave_type),
            None => {
                return ClassificationResult::withheld(
                    BonusStatus::EvaluateUnclassified,
                    format!(
                        "Leave type '{}' is not in the category table; classify it and rerun",
                        leave_type
                    ),
                );
            }
        }
    } else if absence.has_partial_or_full_leave_marker {
        return ClassificationResult::withheld(
            BonusStatus::EvaluateLeave,
            "Absence recorded without a leave type; needs review",
        );
    }

    let hours = employee.monthly_hours_contracted;
    match config.amount_for_hours(hours) {
        Some(amount) => match granted_leave {
            Some(leave_type) => ClassificationResult::pay(
                BonusStatus::PayGrantedLeave,
                amount,
                format!("{} contracted hours; leave type '{}' keeps the bonus", hours, leave_type),
            ),
            None => ClassificationResult::pay(
                BonusStatus::Pay,
                amount,
                format!("{} contracted hours, no disqualifying occurrences", hours),
            ),
        },
        None => ClassificationResult::withheld(
            BonusStatus::EvaluateHours,
            format!("Contracted hours {} are outside the expected set", hours),
        ),
    }
}

/// Holds the rules and category table for a run and classifies records
/// against them.
pub struct EligibilityChecker {
    config: BonusConfig,
    categories: LeaveCategoryTable,
}

impl EligibilityChecker {
    pub fn new(config: BonusConfig, categories: LeaveCategoryTable) -> Self {
        Self { config, categories }
    }

    pub fn classify(&self, employee: &EmployeeRecord, absence: &AbsenceSummary) -> ClassificationResult {
        let result = classify(employee, absence, &self.categories, &self.config);
        debug!(
            "Employee {} classified as {:?} ({}): {}",
            employee.employee_id, result.status, result.amount, result.reason
        );
        result
    }
}

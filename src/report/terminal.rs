use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::{
    bonus::{BatchSummary, BonusStatus, ClassifiedEmployee, Outcome},
    error::Result,
    run_log::{LogEntry, RunLog},
    storage::{Disposition, LeaveCategoryTable},
    utils::{self, format_brl},
};

const RESULT_WIDTHS: &[usize] = &[10, 28, 6, 14, 30, 12];
const REASON_WIDTH: usize = 60;

fn colored_status(status: BonusStatus) -> ColoredString {
    let label = utils::pad_display(status.label(), RESULT_WIDTHS[4]);
    match status.outcome() {
        Outcome::Pay => label.green(),
        Outcome::DoNotPay => label.red(),
        Outcome::Evaluate => label.yellow(),
    }
}

fn print_result_row(classified: &ClassifiedEmployee, verbose: bool) {
    let employee = &classified.employee;
    let cells = [
        employee.employee_id.to_string(),
        employee.name.clone(),
        employee.monthly_hours_contracted.to_string(),
        format_brl(employee.monthly_salary),
    ];

    let mut row = String::new();
    for (cell, width) in cells.iter().zip(RESULT_WIDTHS) {
        let cell = utils::truncate_display(cell, *width);
        row.push_str(&utils::pad_display(&cell, *width));
        row.push_str("  ");
    }

    // Colour codes break width math, so the status cell is padded first.
    print!("{}{}  {}", row, colored_status(classified.result.status), format_brl(classified.result.amount));
    if verbose {
        print!("  {}", utils::truncate_display(&classified.result.reason, REASON_WIDTH).dimmed());
    }
    println!();
}

/// Print one row per classified employee.
pub fn print_results_table(results: &[ClassifiedEmployee], verbose: bool) {
    if results.is_empty() {
        println!("{}", "No employees classified".yellow());
        return;
    }

    let total: usize = RESULT_WIDTHS.iter().sum::<usize>() + 2 * RESULT_WIDTHS.len();
    let total = if verbose { total + REASON_WIDTH + 2 } else { total };
    let mut headers = vec!["Matrícula", "Nome", "Horas", "Salário", "Status", "Valor"];
    let mut widths = RESULT_WIDTHS.to_vec();
    if verbose {
        headers.push("Motivo");
        widths.push(REASON_WIDTH);
    }

    utils::print_table_border(total);
    utils::print_table_row(&headers, &widths);
    utils::print_table_border(total);
    for classified in results {
        print_result_row(classified, verbose);
    }
    utils::print_table_border(total);
}

/// Print the employees still waiting on an operator decision.
pub fn print_pending_review(summary: &BatchSummary) {
    let pending: Vec<&ClassifiedEmployee> = summary.pending_review().collect();
    if pending.is_empty() {
        return;
    }

    println!("\n{}", format!("Awaiting evaluation ({}):", pending.len()).yellow().bold());
    for classified in pending {
        println!(
            "  {} {} - {}",
            classified.employee.employee_id.to_string().yellow(),
            classified.employee.name,
            classified.result.reason
        );
    }
}

pub fn print_run_log(log: &RunLog) {
    if log.is_empty() {
        return;
    }

    println!("\n{}", format!("Data warnings ({}):", log.len()).yellow().bold());
    for entry in log.entries() {
        println!("  {}", entry.to_string().yellow());
    }
}

pub fn print_categories(table: &LeaveCategoryTable) {
    if table.is_empty() {
        println!("{}", "No leave categories configured".yellow());
        return;
    }

    let widths = [40, 20];
    utils::print_table_border(62);
    utils::print_table_row(&["Leave type", "Disposition"], &widths);
    utils::print_table_border(62);
    for category in table.categories() {
        let disposition = utils::pad_display(category.disposition.as_str(), widths[1]);
        let disposition = match category.disposition {
            Disposition::GrantsBonus => disposition.green(),
            Disposition::RequiresDecision => disposition.yellow(),
            Disposition::BlocksBonus => disposition.red(),
        };
        let name = utils::truncate_display(&category.name, widths[0]);
        println!("{}  {}", utils::pad_display(&name, widths[0]), disposition);
    }
    utils::print_table_border(62);
    println!("{} categories", table.len());
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a BatchSummary,
    warnings: &'a [LogEntry],
}

/// The whole run as pretty JSON: counts, per-employee results and warnings.
pub fn render_json(summary: &BatchSummary, log: &RunLog) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport {
        summary,
        warnings: log.entries(),
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::ClassificationResult;
    use crate::records::{AbsenceSummary, EmployeeId, EmployeeRecord};
    use crate::run_log::LogSource;
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_json() {
        let mut summary = BatchSummary {
            total_records: 1,
            results: vec![ClassifiedEmployee {
                employee: EmployeeRecord {
                    employee_id: EmployeeId::parse("0042").unwrap(),
                    name: "Ana".to_string(),
                    role: "Caixa".to_string(),
                    monthly_salary: dec!(1800),
                    monthly_hours_contracted: 220,
                    admission_date: None,
                    cost_center: None,
                },
                absence: AbsenceSummary::default(),
                result: ClassificationResult::pay(BonusStatus::Pay, dec!(300), "Full-time hours"),
            }],
            ..BatchSummary::default()
        };
        summary.recount();
        let mut log = RunLog::new();
        log.warn_line(LogSource::Roster, 4, "salary is blank");

        let json = render_json(&summary, &log).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["results"][0]["employee"]["employee_id"], "42");
        assert_eq!(value["summary"]["results"][0]["result"]["status"], "PAY");
        assert_eq!(value["summary"]["total_records"], 1);
        assert_eq!(value["warnings"][0]["source"], "roster");
        assert_eq!(value["warnings"][0]["line"], 4);
    }
}

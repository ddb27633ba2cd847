//! Operator decisions for results left in an evaluate state.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use tracing::info;

use crate::{
    bonus::{
        batch::ClassifiedEmployee,
        types::{BonusStatus, ClassificationResult},
    },
    config::BonusConfig,
    error::Result,
    records::{parse::parse_decimal, EmployeeId},
    run_log::{LogSource, RunLog},
    text::normalize_key,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Pay,
    DoNotPay,
}

impl Decision {
    fn parse(raw: &str) -> Option<Self> {
        match normalize_key(raw).as_str() {
            "pay" | "pagar" | "paga" | "sim" => Some(Decision::Pay),
            "do not pay" | "dont pay" | "nao pagar" | "nao paga" | "nao" => Some(Decision::DoNotPay),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DecisionRow {
    #[serde(alias = "matricula", alias = "Matrícula")]
    employee_id: String,
    #[serde(alias = "decisao", alias = "Decisão")]
    decision: String,
    #[serde(default, alias = "valor", alias = "Valor")]
    amount: Option<String>,
    #[serde(default, alias = "observacao", alias = "Observação")]
    note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManualDecision {
    pub line: usize,
    pub employee_id: EmployeeId,
    pub decision: Decision,
    pub amount: Option<Decimal>,
    pub note: Option<String>,
}

/// Read a decisions file (`employee_id,decision[,amount][,note]`). Rows that
/// cannot be understood are logged and skipped.
pub fn load_decisions<R: Read>(mut reader: R, log: &mut RunLog) -> Result<Vec<ManualDecision>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let text = text.trim_start_matches('\u{feff}');

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(crate::records::loader::detect_delimiter(text))
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut decisions = Vec::new();
    for (idx, result) in csv_reader.deserialize().enumerate() {
        let line = idx + 2;
        let row: DecisionRow = match result {
            Ok(row) => row,
            Err(e) => {
                log.warn_line(LogSource::Decisions, line, format!("unreadable row: {}", e));
                continue;
            }
        };

        let Some(employee_id) = EmployeeId::parse(&row.employee_id) else {
            log.warn_line(LogSource::Decisions, line, "decision has no employee id");
            continue;
        };
        let Some(decision) = Decision::parse(&row.decision) else {
            log.warn_line(
                LogSource::Decisions,
                line,
                format!("unknown decision '{}' (expected pagar or nao pagar)", row.decision),
            );
            continue;
        };
        let amount = match row.amount.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => match parse_decimal(raw) {
                Some(amount) => Some(amount),
                None => {
                    log.warn_line(LogSource::Decisions, line, format!("amount '{}' is not a number", raw));
                    continue;
                }
            },
            None => None,
        };

        decisions.push(ManualDecision {
            line,
            employee_id,
            decision,
            amount,
            note: row.note.filter(|n| !n.trim().is_empty()),
        });
    }

    Ok(decisions)
}

pub fn load_decisions_file(path: &str, log: &mut RunLog) -> Result<Vec<ManualDecision>> {
    let file = std::fs::File::open(path)?;
    load_decisions(file, log)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub applied: usize,
    pub rejected: usize,
}

/// Apply operator decisions to results awaiting evaluation.
///
/// A pay decision uses its explicit amount, which must be one of the
/// configured bonus amounts, or else the amount for the employee's contracted
/// hours. Decisions for results not awaiting evaluation are rejected.
pub fn apply_decisions(
    results: &mut [ClassifiedEmployee],
    decisions: &[ManualDecision],
    config: &BonusConfig,
    log: &mut RunLog,
) -> ReviewOutcome {
    let index: HashMap<EmployeeId, usize> = results
        .iter()
        .enumerate()
        .map(|(idx, c)| (c.employee.employee_id.clone(), idx))
        .collect();

    let mut outcome = ReviewOutcome::default();

    for decision in decisions {
        let Some(&idx) = index.get(&decision.employee_id) else {
            log.warn_line(
                LogSource::Decisions,
                decision.line,
                format!("employee {} was not classified in this run", decision.employee_id),
            );
            outcome.rejected += 1;
            continue;
        };

        let classified = &mut results[idx];
        let previous = classified.result.status;
        if !previous.needs_review() {
            log.warn_line(
                LogSource::Decisions,
                decision.line,
                format!(
                    "employee {} is '{}', not awaiting evaluation; decision ignored",
                    decision.employee_id,
                    previous.label()
                ),
            );
            outcome.rejected += 1;
            continue;
        }

        let note = decision
            .note
            .as_deref()
            .map(|n| format!(": {}", n))
            .unwrap_or_default();

        let result = match decision.decision {
            Decision::DoNotPay => ClassificationResult::withheld(
                BonusStatus::DoNotPayManual,
                format!("Manual decision not to pay (was {}){}", previous.label(), note),
            ),
            Decision::Pay => {
                let amount = match decision.amount {
                    Some(amount) if amount > Decimal::ZERO && config.is_valid_amount(amount) => Some(amount),
                    Some(amount) => {
                        log.warn_line(
                            LogSource::Decisions,
                            decision.line,
                            format!(
                                "amount {} is not one of the bonus amounts ({} or {})",
                                amount, config.part_time_amount, config.full_time_amount
                            ),
                        );
                        None
                    }
                    None => config.amount_for_hours(classified.employee.monthly_hours_contracted),
                };

                let Some(amount) = amount else {
                    if decision.amount.is_none() {
                        log.warn_line(
                            LogSource::Decisions,
                            decision.line,
                            format!(
                                "employee {} has {} contracted hours; a pay decision needs an explicit amount",
                                decision.employee_id, classified.employee.monthly_hours_contracted
                            ),
                        );
                    }
                    outcome.rejected += 1;
                    continue;
                };

                ClassificationResult::pay(
                    BonusStatus::PayManual,
                    amount,
                    format!("Manual decision to pay (was {}){}", previous.label(), note),
                )
            }
        };

        classified.result = result;
        outcome.applied += 1;
    }

    info!(
        "Applied {} manual decisions ({} rejected)",
        outcome.applied, outcome.rejected
    );
    outcome
}

//! CSV exports of a classification run.

use rust_decimal::Decimal;
use std::io::{Read, Write};
use tracing::info;

use crate::{
    bonus::{ClassifiedEmployee, Outcome},
    error::{BonusError, Result},
    records::loader::detect_delimiter,
    storage::LeaveCategoryTable,
    text::{non_empty, normalize_key},
};

const RESULT_HEADERS: &[&str] = &[
    "Matrícula",
    "Nome",
    "Cargo",
    "Centro de Custo",
    "Salário",
    "Horas",
    "Status Prêmio",
    "Valor Prêmio",
    "Motivo",
];

const PAYABLE_HEADERS: &[&str] = &["Matrícula", "Nome", "Centro de Custo", "Valor Prêmio"];

/// Spreadsheet apps need the BOM to read the accents correctly.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// A column an export template can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportField {
    EmployeeId,
    Name,
    Role,
    CostCenter,
    Salary,
    Hours,
    AdmissionDate,
    Status,
    Amount,
    Reason,
}

impl ReportField {
    /// Resolve a template header to a field. Unknown headers stay empty.
    pub fn from_header(header: &str) -> Option<Self> {
        let field = match normalize_key(header).as_str() {
            "matricula" | "codigo funcionario" | "cod funcionario" | "cadastro" | "employee id" | "id" => {
                ReportField::EmployeeId
            }
            "nome" | "nome funcionario" | "colaborador" | "name" => ReportField::Name,
            "cargo" | "funcao" | "role" => ReportField::Role,
            "centro de custo" | "centro de custo nome" | "nome local funcionario" | "local" | "cost center" => {
                ReportField::CostCenter
            }
            "salario" | "salario mes atual" | "monthly salary" => ReportField::Salary,
            "horas" | "qtd horas mensais" | "horas mensais" | "monthly hours" => ReportField::Hours,
            "data admissao" | "admissao" | "admission date" => ReportField::AdmissionDate,
            "status" | "status premio" => ReportField::Status,
            "valor" | "valor premio" | "somadevalor" | "soma de valor" | "amount" => ReportField::Amount,
            "motivo" | "observacao" | "reason" => ReportField::Reason,
            _ => return None,
        };
        Some(field)
    }

    pub fn value(&self, classified: &ClassifiedEmployee) -> String {
        let employee = &classified.employee;
        match self {
            ReportField::EmployeeId => employee.employee_id.to_string(),
            ReportField::Name => employee.name.clone(),
            ReportField::Role => employee.role.clone(),
            ReportField::CostCenter => employee.cost_center.clone().unwrap_or_default(),
            ReportField::Salary => money(employee.monthly_salary),
            ReportField::Hours => employee.monthly_hours_contracted.to_string(),
            ReportField::AdmissionDate => employee
                .admission_date
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_default(),
            ReportField::Status => classified.result.status.label().to_string(),
            ReportField::Amount => money(classified.result.amount),
            ReportField::Reason => classified.result.reason.clone(),
        }
    }
}

fn is_payable(classified: &ClassifiedEmployee) -> bool {
    classified.result.outcome() == Outcome::Pay && classified.result.amount > Decimal::ZERO
}

/// Every classified employee with status, amount and reason.
pub fn write_results_csv<W: Write>(results: &[ClassifiedEmployee], mut writer: W) -> Result<()> {
    writer.write_all(UTF8_BOM)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(RESULT_HEADERS)?;

    for classified in results {
        let employee = &classified.employee;
        csv_writer.write_record([
            employee.employee_id.to_string(),
            employee.name.clone(),
            employee.role.clone(),
            employee.cost_center.clone().unwrap_or_default(),
            money(employee.monthly_salary),
            employee.monthly_hours_contracted.to_string(),
            classified.result.status.label().to_string(),
            money(classified.result.amount),
            classified.result.reason.clone(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Only employees who receive the bonus, in the payroll upload layout.
/// Returns the number of rows written.
pub fn write_payables_csv<W: Write>(results: &[ClassifiedEmployee], mut writer: W) -> Result<usize> {
    writer.write_all(UTF8_BOM)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(PAYABLE_HEADERS)?;

    let mut written = 0;
    for classified in results.iter().filter(|c| is_payable(c)) {
        let employee = &classified.employee;
        csv_writer.write_record([
            employee.employee_id.to_string(),
            employee.name.clone(),
            employee.cost_center.clone().unwrap_or_default(),
            money(classified.result.amount),
        ])?;
        written += 1;
    }

    csv_writer.flush()?;
    info!("Wrote {} payable rows", written);
    Ok(written)
}

/// Header row of an export template, in template order.
pub fn read_template_headers<R: Read>(mut reader: R) -> Result<Vec<String>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let text = text.trim_start_matches('\u{feff}');

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(detect_delimiter(text))
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    for result in csv_reader.records() {
        let record = result?;
        if record.iter().any(|cell| non_empty(cell).is_some()) {
            return Ok(record.iter().map(|cell| cell.to_string()).collect());
        }
    }

    Err(BonusError::HeaderNotFound {
        file: "template".to_string(),
        anchor: "any column".to_string(),
    })
}

/// Payable employees laid out in the template's columns. Headers that match
/// no known field are written empty for the operator to fill in.
pub fn write_template_csv<W: Write>(
    results: &[ClassifiedEmployee],
    headers: &[String],
    mut writer: W,
) -> Result<usize> {
    let fields: Vec<Option<ReportField>> = headers.iter().map(|h| ReportField::from_header(h)).collect();
    for (header, field) in headers.iter().zip(&fields) {
        if field.is_none() {
            info!("Template column '{}' has no matching field; left empty", header);
        }
    }

    writer.write_all(UTF8_BOM)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(headers)?;

    let mut written = 0;
    for classified in results.iter().filter(|c| is_payable(c)) {
        let row: Vec<String> = fields
            .iter()
            .map(|field| field.map(|f| f.value(classified)).unwrap_or_default())
            .collect();
        csv_writer.write_record(&row)?;
        written += 1;
    }

    csv_writer.flush()?;
    Ok(written)
}

/// The category table in the layout `categories import` reads back.
pub fn write_categories_csv<W: Write>(table: &LeaveCategoryTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["name", "disposition"])?;
    for category in table.categories() {
        csv_writer.write_record([category.name.as_str(), category.disposition.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

//! Roster and absence-log CSV loading.
//!
//! Exports from the HR system arrive with banner rows above the header,
//! accented and inconsistently named columns, and `;` or `,` delimiters.
//! Everything is mapped once here into typed records so the classifier never
//! sees raw column names.

use csv::StringRecord;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use tracing::{debug, info};

use crate::{
    error::{BonusError, Result},
    records::{
        models::{AbsenceRow, EmployeeId, EmployeeRecord},
        parse::{parse_date, parse_decimal, parse_hours},
    },
    run_log::{LogSource, RunLog},
    storage::LeaveCategoryRow,
    text::{non_empty, normalize_key},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    EmployeeId,
    Name,
    Role,
    Salary,
    Hours,
    Admission,
    CostCenter,
    Falta,
    LeaveType,
    FullAbsence,
    PartialAbsence,
}

struct ColumnSpec {
    field: Field,
    label: &'static str,
    /// Already in `normalize_key` form.
    aliases: &'static [&'static str],
    required: bool,
}

const EMPLOYEE_ID_ALIASES: &[&str] = &[
    "matricula",
    "codigo funcionario",
    "cod funcionario",
    "codigo do funcionario",
    "cadastro",
    "id funcionario",
    "employee id",
    "id",
];

const SALARY_ALIASES: &[&str] = &[
    "salario mes atual",
    "salario",
    "salario base",
    "salario mensal",
    "monthly salary",
];

const ROSTER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { field: Field::EmployeeId, label: "Matrícula", aliases: EMPLOYEE_ID_ALIASES, required: true },
    ColumnSpec {
        field: Field::Name,
        label: "Nome",
        aliases: &["nome funcionario", "nome", "nome do funcionario", "colaborador", "name"],
        required: false,
    },
    ColumnSpec {
        field: Field::Role,
        label: "Cargo",
        aliases: &["cargo", "funcao", "descricao cargo", "nome cargo", "role"],
        required: false,
    },
    ColumnSpec { field: Field::Salary, label: "Salário", aliases: SALARY_ALIASES, required: true },
    ColumnSpec {
        field: Field::Hours,
        label: "Horas",
        aliases: &[
            "qtd horas mensais",
            "horas mensais",
            "horas",
            "carga horaria",
            "monthly hours",
            "monthly hours contracted",
        ],
        required: true,
    },
    ColumnSpec {
        field: Field::Admission,
        label: "Data Admissão",
        aliases: &["data admissao", "admissao", "dt admissao", "admission date"],
        required: false,
    },
    ColumnSpec {
        field: Field::CostCenter,
        label: "Centro de Custo",
        aliases: &[
            "nome local funcionario",
            "centro de custo nome",
            "centro de custo",
            "local",
            "cost center",
        ],
        required: false,
    },
];

const ABSENCE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { field: Field::EmployeeId, label: "Matrícula", aliases: EMPLOYEE_ID_ALIASES, required: true },
    ColumnSpec { field: Field::Falta, label: "Falta", aliases: &["falta", "faltas"], required: false },
    ColumnSpec {
        field: Field::LeaveType,
        label: "Tipo Ausência",
        aliases: &[
            "tipo ausencia",
            "tipo de ausencia",
            "tipo afastamento",
            "motivo",
            "ocorrencia",
            "leave type",
        ],
        required: false,
    },
    ColumnSpec {
        field: Field::FullAbsence,
        label: "Ausência Integral",
        aliases: &["ausencia integral"],
        required: false,
    },
    ColumnSpec {
        field: Field::PartialAbsence,
        label: "Ausência Parcial",
        aliases: &["ausencia parcial"],
        required: false,
    },
];

/// Parsed roster plus the rows that could not become records.
#[derive(Debug, Default)]
pub struct RosterLoad {
    pub records: Vec<EmployeeRecord>,
    pub skipped_missing_id: usize,
    pub skipped_duplicate: usize,
}

impl RosterLoad {
    pub fn skipped(&self) -> usize {
        self.skipped_missing_id + self.skipped_duplicate
    }
}

/// Header cells and data rows of one delimited file.
struct Sheet {
    columns: HashMap<Field, usize>,
    rows: Vec<(usize, StringRecord)>,
}

impl Sheet {
    fn cell<'a>(&self, record: &'a StringRecord, field: Field) -> Option<&'a str> {
        self.columns
            .get(&field)
            .and_then(|&idx| record.get(idx))
            .and_then(non_empty)
    }

    fn has(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }
}

pub fn load_roster<R: Read>(reader: R, log: &mut RunLog) -> Result<RosterLoad> {
    let sheet = read_sheet(
        reader,
        "roster",
        ROSTER_COLUMNS,
        &[EMPLOYEE_ID_ALIASES, SALARY_ALIASES],
    )?;
    let mut load = RosterLoad::default();
    let mut seen = HashSet::new();

    for (line, record) in &sheet.rows {
        let line = *line;
        let Some(employee_id) = sheet.cell(record, Field::EmployeeId).and_then(EmployeeId::parse) else {
            log.warn_line(LogSource::Roster, line, "row has no employee id; excluded");
            load.skipped_missing_id += 1;
            continue;
        };

        if !seen.insert(employee_id.clone()) {
            log.warn_line(
                LogSource::Roster,
                line,
                format!("employee {} appears more than once; later row excluded", employee_id),
            );
            load.skipped_duplicate += 1;
            continue;
        }

        let monthly_salary = match sheet.cell(record, Field::Salary) {
            Some(raw) => parse_decimal(raw).unwrap_or_else(|| {
                log.warn_line(
                    LogSource::Roster,
                    line,
                    format!("salary '{}' is not a number; using 0", raw),
                );
                Decimal::ZERO
            }),
            None => {
                log.warn_line(LogSource::Roster, line, "salary is blank; using 0");
                Decimal::ZERO
            }
        };

        let monthly_hours_contracted = match sheet.cell(record, Field::Hours) {
            Some(raw) => parse_hours(raw).unwrap_or_else(|| {
                log.warn_line(
                    LogSource::Roster,
                    line,
                    format!("monthly hours '{}' is not a whole number; using 0", raw),
                );
                0
            }),
            None => {
                log.warn_line(LogSource::Roster, line, "monthly hours are blank; using 0");
                0
            }
        };

        let admission_date = sheet.cell(record, Field::Admission).and_then(|raw| {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                log.warn_line(
                    LogSource::Roster,
                    line,
                    format!("admission date '{}' is not a date; ignored", raw),
                );
            }
            parsed
        });

        load.records.push(EmployeeRecord {
            employee_id,
            name: sheet.cell(record, Field::Name).unwrap_or_default().to_string(),
            role: sheet.cell(record, Field::Role).unwrap_or_default().to_string(),
            monthly_salary,
            monthly_hours_contracted,
            admission_date,
            cost_center: sheet.cell(record, Field::CostCenter).map(str::to_string),
        });
    }

    info!(
        "Loaded {} roster records ({} skipped)",
        load.records.len(),
        load.skipped()
    );
    Ok(load)
}

pub fn load_roster_file(path: &str, log: &mut RunLog) -> Result<RosterLoad> {
    let file = std::fs::File::open(path)?;
    load_roster(file, log)
}

pub fn load_absences<R: Read>(reader: R) -> Result<Vec<AbsenceRow>> {
    let sheet = read_sheet(reader, "absences", ABSENCE_COLUMNS, &[EMPLOYEE_ID_ALIASES])?;

    if !sheet.has(Field::Falta) && !sheet.has(Field::LeaveType) {
        return Err(BonusError::MissingColumn {
            file: "absences".to_string(),
            column: "Falta or Tipo Ausência".to_string(),
        });
    }

    let rows: Vec<AbsenceRow> = sheet
        .rows
        .iter()
        .map(|(line, record)| AbsenceRow {
            line: *line,
            employee_id: sheet.cell(record, Field::EmployeeId).and_then(EmployeeId::parse),
            falta: sheet.cell(record, Field::Falta).map(str::to_string),
            leave_type: sheet.cell(record, Field::LeaveType).map(str::to_string),
            full_absence: sheet.cell(record, Field::FullAbsence).map(str::to_string),
            partial_absence: sheet.cell(record, Field::PartialAbsence).map(str::to_string),
        })
        .collect();

    info!("Loaded {} absence rows", rows.len());
    Ok(rows)
}

pub fn load_absences_file(path: &str) -> Result<Vec<AbsenceRow>> {
    let file = std::fs::File::open(path)?;
    load_absences(file)
}

/// Rows of a leave-category upload (`name,disposition`).
pub fn load_category_rows<R: Read>(reader: R) -> Result<Vec<LeaveCategoryRow>> {
    let text = read_text(reader)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(detect_delimiter(&text))
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (idx, result) in csv_reader.deserialize().enumerate() {
        let row: LeaveCategoryRow = result.map_err(|e| {
            BonusError::InvalidCategoryUpload(format!("line {}: {}", idx + 2, e))
        })?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn load_category_rows_file(path: &str) -> Result<Vec<LeaveCategoryRow>> {
    let file = std::fs::File::open(path)?;
    load_category_rows(file)
}

fn read_text<R: Read>(mut reader: R) -> Result<String> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// `;` when the first non-empty line has more semicolons than commas.
pub(crate) fn detect_delimiter(text: &str) -> u8 {
    let first = text.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
    let semicolons = first.matches(';').count();
    let commas = first.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

fn read_sheet<R: Read>(
    reader: R,
    file: &str,
    specs: &[ColumnSpec],
    anchors: &[&[&str]],
) -> Result<Sheet> {
    let text = read_text(reader)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(detect_delimiter(&text))
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for (idx, result) in csv_reader.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 1);

        if record.iter().all(|cell| non_empty(cell).is_none()) {
            continue;
        }

        match &header {
            None => {
                let normalized: Vec<String> = record.iter().map(normalize_key).collect();
                let is_header = anchors.iter().all(|aliases| {
                    normalized.iter().any(|cell| aliases.contains(&cell.as_str()))
                });
                if is_header {
                    debug!("{}: header found on line {}", file, line);
                    header = Some(normalized);
                }
            }
            Some(columns) => {
                let repeated = record
                    .iter()
                    .map(normalize_key)
                    .eq(columns.iter().cloned());
                if !repeated {
                    rows.push((line, record));
                }
            }
        }
    }

    let header = header.ok_or_else(|| BonusError::HeaderNotFound {
        file: file.to_string(),
        anchor: anchors
            .iter()
            .filter_map(|aliases| aliases.first().copied())
            .collect::<Vec<_>>()
            .join(" and "),
    })?;

    let columns = map_columns(file, &header, specs)?;
    Ok(Sheet { columns, rows })
}

fn map_columns(file: &str, header: &[String], specs: &[ColumnSpec]) -> Result<HashMap<Field, usize>> {
    let mut columns = HashMap::new();
    let mut claimed = HashSet::new();

    for spec in specs {
        let found = spec.aliases.iter().find_map(|alias| {
            header
                .iter()
                .enumerate()
                .find(|(idx, cell)| cell.as_str() == *alias && !claimed.contains(idx))
                .map(|(idx, _)| idx)
        });

        match found {
            Some(idx) => {
                claimed.insert(idx);
                columns.insert(spec.field, idx);
            }
            None if spec.required => {
                return Err(BonusError::MissingColumn {
                    file: file.to_string(),
                    column: spec.label.to_string(),
                });
            }
            None => debug!("{}: optional column '{}' not present", file, spec.label),
        }
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const ROSTER_CSV: &str = "\
Relatório de Funcionários;;;;;;
Competência 03/2024;;;;;;
Matrícula;Nome;Cargo;Salário Mês Atual;Qtd Horas Mensais;Data Admissão;Centro de Custo Nome
00101;Ana Lima;Auxiliar;2.000,00;220;01/02/2020;Loja Centro
102.0;Bruno Dias;Repositor;R$ 1.800,50;110,0;2023-05-10;
;Sem Matrícula;Auxiliar;1500;220;;
103;Carla Reis;Gerente;abc;x;ontem;Matriz
101;Ana Duplicada;Auxiliar;2000;220;;
";

    #[test]
    fn test_roster_skips_banner_and_maps_columns() {
        let mut log = RunLog::new();
        let load = load_roster(ROSTER_CSV.as_bytes(), &mut log).unwrap();

        assert_eq!(load.records.len(), 3);
        assert_eq!(load.skipped_missing_id, 1);
        assert_eq!(load.skipped_duplicate, 1);

        let ana = &load.records[0];
        assert_eq!(ana.employee_id.as_str(), "101");
        assert_eq!(ana.name, "Ana Lima");
        assert_eq!(ana.monthly_salary, dec!(2000.00));
        assert_eq!(ana.monthly_hours_contracted, 220);
        assert_eq!(ana.admission_date, NaiveDate::from_ymd_opt(2020, 2, 1));
        assert_eq!(ana.cost_center.as_deref(), Some("Loja Centro"));

        let bruno = &load.records[1];
        assert_eq!(bruno.employee_id.as_str(), "102");
        assert_eq!(bruno.monthly_salary, dec!(1800.50));
        assert_eq!(bruno.monthly_hours_contracted, 110);
        assert!(bruno.cost_center.is_none());
    }

    #[test]
    fn test_roster_malformed_values_become_sentinels_with_warnings() {
        let mut log = RunLog::new();
        let load = load_roster(ROSTER_CSV.as_bytes(), &mut log).unwrap();

        let carla = &load.records[2];
        assert_eq!(carla.monthly_salary, Decimal::ZERO);
        assert_eq!(carla.monthly_hours_contracted, 0);
        assert!(carla.admission_date.is_none());

        // missing id, duplicate, salary, hours, admission date
        assert_eq!(log.count_from(LogSource::Roster), 5);
    }

    #[test]
    fn test_roster_without_salary_header_fails() {
        let mut log = RunLog::new();
        let csv = "Matrícula,Nome,Horas\n1,Ana,220\n";
        let err = load_roster(csv.as_bytes(), &mut log).unwrap_err();
        assert!(matches!(err, BonusError::HeaderNotFound { .. }));
    }

    #[test]
    fn test_roster_banner_with_lone_salary_cell_is_not_the_header() {
        let mut log = RunLog::new();
        let csv = "\
Folha de Pagamento;Salário;;
Matrícula;Nome;Salário;Horas
1;Ana;3.000;220
2;Bia;R$ 1.500;110
";
        let load = load_roster(csv.as_bytes(), &mut log).unwrap();
        assert_eq!(load.records.len(), 2);
        assert_eq!(load.records[0].monthly_salary, dec!(3000));
        assert_eq!(load.records[1].monthly_salary, dec!(1500));
        assert!(log.is_empty());
    }

    #[test]
    fn test_roster_missing_required_column() {
        let mut log = RunLog::new();
        let csv = "Matrícula,Nome,Salário\n1,Ana,2000\n";
        let err = load_roster(csv.as_bytes(), &mut log).unwrap_err();
        match err {
            BonusError::MissingColumn { column, .. } => assert_eq!(column, "Horas"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_absences_load_with_comma_delimiter() {
        let csv = "\
\u{feff}Código Funcionário,Falta,Tipo Ausência,Ausência Integral
101,x,,
102.0,,Atraso,
103,,,Sim
";
        let rows = load_absences(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].falta.as_deref(), Some("x"));
        assert_eq!(rows[1].employee_id.as_ref().map(|id| id.as_str()), Some("102"));
        assert_eq!(rows[1].leave_type.as_deref(), Some("Atraso"));
        assert!(rows[1].falta.is_none());
        assert_eq!(rows[2].full_absence.as_deref(), Some("Sim"));
        assert_eq!(rows[2].line, 4);
    }

    #[test]
    fn test_absences_need_a_marker_column() {
        let csv = "Matrícula;Observação\n101;algo\n";
        assert!(matches!(
            load_absences(csv.as_bytes()),
            Err(BonusError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_category_rows() {
        let csv = "name;disposition\nAtraso;avaliar\nSuspensão;nao paga\n";
        let rows = load_category_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "Suspensão");
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("\n\na;b;c\n"), b';');
        assert_eq!(detect_delimiter("a,b,c"), b',');
        assert_eq!(detect_delimiter("a;b,c;d"), b';');
    }
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical employee identifier ("matrícula").
///
/// Spreadsheets hand the same id back as `123`, `"123"`, `123.0` or
/// `"00123"`; all of them normalize to `"123"` so roster and absence rows
/// join on one form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let numeric = strip_float_zero(trimmed);
        if !numeric.is_empty() && numeric.bytes().all(|b| b.is_ascii_digit()) {
            let stripped = numeric.trim_start_matches('0');
            let canonical = if stripped.is_empty() { "0" } else { stripped };
            return Some(Self(canonical.to_string()));
        }

        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `"123.0"` / `"123,00"` → `"123"`; anything else unchanged.
fn strip_float_zero(value: &str) -> &str {
    if let Some(pos) = value.find(|c| c == '.' || c == ',') {
        let (int_part, frac) = value.split_at(pos);
        if frac[1..].bytes().all(|b| b == b'0') {
            return int_part;
        }
    }
    value
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One roster row after schema mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeRecord {
    pub employee_id: EmployeeId,
    pub name: String,
    pub role: String,
    pub monthly_salary: Decimal,
    pub monthly_hours_contracted: u32,
    pub admission_date: Option<NaiveDate>,
    pub cost_center: Option<String>,
}

/// One absence-log row after schema mapping, before aggregation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AbsenceRow {
    pub line: usize,
    pub employee_id: Option<EmployeeId>,
    /// Raw "Falta" cell: a count, an `x` marker or blank.
    pub falta: Option<String>,
    pub leave_type: Option<String>,
    pub full_absence: Option<String>,
    pub partial_absence: Option<String>,
}

/// Aggregated absence picture for one employee in the period.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AbsenceSummary {
    pub has_unexcused_absence: bool,
    pub leave_type: Option<String>,
    pub has_partial_or_full_leave_marker: bool,
    pub occurrences: usize,
}

impl AbsenceSummary {
    pub fn none() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_id_canonical_forms() {
        let expected = EmployeeId::parse("123").unwrap();
        assert_eq!(EmployeeId::parse(" 123 ").unwrap(), expected);
        assert_eq!(EmployeeId::parse("123.0").unwrap(), expected);
        assert_eq!(EmployeeId::parse("123,00").unwrap(), expected);
        assert_eq!(EmployeeId::parse("00123").unwrap(), expected);
        assert_eq!(EmployeeId::parse("0").unwrap().as_str(), "0");
        assert_eq!(EmployeeId::parse("000").unwrap().as_str(), "0");
    }

    #[test]
    fn test_employee_id_keeps_non_numeric_values() {
        assert_eq!(EmployeeId::parse("A-0012").unwrap().as_str(), "A-0012");
        assert_eq!(EmployeeId::parse("123.5").unwrap().as_str(), "123.5");
        assert!(EmployeeId::parse("   ").is_none());
    }
}

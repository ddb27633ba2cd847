use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{BonusError, Result};
use crate::text::normalize_key;

/// Effect a leave type has on bonus eligibility.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    GrantsBonus,
    RequiresDecision,
    BlocksBonus,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::GrantsBonus => "grants_bonus",
            Disposition::RequiresDecision => "requires_decision",
            Disposition::BlocksBonus => "blocks_bonus",
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Disposition {
    type Err = BonusError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "grants bonus" | "grants" | "grant" | "paga" | "pagar" | "abona" => {
                Ok(Disposition::GrantsBonus)
            }
            "requires decision" | "decision" | "evaluate" | "avaliar" | "decidir" => {
                Ok(Disposition::RequiresDecision)
            }
            "blocks bonus" | "blocks" | "block" | "nao paga" | "nao pagar" | "bloqueia" => {
                Ok(Disposition::BlocksBonus)
            }
            _ => Err(BonusError::UnknownDisposition(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaveCategory {
    /// Display name as the operator typed it.
    pub name: String,
    pub disposition: Disposition,
}

/// One row of a category upload, before validation.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LeaveCategoryRow {
    #[serde(alias = "tipo", alias = "Tipo", alias = "leave_type", alias = "Tipo Ausência")]
    pub name: String,
    #[serde(alias = "categoria", alias = "Categoria", alias = "Disposição")]
    pub disposition: String,
}

/// Leave type → disposition, keyed by the folded name so lookups ignore
/// accents, case and spacing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeaveCategoryTable {
    entries: BTreeMap<String, LeaveCategory>,
}

const DEFAULT_CATEGORIES: &[(&str, Disposition)] = &[
    ("Licença Maternidade", Disposition::GrantsBonus),
    ("Licença Paternidade", Disposition::GrantsBonus),
    ("Licença Nojo", Disposition::GrantsBonus),
    ("Licença Casamento", Disposition::GrantsBonus),
    ("Abono", Disposition::GrantsBonus),
    ("Férias", Disposition::GrantsBonus),
    ("Atestado Médico", Disposition::RequiresDecision),
    ("Atraso", Disposition::RequiresDecision),
    ("Declaração de Horas", Disposition::RequiresDecision),
    ("Suspensão", Disposition::BlocksBonus),
    ("Falta Injustificada", Disposition::BlocksBonus),
];

impl LeaveCategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed used when the store is first initialised.
    pub fn defaults() -> Self {
        let mut table = Self::new();
        for (name, disposition) in DEFAULT_CATEGORIES {
            table.insert(name, *disposition);
        }
        table
    }

    /// Validate an uploaded table. Blank names, unparseable dispositions and
    /// the same type listed twice with different dispositions are rejected.
    pub fn from_rows(rows: &[LeaveCategoryRow]) -> Result<Self> {
        let mut table = Self::new();
        for (idx, row) in rows.iter().enumerate() {
            let row_num = idx + 1;
            let name = row.name.trim();
            if name.is_empty() {
                return Err(BonusError::InvalidCategoryUpload(format!(
                    "row {} has an empty leave type",
                    row_num
                )));
            }
            let disposition: Disposition = row.disposition.parse().map_err(|e| {
                BonusError::InvalidCategoryUpload(format!("row {}: {}", row_num, e))
            })?;
            if let Some(existing) = table.lookup(name) {
                if existing != disposition {
                    return Err(BonusError::InvalidCategoryUpload(format!(
                        "row {}: '{}' is listed as both {} and {}",
                        row_num, name, existing, disposition
                    )));
                }
                continue;
            }
            table.insert(name, disposition);
        }
        Ok(table)
    }

    /// Insert or replace; returns the previous disposition.
    pub fn insert(&mut self, name: &str, disposition: Disposition) -> Option<Disposition> {
        let name = name.trim();
        self.entries
            .insert(
                normalize_key(name),
                LeaveCategory {
                    name: name.to_string(),
                    disposition,
                },
            )
            .map(|previous| previous.disposition)
    }

    pub fn remove(&mut self, name: &str) -> Option<LeaveCategory> {
        self.entries.remove(&normalize_key(name))
    }

    pub fn lookup(&self, leave_type: &str) -> Option<Disposition> {
        self.entries
            .get(&normalize_key(leave_type))
            .map(|category| category.disposition)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LeaveCategory)> {
        self.entries.iter().map(|(key, category)| (key.as_str(), category))
    }

    pub fn categories(&self) -> impl Iterator<Item = &LeaveCategory> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, disposition: &str) -> LeaveCategoryRow {
        LeaveCategoryRow {
            name: name.to_string(),
            disposition: disposition.to_string(),
        }
    }

    #[test]
    fn test_disposition_parsing_accepts_both_languages() {
        assert_eq!("grants_bonus".parse::<Disposition>().unwrap(), Disposition::GrantsBonus);
        assert_eq!("Não Paga".parse::<Disposition>().unwrap(), Disposition::BlocksBonus);
        assert_eq!("AVALIAR".parse::<Disposition>().unwrap(), Disposition::RequiresDecision);
        assert!("maybe".parse::<Disposition>().is_err());
    }

    #[test]
    fn test_lookup_ignores_accents_and_case() {
        let table = LeaveCategoryTable::defaults();
        assert_eq!(table.lookup("atestado medico"), Some(Disposition::RequiresDecision));
        assert_eq!(table.lookup("  LICENÇA   NOJO "), Some(Disposition::GrantsBonus));
        assert_eq!(table.lookup("Atraso"), Some(Disposition::RequiresDecision));
        assert_eq!(table.lookup("Licença Prêmio"), None);
    }

    #[test]
    fn test_insert_replaces_and_reports_previous() {
        let mut table = LeaveCategoryTable::defaults();
        let before = table.len();
        assert_eq!(
            table.insert("ATRASO", Disposition::BlocksBonus),
            Some(Disposition::RequiresDecision)
        );
        assert_eq!(table.len(), before);
        assert_eq!(table.lookup("atraso"), Some(Disposition::BlocksBonus));
        assert_eq!(table.insert("Home Office", Disposition::GrantsBonus), None);
        assert_eq!(table.len(), before + 1);
    }

    #[test]
    fn test_from_rows_validates() {
        let table = LeaveCategoryTable::from_rows(&[
            row("Atraso", "avaliar"),
            row("atraso", "requires_decision"),
            row("Suspensão", "blocks_bonus"),
        ])
        .unwrap();
        assert_eq!(table.len(), 2);

        assert!(LeaveCategoryTable::from_rows(&[row("  ", "paga")]).is_err());
        assert!(LeaveCategoryTable::from_rows(&[row("Atraso", "sometimes")]).is_err());
        assert!(LeaveCategoryTable::from_rows(&[
            row("Atraso", "paga"),
            row("ATRASO", "nao paga"),
        ])
        .is_err());
    }
}

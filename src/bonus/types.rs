use rust_decimal::Decimal;
use serde::Serialize;

/// Broad family of a status: paid, not paid, or waiting on a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pay,
    DoNotPay,
    Evaluate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BonusStatus {
    /// No occurrences in the period.
    Pay,
    /// Only leave types that keep the bonus.
    PayGrantedLeave,
    DoNotPayRole,
    DoNotPaySalary,
    DoNotPayAbsence,
    DoNotPayLeave,
    EvaluateLeave,
    EvaluateHours,
    EvaluateUnclassified,
    /// Set by an operator decision during review.
    PayManual,
    DoNotPayManual,
}

impl BonusStatus {
    pub const ALL: [BonusStatus; 11] = [
        BonusStatus::Pay,
        BonusStatus::PayGrantedLeave,
        BonusStatus::DoNotPayRole,
        BonusStatus::DoNotPaySalary,
        BonusStatus::DoNotPayAbsence,
        BonusStatus::DoNotPayLeave,
        BonusStatus::EvaluateLeave,
        BonusStatus::EvaluateHours,
        BonusStatus::EvaluateUnclassified,
        BonusStatus::PayManual,
        BonusStatus::DoNotPayManual,
    ];

    pub fn outcome(&self) -> Outcome {
        match self {
            BonusStatus::Pay | BonusStatus::PayGrantedLeave | BonusStatus::PayManual => Outcome::Pay,
            BonusStatus::DoNotPayRole
            | BonusStatus::DoNotPaySalary
            | BonusStatus::DoNotPayAbsence
            | BonusStatus::DoNotPayLeave
            | BonusStatus::DoNotPayManual => Outcome::DoNotPay,
            BonusStatus::EvaluateLeave
            | BonusStatus::EvaluateHours
            | BonusStatus::EvaluateUnclassified => Outcome::Evaluate,
        }
    }

    pub fn needs_review(&self) -> bool {
        self.outcome() == Outcome::Evaluate
    }

    /// Label used in the payroll team's reports.
    pub fn label(&self) -> &'static str {
        match self {
            BonusStatus::Pay => "PAGAR",
            BonusStatus::PayGrantedLeave => "PAGAR - AUSÊNCIA ABONADA",
            BonusStatus::DoNotPayRole => "NÃO PAGAR - CARGO EXCLUÍDO",
            BonusStatus::DoNotPaySalary => "NÃO PAGAR - SALÁRIO ALTO",
            BonusStatus::DoNotPayAbsence => "NÃO PAGAR - FALTA",
            BonusStatus::DoNotPayLeave => "NÃO PAGAR - AFASTAMENTO",
            BonusStatus::EvaluateLeave => "AVALIAR - AFASTAMENTO",
            BonusStatus::EvaluateHours => "AVALIAR - HORAS DIFERENTES",
            BonusStatus::EvaluateUnclassified => "AVALIAR - TIPO NÃO CLASSIFICADO",
            BonusStatus::PayManual => "PAGAR - DECISÃO MANUAL",
            BonusStatus::DoNotPayManual => "NÃO PAGAR - DECISÃO MANUAL",
        }
    }
}

impl std::fmt::Display for BonusStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub status: BonusStatus,
    pub amount: Decimal,
    pub reason: String,
}

impl ClassificationResult {
    pub fn pay(status: BonusStatus, amount: Decimal, reason: impl Into<String>) -> Self {
        Self {
            status,
            amount,
            reason: reason.into(),
        }
    }

    /// Zero-amount result for any non-paying status.
    pub fn withheld(status: BonusStatus, reason: impl Into<String>) -> Self {
        Self {
            status,
            amount: Decimal::ZERO,
            reason: reason.into(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.status.outcome()
    }
}

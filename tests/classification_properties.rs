use attendance_bonus::{
    bonus::{classify, BonusStatus, Outcome},
    config::BonusConfig,
    records::{AbsenceSummary, EmployeeId, EmployeeRecord},
    storage::LeaveCategoryTable,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const SALARIES: &[Decimal] = &[dec!(0), dec!(1500), dec!(2542.85), dec!(2542.86), dec!(2542.87), dec!(9000)];
const HOURS: &[u32] = &[0, 100, 110, 120, 150, 219, 220, 221];
const LEAVE_TYPES: &[Option<&str>] = &[
    None,
    Some("Férias"),
    Some("ferias"),
    Some("Atestado Médico"),
    Some("Suspensão"),
    Some("Licença Esquisita"),
];

fn employee(salary: Decimal, hours: u32, role: &str) -> EmployeeRecord {
    EmployeeRecord {
        employee_id: EmployeeId::parse("1").unwrap(),
        name: "Teste".to_string(),
        role: role.to_string(),
        monthly_salary: salary,
        monthly_hours_contracted: hours,
        admission_date: None,
        cost_center: None,
    }
}

/// Every combination of absence flags and leave types.
fn absences() -> Vec<AbsenceSummary> {
    let mut out = Vec::new();
    for &unexcused in &[false, true] {
        for &marker in &[false, true] {
            for leave_type in LEAVE_TYPES {
                out.push(AbsenceSummary {
                    has_unexcused_absence: unexcused,
                    leave_type: leave_type.map(str::to_string),
                    has_partial_or_full_leave_marker: marker,
                    occurrences: 1,
                });
            }
        }
    }
    out
}

fn grid(mut check: impl FnMut(&EmployeeRecord, &AbsenceSummary)) {
    let absences = absences();
    for &salary in SALARIES {
        for &hours in HOURS {
            for role in ["Auxiliar", "Diretor"] {
                let employee = employee(salary, hours, role);
                for absence in &absences {
                    check(&employee, absence);
                }
            }
        }
    }
}

fn config() -> BonusConfig {
    BonusConfig {
        excluded_roles: vec!["diretor".to_string()],
        ..BonusConfig::default()
    }
}

#[test]
fn test_every_input_gets_a_consistent_result() {
    let config = config();
    let table = LeaveCategoryTable::defaults();
    let mut seen = std::collections::HashSet::new();

    grid(|employee, absence| {
        let result = classify(employee, absence, &table, &config);
        seen.insert(result.status);

        assert!(!result.reason.trim().is_empty());
        assert!(
            result.amount == Decimal::ZERO
                || result.amount == config.part_time_amount
                || result.amount == config.full_time_amount
        );
        assert_eq!(result.amount > Decimal::ZERO, result.outcome() == Outcome::Pay);
        assert!(!matches!(result.status, BonusStatus::PayManual | BonusStatus::DoNotPayManual));
    });

    // The grid reaches every automatic status.
    assert_eq!(seen.len(), BonusStatus::ALL.len() - 2);
}

#[test]
fn test_unexcused_absence_beats_any_leave_type() {
    let config = config();
    let table = LeaveCategoryTable::defaults();

    grid(|employee, absence| {
        if !absence.has_unexcused_absence
            || employee.role == "Diretor"
            || employee.monthly_salary >= config.salary_limit
        {
            return;
        }
        let result = classify(employee, absence, &table, &config);
        assert_eq!(result.status, BonusStatus::DoNotPayAbsence);
    });
}

#[test]
fn test_classification_is_deterministic() {
    let config = config();
    let table = LeaveCategoryTable::defaults();

    grid(|employee, absence| {
        assert_eq!(
            classify(employee, absence, &table, &config),
            classify(employee, absence, &table, &config)
        );
    });
}

#[test]
fn test_salary_cutoff_is_monotonic() {
    let config = config();
    let table = LeaveCategoryTable::defaults();
    let absence = AbsenceSummary::default();

    for &hours in HOURS {
        let mut blocked = false;
        for &salary in SALARIES {
            let status = classify(&employee(salary, hours, "Auxiliar"), &absence, &table, &config).status;
            if blocked {
                assert_eq!(status, BonusStatus::DoNotPaySalary, "salary {} hours {}", salary, hours);
            }
            blocked |= status == BonusStatus::DoNotPaySalary;
        }
        assert!(blocked);
    }
}

#[test]
fn test_unknown_leave_types_never_pay() {
    let config = config();
    let table = LeaveCategoryTable::defaults();

    grid(|employee, absence| {
        let unknown = absence
            .leave_type
            .as_deref()
            .map(|t| table.lookup(t).is_none())
            .unwrap_or(false);
        if unknown {
            let result = classify(employee, absence, &table, &config);
            assert_ne!(result.outcome(), Outcome::Pay);
        }
    });
}

#[test]
fn test_reference_scenarios() {
    let config = BonusConfig::default();
    let table = LeaveCategoryTable::defaults();
    let clean = AbsenceSummary::default();

    let result = classify(&employee(dec!(2000), 220, ""), &clean, &table, &config);
    assert_eq!((result.status, result.amount), (BonusStatus::Pay, dec!(300.00)));

    let result = classify(&employee(dec!(2000), 110, ""), &clean, &table, &config);
    assert_eq!((result.status, result.amount), (BonusStatus::Pay, dec!(150.00)));

    let result = classify(&employee(dec!(3000), 220, ""), &clean, &table, &config);
    assert_eq!((result.status, result.amount), (BonusStatus::DoNotPaySalary, Decimal::ZERO));

    let absent = AbsenceSummary {
        has_unexcused_absence: true,
        occurrences: 1,
        ..AbsenceSummary::default()
    };
    let result = classify(&employee(dec!(2000), 220, ""), &absent, &table, &config);
    assert_eq!((result.status, result.amount), (BonusStatus::DoNotPayAbsence, Decimal::ZERO));

    let late = AbsenceSummary {
        leave_type: Some("Atraso".to_string()),
        occurrences: 1,
        ..AbsenceSummary::default()
    };
    let result = classify(&employee(dec!(2000), 220, ""), &late, &table, &config);
    assert_eq!((result.status, result.amount), (BonusStatus::EvaluateLeave, Decimal::ZERO));
    assert!(result.reason.contains("Atraso"));

    let result = classify(&employee(dec!(2000), 150, ""), &clean, &table, &config);
    assert_eq!((result.status, result.amount), (BonusStatus::EvaluateHours, Decimal::ZERO));
}

//! Cell value parsers for spreadsheet exports.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a number the way Brazilian spreadsheets print it: optional `R$`,
/// `.` or `,` as thousands separator, `,` or `.` as decimal separator.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let last_dot = cleaned.rfind('.');
    let last_comma = cleaned.rfind(',');
    let normalized = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(_)) if cleaned.matches(',').count() == 1 => cleaned.replace(',', "."),
        (None, Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        (Some(dot), None) if is_thousands_group(&cleaned, dot) => cleaned.replace('.', ""),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

/// `3.000` is three thousand in a Brazilian export: a single dot followed by
/// exactly three digits, with a non-zero integer part.
fn is_thousands_group(value: &str, dot: usize) -> bool {
    let int_part = value[..dot].trim_start_matches('-');
    let frac_part = &value[dot + 1..];
    frac_part.len() == 3
        && frac_part.bytes().all(|b| b.is_ascii_digit())
        && !int_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && !int_part.trim_start_matches('0').is_empty()
}

/// Whole, non-negative hour quotas only: `220`, `220.0` and `220,00` are
/// accepted, `220.5` is not.
pub fn parse_hours(raw: &str) -> Option<u32> {
    let value = parse_decimal(raw)?;
    if value.is_sign_negative() || !value.fract().is_zero() {
        return None;
    }
    value.to_u32()
}

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y"];

/// `dd/mm/yyyy`, ISO dates, timestamps as pandas writes them, or a
/// spreadsheet serial day number.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }

    let serial = parse_decimal(trimmed)?.trunc().to_i64()?;
    if !(1..=2_958_465).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial))
}

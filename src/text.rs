//! Text folding shared by column matching, role exclusion and leave-type
//! lookups, so "Salário Mês Atual", "salario_mes_atual" and
//! "SALARIO  MES ATUAL" all compare equal.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Strip accents, lower-case, treat `_`, `-` and `.` as spaces and collapse
/// runs of whitespace.
pub fn normalize_key(input: &str) -> String {
    let folded = input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            '_' | '-' | '.' => ' ',
            other => other,
        })
        .collect::<String>()
        .to_lowercase();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trimmed value, or `None` when the cell is blank or a spreadsheet null
/// marker.
pub fn non_empty(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    match trimmed {
        "" | "-" => None,
        t if t.eq_ignore_ascii_case("nan") || t.eq_ignore_ascii_case("none") => None,
        t => Some(t),
    }
}

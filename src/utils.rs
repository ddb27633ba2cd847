use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rust_decimal::Decimal;
use std::time::Duration;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format an amount as Brazilian currency, e.g. `R$ 2.542,86`.
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}R$ {},{}", if negative { "-" } else { "" }, grouped, frac_part)
}

/// Truncate to `max` display columns, marking the cut with `…`.
pub fn truncate_display(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        width += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Left-align `text` in `width` display columns. `format!`'s padding counts
/// chars, which misaligns accented names.
pub fn pad_display(text: &str, width: usize) -> String {
    let current = text.width();
    if current >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - current))
    }
}

/// Ask for a yes/no confirmation on stdin. Anything but `y`/`yes` declines.
pub fn confirm_action(prompt: &str) -> std::io::Result<bool> {
    use std::io::{self, Write};

    print!("{} (y/N): ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Stderr spinner for the load and classify steps.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message.to_string());
    pb
}

/// Print a formatted table border
pub fn print_table_border(width: usize) {
    println!("{}", "=".repeat(width));
}

/// Print a table row with columns
pub fn print_table_row(columns: &[&str], widths: &[usize]) {
    let mut row = String::new();
    for (i, col) in columns.iter().enumerate() {
        if i < widths.len() {
            let cell = truncate_display(col, widths[i]);
            row.push_str(&pad_display(&cell, widths[i]));
            row.push_str("  ");
        }
    }
    println!("{}", row.trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(dec!(2542.86)), "R$ 2.542,86");
        assert_eq!(format_brl(dec!(300)), "R$ 300,00");
        assert_eq!(format_brl(dec!(1234567.5)), "R$ 1.234.567,50");
        assert_eq!(format_brl(Decimal::ZERO), "R$ 0,00");
        assert_eq!(format_brl(dec!(-150)), "-R$ 150,00");
    }

    #[test]
    fn test_pad_and_truncate_use_display_width() {
        assert_eq!(pad_display("João", 6), "João  ");
        assert_eq!(pad_display("Conceição", 3), "Conceição");
        assert_eq!(truncate_display("Conceição", 20), "Conceição");
        let cut = truncate_display("Maria Conceição da Silva", 10);
        assert!(cut.ends_with('…'));
        assert!(cut.width() <= 10);
        assert_eq!(truncate_display("Conceição", 0), "");
        assert_eq!(truncate_display("Ana", 1), "…");
    }
}

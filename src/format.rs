//! Display helpers for projection amounts. The engine returns raw numbers;
//! these turn them into labels for tables, axes and tooltips.

const CRORE: f64 = 10_000_000.0;
const LAKH: f64 = 100_000.0;

/// Whole rupees with Indian digit grouping (`12,34,567`). Zero renders as `-`.
pub fn format_inr(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "-".to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let grouped = group_indian(&digits);
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Short axis label: `1.3Cr`, `45L`, or the plain number below one lakh.
pub fn format_axis_inr(value: f64) -> String {
    if value >= CRORE {
        format!("{:.1}Cr", value / CRORE)
    } else if value >= LAKH {
        format!("{:.0}L", value / LAKH)
    } else {
        format!("{value}")
    }
}

pub fn format_tooltip_inr(value: f64) -> String {
    if value >= CRORE {
        format!("₹{:.2} Cr", value / CRORE)
    } else if value >= LAKH {
        format!("₹{:.2} L", value / LAKH)
    } else {
        format!("₹{}", format_inr(value))
    }
}

/// K/M/B abbreviation with one decimal, for callers outside the lakh/crore system.
pub fn abbreviate(value: f64) -> String {
    let magnitude = value.abs();
    let (scaled, suffix) = if magnitude >= 1e9 {
        (value / 1e9, "B")
    } else if magnitude >= 1e6 {
        (value / 1e6, "M")
    } else if magnitude >= 1e3 {
        (value / 1e3, "K")
    } else {
        return format!("{:.0}", value);
    };
    format!("{scaled:.1}{suffix}")
}

use crate::core::{ProjectionResult, YearRecord};
use crate::format::{abbreviate, format_inr, format_tooltip_inr};

const HEADERS: [&str; 8] = [
    "Age",
    "Starting Savings",
    "Planned Expenses",
    "Additional Savings",
    "Ending Savings",
    "Status",
    "Warning",
    "Monthly",
];

/// Columns rendered flush left; the rest are amounts and align right.
const LEFT_ALIGNED: [usize; 2] = [0, 5];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AmountStyle {
    /// Lakh/crore rupee labels.
    Indian,
    /// K/M/B abbreviation.
    Compact,
}

pub fn render_summary(result: &ProjectionResult, style: AmountStyle) -> String {
    let horizon = result.life_expectancy_age;
    let remaining = match style {
        AmountStyle::Indian => format_tooltip_inr(result.terminal_balance),
        AmountStyle::Compact => abbreviate(result.terminal_balance),
    };
    match result.depletion_age {
        None => format!("Funds last until age {horizon}, with {remaining} remaining"),
        Some(age) if result.solvent => {
            format!("Funds last until age {horizon}, fully drawn down at age {age}")
        }
        Some(age) => format!(
            "Funds run out at age {age}, {} years before age {horizon}",
            horizon - age
        ),
    }
}

pub fn render_table(schedule: &[YearRecord]) -> String {
    let rows: Vec<[String; 8]> = schedule.iter().map(row_cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = HEADERS.map(str::to_string);
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_line(&header, &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &rows {
        lines.push(render_line(row, &widths));
    }
    lines.join("\n")
}

fn row_cells(record: &YearRecord) -> [String; 8] {
    [
        record.age.to_string(),
        format_inr(record.opening_balance),
        format_inr(record.planned_expense),
        format_inr(record.contribution),
        format_inr(record.closing_balance),
        record.lifecycle_phase.label().to_string(),
        record
            .depletion_warning_years_left
            .map(|years| format!("{years:.1}"))
            .unwrap_or_default(),
        format_inr(record.monthly_expense_equivalent),
    ]
}

fn render_line(cells: &[String; 8], widths: &[usize; 8]) -> String {
    cells
        .iter()
        .zip(widths.iter())
        .enumerate()
        .map(|(idx, (cell, &width))| {
            if LEFT_ALIGNED.contains(&idx) {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

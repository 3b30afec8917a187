use serde::Serialize;

/// Assumptions for one projection. Rates are fractions (0.095 = 9.5%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy_age: u32,
    pub current_savings: f64,
    pub monthly_investment: f64,
    pub annual_step_up_rate: f64,
    /// Monthly spend in today's money at the start of retirement.
    pub post_retirement_monthly_expense: f64,
    pub inflation_rate: f64,
    pub pre_retirement_return_rate: f64,
    pub post_retirement_return_rate: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePhase {
    Working,
    Retired,
    Depleted,
}

impl LifecyclePhase {
    pub fn label(self) -> &'static str {
        match self {
            LifecyclePhase::Working => "Earning",
            LifecyclePhase::Retired => "Retired",
            LifecyclePhase::Depleted => "Depleted",
        }
    }
}

/// One simulated year. Money fields are rounded to whole units, and
/// `closing_balance` is clamped at zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    pub age: u32,
    pub opening_balance: f64,
    pub planned_expense: f64,
    pub contribution: f64,
    pub closing_balance: f64,
    pub lifecycle_phase: LifecyclePhase,
    pub depletion_warning_years_left: Option<f64>,
    pub monthly_expense_equivalent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulationPoint {
    pub age: u32,
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecumulationPoint {
    pub age: u32,
    pub remaining_balance: f64,
    pub annual_expense: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub accumulation_series: Vec<AccumulationPoint>,
    pub decumulation_series: Vec<DecumulationPoint>,
    pub yearly_schedule: Vec<YearRecord>,
    pub solvent: bool,
    pub depletion_age: Option<u32>,
    /// Closing balance of the last record; 0 whenever that year is the depletion year.
    pub terminal_balance: f64,
    pub life_expectancy_age: u32,
}

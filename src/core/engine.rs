use super::types::{
    AccumulationPoint, DecumulationPoint, Inputs, LifecyclePhase, ProjectionResult, YearRecord,
};

/// Years of expense coverage below which a retired year carries a warning.
const WARNING_COVERAGE_YEARS: f64 = 5.0;

/// Runs the accumulation phase through `retirement_age` (inclusive) and then
/// draws the corpus down until `life_expectancy_age` or the first year the
/// balance reaches zero.
///
/// Growth is applied to the opening balance once a year and the whole year's
/// contribution or expense lands at year end. Balances carry full precision
/// between years; only the stored records are rounded.
pub fn project(inputs: &Inputs) -> ProjectionResult {
    let working_years = span(inputs.current_age, inputs.retirement_age);
    let retired_years = inputs
        .life_expectancy_age
        .saturating_sub(inputs.retirement_age) as usize;

    let mut yearly_schedule = Vec::with_capacity(working_years + retired_years);
    let mut accumulation_series = Vec::with_capacity(working_years);
    let mut decumulation_series = Vec::with_capacity(retired_years);

    let corpus = accumulate(inputs, &mut yearly_schedule, &mut accumulation_series);
    let depletion_age = decumulate(
        inputs,
        corpus,
        &mut yearly_schedule,
        &mut decumulation_series,
    );

    let solvent = depletion_age.is_none_or(|age| age >= inputs.life_expectancy_age);
    let terminal_balance = yearly_schedule
        .last()
        .map(|record| record.closing_balance)
        .unwrap_or(0.0);

    ProjectionResult {
        accumulation_series,
        decumulation_series,
        yearly_schedule,
        solvent,
        depletion_age,
        terminal_balance,
        life_expectancy_age: inputs.life_expectancy_age,
    }
}

fn span(from_age: u32, to_age_inclusive: u32) -> usize {
    if to_age_inclusive < from_age {
        0
    } else {
        (to_age_inclusive - from_age + 1) as usize
    }
}

/// Returns the unrounded balance at the end of the last working year.
fn accumulate(
    inputs: &Inputs,
    schedule: &mut Vec<YearRecord>,
    series: &mut Vec<AccumulationPoint>,
) -> f64 {
    let base_contribution = inputs.monthly_investment * 12.0;
    let growth = 1.0 + inputs.pre_retirement_return_rate;
    let mut balance = inputs.current_savings;
    let mut step_up_factor = 1.0;

    for (year, age) in (inputs.current_age..=inputs.retirement_age).enumerate() {
        if year > 0 {
            step_up_factor *= 1.0 + inputs.annual_step_up_rate;
        }
        let contribution = base_contribution * step_up_factor;
        let opening = balance;
        balance = opening * growth + contribution;

        let closing = round_currency(balance.max(0.0));
        schedule.push(YearRecord {
            age,
            opening_balance: round_currency(opening),
            planned_expense: 0.0,
            contribution: round_currency(contribution),
            closing_balance: closing,
            lifecycle_phase: LifecyclePhase::Working,
            depletion_warning_years_left: None,
            monthly_expense_equivalent: 0.0,
        });
        series.push(AccumulationPoint {
            age,
            balance: closing,
        });
    }

    balance
}

/// Returns the first age whose true closing balance is zero or below.
fn decumulate(
    inputs: &Inputs,
    corpus: f64,
    schedule: &mut Vec<YearRecord>,
    series: &mut Vec<DecumulationPoint>,
) -> Option<u32> {
    let growth = 1.0 + inputs.post_retirement_return_rate;
    let mut annual_expense = inputs.post_retirement_monthly_expense * 12.0;
    let mut balance = corpus;

    let first_retired_age = inputs.retirement_age.saturating_add(1);
    for age in first_retired_age..=inputs.life_expectancy_age {
        let opening = balance;
        annual_expense *= 1.0 + inputs.inflation_rate;
        balance = opening * growth - annual_expense;

        let depleted = balance <= 0.0;
        let closing = round_currency(balance.max(0.0));
        let expense = round_currency(annual_expense);

        schedule.push(YearRecord {
            age,
            opening_balance: round_currency(opening),
            planned_expense: expense,
            contribution: 0.0,
            closing_balance: closing,
            lifecycle_phase: if depleted {
                LifecyclePhase::Depleted
            } else {
                LifecyclePhase::Retired
            },
            depletion_warning_years_left: coverage_warning(balance, annual_expense),
            monthly_expense_equivalent: round_currency(annual_expense / 12.0),
        });
        series.push(DecumulationPoint {
            age,
            remaining_balance: closing,
            annual_expense: expense,
        });

        if depleted {
            return Some(age);
        }
    }

    None
}

fn coverage_warning(balance: f64, annual_expense: f64) -> Option<f64> {
    if annual_expense <= 0.0 {
        return None;
    }
    if balance > 0.0 && balance < annual_expense * WARNING_COVERAGE_YEARS {
        Some(round_tenth(balance / annual_expense))
    } else {
        None
    }
}

fn round_currency(value: f64) -> f64 {
    value.round()
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_inputs() -> Inputs {
        Inputs {
            current_age: 34,
            retirement_age: 40,
            life_expectancy_age: 85,
            current_savings: 13_000_000.0,
            monthly_investment: 180_000.0,
            annual_step_up_rate: 0.1,
            post_retirement_monthly_expense: 90_000.0,
            inflation_rate: 0.05,
            pre_retirement_return_rate: 0.095,
            post_retirement_return_rate: 0.085,
        }
    }

    fn flat_inputs() -> Inputs {
        Inputs {
            current_age: 60,
            retirement_age: 60,
            life_expectancy_age: 62,
            current_savings: 24_000.0,
            monthly_investment: 0.0,
            annual_step_up_rate: 0.0,
            post_retirement_monthly_expense: 1_000.0,
            inflation_rate: 0.0,
            pre_retirement_return_rate: 0.0,
            post_retirement_return_rate: 0.0,
        }
    }

    fn working_records(result: &ProjectionResult) -> Vec<&YearRecord> {
        result
            .yearly_schedule
            .iter()
            .filter(|r| r.lifecycle_phase == LifecyclePhase::Working)
            .collect()
    }

    #[test]
    fn default_scenario_stays_solvent_to_life_expectancy() {
        let inputs = sample_inputs();
        let result = project(&inputs);

        let working = working_records(&result);
        assert_eq!(working.len(), 7);
        assert_eq!(working[0].age, 34);
        assert_eq!(working[6].age, 40);
        assert_eq!(result.accumulation_series.len(), 7);

        assert!(result.solvent);
        assert_eq!(result.depletion_age, None);
        assert_eq!(result.yearly_schedule.len(), 52);
        assert_eq!(result.decumulation_series.len(), 45);
        assert_eq!(result.yearly_schedule.last().map(|r| r.age), Some(85));
        assert_approx(result.terminal_balance, 1_020_496_399.0);
    }

    #[test]
    fn accumulation_steps_up_contribution_after_first_year() {
        let result = project(&sample_inputs());
        let first = &result.yearly_schedule[0];
        let second = &result.yearly_schedule[1];

        assert_approx(first.opening_balance, 13_000_000.0);
        assert_approx(first.contribution, 2_160_000.0);
        assert_approx(first.closing_balance, 16_395_000.0);
        assert_approx(first.planned_expense, 0.0);
        assert_eq!(first.depletion_warning_years_left, None);

        assert_approx(second.opening_balance, 16_395_000.0);
        assert_approx(second.contribution, 2_376_000.0);
        assert_approx(second.closing_balance, 20_328_525.0);

        let last_working = &result.yearly_schedule[6];
        assert_approx(last_working.contribution, 3_826_572.0);
        assert_approx(last_working.closing_balance, 50_961_664.0);
        assert_approx(result.accumulation_series[6].balance, 50_961_664.0);
    }

    #[test]
    fn first_retired_year_expense_is_already_inflated() {
        let inputs = sample_inputs();
        let result = project(&inputs);
        let first_retired = &result.yearly_schedule[7];

        assert_eq!(first_retired.age, 41);
        assert_eq!(first_retired.lifecycle_phase, LifecyclePhase::Retired);
        assert!(first_retired.planned_expense > inputs.post_retirement_monthly_expense * 12.0);
        assert_approx(first_retired.planned_expense, 1_134_000.0);
        assert_approx(first_retired.monthly_expense_equivalent, 94_500.0);
        assert_approx(first_retired.contribution, 0.0);
        assert_approx(first_retired.opening_balance, 50_961_664.0);
        assert_approx(first_retired.closing_balance, 54_159_406.0);

        let first_point = result.decumulation_series[0];
        assert_eq!(first_point.age, 41);
        assert_approx(first_point.remaining_balance, 54_159_406.0);
        assert_approx(first_point.annual_expense, 1_134_000.0);
    }

    #[test]
    fn immediate_retirement_has_single_working_year() {
        let mut inputs = sample_inputs();
        inputs.current_age = 40;
        inputs.retirement_age = 40;

        let result = project(&inputs);
        assert_eq!(working_records(&result).len(), 1);
        assert_eq!(result.yearly_schedule[0].age, 40);
        assert_eq!(result.yearly_schedule[1].age, 41);
        assert_ne!(
            result.yearly_schedule[1].lifecycle_phase,
            LifecyclePhase::Working
        );
    }

    #[test]
    fn retiring_at_life_expectancy_skips_drawdown() {
        let mut inputs = sample_inputs();
        inputs.life_expectancy_age = inputs.retirement_age;

        let result = project(&inputs);
        assert_eq!(result.yearly_schedule.len(), 7);
        assert!(result.decumulation_series.is_empty());
        assert!(result.solvent);
        assert_eq!(result.depletion_age, None);
        assert_approx(result.terminal_balance, 50_961_664.0);
    }

    #[test]
    fn zero_savings_and_investment_deplete_in_first_retired_year() {
        let inputs = Inputs {
            current_age: 30,
            retirement_age: 35,
            life_expectancy_age: 90,
            current_savings: 0.0,
            monthly_investment: 0.0,
            annual_step_up_rate: 0.1,
            post_retirement_monthly_expense: 50_000.0,
            inflation_rate: 0.06,
            pre_retirement_return_rate: 0.095,
            post_retirement_return_rate: 0.085,
        };

        let result = project(&inputs);
        for record in working_records(&result) {
            assert_approx(record.closing_balance, 0.0);
        }
        assert_eq!(result.yearly_schedule.len(), 7);
        assert_eq!(result.depletion_age, Some(36));
        assert!(!result.solvent);
        assert_approx(result.terminal_balance, 0.0);

        let last = result.yearly_schedule.last().expect("depletion year");
        assert_eq!(last.lifecycle_phase, LifecyclePhase::Depleted);
        assert_approx(last.planned_expense, 636_000.0);
        assert_approx(last.monthly_expense_equivalent, 53_000.0);
        assert_approx(last.closing_balance, 0.0);
        assert_eq!(last.depletion_warning_years_left, None);
    }

    #[test]
    fn depleting_exactly_at_life_expectancy_counts_as_solvent() {
        let result = project(&flat_inputs());

        assert_eq!(result.depletion_age, Some(62));
        assert!(result.solvent);
        assert_approx(result.terminal_balance, 0.0);
        assert_eq!(result.yearly_schedule.len(), 3);

        let warned = &result.yearly_schedule[1];
        assert_eq!(warned.age, 61);
        assert_approx(warned.closing_balance, 12_000.0);
        assert_eq!(warned.depletion_warning_years_left, Some(1.0));

        let last = &result.yearly_schedule[2];
        assert_eq!(last.lifecycle_phase, LifecyclePhase::Depleted);
    }

    #[test]
    fn early_depletion_truncates_schedule_and_warns_beforehand() {
        let inputs = Inputs {
            current_age: 50,
            retirement_age: 55,
            life_expectancy_age: 95,
            current_savings: 1_000_000.0,
            monthly_investment: 10_000.0,
            annual_step_up_rate: 0.0,
            post_retirement_monthly_expense: 60_000.0,
            inflation_rate: 0.06,
            pre_retirement_return_rate: 0.08,
            post_retirement_return_rate: 0.07,
        };

        let result = project(&inputs);
        assert_eq!(result.depletion_age, Some(59));
        assert!(!result.solvent);
        assert_eq!(result.yearly_schedule.len(), 10);
        assert_eq!(result.decumulation_series.len(), 4);

        let warnings: Vec<Option<f64>> = result.yearly_schedule[6..]
            .iter()
            .map(|r| r.depletion_warning_years_left)
            .collect();
        assert_eq!(warnings, vec![Some(2.5), Some(1.5), Some(0.5), None]);

        let phases: Vec<LifecyclePhase> = result.yearly_schedule[6..]
            .iter()
            .map(|r| r.lifecycle_phase)
            .collect();
        assert_eq!(
            phases,
            vec![
                LifecyclePhase::Retired,
                LifecyclePhase::Retired,
                LifecyclePhase::Retired,
                LifecyclePhase::Depleted,
            ]
        );

        let last_point = result.decumulation_series[3];
        assert_eq!(last_point.age, 59);
        assert_approx(last_point.remaining_balance, 0.0);
        assert_approx(last_point.annual_expense, 908_983.0);
        assert_approx(result.terminal_balance, 0.0);
    }

    #[test]
    fn zero_expense_never_warns_or_depletes() {
        let mut inputs = sample_inputs();
        inputs.post_retirement_monthly_expense = 0.0;

        let result = project(&inputs);
        assert!(result.solvent);
        assert_eq!(result.depletion_age, None);
        for pair in result.yearly_schedule.windows(2) {
            assert!(pair[1].closing_balance >= pair[0].closing_balance);
        }
        for record in &result.yearly_schedule[7..] {
            assert_eq!(record.depletion_warning_years_left, None);
            assert_approx(record.monthly_expense_equivalent, 0.0);
            assert_approx(record.planned_expense, 0.0);
        }
    }

    #[test]
    fn inverted_ages_yield_empty_phases_without_panicking() {
        let mut inputs = sample_inputs();
        inputs.retirement_age = 30;
        inputs.life_expectancy_age = 29;

        let result = project(&inputs);
        assert!(result.yearly_schedule.is_empty());
        assert!(result.solvent);
        assert_approx(result.terminal_balance, 0.0);
    }

    #[test]
    fn reading_a_result_does_not_change_the_next_projection() {
        let inputs = sample_inputs();
        let first = project(&inputs);
        let _ = first.yearly_schedule.iter().map(|r| r.closing_balance).sum::<f64>();
        let second = project(&inputs);
        assert_eq!(first, second);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_schedule_shape_and_balances_hold(
            current_age in 18u32..70,
            working_span in 0u32..30,
            retired_span in 0u32..40,
            savings in 0u32..50_000_000,
            monthly in 0u32..500_000,
            step_up_bp in 0u32..2_000,
            expense in 0u32..400_000,
            inflation_bp in 0u32..1_200,
            pre_bp in 0u32..1_500,
            post_bp in 0u32..1_500
        ) {
            let retirement_age = current_age + working_span;
            let inputs = Inputs {
                current_age,
                retirement_age,
                life_expectancy_age: (retirement_age + retired_span).min(120),
                current_savings: savings as f64,
                monthly_investment: monthly as f64,
                annual_step_up_rate: step_up_bp as f64 / 10_000.0,
                post_retirement_monthly_expense: expense as f64,
                inflation_rate: inflation_bp as f64 / 10_000.0,
                pre_retirement_return_rate: pre_bp as f64 / 10_000.0,
                post_retirement_return_rate: post_bp as f64 / 10_000.0,
            };

            let result = project(&inputs);
            prop_assert_eq!(&result, &project(&inputs));

            let working = (retirement_age - current_age + 1) as usize;
            let max_retired = (inputs.life_expectancy_age - retirement_age) as usize;
            let retired = result.yearly_schedule.len() - working;
            prop_assert!(retired <= max_retired);
            if result.depletion_age.is_none() {
                prop_assert_eq!(retired, max_retired);
            }
            prop_assert_eq!(result.accumulation_series.len(), working);
            prop_assert_eq!(result.decumulation_series.len(), retired);

            for (offset, record) in result.yearly_schedule.iter().enumerate() {
                prop_assert_eq!(record.age, current_age + offset as u32);
                prop_assert!(record.closing_balance >= 0.0);
                prop_assert!(record.opening_balance >= 0.0);
            }
            for point in &result.decumulation_series {
                prop_assert!(point.remaining_balance >= 0.0);
            }

            let depleted = result
                .yearly_schedule
                .iter()
                .filter(|r| r.lifecycle_phase == LifecyclePhase::Depleted)
                .count();
            prop_assert!(depleted <= 1);
            if let Some(age) = result.depletion_age {
                prop_assert_eq!(result.yearly_schedule.last().map(|r| r.age), Some(age));
                prop_assert_eq!(result.solvent, age >= inputs.life_expectancy_age);
            } else {
                prop_assert!(result.solvent);
            }
        }
    }
}

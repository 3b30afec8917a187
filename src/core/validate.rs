use thiserror::Error;

use super::types::Inputs;

pub const MAX_AGE: u32 = 120;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("retirement age ({retirement_age}) must be >= current age ({current_age})")]
    RetirementBeforeCurrent {
        current_age: u32,
        retirement_age: u32,
    },
    #[error(
        "life expectancy age ({life_expectancy_age}) must be >= retirement age ({retirement_age})"
    )]
    LifeExpectancyBeforeRetirement {
        retirement_age: u32,
        life_expectancy_age: u32,
    },
    #[error("{field} must be <= 120, got {value}")]
    AgeOutOfRange { field: &'static str, value: u32 },
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} must be >= 0")]
    NegativeAmount { field: &'static str },
    #[error("{field} must be between {min}% and {max}%")]
    RateOutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} must be > -100% and <= 100%")]
    ReturnOutOfRange { field: &'static str },
}

/// Checks the invariants `project` assumes. Equal ages are accepted: retiring
/// now and retiring at life expectancy both have well defined schedules.
pub fn validate_inputs(inputs: &Inputs) -> Result<(), InputError> {
    for (field, value) in [
        ("currentAge", inputs.current_age),
        ("retirementAge", inputs.retirement_age),
        ("lifeExpectancyAge", inputs.life_expectancy_age),
    ] {
        if value > MAX_AGE {
            return Err(InputError::AgeOutOfRange { field, value });
        }
    }

    if inputs.retirement_age < inputs.current_age {
        return Err(InputError::RetirementBeforeCurrent {
            current_age: inputs.current_age,
            retirement_age: inputs.retirement_age,
        });
    }

    if inputs.life_expectancy_age < inputs.retirement_age {
        return Err(InputError::LifeExpectancyBeforeRetirement {
            retirement_age: inputs.retirement_age,
            life_expectancy_age: inputs.life_expectancy_age,
        });
    }

    for (field, value) in [
        ("currentSavings", inputs.current_savings),
        ("monthlyInvestment", inputs.monthly_investment),
        (
            "postRetirementMonthlyExpense",
            inputs.post_retirement_monthly_expense,
        ),
    ] {
        if !value.is_finite() {
            return Err(InputError::NonFinite { field });
        }
        if value < 0.0 {
            return Err(InputError::NegativeAmount { field });
        }
    }

    for (field, value, min, max) in [
        ("annualStepUpRate", inputs.annual_step_up_rate, 0.0, 1.0),
        ("inflationRate", inputs.inflation_rate, 0.0, 1.0),
    ] {
        if !value.is_finite() {
            return Err(InputError::NonFinite { field });
        }
        if !(min..=max).contains(&value) {
            return Err(InputError::RateOutOfRange {
                field,
                min: min * 100.0,
                max: max * 100.0,
            });
        }
    }

    // Returns may be negative but never wipe out more than the whole balance.
    for (field, value) in [
        ("preRetirementReturnRate", inputs.pre_retirement_return_rate),
        ("postRetirementReturnRate", inputs.post_retirement_return_rate),
    ] {
        if !value.is_finite() {
            return Err(InputError::NonFinite { field });
        }
        if value <= -1.0 || value > 1.0 {
            return Err(InputError::ReturnOutOfRange { field });
        }
    }

    Ok(())
}

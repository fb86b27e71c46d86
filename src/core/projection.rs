use super::types::{Inputs, InvalidInputError, Projection};

pub fn run_projection(inputs: &Inputs) -> Result<Projection, InvalidInputError> {
    validate(inputs)?;

    let deflator = 1.0 - inputs.inflation_rate_pct / 100.0;
    let growth = 1.0 + inputs.interest_rate_pct / 100.0;

    let series_no_interest: Vec<f64> = (0..=inputs.years)
        .map(|year| inputs.start_amount * deflator.powf(f64::from(year)))
        .collect();
    let series_with_interest: Vec<f64> = (0..=inputs.years)
        .map(|year| {
            inputs.start_amount * growth.powf(f64::from(year)) * deflator.powf(f64::from(year))
        })
        .collect();

    let end_amount_no_interest = series_no_interest[inputs.years as usize];
    let end_amount_with_interest = series_with_interest[inputs.years as usize];

    Ok(Projection {
        start_amount: inputs.start_amount,
        years: inputs.years,
        end_amount_no_interest,
        end_amount_with_interest,
        loss_no_interest: inputs.start_amount - end_amount_no_interest,
        loss_with_interest: inputs.start_amount - end_amount_with_interest,
        series_no_interest,
        series_with_interest,
    })
}

fn validate(inputs: &Inputs) -> Result<(), InvalidInputError> {
    for (field, value) in [
        ("start_amount", inputs.start_amount),
        ("inflation_rate_pct", inputs.inflation_rate_pct),
        ("interest_rate_pct", inputs.interest_rate_pct),
    ] {
        if !value.is_finite() {
            return Err(InvalidInputError::NonFinite { field, value });
        }
        if value < 0.0 {
            return Err(InvalidInputError::Negative { field, value });
        }
    }
    if inputs.years == 0 {
        return Err(InvalidInputError::YearsTooSmall);
    }
    Ok(())
}

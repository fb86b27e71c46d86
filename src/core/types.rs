use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inputs {
    pub start_amount: f64,
    pub inflation_rate_pct: f64,
    pub interest_rate_pct: f64,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub start_amount: f64,
    pub years: u32,
    pub end_amount_no_interest: f64,
    pub end_amount_with_interest: f64,
    pub loss_no_interest: f64,
    pub loss_with_interest: f64,
    pub series_no_interest: Vec<f64>,
    pub series_with_interest: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} must be >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("years must be >= 1")]
    YearsTooSmall,
}

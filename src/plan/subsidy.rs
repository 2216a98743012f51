//! @acp:module "Subsidy Calculator"
//! @acp:summary "Statutory subsidy amount, depreciation and payback helpers"
//! @acp:domain subsidy
//! @acp:layer logic

use serde::{Deserialize, Serialize};

use crate::error::{Result, SubsidyError};
use crate::record::ExpenseItem;

pub const SUBSIDY_RATE: f64 = 0.75;
pub const STANDARD_CAP: i64 = 1_000_000;
/// Cap for applicants with sales of 1 billion or more
pub const HIGH_SALES_CAP: i64 = 5_000_000;
pub const DEFAULT_USEFUL_LIFE: i64 = 5;

/// @acp:summary "Subsidy award for one application"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidyCalculation {
    pub total_expense: i64,
    pub subsidy_rate: f64,
    pub upper_limit: i64,
    pub subsidy_amount: i64,
    pub self_payment: i64,
}

impl SubsidyCalculation {
    /// Total expense of at least 500,000
    pub fn meets_half_million(&self) -> bool {
        self.total_expense >= 500_000
    }
}

/// @acp:summary "Sum the expenses and apply rate and cap"
pub fn calculate_subsidy(expenses: &[ExpenseItem], sales_over_threshold: bool) -> SubsidyCalculation {
    let total_expense = expenses
        .iter()
        .fold(0i64, |total, e| total.saturating_add(e.amount));
    let upper_limit = if sales_over_threshold {
        HIGH_SALES_CAP
    } else {
        STANDARD_CAP
    };
    let raw = (total_expense as f64 * SUBSIDY_RATE).floor() as i64;
    let subsidy_amount = raw.min(upper_limit);

    SubsidyCalculation {
        total_expense,
        subsidy_rate: SUBSIDY_RATE,
        upper_limit,
        subsidy_amount,
        self_payment: total_expense.saturating_sub(subsidy_amount),
    }
}

/// Straight-line annual depreciation of a new asset
pub fn estimate_depreciation(asset_cost: i64, useful_life: i64) -> Result<i64> {
    if useful_life <= 0 {
        return Err(SubsidyError::InvalidUsefulLife(useful_life));
    }
    Ok(asset_cost.div_euclid(useful_life))
}

/// @acp:summary "Years until the applicant's own share is recovered"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payback {
    Years(f64),
    /// No positive annual effect, the share is never recovered
    Never,
}

impl std::fmt::Display for Payback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payback::Years(years) => write!(f, "{:.1}", years),
            Payback::Never => write!(f, "∞"),
        }
    }
}

pub fn calculate_investment_payback(subsidy: &SubsidyCalculation, annual_effect: i64) -> Payback {
    if annual_effect <= 0 {
        return Payback::Never;
    }
    let years = subsidy.self_payment as f64 / annual_effect as f64;
    Payback::Years(round_tenths(years))
}

/// Nearest tenth, ties to even on the exact binary value (0.25 -> 0.2)
fn round_tenths(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

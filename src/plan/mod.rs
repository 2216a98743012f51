//! @acp:module "Plan"
//! @acp:summary "Projection, subsidy and eligibility calculations"
//! @acp:domain subsidy
//! @acp:layer logic
//!
//! ## Core Components
//!
//! - [`project`]: baseline + planned effects into a [`ThreeYearPlan`]
//! - [`calculate_subsidy`]: expenses + sales tier into a [`SubsidyCalculation`]
//! - [`validate`]: plan + subsidy into a [`ValidationReport`]

pub mod projection;
pub mod subsidy;
pub mod validate;

pub use projection::{
    growth_rate, project, FinancialBaseline, Metric, PlannedEffects, RampMode, ThreeYearPlan,
    YearProjection,
};
pub use subsidy::{
    calculate_investment_payback, calculate_subsidy, estimate_depreciation, Payback,
    SubsidyCalculation, DEFAULT_USEFUL_LIFE,
};
pub use validate::{validate, AmountCheck, RateCheck, ValidationReport, EXPENSE_FLOOR};

//! @acp:module "Assessment"
//! @acp:summary "Run projection, subsidy, validation and payback for one record"
//! @acp:domain subsidy
//! @acp:layer service

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::plan::{
    calculate_investment_payback, calculate_subsidy, estimate_depreciation, project, validate,
    FinancialBaseline, Payback, PlannedEffects, RampMode, SubsidyCalculation, ThreeYearPlan,
    ValidationReport,
};
use crate::record::InputRecord;

/// @acp:summary "Everything computed from a record before document mapping"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub ramp_mode: RampMode,
    pub baseline: FinancialBaseline,
    pub effects: PlannedEffects,
    pub useful_life: i64,
    pub plan: ThreeYearPlan,
    pub subsidy: SubsidyCalculation,
    pub validation: ValidationReport,
    pub annual_effect: i64,
    pub payback: Payback,
}

impl Assessment {
    /// @acp:summary "Assess a record with the configured units and defaults"
    pub fn from_record(record: &InputRecord, config: &Config, ramp_mode: RampMode) -> Result<Self> {
        let baseline = baseline_from(record, config.baseline_unit);
        let subsidy = calculate_subsidy(&record.expenses, record.sales_over_threshold());

        let useful_life = record.useful_life_years(config.default_useful_life);
        let new_depreciation = estimate_depreciation(record.total_expense(), useful_life)?;

        let effects = PlannedEffects {
            sales_increase_annual: record.effect.sales_increase_annual,
            cost_reduction_annual: record.effect.cost_reduction_annual,
            wage_increase_annual: record.wage.annual_increase,
            new_depreciation,
            employee_change: 0,
        };
        let plan = project(&baseline, &effects, ramp_mode);
        let validation = validate(&plan, &subsidy);

        let annual_effect = record.annual_effect();
        let payback = calculate_investment_payback(&subsidy, annual_effect);

        tracing::debug!(
            "Assessed {}: subsidy {} / total {}, requirements met: {}",
            record.company.name,
            subsidy.subsidy_amount,
            subsidy.total_expense,
            validation.all_met
        );

        Ok(Self {
            ramp_mode,
            baseline,
            effects,
            useful_life,
            plan,
            subsidy,
            validation,
            annual_effect,
            payback,
        })
    }
}

/// Record financials scaled to yen, saturating; the headcount is not scaled
pub fn baseline_from(record: &InputRecord, unit: i64) -> FinancialBaseline {
    let f = &record.financial;
    FinancialBaseline::new(
        f.sales.saturating_mul(unit),
        f.operating_profit.saturating_mul(unit),
        f.depreciation.saturating_mul(unit),
        f.personnel_cost.saturating_mul(unit),
        f.salary_total.saturating_mul(unit),
        f.employee_count,
    )
}

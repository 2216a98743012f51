//! @acp:module "Financial Projector"
//! @acp:summary "Three-year projection of added value and salaries"
//! @acp:domain subsidy
//! @acp:layer logic
//!
//! Year 0 is the baseline. Years 1..3 apply the investment's effects with a
//! ramp schedule for sales and cost savings; wage increases accumulate per
//! year and the new asset's depreciation applies in full from year 1.

use serde::{Deserialize, Serialize};

/// Upper bound on the gross-margin heuristic
const MAX_GROSS_MARGIN: f64 = 0.5;
/// Gross margin assumed when there are no baseline sales
const FALLBACK_GROSS_MARGIN: f64 = 0.3;

pub const PROJECTION_YEARS: usize = 3;

/// @acp:summary "Most recent actual fiscal year"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialBaseline {
    pub sales: i64,
    pub operating_profit: i64,
    pub depreciation: i64,
    pub personnel_cost: i64,
    pub salary_total: i64,
    pub employee_count: i64,
}

impl FinancialBaseline {
    pub fn new(
        sales: i64,
        operating_profit: i64,
        depreciation: i64,
        personnel_cost: i64,
        salary_total: i64,
        employee_count: i64,
    ) -> Self {
        Self {
            sales,
            operating_profit,
            depreciation,
            personnel_cost,
            salary_total,
            employee_count,
        }
    }

    /// Operating profit + personnel cost + depreciation
    pub fn added_value(&self) -> i64 {
        self.operating_profit
            .saturating_add(self.personnel_cost)
            .saturating_add(self.depreciation)
    }

    /// Added value as a percentage of sales, 0 without sales
    pub fn added_value_rate(&self) -> f64 {
        if self.sales > 0 {
            self.added_value() as f64 / self.sales as f64 * 100.0
        } else {
            0.0
        }
    }

    fn gross_margin(&self) -> f64 {
        if self.sales > 0 {
            let margin =
                (self.operating_profit as f64 + self.personnel_cost as f64) / self.sales as f64;
            margin.min(MAX_GROSS_MARGIN)
        } else {
            FALLBACK_GROSS_MARGIN
        }
    }
}

/// @acp:summary "How fast the annual sales and cost effects materialize"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RampMode {
    /// 50% in year 1, full from year 2
    #[default]
    Standard,
    /// Nothing in year 1, 70% in year 2, full in year 3
    Delayed,
}

impl RampMode {
    /// Fraction of the annual effect realized in `year` (1-based)
    pub fn ratio(&self, year: usize) -> f64 {
        match (self, year) {
            (RampMode::Standard, 1) => 0.5,
            (RampMode::Standard, _) => 1.0,
            (RampMode::Delayed, 1) => 0.0,
            (RampMode::Delayed, 2) => 0.7,
            (RampMode::Delayed, _) => 1.0,
        }
    }
}

impl std::str::FromStr for RampMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" | "a" => Ok(RampMode::Standard),
            "delayed" | "b" => Ok(RampMode::Delayed),
            _ => Err(format!("Unknown ramp mode: {}. Use 'standard' or 'delayed'", s)),
        }
    }
}

/// @acp:summary "Planned annual effects of the investment"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedEffects {
    pub sales_increase_annual: i64,
    pub cost_reduction_annual: i64,
    pub wage_increase_annual: i64,
    pub new_depreciation: i64,
    pub employee_change: i64,
}

/// @acp:summary "One point of the projection"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: usize,
    pub label: String,
    pub sales: i64,
    pub operating_profit: i64,
    pub depreciation: i64,
    pub personnel_cost: i64,
    pub salary_total: i64,
    pub employee_count: i64,
    pub added_value: i64,
}

impl YearProjection {
    fn baseline(base: &FinancialBaseline) -> Self {
        Self {
            year: 0,
            label: year_label(0),
            sales: base.sales,
            operating_profit: base.operating_profit,
            depreciation: base.depreciation,
            personnel_cost: base.personnel_cost,
            salary_total: base.salary_total,
            employee_count: base.employee_count,
            added_value: base.added_value(),
        }
    }

    /// Value of a projected metric
    pub fn metric(&self, metric: Metric) -> i64 {
        match metric {
            Metric::Sales => self.sales,
            Metric::OperatingProfit => self.operating_profit,
            Metric::PersonnelCost => self.personnel_cost,
            Metric::Depreciation => self.depreciation,
            Metric::AddedValue => self.added_value,
            Metric::SalaryTotal => self.salary_total,
            Metric::EmployeeCount => self.employee_count,
        }
    }
}

/// Projected quantities addressable by reports and documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Sales,
    OperatingProfit,
    PersonnelCost,
    Depreciation,
    AddedValue,
    SalaryTotal,
    EmployeeCount,
}

fn year_label(year: usize) -> String {
    if year == 0 {
        "基準年度".to_string()
    } else {
        format!("{}年目", year)
    }
}

/// @acp:summary "Baseline plus three projected years"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeYearPlan {
    years: [YearProjection; PROJECTION_YEARS + 1],
    pub added_value_increasing: bool,
    pub salary_increasing: bool,
    pub all_requirements_met: bool,
    pub added_value_growth_rate: f64,
    pub salary_growth_rate: f64,
}

impl ThreeYearPlan {
    /// All four points, baseline first
    pub fn years(&self) -> &[YearProjection] {
        &self.years
    }

    pub fn baseline(&self) -> &YearProjection {
        &self.years[0]
    }

    pub fn final_year(&self) -> &YearProjection {
        &self.years[PROJECTION_YEARS]
    }

    /// Percentage change of `metric` in `year` against the baseline
    pub fn change_rate(&self, metric: Metric, year: usize) -> Option<f64> {
        let point = self.years.get(year)?;
        growth_rate(self.baseline().metric(metric), point.metric(metric))
    }
}

/// `(final - base) / base * 100`, or `None` when the base is not positive
pub fn growth_rate(base: i64, value: i64) -> Option<f64> {
    if base > 0 {
        Some((value as f64 - base as f64) / base as f64 * 100.0)
    } else {
        None
    }
}

/// @acp:summary "Project the baseline three years forward"
///
/// Integer arithmetic saturates at the `i64` bounds.
pub fn project(base: &FinancialBaseline, effects: &PlannedEffects, ramp: RampMode) -> ThreeYearPlan {
    let margin = base.gross_margin();
    let project_year = |year: usize| -> YearProjection {
        let ratio = ramp.ratio(year);
        let sales = base
            .sales
            .saturating_add(floor_mul(effects.sales_increase_annual, ratio));
        let cost_saving = floor_mul(effects.cost_reduction_annual, ratio);
        let wage_cumulative = effects.wage_increase_annual.saturating_mul(year as i64);
        let personnel_cost = base.personnel_cost.saturating_add(wage_cumulative);
        let salary_total = base.salary_total.saturating_add(wage_cumulative);
        let depreciation = base.depreciation.saturating_add(effects.new_depreciation);

        let headcount_delta = (effects.employee_change as f64 * year as f64
            / PROJECTION_YEARS as f64)
            .trunc() as i64;
        let employee_count = base.employee_count.saturating_add(headcount_delta).max(1);

        let profit_from_sales = floor_mul(sales.saturating_sub(base.sales), margin);
        let operating_profit = base
            .operating_profit
            .saturating_add(profit_from_sales)
            .saturating_add(cost_saving)
            .saturating_sub(wage_cumulative);

        YearProjection {
            year,
            label: year_label(year),
            sales,
            operating_profit,
            depreciation,
            personnel_cost,
            salary_total,
            employee_count,
            added_value: operating_profit
                .saturating_add(personnel_cost)
                .saturating_add(depreciation),
        }
    };

    let years = [
        YearProjection::baseline(base),
        project_year(1),
        project_year(2),
        project_year(3),
    ];

    let (base_av, final_av) = (years[0].added_value, years[PROJECTION_YEARS].added_value);
    let (base_sal, final_sal) = (years[0].salary_total, years[PROJECTION_YEARS].salary_total);
    let added_value_increasing = final_av > base_av;
    let salary_increasing = final_sal > base_sal;

    ThreeYearPlan {
        years,
        added_value_increasing,
        salary_increasing,
        all_requirements_met: added_value_increasing && salary_increasing,
        added_value_growth_rate: growth_rate(base_av, final_av).unwrap_or(0.0),
        salary_growth_rate: growth_rate(base_sal, final_sal).unwrap_or(0.0),
    }
}

fn floor_mul(amount: i64, ratio: f64) -> i64 {
    (amount as f64 * ratio).floor() as i64
}

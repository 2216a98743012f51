//! @acp:module "Requirement Validator"
//! @acp:summary "Eligibility checks over the projection and subsidy"
//! @acp:domain subsidy
//! @acp:layer logic
//!
//! A failing check is a valid outcome to surface, not an error.

use serde::{Deserialize, Serialize};

use super::projection::ThreeYearPlan;
use super::subsidy::SubsidyCalculation;
use crate::format::{signed_percent, thousands};

/// Minimum total eligible expense
pub const EXPENSE_FLOOR: i64 = 250_000;

/// @acp:summary "A growth requirement with its measured rate"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCheck {
    pub ok: bool,
    pub rate: f64,
    pub message: String,
}

/// @acp:summary "An amount requirement with its measured amount"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountCheck {
    pub ok: bool,
    pub amount: i64,
    pub message: String,
}

/// @acp:summary "Pass/fail eligibility report"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub added_value: RateCheck,
    pub salary: RateCheck,
    pub expense_min: AmountCheck,
    pub all_met: bool,
}

impl ValidationReport {
    /// Messages in report order with their outcome
    pub fn messages(&self) -> [(bool, &str); 3] {
        [
            (self.added_value.ok, self.added_value.message.as_str()),
            (self.salary.ok, self.salary.message.as_str()),
            (self.expense_min.ok, self.expense_min.message.as_str()),
        ]
    }
}

/// Run every check; none short-circuits another
pub fn validate(plan: &ThreeYearPlan, subsidy: &SubsidyCalculation) -> ValidationReport {
    let added_value = rate_check(
        "付加価値額",
        plan.added_value_increasing,
        plan.added_value_growth_rate,
    );
    let salary = rate_check("給与支給総額", plan.salary_increasing, plan.salary_growth_rate);

    let amount = subsidy.total_expense;
    let expense_ok = amount >= EXPENSE_FLOOR;
    let expense_min = AmountCheck {
        ok: expense_ok,
        amount,
        message: if expense_ok {
            format!("補助対象経費 {}円（25万円以上）", thousands(amount))
        } else {
            format!("補助対象経費が25万円未満です（{}円）", thousands(amount))
        },
    };

    let all_met = added_value.ok && salary.ok && expense_min.ok;
    ValidationReport {
        added_value,
        salary,
        expense_min,
        all_met,
    }
}

fn rate_check(subject: &str, ok: bool, rate: f64) -> RateCheck {
    let message = if ok {
        format!("{} {}%（3年間）", subject, signed_percent(rate))
    } else {
        format!("{}が増加していません（{}%）", subject, signed_percent(rate))
    };
    RateCheck { ok, rate, message }
}

//! @acp:module "Input Record"
//! @acp:summary "Structured interview record consumed by the engine"
//! @acp:domain subsidy
//! @acp:layer model
//!
//! The record is produced outside the engine (from the interview workbook) and
//! arrives as JSON or YAML. Every field is optional; malformed cells are
//! coerced instead of rejected (see [`coerce`]).

pub mod coerce;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::narrative::NarrativeSections;

const DEFAULT_REPRESENTATIVE_TITLE: &str = "代表取締役";

/// @acp:summary "Company profile"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyInfo {
    #[serde(deserialize_with = "coerce::text")]
    pub name: String,
    #[serde(deserialize_with = "coerce::text")]
    pub corporate_number: String,
    #[serde(deserialize_with = "coerce::text")]
    pub representative: String,
    #[serde(deserialize_with = "coerce::text")]
    pub representative_title: String,
    #[serde(deserialize_with = "coerce::text")]
    pub postal_code: String,
    #[serde(deserialize_with = "coerce::text")]
    pub address: String,
    #[serde(deserialize_with = "coerce::text")]
    pub phone: String,
    #[serde(deserialize_with = "coerce::text")]
    pub fax: String,
    #[serde(deserialize_with = "coerce::text")]
    pub email: String,
    #[serde(deserialize_with = "coerce::text")]
    pub industry: String,
    #[serde(deserialize_with = "coerce::text")]
    pub industry_code: String,
    #[serde(deserialize_with = "coerce::text")]
    pub business_description: String,
    #[serde(deserialize_with = "coerce::int")]
    pub employee_count: i64,
    /// Capital in thousands
    #[serde(deserialize_with = "coerce::int")]
    pub capital: i64,
    #[serde(deserialize_with = "coerce::text")]
    pub established_date: String,
    #[serde(deserialize_with = "coerce::int")]
    pub fiscal_month: i64,
    /// Free text, e.g. 中小企業 / 個人事業主 / その他法人
    #[serde(deserialize_with = "coerce::text")]
    pub entity_type: String,
    /// Free text, e.g. 10億円未満 / 10億円以上
    #[serde(deserialize_with = "coerce::text")]
    pub sales_category: String,
}

impl Default for CompanyInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            corporate_number: String::new(),
            representative: String::new(),
            representative_title: DEFAULT_REPRESENTATIVE_TITLE.to_string(),
            postal_code: String::new(),
            address: String::new(),
            phone: String::new(),
            fax: String::new(),
            email: String::new(),
            industry: String::new(),
            industry_code: String::new(),
            business_description: String::new(),
            employee_count: 0,
            capital: 0,
            established_date: String::new(),
            fiscal_month: 0,
            entity_type: String::new(),
            sales_category: String::new(),
        }
    }
}

/// @acp:summary "Impact of rising prices on the business"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceImpact {
    #[serde(deserialize_with = "coerce::text")]
    pub history: String,
    #[serde(deserialize_with = "coerce::text")]
    pub main_business: String,
    #[serde(deserialize_with = "coerce::text")]
    pub strengths: String,
    #[serde(deserialize_with = "coerce::text")]
    pub customers: String,
    #[serde(deserialize_with = "coerce::text")]
    pub achievements: String,
    #[serde(deserialize_with = "coerce::text")]
    pub material_name: String,
    #[serde(deserialize_with = "coerce::text")]
    pub price_increase_rate: String,
    #[serde(deserialize_with = "coerce::text")]
    pub monthly_cost_increase: String,
    #[serde(deserialize_with = "coerce::text")]
    pub energy_impact: String,
    #[serde(deserialize_with = "coerce::text")]
    pub labor_cost_impact: String,
    #[serde(deserialize_with = "coerce::text")]
    pub annual_total_increase: String,
    #[serde(deserialize_with = "coerce::text")]
    pub cost_to_sales_ratio: String,
    #[serde(deserialize_with = "coerce::text")]
    pub countermeasures: String,
    #[serde(deserialize_with = "coerce::text")]
    pub limitations: String,
}

/// @acp:summary "Descriptors of the subsidized project"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessPlan {
    #[serde(deserialize_with = "coerce::text")]
    pub project_name: String,
    #[serde(deserialize_with = "coerce::text")]
    pub purpose: String,
    #[serde(deserialize_with = "coerce::text")]
    pub method: String,
    #[serde(deserialize_with = "coerce::text")]
    pub current_field: String,
    #[serde(deserialize_with = "coerce::text")]
    pub plan_field: String,
    #[serde(deserialize_with = "coerce::text")]
    pub equipment_name: String,
    #[serde(deserialize_with = "coerce::text")]
    pub equipment_description: String,
    #[serde(deserialize_with = "coerce::text")]
    pub equipment_maker: String,
    #[serde(deserialize_with = "coerce::text")]
    pub selection_reason: String,
    #[serde(deserialize_with = "coerce::text")]
    pub before_process: String,
    #[serde(deserialize_with = "coerce::text")]
    pub after_process: String,
    #[serde(deserialize_with = "coerce::text")]
    pub comparison: String,
    #[serde(deserialize_with = "coerce::text")]
    pub schedule_order: String,
    #[serde(deserialize_with = "coerce::text")]
    pub schedule_delivery: String,
    #[serde(deserialize_with = "coerce::text")]
    pub schedule_start: String,
    #[serde(deserialize_with = "coerce::text")]
    pub schedule_complete: String,
}

/// @acp:summary "Expected effects of the investment"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectPlan {
    #[serde(deserialize_with = "coerce::int")]
    pub sales_increase_annual: i64,
    #[serde(deserialize_with = "coerce::text")]
    pub sales_increase_reason: String,
    #[serde(deserialize_with = "coerce::int")]
    pub cost_reduction_annual: i64,
    #[serde(deserialize_with = "coerce::text")]
    pub cost_reduction_reason: String,
    /// e.g. "7年"
    #[serde(deserialize_with = "coerce::text")]
    pub useful_life: String,
    #[serde(deserialize_with = "coerce::text")]
    pub maintenance: String,
    #[serde(deserialize_with = "coerce::text")]
    pub ease_of_operation: String,
    #[serde(deserialize_with = "coerce::text")]
    pub payback_estimate: String,
    #[serde(deserialize_with = "coerce::text")]
    pub regional_contribution: String,
    #[serde(deserialize_with = "coerce::text")]
    pub reference_for_others: String,
    #[serde(deserialize_with = "coerce::text")]
    pub other_notes: String,
}

/// @acp:summary "Wage increase commitment"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WagePlan {
    #[serde(deserialize_with = "coerce::text")]
    pub start_date: String,
    #[serde(deserialize_with = "coerce::text")]
    pub target_employees: String,
    #[serde(deserialize_with = "coerce::text")]
    pub method: String,
    #[serde(deserialize_with = "coerce::text")]
    pub amount: String,
    #[serde(deserialize_with = "coerce::int")]
    pub annual_increase: i64,
    #[serde(deserialize_with = "coerce::text")]
    pub funding_source: String,
}

/// @acp:summary "Most recent fiscal year, in thousands as entered on the sheet"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialInfo {
    #[serde(deserialize_with = "coerce::int")]
    pub sales: i64,
    #[serde(deserialize_with = "coerce::int")]
    pub operating_profit: i64,
    #[serde(deserialize_with = "coerce::int")]
    pub personnel_cost: i64,
    #[serde(deserialize_with = "coerce::int")]
    pub depreciation: i64,
    #[serde(deserialize_with = "coerce::int")]
    pub salary_total: i64,
    #[serde(deserialize_with = "coerce::int")]
    pub employee_count: i64,
}

impl Default for FinancialInfo {
    fn default() -> Self {
        Self {
            sales: 0,
            operating_profit: 0,
            personnel_cost: 0,
            depreciation: 0,
            salary_total: 0,
            employee_count: 1,
        }
    }
}

/// @acp:summary "One line of subsidy-eligible expense"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseItem {
    #[serde(deserialize_with = "coerce::text")]
    pub category: String,
    #[serde(alias = "item_name", deserialize_with = "coerce::text")]
    pub name: String,
    #[serde(deserialize_with = "coerce::int")]
    pub amount: i64,
    #[serde(deserialize_with = "coerce::flag")]
    pub has_quote: bool,
    #[serde(deserialize_with = "coerce::text")]
    pub note: String,
}

impl ExpenseItem {
    pub fn new(category: &str, name: &str, amount: i64, has_quote: bool) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            amount,
            has_quote,
            note: String::new(),
        }
    }
}

/// @acp:summary "Complete interview record for one application"
/// @acp:lock normal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputRecord {
    pub company: CompanyInfo,
    pub price_impact: PriceImpact,
    pub business: BusinessPlan,
    pub effect: EffectPlan,
    pub wage: WagePlan,
    pub financial: FinancialInfo,
    pub expenses: Vec<ExpenseItem>,
    /// Attached once narrative generation completes
    pub generated_texts: NarrativeSections,
}

impl InputRecord {
    /// @acp:summary "Load a record from a JSON or YAML file"
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let record: Self = serde_json::from_str(content)?;
        Ok(record.normalized())
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let record: Self = serde_yaml::from_str(content)?;
        Ok(record.normalized())
    }

    /// Apply the sheet's fallbacks for blank cells that have a non-empty default
    fn normalized(mut self) -> Self {
        if self.company.representative_title.trim().is_empty() {
            self.company.representative_title = DEFAULT_REPRESENTATIVE_TITLE.to_string();
        }
        if self.financial.employee_count == 0 {
            self.financial.employee_count = 1;
        }
        self
    }

    /// Attach narrative text produced by the generator
    pub fn with_generated_texts(mut self, texts: NarrativeSections) -> Self {
        self.generated_texts = texts;
        self
    }

    /// True when the applicant declared sales of 1 billion or more
    pub fn sales_over_threshold(&self) -> bool {
        let category = &self.company.sales_category;
        category.contains("10億") && category.contains("以上")
    }

    pub fn total_expense(&self) -> i64 {
        self.expenses
            .iter()
            .fold(0, |total: i64, e| total.saturating_add(e.amount))
    }

    pub fn has_quoted_expense(&self) -> bool {
        self.expenses.iter().any(|e| e.has_quote)
    }

    /// Useful life in years from text like "7年", or `default` when unusable
    pub fn useful_life_years(&self, default: i64) -> i64 {
        let raw = self.effect.useful_life.replace('年', "");
        match raw.trim().parse::<i64>() {
            Ok(years) if years > 0 => years,
            _ => default,
        }
    }

    /// Sales increase plus cost reduction per year
    pub fn annual_effect(&self) -> i64 {
        self.effect
            .sales_increase_annual
            .saturating_add(self.effect.cost_reduction_annual)
    }
}

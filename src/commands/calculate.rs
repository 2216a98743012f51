//! @acp:module "Calculate Command"
//! @acp:summary "Print projection, subsidy, payback and eligibility for a record"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use super::load_record;
use crate::assess::Assessment;
use crate::config::Config;
use crate::format::thousands;
use crate::plan::{Metric, RampMode, ThreeYearPlan};

/// Options for the calculate command
#[derive(Debug, Clone)]
pub struct CalculateOptions {
    /// Interview record (JSON or YAML)
    pub record: PathBuf,
    /// Output as JSON
    pub json: bool,
    /// Use the delayed ramp regardless of config
    pub delayed: bool,
}

const ROWS: &[(&str, Metric)] = &[
    ("売上高", Metric::Sales),
    ("営業利益", Metric::OperatingProfit),
    ("人件費", Metric::PersonnelCost),
    ("減価償却費", Metric::Depreciation),
    ("付加価値額", Metric::AddedValue),
    ("給与支給総額", Metric::SalaryTotal),
    ("従業員数", Metric::EmployeeCount),
];

/// Execute the calculate command
pub fn execute_calculate(options: CalculateOptions, config: &Config) -> Result<()> {
    let record = load_record(&options.record)?;
    let ramp = if options.delayed {
        RampMode::Delayed
    } else {
        config.ramp_mode
    };
    let assessment = Assessment::from_record(&record, config, ramp)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
        return Ok(());
    }

    let title = if record.company.name.is_empty() {
        "(名称未設定)"
    } else {
        record.company.name.as_str()
    };
    println!("{} {}\n", style("→").cyan(), style(title).bold());

    for line in plan_table(&assessment.plan) {
        println!("  {}", line);
    }

    println!(
        "\n  基準年度の付加価値率 {:.1}%",
        assessment.baseline.added_value_rate()
    );

    let subsidy = &assessment.subsidy;
    println!("\n{}", style("Subsidy:").bold());
    let scale = if subsidy.meets_half_million() {
        "50万円以上"
    } else {
        "50万円未満"
    };
    println!(
        "  補助対象経費  {:>14}円 ({})",
        thousands(subsidy.total_expense),
        scale
    );
    println!(
        "  補助金額      {:>14}円 (補助率 {:.0}%, 上限 {}円)",
        thousands(subsidy.subsidy_amount),
        subsidy.subsidy_rate * 100.0,
        thousands(subsidy.upper_limit)
    );
    println!("  自己負担      {:>14}円", thousands(subsidy.self_payment));
    println!(
        "  投資回収      {:>14}年 (年間効果 {}円, 耐用年数 {}年)",
        assessment.payback,
        thousands(assessment.annual_effect),
        assessment.useful_life
    );

    println!("\n{}", style("Requirements:").bold());
    for (ok, message) in assessment.validation.messages() {
        let mark = if ok { style("✓").green() } else { style("✗").red() };
        println!("  {} {}", mark, message);
    }

    if assessment.validation.all_met {
        println!("\n{} All requirements met", style("✓").green());
    } else {
        println!("\n{} Some requirements are not met", style("⚠").yellow());
    }

    Ok(())
}

/// Fixed-width text table of the plan, header first
fn plan_table(plan: &ThreeYearPlan) -> Vec<String> {
    let mut lines = Vec::with_capacity(ROWS.len() + 1);
    let header: String = plan
        .years()
        .iter()
        .map(|y| format!("{:>14}", y.label))
        .collect();
    lines.push(format!("{:<10}{}", "", header));

    for (label, metric) in ROWS {
        let values: String = plan
            .years()
            .iter()
            .map(|y| format!("{:>14}", thousands(y.metric(*metric))))
            .collect();
        lines.push(format!("{:<10}{}", label, values));
    }
    lines
}

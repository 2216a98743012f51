//! @acp:module "Business Plan"
//! @acp:summary "Field map for the business plan document (別紙1)"
//! @acp:domain documents
//! @acp:layer output
//!
//! Cells are addressed as (table, row, grid column). Templates that lack a
//! table, row or cell simply leave that edit unapplied.

use super::checkbox::Predicate;
use super::docx::{CellContent, DocumentFields};
use crate::format::thousands;
use crate::narrative::{NarrativeSections, SectionKey};
use crate::plan::{Metric, SubsidyCalculation, ThreeYearPlan};
use crate::record::InputRecord;

const PURPOSE_NEW_FIELD: &str = "新事業展開／事業分野拡大";
const PURPOSE_PRODUCTIVITY: &str = "生産性の向上";

const METHOD_LABELS: &[(Predicate, &str)] = &[
    (Predicate::Contains("機械設備"), "機械設備の導入・更新"),
    (Predicate::Contains("システム"), "システムの開発・導入"),
    (Predicate::Contains("改装"), "工場・店舗等の改装"),
];

/// Narrative sections by (table, row); the text goes in cell 1
const NARRATIVE_CELLS: &[(usize, usize, SectionKey)] = &[
    (4, 0, SectionKey::History),
    (4, 1, SectionKey::PriceImpact),
    (5, 0, SectionKey::ProjectContent),
    (5, 1, SectionKey::WagePlan),
    (6, 0, SectionKey::AddedValue),
    (6, 1, SectionKey::WageDetail),
    (6, 2, SectionKey::Sustainability),
    (6, 3, SectionKey::Effectiveness),
    (6, 4, SectionKey::Spillover),
    (6, 5, SectionKey::Other),
];

const PLAN_TABLE: usize = 8;
const EXPENSE_TABLE: usize = 10;
const EXPENSE_FIRST_ROW: usize = 2;
const EXPENSE_ROWS: usize = 15;

enum PlanRow {
    /// Amount in yen shown in thousands
    Thousands(Metric),
    /// Plain count
    Units(Metric),
    /// Change against the baseline
    Rate(Metric),
}

/// Rows 1..=9 of the income plan table
const PLAN_ROWS: [PlanRow; 9] = [
    PlanRow::Thousands(Metric::Sales),
    PlanRow::Thousands(Metric::OperatingProfit),
    PlanRow::Thousands(Metric::PersonnelCost),
    PlanRow::Thousands(Metric::Depreciation),
    PlanRow::Thousands(Metric::AddedValue),
    PlanRow::Rate(Metric::AddedValue),
    PlanRow::Thousands(Metric::SalaryTotal),
    PlanRow::Rate(Metric::SalaryTotal),
    PlanRow::Units(Metric::EmployeeCount),
];

/// @acp:summary "Table edits for the business plan"
pub fn fields(
    record: &InputRecord,
    plan: &ThreeYearPlan,
    subsidy: &SubsidyCalculation,
) -> DocumentFields {
    let mut f = DocumentFields::new();
    let business = &record.business;

    f.text(0, 0, 1, &record.company.name);

    f.text(1, 0, 1, &business.project_name)
        .text(1, 1, 1, format!("（{}）", business.current_field))
        .text(1, 2, 1, format!("（{}）", business.plan_field));

    let new_field = ["新事業展開", "事業分野拡大"]
        .iter()
        .any(|k| business.purpose.contains(k));
    f.push(
        2,
        0,
        1,
        CellContent::Glyphs(vec![
            (PURPOSE_NEW_FIELD.to_string(), new_field),
            (PURPOSE_PRODUCTIVITY.to_string(), !new_field),
        ]),
    );

    let methods = METHOD_LABELS
        .iter()
        .map(|(when, label)| (label.to_string(), when.matches(&business.method)))
        .collect();
    f.push(2, 1, 1, CellContent::Glyphs(methods));

    let high = record.sales_over_threshold();
    f.push(
        2,
        2,
        1,
        CellContent::Glyphs(vec![
            ("10億円未満".to_string(), !high),
            ("10億円以上".to_string(), high),
        ]),
    );

    if let Some(rate) = plan.change_rate(Metric::AddedValue, 3) {
        f.text(
            2,
            3,
            2,
            format!(
                "付加価値額増加率\n（{:.1}）％\n\n※「5全体の収支計画」における(b3)３年目の、⑥付加価値額の増加率を記載してください。",
                rate
            ),
        );
    }
    if let Some(rate) = plan.change_rate(Metric::SalaryTotal, 3) {
        f.text(
            2,
            4,
            2,
            format!(
                "※常時使用する従業員がいないを選択した場合は記入不要です。\n給与支給総額増加率\n（{:.1}）％\n\n※「5全体の収支計画」における（b3）３年目の、⑧給与支給総額の増加率を記載してください。",
                rate
            ),
        );
    }

    f.text(
        3,
        0,
        1,
        format!(
            "令和　{}　～　令和　{}",
            business.schedule_order, business.schedule_complete
        ),
    );

    narrative_cells(&mut f, &record.generated_texts);
    plan_table(&mut f, record, plan);
    expense_table(&mut f, record, subsidy);

    f
}

fn narrative_cells(f: &mut DocumentFields, texts: &NarrativeSections) {
    for (table, row, key) in NARRATIVE_CELLS {
        if let Some(text) = texts.get(*key) {
            f.push(*table, *row, 1, CellContent::Narrative(text.to_string()));
        }
    }
}

fn plan_table(f: &mut DocumentFields, record: &InputRecord, plan: &ThreeYearPlan) {
    let fiscal_month = record.company.fiscal_month;
    if fiscal_month != 0 {
        f.text(
            PLAN_TABLE,
            0,
            1,
            format!("申請時の直近期末(a)\n\n（R　年{}月期）", fiscal_month),
        );
    }

    for (i, row) in PLAN_ROWS.iter().enumerate() {
        let row_index = i + 1;
        for year in plan.years() {
            let col = year.year + 1;
            let text = match row {
                PlanRow::Thousands(metric) => Some(thousands(year.metric(*metric).div_euclid(1000))),
                PlanRow::Units(metric) => Some(thousands(year.metric(*metric))),
                PlanRow::Rate(_) if year.year == 0 => Some("―".to_string()),
                PlanRow::Rate(metric) => plan
                    .change_rate(*metric, year.year)
                    .map(|rate| format!("{:.1}%", rate)),
            };
            if let Some(text) = text {
                f.text(PLAN_TABLE, row_index, col, text);
            }
        }
    }
}

fn expense_table(f: &mut DocumentFields, record: &InputRecord, subsidy: &SubsidyCalculation) {
    for (i, expense) in record.expenses.iter().take(EXPENSE_ROWS).enumerate() {
        let row = EXPENSE_FIRST_ROW + i;
        f.text(EXPENSE_TABLE, row, 1, &expense.category)
            .text(EXPENSE_TABLE, row, 2, &expense.name)
            .text(EXPENSE_TABLE, row, 3, thousands(expense.amount));
    }
    let total_row = EXPENSE_FIRST_ROW + EXPENSE_ROWS;
    f.text(EXPENSE_TABLE, total_row, 3, thousands(subsidy.total_expense))
        .text(EXPENSE_TABLE, total_row + 1, 3, thousands(subsidy.subsidy_amount));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{calculate_subsidy, project, FinancialBaseline, PlannedEffects, RampMode};
    use crate::record::ExpenseItem;
    use pretty_assertions::assert_eq;

    fn text(f: &DocumentFields, table: usize, row: usize, cell: usize) -> Option<String> {
        match f.get(table, row, cell) {
            Some(CellContent::Text(t)) | Some(CellContent::Narrative(t)) => Some(t.clone()),
            _ => None,
        }
    }

    fn glyphs(f: &DocumentFields, table: usize, row: usize) -> Vec<(String, bool)> {
        match f.get(table, row, 1) {
            Some(CellContent::Glyphs(g)) => g.clone(),
            _ => Vec::new(),
        }
    }

    fn sample() -> (InputRecord, ThreeYearPlan, SubsidyCalculation) {
        let mut record = InputRecord::default();
        record.company.name = "讃岐製麺株式会社".to_string();
        record.company.fiscal_month = 3;
        record.business.purpose = "生産性向上".to_string();
        record.business.method = "機械設備とシステム".to_string();
        record.business.current_field = "製麺業".to_string();
        record.business.plan_field = "製麺業".to_string();
        record.business.schedule_order = "7年6月".to_string();
        record.business.schedule_complete = "7年12月".to_string();
        record.expenses = (0..17)
            .map(|i| ExpenseItem::new("機械装置", &format!("設備{}", i), 100_000, true))
            .collect();

        let base = FinancialBaseline::new(10_000_000, 500_000, 100_000, 3_000_000, 2_800_000, 5);
        let effects = PlannedEffects {
            sales_increase_annual: 1_200_000,
            wage_increase_annual: 200_000,
            new_depreciation: 100_000,
            ..Default::default()
        };
        let plan = project(&base, &effects, RampMode::Standard);
        let subsidy = calculate_subsidy(&record.expenses, false);
        (record, plan, subsidy)
    }

    #[test]
    fn test_header_tables() {
        let (record, plan, subsidy) = sample();
        let f = fields(&record, &plan, &subsidy);
        assert_eq!(text(&f, 0, 0, 1).as_deref(), Some("讃岐製麺株式会社"));
        assert_eq!(text(&f, 1, 1, 1).as_deref(), Some("（製麺業）"));
        assert_eq!(text(&f, 3, 0, 1).as_deref(), Some("令和　7年6月　～　令和　7年12月"));
    }

    #[test]
    fn test_glyph_rows() {
        let (record, plan, subsidy) = sample();
        let f = fields(&record, &plan, &subsidy);
        assert_eq!(
            glyphs(&f, 2, 0),
            vec![
                ("新事業展開／事業分野拡大".to_string(), false),
                ("生産性の向上".to_string(), true),
            ]
        );
        assert_eq!(
            glyphs(&f, 2, 1),
            vec![
                ("機械設備の導入・更新".to_string(), true),
                ("システムの開発・導入".to_string(), true),
                ("工場・店舗等の改装".to_string(), false),
            ]
        );
        assert_eq!(glyphs(&f, 2, 2)[0], ("10億円未満".to_string(), true));
    }

    #[test]
    fn test_growth_text_cells() {
        let (record, plan, subsidy) = sample();
        let f = fields(&record, &plan, &subsidy);
        let added = text(&f, 2, 3, 2).unwrap();
        assert!(added.starts_with("付加価値額増加率\n（14.4）％\n\n※"));
        let salary = text(&f, 2, 4, 2).unwrap();
        assert!(salary.contains("給与支給総額増加率\n（21.4）％"));
    }

    #[test]
    fn test_plan_table() {
        let (record, plan, subsidy) = sample();
        let f = fields(&record, &plan, &subsidy);
        assert_eq!(
            text(&f, 8, 0, 1).as_deref(),
            Some("申請時の直近期末(a)\n\n（R　年3月期）")
        );
        assert_eq!(text(&f, 8, 1, 1).as_deref(), Some("10,000"));
        assert_eq!(text(&f, 8, 1, 4).as_deref(), Some("11,200"));
        assert_eq!(text(&f, 8, 5, 4).as_deref(), Some("4,120"));
        assert_eq!(text(&f, 8, 6, 1).as_deref(), Some("―"));
        assert_eq!(text(&f, 8, 6, 4).as_deref(), Some("14.4%"));
        assert_eq!(text(&f, 8, 9, 2).as_deref(), Some("5"));
    }

    #[test]
    fn test_rate_rows_skip_non_positive_base() {
        let (record, _, subsidy) = sample();
        let plan = project(&FinancialBaseline::default(), &PlannedEffects::default(), RampMode::Standard);
        let f = fields(&record, &plan, &subsidy);
        assert_eq!(text(&f, 8, 6, 1).as_deref(), Some("―"));
        assert_eq!(f.get(8, 6, 2), None);
        assert_eq!(f.get(2, 3, 2), None);
        assert_eq!(f.get(2, 4, 2), None);
        assert_eq!(text(&f, 8, 1, 1).as_deref(), Some("0"));
    }

    #[test]
    fn test_expense_table_takes_first_fifteen() {
        let (record, plan, subsidy) = sample();
        let f = fields(&record, &plan, &subsidy);
        assert_eq!(text(&f, 10, 2, 2).as_deref(), Some("設備0"));
        assert_eq!(text(&f, 10, 16, 2).as_deref(), Some("設備14"));
        assert_eq!(text(&f, 10, 16, 3).as_deref(), Some("100,000"));
        assert_eq!(text(&f, 10, 17, 3).as_deref(), Some("1,700,000"));
        assert_eq!(text(&f, 10, 18, 3).as_deref(), Some("1,000,000"));
    }

    #[test]
    fn test_narrative_cells_only_for_present_keys() {
        let (mut record, plan, subsidy) = sample();
        let mut texts = NarrativeSections::new();
        texts.insert(SectionKey::Spillover, "地域の同業者に公開する。");
        record.generated_texts = texts;
        let f = fields(&record, &plan, &subsidy);
        assert_eq!(
            f.get(6, 4, 1),
            Some(&CellContent::Narrative("地域の同業者に公開する。".to_string()))
        );
        assert_eq!(f.get(4, 0, 1), None);
    }
}

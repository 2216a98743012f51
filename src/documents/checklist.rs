//! @acp:module "Checklist"
//! @acp:summary "Field map for the applicant self-check sheet (申請者別)"
//! @acp:domain documents
//! @acp:layer output
//!
//! Each rule ticks one row of the applicant's column when its precondition
//! holds. A box is only ever flipped from `□` to `☑`; anything else the
//! template holds stays as it is.

use super::checkbox::{select, Choice, Predicate};
use super::xlsx::SheetFields;
use crate::plan::{SubsidyCalculation, ThreeYearPlan, EXPENSE_FLOOR};
use crate::record::InputRecord;

pub const SHEET: &str = "申請者別";

/// Rows counted when reporting the checklist tally
pub const TALLY_ROWS: std::ops::RangeInclusive<u32> = 9..=66;

const DEFAULT_COLUMN: &str = "D";

const COLUMNS: &[Choice<&str>] = &[
    Choice::new(Predicate::ContainsAny(&["中堅", "中小"]), "D"),
    Choice::new(Predicate::Contains("その他"), "E"),
    Choice::new(Predicate::Contains("個人"), "F"),
];

/// Applicant column for an entity type, `D` when nothing matches
pub fn column_for(entity_type: &str) -> &'static str {
    select(entity_type, COLUMNS).unwrap_or(DEFAULT_COLUMN)
}

/// Rows whose precondition holds for this application, ascending
pub fn rows_to_check(
    record: &InputRecord,
    plan: &ThreeYearPlan,
    subsidy: &SubsidyCalculation,
) -> Vec<u32> {
    let company = &record.company;
    let business = &record.business;
    let has_expenses = !record.expenses.is_empty();
    let has_quote = record.has_quoted_expense();
    let set = |s: &str| !s.is_empty();

    let rules: [(&[u32], bool); 23] = [
        (&[9], company.address.contains("香川")),
        (&[10], set(&company.established_date)),
        (&[11], true),
        (&[13], has_expenses),
        (&[18], set(&company.corporate_number)),
        (&[20], set(&business.current_field) && set(&business.plan_field)),
        (&[21], set(&business.purpose) && set(&business.method)),
        (&[22], true),
        (&[23], set(&business.schedule_order) && set(&business.schedule_complete)),
        (&[24], set(&record.price_impact.material_name)),
        (&[25], set(&business.equipment_name)),
        (&[26], true),
        (&[27], set(&business.comparison)),
        (&[28], set(&record.wage.start_date)),
        (&[29], true),
        (
            &[30],
            set(&record.effect.sales_increase_reason) || set(&record.effect.cost_reduction_reason),
        ),
        (&[31, 32], plan.all_requirements_met),
        (&[33], has_expenses),
        (&[35, 36], true),
        (&[38], subsidy.total_expense >= EXPENSE_FLOOR),
        (&[39], subsidy.subsidy_amount > 0),
        (&[43, 44, 45], has_quote),
        (&[57, 58, 59], true),
    ];

    rules
        .iter()
        .filter(|(_, holds)| *holds)
        .flat_map(|(rows, _)| rows.iter().copied())
        .collect()
}

/// @acp:summary "Cell edits for the checklist"
pub fn fields(
    record: &InputRecord,
    plan: &ThreeYearPlan,
    subsidy: &SubsidyCalculation,
) -> SheetFields {
    let column = column_for(&record.company.entity_type);
    let mut f = SheetFields::new(SHEET);
    f.text("C4", &record.company.name);
    for row in rows_to_check(record, plan, subsidy) {
        f.check_if_blank(format!("{}{}", column, row));
    }
    f.tally = Some((column.to_string(), TALLY_ROWS));
    f
}

//! @acp:module "Application Form"
//! @acp:summary "Field map for the grant application workbook (様式１)"
//! @acp:domain documents
//! @acp:layer output

use super::checkbox::{select, Choice, Predicate, CHECKED, UNCHECKED};
use super::xlsx::SheetFields;
use crate::plan::SubsidyCalculation;
use crate::record::InputRecord;

pub const SHEET: &str = "様式１";

const ENTITY_BOXES: &[Choice<&str>] = &[
    Choice::new(Predicate::Contains("中堅"), "H26"),
    Choice::new(Predicate::Contains("中小"), "H27"),
    Choice::new(Predicate::Contains("個人"), "H28"),
    Choice::new(Predicate::Contains("その他"), "H30"),
];

const INDUSTRY_BOXES: &[Choice<&str>] = &[
    Choice::new(Predicate::ContainsAny(&["製造", "建設", "運輸"]), "P26"),
    Choice::new(Predicate::Contains("卸売"), "P27"),
    Choice::new(Predicate::ContainsAny(&["サービス", "飲食"]), "P28"),
    Choice::new(Predicate::Contains("小売"), "P29"),
    Choice::new(Predicate::Contains("その他"), "P30"),
];

/// One column per digit of the 13-digit corporate number
const CORPORATE_NUMBER_COLUMNS: [&str; 13] =
    ["H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T"];

/// @acp:summary "Cell assignments for the application form"
pub fn fields(record: &InputRecord, subsidy: &SubsidyCalculation) -> SheetFields {
    let company = &record.company;
    let mut f = SheetFields::new(SHEET);

    f.text("Z4", &company.postal_code)
        .text("Z5", &company.address)
        .text("Z6", &company.name)
        .text(
            "Z7",
            format!("{}　{}", company.representative_title, company.representative),
        );

    let (standard, high) = if record.sales_over_threshold() {
        (UNCHECKED, CHECKED)
    } else {
        (CHECKED, UNCHECKED)
    };
    f.text("B14", standard)
        .text("F14", high)
        .number("H14", subsidy.total_expense)
        .number("X14", subsidy.subsidy_amount);

    f.text("H18", &company.name);
    let postal = company.postal_code.replace('〒', "");
    let postal = postal.trim();
    match postal.split_once('-') {
        Some((head, tail)) => {
            let tail = tail.split('-').next().unwrap_or_default();
            f.text("I19", head).text("M19", tail);
        }
        None => {
            f.text("I19", postal);
        }
    }
    f.text("Q19", &company.address);

    f.text("H21", &company.representative_title)
        .text("H23", &company.representative)
        .text("H24", &company.phone)
        .text("AB24", &company.fax)
        .text("H25", &company.email);

    if let Some(cell) = select(&company.entity_type, ENTITY_BOXES).target() {
        f.text(cell, CHECKED);
    }
    if let Some(cell) = select(&company.industry, INDUSTRY_BOXES).target() {
        f.text(cell, CHECKED);
    }

    f.text("Y31", &company.industry)
        .number("H32", company.employee_count)
        .number("Z32", company.capital);

    let digits = company.corporate_number.replace('-', "");
    for (column, ch) in CORPORATE_NUMBER_COLUMNS.iter().zip(digits.trim().chars()) {
        f.text(format!("{}33", column), ch.to_string());
    }

    if !company.established_date.is_empty() {
        f.text("AA36", &company.established_date);
    }

    f
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::xlsx::{CellEdit, CellValue};
    use crate::plan::calculate_subsidy;
    use crate::record::ExpenseItem;

    fn text(f: &SheetFields, cell: &str) -> Option<String> {
        match f.get(cell) {
            Some(CellEdit::Set(CellValue::Text(t))) => Some(t.clone()),
            _ => None,
        }
    }

    fn number(f: &SheetFields, cell: &str) -> Option<i64> {
        match f.get(cell) {
            Some(CellEdit::Set(CellValue::Number(n))) => Some(*n),
            _ => None,
        }
    }

    fn record() -> InputRecord {
        let mut record = InputRecord::default();
        record.company.name = "讃岐製麺株式会社".to_string();
        record.company.representative = "香川太郎".to_string();
        record.company.postal_code = "〒760-0019".to_string();
        record.company.corporate_number = "1234-5678-9012-3".to_string();
        record.company.entity_type = "中小企業".to_string();
        record.company.industry = "食料品製造業".to_string();
        record.company.employee_count = 12;
        record.company.capital = 10_000;
        record.expenses = vec![ExpenseItem::new("機械装置", "製麺機", 1_000_000, true)];
        record
    }

    #[test]
    fn test_header_and_amounts() {
        let record = record();
        let subsidy = calculate_subsidy(&record.expenses, record.sales_over_threshold());
        let f = fields(&record, &subsidy);
        assert_eq!(f.sheet, "様式１");
        assert_eq!(text(&f, "Z7").as_deref(), Some("代表取締役　香川太郎"));
        assert_eq!(text(&f, "B14").as_deref(), Some("☑"));
        assert_eq!(text(&f, "F14").as_deref(), Some("□"));
        assert_eq!(number(&f, "H14"), Some(1_000_000));
        assert_eq!(number(&f, "X14"), Some(750_000));
        assert_eq!(number(&f, "H32"), Some(12));
        assert_eq!(number(&f, "Z32"), Some(10_000));
    }

    #[test]
    fn test_postal_code_split() {
        let mut record = record();
        let subsidy = calculate_subsidy(&record.expenses, false);
        let f = fields(&record, &subsidy);
        assert_eq!(text(&f, "I19").as_deref(), Some("760"));
        assert_eq!(text(&f, "M19").as_deref(), Some("0019"));

        record.company.postal_code = "7600019".to_string();
        let f = fields(&record, &subsidy);
        assert_eq!(text(&f, "I19").as_deref(), Some("7600019"));
        assert_eq!(f.get("M19"), None);
    }

    #[test]
    fn test_checkbox_rules() {
        let mut record = record();
        let subsidy = calculate_subsidy(&record.expenses, false);
        let f = fields(&record, &subsidy);
        assert_eq!(text(&f, "H27").as_deref(), Some("☑"));
        assert_eq!(f.get("H26"), None);
        assert_eq!(text(&f, "P26").as_deref(), Some("☑"));

        record.company.entity_type = "NPO".to_string();
        record.company.industry = "その他サービス".to_string();
        let f = fields(&record, &subsidy);
        for cell in ["H26", "H27", "H28", "H30"] {
            assert_eq!(f.get(cell), None);
        }
        assert_eq!(text(&f, "P28").as_deref(), Some("☑"));
        assert_eq!(f.get("P30"), None);

        record.company.industry = "その他".to_string();
        let f = fields(&record, &subsidy);
        assert_eq!(text(&f, "P30").as_deref(), Some("☑"));
    }

    #[test]
    fn test_corporate_number_digits_and_optional_date() {
        let mut record = record();
        let subsidy = calculate_subsidy(&record.expenses, false);
        let f = fields(&record, &subsidy);
        assert_eq!(text(&f, "H33").as_deref(), Some("1"));
        assert_eq!(text(&f, "T33").as_deref(), Some("3"));
        assert_eq!(f.get("AA36"), None);

        record.company.established_date = "1975年4月1日".to_string();
        let f = fields(&record, &subsidy);
        assert_eq!(text(&f, "AA36").as_deref(), Some("1975年4月1日"));
    }

    #[test]
    fn test_high_sales_tier() {
        let mut record = record();
        record.company.sales_category = "10億円以上".to_string();
        let subsidy = calculate_subsidy(&record.expenses, record.sales_over_threshold());
        let f = fields(&record, &subsidy);
        assert_eq!(text(&f, "B14").as_deref(), Some("□"));
        assert_eq!(text(&f, "F14").as_deref(), Some("☑"));
    }
}

//! Integration tests for document generation against minimal OOXML templates

use std::fs::File;
use std::path::Path;

use kagawa_mirai::documents::docx::Document;
use kagawa_mirai::documents::package::{write_package, Package};
use kagawa_mirai::documents::xlsx::Workbook;
use kagawa_mirai::documents::{
    bundle_directory, generate_all_documents, generate_document, DocumentKind,
};
use kagawa_mirai::narrative::{NarrativeSections, SectionKey};
use kagawa_mirai::{Assessment, Config, ExpenseItem, InputRecord, RampMode};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use zip::ZipArchive;

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"<Override PartName="/xl/calcChain.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.calcChain+xml"/>"#,
    r#"</Types>"#
);

const WORKBOOK_RELS: &str = concat!(
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
    r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/calcChain" Target="calcChain.xml"/>"#,
    r#"</Relationships>"#
);

/// Single-sheet workbook whose shared string 0 is `□`
fn write_workbook(path: &Path, sheet_name: &str, rows: &str) {
    let workbook = format!(
        concat!(
            r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#
        ),
        sheet_name
    );
    let sheet = format!("<worksheet><sheetData>{}</sheetData></worksheet>", rows);
    write_package(
        path,
        &[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("xl/workbook.xml", workbook.as_str()),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet1.xml", sheet.as_str()),
            ("xl/sharedStrings.xml", "<sst><si><t>□</t></si><si><t>済</t></si></sst>"),
            ("xl/calcChain.xml", r#"<calcChain><c r="X14" i="1"/></calcChain>"#),
        ],
    )
    .unwrap();
}

/// Document with eleven tables of 20 rows by 5 empty cells; table 2 row 0 holds purpose boxes
fn write_business_plan(path: &Path) {
    let cell = |text: &str| format!("<w:tc><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:tc>", text);
    let mut body = String::new();
    for table in 0..11 {
        body.push_str("<w:tbl>");
        for row in 0..20 {
            body.push_str("<w:tr>");
            for col in 0..5 {
                let text = if table == 2 && row == 0 && col == 1 {
                    "□新事業展開／事業分野拡大　□生産性の向上"
                } else {
                    ""
                };
                body.push_str(&cell(text));
            }
            body.push_str("</w:tr>");
        }
        body.push_str("</w:tbl><w:p/>");
    }
    let document = format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr/></w:body></w:document>"#,
        body
    );
    write_package(path, &[("word/document.xml", document.as_str())]).unwrap();
}

fn record() -> InputRecord {
    let mut record = InputRecord::default();
    record.company.name = "讃岐製麺株式会社".to_string();
    record.company.postal_code = "760-0001".to_string();
    record.company.address = "香川県高松市番町4-1-10".to_string();
    record.company.entity_type = "中小企業".to_string();
    record.company.fiscal_month = 3;
    record.financial.sales = 10_000;
    record.financial.operating_profit = 500;
    record.financial.depreciation = 100;
    record.financial.personnel_cost = 3_000;
    record.financial.salary_total = 2_800;
    record.financial.employee_count = 5;
    record.effect.sales_increase_annual = 1_200_000;
    record.effect.useful_life = "5年".to_string();
    record.wage.annual_increase = 200_000;
    record.expenses = vec![ExpenseItem::new("機械装置", "製麺機", 500_000, true)];
    record
}

fn assess(record: &InputRecord) -> Assessment {
    Assessment::from_record(record, &Config::default(), RampMode::Standard).unwrap()
}

fn cell(path: &Path, sheet: &str, cell: &str) -> Option<String> {
    let book = Workbook::open(path).unwrap();
    book.worksheet(sheet).unwrap().value(cell).unwrap()
}

#[test]
fn test_application_form_is_filled() {
    let dir = TempDir::new().unwrap();
    let (templates, output) = (dir.path().join("templates"), dir.path().join("output"));
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::create_dir_all(&output).unwrap();
    write_workbook(&templates.join("02_kofushinseisho.xlsx"), "様式１", "");

    let record = record();
    let a = assess(&record);
    let path = generate_document(
        DocumentKind::ApplicationForm,
        &record,
        &output,
        &templates,
        &a.subsidy,
        &a.plan,
    )
    .unwrap()
    .unwrap();

    assert_eq!(path, output.join("交付申請書_完成版.xlsx"));
    assert_eq!(cell(&path, "様式１", "Z6").as_deref(), Some("讃岐製麺株式会社"));
    assert_eq!(cell(&path, "様式１", "B14").as_deref(), Some("☑"));
    assert_eq!(cell(&path, "様式１", "F14").as_deref(), Some("□"));
    assert_eq!(cell(&path, "様式１", "H14").as_deref(), Some("500000"));
    assert_eq!(cell(&path, "様式１", "X14").as_deref(), Some("375000"));
    assert_eq!(cell(&path, "様式１", "I19").as_deref(), Some("760"));
    assert_eq!(cell(&path, "様式１", "M19").as_deref(), Some("0001"));
    assert_eq!(cell(&path, "様式１", "H27").as_deref(), Some("☑"));

    // Template is untouched
    let template = templates.join("02_kofushinseisho.xlsx");
    assert_eq!(cell(&template, "様式１", "Z6"), None);
}

#[test]
fn test_edited_workbook_drops_calc_chain() {
    let dir = TempDir::new().unwrap();
    write_workbook(&dir.path().join("02_kofushinseisho.xlsx"), "様式１", "");

    let record = record();
    let a = assess(&record);
    let path = generate_document(
        DocumentKind::ApplicationForm,
        &record,
        dir.path(),
        dir.path(),
        &a.subsidy,
        &a.plan,
    )
    .unwrap()
    .unwrap();

    let package = Package::open(&path).unwrap();
    assert!(!package.has_part("xl/calcChain.xml"));
    assert!(!package.part("[Content_Types].xml").unwrap().contains("calcChain"));
    assert!(!package.part("xl/_rels/workbook.xml.rels").unwrap().contains("calcChain"));
    assert!(package.part("xl/_rels/workbook.xml.rels").unwrap().contains("sharedStrings"));
}

#[test]
fn test_checklist_only_ticks_blank_boxes() {
    let dir = TempDir::new().unwrap();
    let mut rows = String::new();
    for row in 9..=66 {
        let c = match row {
            9 => format!(r#"<c r="D{}" t="inlineStr"><is><t>☑</t></is></c>"#, row),
            22 => format!(r#"<c r="D{}" t="s"><v>1</v></c>"#, row),
            _ => format!(r#"<c r="D{}" s="3" t="s"><v>0</v></c>"#, row),
        };
        rows.push_str(&format!(r#"<row r="{}">{}</row>"#, row, c));
    }
    write_workbook(&dir.path().join("05_checklist.xlsx"), "申請者別", &rows);

    let record = record();
    let a = assess(&record);
    let path = generate_document(
        DocumentKind::Checklist,
        &record,
        dir.path(),
        dir.path(),
        &a.subsidy,
        &a.plan,
    )
    .unwrap()
    .unwrap();

    let book = Workbook::open(&path).unwrap();
    let sheet = book.worksheet("申請者別").unwrap();
    assert_eq!(sheet.value("C4").unwrap().as_deref(), Some("讃岐製麺株式会社"));
    // Already checked and otherwise-valued cells are kept
    assert_eq!(sheet.value("D9").unwrap().as_deref(), Some("☑"));
    assert_eq!(sheet.value("D22").unwrap().as_deref(), Some("済"));
    // Unconditional row is ticked, unmet precondition keeps its box
    assert_eq!(sheet.value("D11").unwrap().as_deref(), Some("☑"));
    assert_eq!(sheet.value("D10").unwrap().as_deref(), Some("□"));
    assert_eq!(sheet.value("D27").unwrap().as_deref(), Some("□"));
    // Requirements met and quote present
    assert_eq!(sheet.value("D31").unwrap().as_deref(), Some("☑"));
    assert_eq!(sheet.value("D43").unwrap().as_deref(), Some("☑"));
    assert!(sheet.xml().contains(r#"<c r="D11" s="3" t="inlineStr">"#));
}

#[test]
fn test_business_plan_tables_are_filled() {
    let dir = TempDir::new().unwrap();
    write_business_plan(&dir.path().join("03_keikakusho.docx"));

    let mut texts = NarrativeSections::new();
    texts.insert(SectionKey::History, "昭和48年創業。\n地元の小麦を使う。");
    let record = record().with_generated_texts(texts);
    let a = assess(&record);
    let path = generate_document(
        DocumentKind::BusinessPlan,
        &record,
        dir.path(),
        dir.path(),
        &a.subsidy,
        &a.plan,
    )
    .unwrap()
    .unwrap();

    let package = Package::open(&path).unwrap();
    let doc = Document::from_xml(package.part("word/document.xml").unwrap());
    assert_eq!(doc.table_count(), 11);
    assert_eq!(doc.cell_text(0, 0, 1).as_deref(), Some("讃岐製麺株式会社"));
    assert_eq!(
        doc.cell_text(2, 0, 1).as_deref(),
        Some("□新事業展開／事業分野拡大　☑生産性の向上")
    );
    assert_eq!(
        doc.cell_text(4, 0, 1).as_deref(),
        Some("昭和48年創業。\n地元の小麦を使う。")
    );
    assert!(doc.xml().contains("游ゴシック"));

    // Sales in thousands for the baseline and year 3, then the added value rate
    assert_eq!(doc.cell_text(8, 1, 1).as_deref(), Some("10,000"));
    assert_eq!(doc.cell_text(8, 1, 4).as_deref(), Some("11,200"));
    assert_eq!(doc.cell_text(8, 6, 1).as_deref(), Some("―"));
    assert_eq!(doc.cell_text(8, 6, 4).as_deref(), Some("14.4%"));

    assert_eq!(doc.cell_text(10, 2, 2).as_deref(), Some("製麺機"));
    assert_eq!(doc.cell_text(10, 17, 3).as_deref(), Some("500,000"));
    assert_eq!(doc.cell_text(10, 18, 3).as_deref(), Some("375,000"));
}

#[test]
fn test_missing_templates_are_skipped() {
    let dir = TempDir::new().unwrap();
    let (templates, output) = (dir.path().join("templates"), dir.path().join("output"));
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::write(templates.join("04_seiyakusho.pdf"), "%PDF-1.4").unwrap();

    let record = record();
    let a = assess(&record);
    let mut seen = Vec::new();
    let outcomes = generate_all_documents(
        &record,
        &output,
        &templates,
        &a.subsidy,
        &a.plan,
        |index, total, kind| seen.push((index, total, kind)),
    )
    .unwrap();

    assert_eq!(
        seen,
        vec![
            (1, 4, DocumentKind::ApplicationForm),
            (2, 4, DocumentKind::BusinessPlan),
            (3, 4, DocumentKind::Pledge),
            (4, 4, DocumentKind::Checklist),
        ]
    );
    let found: Vec<bool> = outcomes
        .iter()
        .map(|(_, outcome)| matches!(outcome, Ok(Some(_))))
        .collect();
    assert_eq!(found, vec![false, false, true, false]);
    assert!(outcomes.iter().all(|(_, outcome)| outcome.is_ok()));
    assert_eq!(
        std::fs::read_to_string(output.join("誓約書.pdf")).unwrap(),
        "%PDF-1.4"
    );
}

#[test]
fn test_failed_stage_does_not_stop_pipeline() {
    let dir = TempDir::new().unwrap();
    let (templates, output) = (dir.path().join("templates"), dir.path().join("output"));
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::write(templates.join("02_kofushinseisho.xlsx"), "not a package").unwrap();
    std::fs::write(templates.join("04_seiyakusho.pdf"), "%PDF-1.4").unwrap();

    let record = record();
    let a = assess(&record);
    let outcomes =
        generate_all_documents(&record, &output, &templates, &a.subsidy, &a.plan, |_, _, _| {})
            .unwrap();

    assert!(outcomes[0].1.is_err());
    assert!(matches!(outcomes[2].1, Ok(Some(_))));
    // The half-written copy is cleaned up
    assert!(!output.join("交付申請書_完成版.xlsx").exists());
}

#[test]
fn test_bundle_generated_output() {
    let dir = TempDir::new().unwrap();
    let (templates, output) = (dir.path().join("templates"), dir.path().join("output"));
    std::fs::create_dir_all(&templates).unwrap();
    write_workbook(&templates.join("02_kofushinseisho.xlsx"), "様式１", "");
    std::fs::write(templates.join("04_seiyakusho.pdf"), "%PDF-1.4").unwrap();

    let record = record();
    let a = assess(&record);
    generate_all_documents(&record, &output, &templates, &a.subsidy, &a.plan, |_, _, _| {})
        .unwrap();

    let archive = output.join("bundle.zip");
    bundle_directory(&output, &archive).unwrap();
    let zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
    let mut names: Vec<&str> = zip.file_names().collect();
    names.sort();
    assert_eq!(names, vec!["交付申請書_完成版.xlsx", "誓約書.pdf"]);
}

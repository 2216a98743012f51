//! End-to-end tests from a record file through assessment and narrative generation

use kagawa_mirai::narrative::{generate_texts, NarrativeSections, SectionKey};
use kagawa_mirai::{Assessment, Config, InputRecord, Payback, RampMode, Result};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const RECORD_JSON: &str = r#"{
    "company": {
        "name": "讃岐製麺株式会社",
        "address": "香川県高松市番町4-1-10",
        "entity_type": "中小企業",
        "sales_category": "10億円未満",
        "fiscal_month": "3"
    },
    "financial": {
        "sales": "10,000",
        "operating_profit": 500,
        "depreciation": 100,
        "personnel_cost": 3000,
        "salary_total": 2800,
        "employee_count": 5
    },
    "effect": {
        "sales_increase_annual": "1,200,000",
        "useful_life": "5年"
    },
    "wage": {"annual_increase": 200000},
    "expenses": [
        {"category": "機械装置", "item_name": "製麺機", "amount": 500000, "has_quote": true}
    ]
}"#;

#[test]
fn test_record_file_to_assessment() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("record.json");
    std::fs::write(&path, RECORD_JSON).unwrap();

    let record = InputRecord::load(&path).unwrap();
    let assessment = Assessment::from_record(&record, &Config::default(), RampMode::Standard).unwrap();

    let years = assessment.plan.years();
    assert_eq!(years.len(), 4);
    assert_eq!(years[0].added_value, 3_600_000);
    assert_eq!(years[1].sales, 10_600_000);
    assert_eq!(years[3].added_value, 4_120_000);
    assert!(assessment.validation.all_met);

    assert_eq!(assessment.subsidy.subsidy_amount, 375_000);
    assert_eq!(assessment.subsidy.self_payment, 125_000);
    // 125,000 / 1,200,000 = 0.104..
    assert_eq!(assessment.payback, Payback::Years(0.1));
}

#[test]
fn test_delayed_ramp_defers_sales() {
    let record = InputRecord::from_json_str(RECORD_JSON).unwrap();
    let assessment = Assessment::from_record(&record, &Config::default(), RampMode::Delayed).unwrap();
    let years = assessment.plan.years();
    assert_eq!(years[1].sales, 10_000_000);
    assert_eq!(years[2].sales, 10_840_000);
    assert_eq!(years[3].sales, 11_200_000);
}

#[test]
fn test_config_file_changes_units() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join(".kagawa.config.json");
    std::fs::write(&config_path, r#"{"baseline_unit": 1, "default_useful_life": 10}"#).unwrap();
    let config = Config::load(&config_path).unwrap();

    let mut record = InputRecord::from_json_str(RECORD_JSON).unwrap();
    record.effect.useful_life = String::new();
    let assessment = Assessment::from_record(&record, &config, config.ramp_mode).unwrap();

    assert_eq!(assessment.baseline.sales, 10_000);
    assert_eq!(assessment.useful_life, 10);
    assert_eq!(assessment.effects.new_depreciation, 50_000);
}

#[test]
fn test_generated_sections_round_trip_through_file() {
    let record = InputRecord::from_json_str(RECORD_JSON).unwrap();
    let stub = |_system: &str, user: &str| -> Result<String> {
        assert!(user.contains("讃岐製麺株式会社"));
        Ok(concat!(
            "以下の通り作成しました。\n```json\n",
            r#"{"section_2_1": "昭和48年創業の製麺所。", "section_4_3": "十年以上使える。", "draft": "x"}"#,
            "\n```"
        )
        .to_string())
    };
    let sections = generate_texts(&record, &stub).unwrap();
    assert_eq!(sections.len(), 2);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sections.json");
    std::fs::write(&path, serde_json::to_string_pretty(&sections).unwrap()).unwrap();
    let loaded: NarrativeSections =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded, sections);

    let record = record.with_generated_texts(loaded);
    assert_eq!(
        record.generated_texts.get(SectionKey::History),
        Some("昭和48年創業の製麺所。")
    );
    assert!(!record.generated_texts.contains(SectionKey::Other));
}

#[test]
fn test_unparsable_response_yields_no_sections() {
    let record = InputRecord::default();
    let stub = |_: &str, _: &str| -> Result<String> { Ok("申し訳ありません。".to_string()) };
    let sections = generate_texts(&record, &stub).unwrap();
    assert!(sections.is_empty());
}

//! @acp:module "Narrative Prompt"
//! @acp:summary "Assemble the generation prompt from the interview record"
//! @acp:domain subsidy
//! @acp:layer output

use handlebars::Handlebars;
use serde_json::json;

use crate::error::Result;
use crate::format::thousands;
use crate::record::InputRecord;

pub const SYSTEM_PROMPT: &str = "あなたは補助金申請の専門家です。
香川県未来投資応援補助金の事業計画書を作成してください。

【審査のポイント】（書面審査のみ）
1. 付加価値額の増加が具体的に計画されているか
2. 賃上げの取組みが具体的かつ実現可能か
3. 補助事業終了後も効果が持続するか
4. 費用対効果が高く具体的な成果が見込めるか
5. 他事業者や地域への波及効果があるか

【最重要: 文章のトーン】
- 経営者が自ら書いた文章に見せる（AI臭を出さない）
- 「〜に取り組む」「〜と考えている」等の簡潔な文末
- 1文1意の原則（1つの文に1つのメッセージ）
- 数字は具体的だが誇張しない
- 補助金の規模感（上限100万円）に合った記述
- 専門用語を避け平易な言葉で
- 1文は60字以内が目安

【絶対に使わない表現】
- 「推進してまいります」「寄与するものと確信」
- 「革新的」「画期的」「飛躍的」
- 「総合的」「包括的」「戦略的」
- 「シナジー効果」「パラダイムシフト」
- 動詞の連鎖（「〜し、〜を実現し、〜に貢献する」）

【推奨する表現】
- 「〜である。」「〜と考えている。」
- 「〜に取り組む。」「〜を計画している。」
- 業界固有の言い回し
- たまに短い文を入れる「これが課題である。」
";

const FULL_PLAN_TEMPLATE: &str = "
以下の企業情報・ヒアリングデータを基に、香川県未来投資応援補助金の事業計画書（別紙1）の
セクション2〜4の全文を一括で生成してください。

セクション5（収支計画）とセクション6（経費一覧）は自動計算するため不要です。

### 企業・事業情報
{{{all_data}}}

### 出力形式
以下のJSON形式で出力してください：

```json
{
  \"section_2_1\": \"会社の沿革やこれまでの既存事業の内容（400字程度）\",
  \"section_2_2\": \"物価高騰による経営面等への影響（400字程度）\",
  \"section_3_1\": \"事業の内容（500字程度）\",
  \"section_3_2\": \"賃上げの具体的な計画（200字程度）\",
  \"section_4_1\": \"付加価値額の増加（300字程度）\",
  \"section_4_2\": \"賃上げの内容（100字程度）\",
  \"section_4_3\": \"持続性（150字程度）\",
  \"section_4_4\": \"有効性（150字程度）\",
  \"section_4_5\": \"波及性（150字程度）\",
  \"section_4_6\": \"その他特筆すべき事項（100字程度、なければ空文字）\"
}
```

### 文字数の目標合計: 2,500〜3,500字

{{{system_prompt}}}
";

/// `- label: value` lines for the non-empty values
fn format_lines(fields: &[(&str, String)]) -> String {
    fields
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| format!("- {}: {}", label, value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn yen(amount: i64) -> String {
    format!("{}円", thousands(amount))
}

fn company_lines(record: &InputRecord) -> String {
    let c = &record.company;
    let p = &record.price_impact;
    let capital = if c.capital != 0 {
        format!("{}千円", thousands(c.capital))
    } else {
        String::new()
    };
    format_lines(&[
        ("会社名", c.name.clone()),
        ("業種", c.industry.clone()),
        ("事業内容", c.business_description.clone()),
        ("従業員数", format!("{}名", c.employee_count)),
        ("設立年月日", c.established_date.clone()),
        ("資本金", capital),
        ("創業からの経緯", p.history.clone()),
        ("特徴・強み", p.strengths.clone()),
        ("主な顧客・取引先", p.customers.clone()),
        ("実績・評価", p.achievements.clone()),
    ])
}

fn price_impact_lines(record: &InputRecord) -> String {
    let p = &record.price_impact;
    format_lines(&[
        ("影響が大きい原材料名", p.material_name.clone()),
        ("価格上昇率", p.price_increase_rate.clone()),
        ("月額コスト増", p.monthly_cost_increase.clone()),
        ("エネルギーコストの影響", p.energy_impact.clone()),
        ("人件費の上昇影響", p.labor_cost_impact.clone()),
        ("年間合計コスト増", p.annual_total_increase.clone()),
        ("売上高に対する割合", p.cost_to_sales_ratio.clone()),
        ("これまでの対策", p.countermeasures.clone()),
        ("対策の限界", p.limitations.clone()),
    ])
}

fn business_lines(record: &InputRecord) -> String {
    let b = &record.business;
    format_lines(&[
        ("事業名", b.project_name.clone()),
        ("目的", b.purpose.clone()),
        ("手法", b.method.clone()),
        ("設備名称", b.equipment_name.clone()),
        ("設備の概要・特徴", b.equipment_description.clone()),
        ("選定理由", b.selection_reason.clone()),
        ("現在の作業方法（Before）", b.before_process.clone()),
        ("導入後の変化（After）", b.after_process.clone()),
        ("発注予定日", b.schedule_order.clone()),
        ("納品・設置予定日", b.schedule_delivery.clone()),
        ("稼働開始予定日", b.schedule_start.clone()),
        ("事業完了予定日", b.schedule_complete.clone()),
    ])
}

fn effect_lines(record: &InputRecord) -> String {
    let e = &record.effect;
    format_lines(&[
        ("年間売上増加見込み", yen(e.sales_increase_annual)),
        ("売上増加の根拠", e.sales_increase_reason.clone()),
        ("年間コスト削減見込み", yen(e.cost_reduction_annual)),
        ("コスト削減の根拠", e.cost_reduction_reason.clone()),
        ("設備の耐用年数", e.useful_life.clone()),
        ("メンテナンス体制", e.maintenance.clone()),
        ("操作の容易さ", e.ease_of_operation.clone()),
        ("投資回収の見込み", e.payback_estimate.clone()),
        ("地域への貢献", e.regional_contribution.clone()),
        ("他事業者への参考", e.reference_for_others.clone()),
        ("その他特筆すべき事項", e.other_notes.clone()),
    ])
}

fn wage_lines(record: &InputRecord) -> String {
    let w = &record.wage;
    format_lines(&[
        ("賃上げ開始時期", w.start_date.clone()),
        ("対象者", w.target_employees.clone()),
        ("賃上げ方法", w.method.clone()),
        ("具体的な金額", w.amount.clone()),
        ("年間給与支給総額増加額", yen(w.annual_increase)),
        ("賃上げの原資", w.funding_source.clone()),
    ])
}

/// @acp:summary "Render the single user message sent to the generator"
pub fn build_full_prompt(record: &InputRecord) -> Result<String> {
    let all_data = [
        "## 企業基本情報".to_string(),
        company_lines(record),
        "\n## 物価高騰の影響".to_string(),
        price_impact_lines(record),
        "\n## 補助事業の内容".to_string(),
        business_lines(record),
        "\n## 補助事業の効果".to_string(),
        effect_lines(record),
        "\n## 賃上げ計画".to_string(),
        wage_lines(record),
    ]
    .join("\n");

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.register_template_string("full_plan", FULL_PLAN_TEMPLATE)?;

    let rendered = handlebars.render(
        "full_plan",
        &json!({
            "all_data": all_data,
            "system_prompt": SYSTEM_PROMPT,
        }),
    )?;
    Ok(rendered)
}

//! @acp:module "Checkbox Selection"
//! @acp:summary "Keyword rules that pick which box to tick"
//! @acp:domain documents
//! @acp:layer logic
//!
//! Selection is an ordered list of (predicate, target) pairs; the first
//! matching predicate wins and no match is an explicit outcome.

pub const CHECKED: &str = "☑";
pub const UNCHECKED: &str = "□";

/// Box glyphs a template may already carry in front of a label
const BOX_GLYPHS: &[char] = &['□', '☐', '☑', '■', '☒'];

/// @acp:summary "Keyword test over free text"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Contains(&'static str),
    ContainsAny(&'static [&'static str]),
    Always,
}

impl Predicate {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Predicate::Contains(keyword) => text.contains(keyword),
            Predicate::ContainsAny(keywords) => keywords.iter().any(|k| text.contains(k)),
            Predicate::Always => true,
        }
    }
}

/// @acp:summary "A predicate paired with what it selects"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice<T> {
    pub when: Predicate,
    pub target: T,
}

impl<T> Choice<T> {
    pub const fn new(when: Predicate, target: T) -> Self {
        Self { when, target }
    }
}

/// @acp:summary "Outcome of a first-match selection"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<T> {
    Match(T),
    NoMatch,
}

impl<T> Selection<T> {
    pub fn unwrap_or(self, fallback: T) -> T {
        match self {
            Selection::Match(target) => target,
            Selection::NoMatch => fallback,
        }
    }

    pub fn target(self) -> Option<T> {
        match self {
            Selection::Match(target) => Some(target),
            Selection::NoMatch => None,
        }
    }
}

/// First choice whose predicate matches `text`
pub fn select<T: Copy>(text: &str, choices: &[Choice<T>]) -> Selection<T> {
    choices
        .iter()
        .find(|c| c.when.matches(text))
        .map(|c| Selection::Match(c.target))
        .unwrap_or(Selection::NoMatch)
}

/// @acp:summary "Set the box glyph in front of every occurrence of `label`"
///
/// The glyph is looked up behind the label, skipping whitespace. When none
/// is there, `{glyph} ` is inserted directly before the label.
pub fn toggle_glyph(text: &str, label: &str, checked: bool) -> String {
    if label.is_empty() {
        return text.to_string();
    }
    let glyph = if checked { CHECKED } else { UNCHECKED };

    let mut out = String::with_capacity(text.len() + 8);
    let mut rest = text;
    while let Some(found) = rest.find(label) {
        let before = &rest[..found];
        let trimmed = before.trim_end();
        match trimmed.chars().last() {
            Some(c) if BOX_GLYPHS.contains(&c) => {
                let glyph_at = trimmed.len() - c.len_utf8();
                out.push_str(&before[..glyph_at]);
                out.push_str(glyph);
                out.push_str(&before[trimmed.len()..]);
            }
            _ => {
                out.push_str(before);
                out.push_str(glyph);
                out.push(' ');
            }
        }
        out.push_str(label);
        rest = &rest[found + label.len()..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTITY: &[Choice<&str>] = &[
        Choice::new(Predicate::Contains("中堅"), "H26"),
        Choice::new(Predicate::Contains("中小"), "H27"),
        Choice::new(Predicate::Contains("個人"), "H28"),
    ];

    #[test]
    fn test_first_match_wins() {
        assert_eq!(select("中小企業", ENTITY), Selection::Match("H27"));
        assert_eq!(select("中堅・中小", ENTITY), Selection::Match("H26"));
        assert_eq!(select("NPO法人", ENTITY), Selection::NoMatch);
        assert_eq!(select("NPO法人", ENTITY).unwrap_or("D"), "D");
        assert_eq!(select("個人事業主", ENTITY).target(), Some("H28"));
    }

    #[test]
    fn test_any_and_always() {
        assert!(Predicate::ContainsAny(&["製造", "建設"]).matches("建設業"));
        assert!(!Predicate::ContainsAny(&["製造", "建設"]).matches("小売業"));
        assert!(Predicate::Always.matches(""));
    }

    #[test]
    fn test_toggle_replaces_existing_glyph() {
        assert_eq!(toggle_glyph("□ 10億円未満　☑ 10億円以上", "10億円未満", true), "☑ 10億円未満　☑ 10億円以上");
        assert_eq!(toggle_glyph("☐10億円以上", "10億円以上", false), "□10億円以上");
        assert_eq!(toggle_glyph("■　生産性の向上", "生産性の向上", true), "☑　生産性の向上");
    }

    #[test]
    fn test_toggle_inserts_when_no_glyph() {
        assert_eq!(
            toggle_glyph("機械設備の導入・更新、システムの開発・導入", "システムの開発・導入", true),
            "機械設備の導入・更新、☑ システムの開発・導入"
        );
        assert_eq!(toggle_glyph("改装なし", "工場・店舗等の改装", true), "改装なし");
        assert_eq!(toggle_glyph("A / A", "A", false), "□ A / □ A");
    }
}

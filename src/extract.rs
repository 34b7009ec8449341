//! Recovery of recommendation stubs from sanitized completion text.
//!
//! Three increasingly lenient tiers are tried in order and the first one that
//! yields at least one stub wins:
//!
//! 1. strict JSON parse of the outermost `[...]` span
//! 2. the same span after syntax repair (trailing commas, stray whitespace)
//! 3. a field pattern scan over the whole text
//!
//! Nothing is guessed: a stub only exists if its fields were found in the text.

use crate::model::RecommendationStub;
use crate::sanitize::sanitize;
use log::{debug, info, warn};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static RE_TRAILING_COMMA_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\]").expect("valid trailing comma pattern"));

static RE_TRAILING_COMMA_BRACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\}").expect("valid trailing comma pattern"));

static RE_LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\n\r\t]").expect("valid line break pattern"));

static RE_WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

static RE_STUB_FIELDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#""title"\s*:\s*"([^"]+)"[^}]*"titleTr"\s*:\s*"([^"]+)"[^}]*"year"\s*:\s*"?(\d{3,4})"?[^}]*"reason"\s*:\s*"([^"]+)""#,
    )
    .expect("valid stub field pattern")
});

/// Outcome of [`extract`], tagged with the tier that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Bracketed span parsed as-is
    Strict(Vec<RecommendationStub>),
    /// Bracketed span parsed after repair
    Repaired(Vec<RecommendationStub>),
    /// Fields recovered by pattern scan
    PatternRecovered(Vec<RecommendationStub>),
    /// Nothing recoverable
    Failed,
}

impl Extraction {
    /// Short name of the tier, for logging
    pub fn tier(&self) -> &'static str {
        match self {
            Extraction::Strict(_) => "strict",
            Extraction::Repaired(_) => "repaired",
            Extraction::PatternRecovered(_) => "pattern",
            Extraction::Failed => "failed",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Extraction::Failed)
    }

    pub fn stubs(&self) -> &[RecommendationStub] {
        match self {
            Extraction::Strict(stubs)
            | Extraction::Repaired(stubs)
            | Extraction::PatternRecovered(stubs) => stubs,
            Extraction::Failed => &[],
        }
    }

    /// Consume into the recovered stubs; empty when extraction failed.
    pub fn into_stubs(self) -> Vec<RecommendationStub> {
        match self {
            Extraction::Strict(stubs)
            | Extraction::Repaired(stubs)
            | Extraction::PatternRecovered(stubs) => stubs,
            Extraction::Failed => Vec::new(),
        }
    }
}

/// Sanitize raw completion text and extract stubs from it.
pub fn parse_recommendations(raw: &str) -> Extraction {
    let clean = sanitize(raw);
    let extraction = extract(&clean);

    match &extraction {
        Extraction::Failed => warn!("All parse methods failed for: {}", clean),
        found => info!(
            "Recovered {} recommendation(s) via {} parse",
            found.stubs().len(),
            found.tier()
        ),
    }

    extraction
}

/// Extract stubs from already sanitized text.
pub fn extract(text: &str) -> Extraction {
    if let Some(span) = bracket_span(text) {
        match parse_array(span) {
            Ok(stubs) => return Extraction::Strict(stubs),
            Err(e) => debug!("Direct parse failed, trying cleanup: {}", e),
        }

        let repaired = repair(span);
        match parse_array(&repaired) {
            Ok(stubs) => return Extraction::Repaired(stubs),
            Err(e) => debug!("Cleaned parse also failed: {}", e),
        }
    }

    debug!("Attempting pattern extraction");
    let stubs = scan_fields(text);
    if stubs.is_empty() {
        Extraction::Failed
    } else {
        Extraction::PatternRecovered(stubs)
    }
}

/// First `[` through the last `]`.
fn bracket_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

fn repair(span: &str) -> String {
    let fixed = RE_TRAILING_COMMA_BRACKET.replace_all(span, "]");
    let fixed = RE_TRAILING_COMMA_BRACE.replace_all(&fixed, "}");
    let fixed = RE_LINE_BREAKS.replace_all(&fixed, " ");
    RE_WHITESPACE_RUN.replace_all(&fixed, " ").into_owned()
}

/// Strict parse; succeeds only for an array holding at least one object.
fn parse_array(span: &str) -> Result<Vec<RecommendationStub>, String> {
    let value: Value = serde_json::from_str(span).map_err(|e| e.to_string())?;
    let items = value.as_array().ok_or("not an array")?;

    let stubs: Vec<RecommendationStub> = items.iter().filter_map(stub_from_value).collect();
    if stubs.is_empty() {
        return Err("array holds no recommendation objects".to_string());
    }
    Ok(stubs)
}

fn stub_from_value(value: &Value) -> Option<RecommendationStub> {
    let object = value.as_object()?;
    let field = |key: &str| match object.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    Some(RecommendationStub {
        title: field("title"),
        title_tr: field("titleTr"),
        year: field("year"),
        reason: field("reason"),
    })
}

fn scan_fields(text: &str) -> Vec<RecommendationStub> {
    RE_STUB_FIELDS
        .captures_iter(text)
        .map(|caps| RecommendationStub {
            title: caps[1].to_string(),
            title_tr: caps[2].to_string(),
            year: caps[3].to_string(),
            reason: caps[4].to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub(title: &str, title_tr: &str, year: &str, reason: &str) -> RecommendationStub {
        RecommendationStub {
            title: title.to_string(),
            title_tr: title_tr.to_string(),
            year: year.to_string(),
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_strict_parse_inside_prose() {
        let text = r#"Here you go: [{"title":"Heat","titleTr":"Büyük Hesaplaşma","year":"1995","reason":"gerilim"},{"title":"Up","titleTr":"Yukarı Bak","year":"2009","reason":"duygusal"}] Enjoy!"#;
        let result = extract(text);
        assert_eq!(
            result,
            Extraction::Strict(vec![
                stub("Heat", "Büyük Hesaplaşma", "1995", "gerilim"),
                stub("Up", "Yukarı Bak", "2009", "duygusal"),
            ])
        );
    }

    #[test]
    fn test_trailing_comma_matches_valid_equivalent() {
        let broken = r#"[{"title":"Heat","titleTr":"Heat","year":"1995","reason":"a",},]"#;
        let valid = r#"[{"title":"Heat","titleTr":"Heat","year":"1995","reason":"a"}]"#;

        let repaired = extract(broken);
        assert_eq!(repaired.tier(), "repaired");
        assert_eq!(repaired.stubs(), extract(valid).stubs());
    }

    #[test]
    fn test_numeric_year_is_rendered_as_text() {
        let text = r#"[{"title":"Alien","titleTr":"Yaratık","year":1979,"reason":"klasik"}]"#;
        let stubs = extract(text).into_stubs();
        assert_eq!(stubs[0].year, "1979");
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let text = r#"[{"title":"Alien"}]"#;
        let stubs = extract(text).into_stubs();
        assert_eq!(stubs, vec![stub("Alien", "", "", "")]);
    }

    #[test]
    fn test_empty_array_is_not_accepted() {
        assert_eq!(extract("[]"), Extraction::Failed);
        assert_eq!(extract("[1, 2, 3]"), Extraction::Failed);
    }

    #[test]
    fn test_pattern_tier_without_brackets() {
        let text = r#"{"title": "Dune", "titleTr": "Çöl Gezegeni", "year": 2021, "reason": "görsel şölen"}
            {"title": "Arrival", "titleTr": "Geliş", "year": "2016", "reason": "zekice"}"#;
        let result = extract(text);
        assert_eq!(
            result,
            Extraction::PatternRecovered(vec![
                stub("Dune", "Çöl Gezegeni", "2021", "görsel şölen"),
                stub("Arrival", "Geliş", "2016", "zekice"),
            ])
        );
    }

    #[test]
    fn test_pattern_tier_when_array_is_unparseable() {
        let text = r#"[{"title": "Dune", "titleTr": "Çöl Gezegeni", "year": "2021", "reason": "iyi"} {"title": "Her", "titleTr": "Aşk", "year": "2013", "reason": "duygusal"}]"#;
        let result = extract(text);
        assert_eq!(result.tier(), "pattern");
        let titles: Vec<_> = result.stubs().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Dune", "Her"]);
    }

    #[test]
    fn test_three_digit_year_is_accepted_by_pattern() {
        let text = r#"{"title":"Old","titleTr":"Eski","year":"999","reason":"tarih"}"#;
        assert_eq!(extract(text).stubs()[0].year, "999");
    }

    #[test]
    fn test_nothing_recoverable() {
        assert_eq!(extract("Üzgünüm, öneri veremiyorum."), Extraction::Failed);
        assert_eq!(extract(""), Extraction::Failed);
        assert!(extract("] backwards [").is_failed());
        assert!(Extraction::Failed.into_stubs().is_empty());
    }

    #[test]
    fn test_parse_recommendations_end_to_end() {
        let raw = "```json\n[{\"title\":\"Inception\",\"titleTr\":\"Başlangıç\",\"year\":\"2010\",\"reason\":\"akıllı kurgu\"},]\n```";
        let result = parse_recommendations(raw);
        assert_eq!(result.tier(), "repaired");
        assert_eq!(
            result.into_stubs(),
            vec![stub("Inception", "Başlangıç", "2010", "akıllı kurgu")]
        );
    }
}

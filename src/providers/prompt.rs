use crate::model::Filters;
use chrono::{Datelike, NaiveDate};

/// Shape the model is asked to answer with
pub const RESPONSE_SCHEMA: &str =
    r#"[{"title": "Orijinal ad", "titleTr": "Türkçe ad", "year": "Yıl", "reason": "Kısa sebep"}]"#;

/// Number of suggestions requested per call
pub const SUGGESTION_COUNT: usize = 5;

const ANY_CATEGORY: &str = "herhangi bir kategori";

const MONTHS_TR: [&str; 12] = [
    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül", "Ekim",
    "Kasım", "Aralık",
];

/// What a translation request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslationKind {
    /// Synopsis of a movie or series
    Overview,
    #[default]
    General,
}

/// Build the recommendation prompt for the selected filters.
///
/// A non-empty `user_prompt` is quoted and marked as taking priority over the
/// other selections.
pub fn build_recommendation_prompt(filters: &Filters, user_prompt: &str, today: NaiveDate) -> String {
    let content_type = filters.content_type.label();
    let categories = if filters.categories.is_empty() {
        ANY_CATEGORY.to_string()
    } else {
        filters.categories.join(", ")
    };
    let month = MONTHS_TR[today.month0() as usize];

    let mut prompt = format!(
        "Sen bir {content_type} öneri uzmanısın. \n\nGÜNCEL TARİH: {month} {year}\n\nTercihler:\n- İçerik Türü: {content_type}\n- Kategoriler: {categories}",
        year = today.year(),
    );

    if let Some(mood) = filters.mood {
        prompt.push_str(&format!("\n- Ruh Hali: {}", mood.description()));
    }

    let wish = user_prompt.trim();
    if !wish.is_empty() {
        prompt.push_str(&format!(
            "\n\n⚠️ KULLANICININ İSTEĞİ (bunu diğer tercihlerden öncelikli tut): \"{wish}\"\nEğer kullanıcının isteği yukarıdaki seçimlerle çelişiyorsa, KULLANICININ İSTEĞİNE GÖRE hareket et!"
        ));
    }

    prompt.push_str(&format!(
        "\n\nYanıtını SADECE JSON formatında ver:\n{RESPONSE_SCHEMA}\n\n{SUGGESTION_COUNT} adet {content_type} öner. SADECE JSON ver, başka yazı YAZMA!"
    ));

    prompt
}

/// Build the prompt asking for a Turkish translation of `text`.
pub fn build_translation_prompt(text: &str, kind: TranslationKind) -> String {
    match kind {
        TranslationKind::Overview => format!(
            "Translate the following movie/TV show description to Turkish. Keep it natural and fluent. Only return the translation, nothing else.\n\nDescription:\n{}",
            text
        ),
        TranslationKind::General => format!(
            "Translate the following text to Turkish. Only return the translation, nothing else. Do not add any explanations or notes.\n\nText to translate:\n{}",
            text
        ),
    }
}

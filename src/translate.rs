//! Turkish translation of catalog text through the completion relay.

use crate::discover::PersonProfile;
use crate::error::RecommendError;
use crate::model::EnrichedRecommendation;
use crate::providers::prompt::{build_translation_prompt, TranslationKind};
use crate::providers::{CompletionRequest, FallbackProvider, ModelRotation};
use log::{debug, warn};

pub struct Translator<'a> {
    fallback: &'a FallbackProvider,
    rotation: &'a ModelRotation,
    max_tokens: u32,
    temperature: f32,
}

impl<'a> Translator<'a> {
    pub fn new(
        fallback: &'a FallbackProvider,
        rotation: &'a ModelRotation,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Translator {
            fallback,
            rotation,
            max_tokens,
            temperature,
        }
    }

    pub async fn translate(
        &self,
        text: &str,
        kind: TranslationKind,
    ) -> Result<String, RecommendError> {
        if text.trim().is_empty() {
            return Err(RecommendError::InvalidInput(
                "Text to translate cannot be empty".to_string(),
            ));
        }

        let request = CompletionRequest::from_prompt(
            build_translation_prompt(text, kind),
            self.max_tokens,
            self.temperature,
        );
        let completion = self.rotation.complete(self.fallback, &request).await?;
        Ok(completion.content.trim().to_string())
    }
}

/// Replace untranslated overviews in place.
///
/// Records without the translation flag are left alone, as are records whose
/// translation fails.
pub async fn translate_overviews(records: &mut [EnrichedRecommendation], translator: &Translator<'_>) {
    for record in records.iter_mut() {
        if !record.needs_overview_translation {
            continue;
        }
        let Some(original) = record.original_overview.clone() else {
            continue;
        };

        match translator.translate(&original, TranslationKind::Overview).await {
            Ok(translated) if !translated.is_empty() => {
                debug!("Translated overview for {}", record.title);
                record.overview = Some(translated);
                record.needs_overview_translation = false;
            }
            Ok(_) => warn!("Empty translation for {}", record.title),
            Err(e) => warn!("Overview translation failed for {}: {}", record.title, e),
        }
    }
}

/// Replace a fallback-language biography with its translation, if it has one.
pub async fn translate_biography(profile: &mut PersonProfile, translator: &Translator<'_>) {
    if !profile.needs_biography_translation {
        return;
    }
    let Some(original) = profile.original_biography.clone() else {
        return;
    };

    match translator.translate(&original, TranslationKind::General).await {
        Ok(translated) if !translated.is_empty() => {
            profile.biography = translated;
            profile.needs_biography_translation = false;
        }
        Ok(_) => warn!("Empty biography translation for {}", profile.name),
        Err(e) => warn!("Biography translation failed for {}: {}", profile.name, e),
    }
}

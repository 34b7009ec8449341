//! Catalog browsing outside the recommendation flow: this week's trending
//! titles and person profiles.
//!
//! Both merge two fetches of the same data. Art comes from the request made
//! without a language, text from the localized one.

use crate::catalog::{Catalog, Person, PersonCredit, SearchResult};
use crate::config::CatalogConfig;
use crate::enrich::{rating, OVERVIEW_NOT_FOUND};
use crate::error::{BoxError, RecommendError};
use crate::model::MediaType;
use log::{debug, warn};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Placeholder biography when the catalog has none in any language
pub const BIOGRAPHY_NOT_FOUND: &str = "Biyografi bilgisi bulunamadı.";

const BIOGRAPHY_FALLBACK_LANGUAGE: &str = "en-US";
const KNOWN_FOR_LIMIT: usize = 15;
const KNOWN_FOR_MAX_ORDER: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingTitle {
    pub id: u64,
    pub title: String,
    pub year: String,
    pub overview: String,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    pub rating: Option<String>,
    pub media_type: MediaType,
    pub tmdb_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownFor {
    pub id: u64,
    pub media_type: Option<MediaType>,
    pub title_tr: String,
    pub poster: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonProfile {
    pub id: u64,
    pub name: String,
    pub biography: String,
    /// Fallback-language biography kept for later translation
    pub original_biography: Option<String>,
    pub needs_biography_translation: bool,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    pub place_of_birth: Option<String>,
    pub photo: Option<String>,
    pub known_for: Vec<KnownFor>,
    pub tmdb_url: String,
}

pub struct Discovery<'a> {
    catalog: &'a dyn Catalog,
    config: &'a CatalogConfig,
}

impl<'a> Discovery<'a> {
    pub fn new(catalog: &'a dyn Catalog, config: &'a CatalogConfig) -> Self {
        Discovery { catalog, config }
    }

    /// Up to `limit` titles trending this week with localized text and original art.
    ///
    /// Only the unlocalized fetch is required; without the localized one the
    /// original text is used.
    pub async fn trending(
        &self,
        kind: MediaType,
        limit: usize,
    ) -> Result<Vec<TrendingTitle>, RecommendError> {
        let (original, localized) = tokio::join!(
            self.catalog.trending(kind, None),
            self.catalog.trending(kind, Some(self.config.language.as_str())),
        );
        let original = original.map_err(catalog_error)?;
        let localized = localized.unwrap_or_else(|e| {
            warn!("Localized trending lookup failed: {}", e);
            Vec::new()
        });
        debug!(
            "Trending {}: {} results, {} localized",
            kind,
            original.len(),
            localized.len()
        );

        Ok(merge_trending(original, localized)
            .into_iter()
            .take(limit)
            .map(|result| self.trending_title(result, kind))
            .collect())
    }

    /// Localized person profile with a fallback-language biography and a
    /// known-for list built from combined credits.
    pub async fn person(&self, id: u64) -> Result<PersonProfile, RecommendError> {
        let language = Some(self.config.language.as_str());
        let (localized, fallback, original_credits, localized_credits) = tokio::join!(
            self.catalog.person(id, language),
            self.catalog.person(id, Some(BIOGRAPHY_FALLBACK_LANGUAGE)),
            self.catalog.combined_credits(id, None),
            self.catalog.combined_credits(id, language),
        );
        let person = localized.map_err(catalog_error)?;

        let original_biography = match fallback {
            Ok(fallback) => non_empty(fallback.biography),
            Err(e) => {
                warn!("Fallback biography lookup failed for person/{}: {}", id, e);
                None
            }
        };
        let credits = original_credits.unwrap_or_else(|e| {
            warn!("Credits lookup failed for person/{}: {}", id, e);
            Vec::new()
        });
        let localized_credits = localized_credits.unwrap_or_else(|e| {
            warn!("Localized credits lookup failed for person/{}: {}", id, e);
            Vec::new()
        });

        Ok(self.profile(person, original_biography, credits, &localized_credits))
    }

    fn trending_title(&self, result: SearchResult, kind: MediaType) -> TrendingTitle {
        TrendingTitle {
            id: result.id,
            title: result.display_title().unwrap_or_default().to_string(),
            year: result.release_year().unwrap_or_default(),
            overview: non_empty(result.overview.clone())
                .unwrap_or_else(|| OVERVIEW_NOT_FOUND.to_string()),
            poster: self.image(&self.config.image_base, result.poster_path.as_deref()),
            backdrop: self.image(&self.config.backdrop_base, result.backdrop_path.as_deref()),
            rating: rating(&result),
            media_type: kind,
            tmdb_url: format!("{}/{}/{}", self.config.web_base, kind, result.id),
        }
    }

    fn profile(
        &self,
        person: Person,
        fallback_biography: Option<String>,
        credits: Vec<PersonCredit>,
        localized_credits: &[PersonCredit],
    ) -> PersonProfile {
        let localized_biography = non_empty(person.biography);
        let needs_biography_translation =
            localized_biography.is_none() && fallback_biography.is_some();
        let biography = localized_biography
            .or_else(|| fallback_biography.clone())
            .unwrap_or_else(|| BIOGRAPHY_NOT_FOUND.to_string());

        PersonProfile {
            id: person.id,
            name: person.name,
            biography,
            original_biography: fallback_biography,
            needs_biography_translation,
            birthday: non_empty(person.birthday),
            deathday: non_empty(person.deathday),
            place_of_birth: non_empty(person.place_of_birth),
            photo: self.image(&self.config.image_base, person.profile_path.as_deref()),
            known_for: known_for(credits, localized_credits)
                .into_iter()
                .map(|(credit, title_tr)| KnownFor {
                    id: credit.id,
                    media_type: credit.media_type,
                    title_tr,
                    poster: self.image(&self.config.image_base, credit.poster_path.as_deref()),
                })
                .collect(),
            tmdb_url: format!("{}/person/{}", self.config.web_base, person.id),
        }
    }

    fn image(&self, base: &str, path: Option<&str>) -> Option<String> {
        path.filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", base, p))
    }
}

/// Overlay localized titles and overviews onto the unlocalized results, matched by id.
/// Order and art follow `original`.
pub fn merge_trending(original: Vec<SearchResult>, localized: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut localized: HashMap<u64, SearchResult> =
        localized.into_iter().map(|r| (r.id, r)).collect();

    original
        .into_iter()
        .map(|mut item| {
            let Some(tr) = localized.remove(&item.id) else {
                return item;
            };
            let title = non_empty(tr.title.clone()).or_else(|| non_empty(tr.name.clone()));
            let name = non_empty(tr.name).or_else(|| non_empty(tr.title));
            if title.is_some() {
                item.title = title;
            }
            if name.is_some() {
                item.name = name;
            }
            if let Some(overview) = non_empty(tr.overview) {
                item.overview = Some(overview);
            }
            item
        })
        .collect()
}

/// Pick the credits to show for a person, each with its localized title.
///
/// Credits need a poster and a character, must be billed in the top ten when
/// the billing is known, and are ranked by vote count. Each title appears once.
pub fn known_for(
    credits: Vec<PersonCredit>,
    localized: &[PersonCredit],
) -> Vec<(PersonCredit, String)> {
    let localized_titles: HashMap<(Option<MediaType>, u64), &str> = localized
        .iter()
        .filter_map(|c| c.display_title().map(|title| ((c.media_type, c.id), title)))
        .collect();

    let mut picked: Vec<PersonCredit> = credits
        .into_iter()
        .filter(|c| c.poster_path.as_deref().is_some_and(|p| !p.is_empty()))
        .filter(|c| c.character.as_deref().is_some_and(|ch| !ch.trim().is_empty()))
        .filter(|c| c.order.map_or(true, |order| order < KNOWN_FOR_MAX_ORDER))
        .collect();
    picked.sort_by(|a, b| b.vote_count.unwrap_or(0).cmp(&a.vote_count.unwrap_or(0)));

    let mut seen = HashSet::new();
    picked
        .into_iter()
        .filter(|c| seen.insert((c.media_type, c.id)))
        .take(KNOWN_FOR_LIMIT)
        .map(|credit| {
            let title = localized_titles
                .get(&(credit.media_type, credit.id))
                .map(|t| t.to_string())
                .or_else(|| credit.display_title().map(String::from))
                .unwrap_or_default();
            (credit, title)
        })
        .collect()
}

fn catalog_error(e: BoxError) -> RecommendError {
    RecommendError::Catalog(e.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//! Resolve recommendation stubs against the catalog.
//!
//! `Enricher::enrich` never fails: a stub the catalog cannot resolve, or whose
//! core lookups error out, becomes a minimal record with a web-search link.

use crate::catalog::{Catalog, RegionProviders, SearchResult, Video};
use crate::discover::Discovery;
use crate::config::CatalogConfig;
use crate::error::BoxError;
use crate::model::{CastMember, EnrichedRecommendation, MediaType, RecommendationStub};
use futures_util::stream::{self, StreamExt};
use log::{debug, info, warn};

/// Placeholder overview when the catalog has none in any language
pub const OVERVIEW_NOT_FOUND: &str = "Açıklama bulunamadı.";

const CAST_LIMIT: usize = 15;

pub struct Enricher {
    catalog: Box<dyn Catalog>,
    config: CatalogConfig,
    concurrency: usize,
}

impl Enricher {
    pub fn new(catalog: Box<dyn Catalog>, config: CatalogConfig) -> Self {
        Enricher {
            catalog,
            config,
            concurrency: 1,
        }
    }

    /// Resolve up to `limit` stubs at a time. Output order always follows input order.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Trending and person lookups against the same catalog
    pub fn discovery(&self) -> Discovery<'_> {
        Discovery::new(self.catalog.as_ref(), &self.config)
    }

    /// Enrich every stub; sequential unless a concurrency limit above one was set.
    pub async fn enrich_all(
        &self,
        stubs: &[RecommendationStub],
        kind: MediaType,
    ) -> Vec<EnrichedRecommendation> {
        if self.concurrency <= 1 {
            let mut enriched = Vec::with_capacity(stubs.len());
            for stub in stubs {
                enriched.push(self.enrich(stub, kind).await);
            }
            return enriched;
        }

        stream::iter(stubs)
            .map(|stub| self.enrich(stub, kind))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    pub async fn enrich(&self, stub: &RecommendationStub, kind: MediaType) -> EnrichedRecommendation {
        match self.try_enrich(stub, kind).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                info!("No catalog match for '{}'", stub.title);
                EnrichedRecommendation::minimal(stub, kind)
            }
            Err(e) => {
                warn!("Catalog fetch error for '{}': {}", stub.title, e);
                EnrichedRecommendation::minimal(stub, kind)
            }
        }
    }

    async fn try_enrich(
        &self,
        stub: &RecommendationStub,
        kind: MediaType,
    ) -> Result<Option<EnrichedRecommendation>, BoxError> {
        let Some(result) = self.find(stub, kind).await? else {
            return Ok(None);
        };
        debug!("Matched '{}' to catalog id {}", stub.title, result.id);

        let localized = self
            .catalog
            .details(kind, result.id, Some(self.config.language.as_str()))
            .await?;

        // Localized art is only the native art for works originally in the locale's language.
        let native = result.original_language.as_deref() == Some(self.config.origin_language.as_str());
        let (poster_path, backdrop_path) = if native {
            (
                non_empty(localized.poster_path.clone()).or_else(|| result.poster_path.clone()),
                non_empty(localized.backdrop_path.clone()).or_else(|| result.backdrop_path.clone()),
            )
        } else {
            (result.poster_path.clone(), result.backdrop_path.clone())
        };

        let providers = self
            .catalog
            .watch_providers(kind, result.id)
            .await?
            .remove(&self.config.region)
            .map(RegionProviders::preferred)
            .unwrap_or_default();

        let cast = self.cast(kind, result.id).await;
        let trailer_key = self.trailer_key(kind, result.id).await;

        let localized_overview = non_empty(localized.overview.clone());
        let original_overview = non_empty(result.overview.clone());
        let needs_overview_translation = localized_overview.is_none() && original_overview.is_some();
        let overview = localized_overview
            .or_else(|| original_overview.clone())
            .unwrap_or_else(|| OVERVIEW_NOT_FOUND.to_string());

        let title_tr = localized
            .display_title()
            .or_else(|| result.display_title())
            .map(String::from)
            .unwrap_or_else(|| stub.title_tr.clone());

        let year = if stub.year.is_empty() {
            result.release_year().unwrap_or_default()
        } else {
            stub.year.clone()
        };

        Ok(Some(EnrichedRecommendation {
            id: Some(result.id),
            title: stub.title.clone(),
            title_tr,
            year,
            reason: stub.reason.clone(),
            poster: poster_path.map(|path| format!("{}{}", self.config.image_base, path)),
            backdrop: backdrop_path.map(|path| format!("{}{}", self.config.backdrop_base, path)),
            overview: Some(overview),
            original_overview,
            needs_overview_translation,
            rating: rating(&result),
            tmdb_url: format!("{}/{}/{}", self.config.web_base, kind, result.id),
            providers,
            cast,
            media_type: kind,
            trailer_key,
        }))
    }

    /// Search by original title, then by the localized one if that differs.
    async fn find(
        &self,
        stub: &RecommendationStub,
        kind: MediaType,
    ) -> Result<Option<SearchResult>, BoxError> {
        let primary = if stub.title.trim().is_empty() {
            stub.title_tr.as_str()
        } else {
            stub.title.as_str()
        };
        if primary.trim().is_empty() {
            return Ok(None);
        }

        let mut results = self.catalog.search(kind, primary, None).await?;
        if results.is_empty() && !stub.title_tr.trim().is_empty() && stub.title_tr != primary {
            debug!("No results for '{}', retrying with '{}'", primary, stub.title_tr);
            results = self.catalog.search(kind, &stub.title_tr, None).await?;
        }

        Ok(results.into_iter().next())
    }

    async fn cast(&self, kind: MediaType, id: u64) -> Vec<CastMember> {
        match self.catalog.credits(kind, id).await {
            Ok(mut cast) => {
                cast.truncate(CAST_LIMIT);
                cast
            }
            Err(e) => {
                warn!("Credits lookup failed for {}/{}: {}", kind, id, e);
                Vec::new()
            }
        }
    }

    async fn trailer_key(&self, kind: MediaType, id: u64) -> Option<String> {
        let videos = self.catalog.videos(kind, id).await.unwrap_or_else(|e| {
            warn!("Video lookup failed for {}/{}: {}", kind, id, e);
            Vec::new()
        });

        // Series: the oldest trailer is usually the original one.
        if let Some(key) = pick_trailer(videos, kind == MediaType::Tv) {
            return Some(key);
        }

        if kind == MediaType::Tv {
            match self.catalog.season_videos(id, 1).await {
                Ok(videos) => return pick_trailer(videos, false),
                Err(e) => warn!("Season video lookup failed for tv/{}: {}", id, e),
            }
        }

        None
    }
}

/// YouTube trailers only; official preferred, else the first one.
fn pick_trailer(videos: Vec<Video>, oldest_first: bool) -> Option<String> {
    let mut trailers: Vec<Video> = videos
        .into_iter()
        .filter(Video::is_youtube_trailer)
        .collect();

    if oldest_first {
        trailers.sort_by(|a, b| {
            (a.published_at.is_none(), &a.published_at).cmp(&(b.published_at.is_none(), &b.published_at))
        });
    }

    trailers
        .iter()
        .find(|video| video.official)
        .or_else(|| trailers.first())
        .map(|video| video.key.clone())
}

pub(crate) fn rating(result: &SearchResult) -> Option<String> {
    result
        .vote_average
        .filter(|vote| *vote > 0.0)
        .map(|vote| format!("{:.1}", vote))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

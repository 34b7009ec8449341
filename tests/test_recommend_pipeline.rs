use film_recommender::config::AppConfig;
use film_recommender::{MediaType, Mood, RecommendError, Recommender};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

fn config_for(completion: &ServerGuard, catalog_url: String) -> AppConfig {
    let mut config = AppConfig::default();
    config.completion.api_key = Some("test-key".to_string());
    config.completion.base_url = completion.url();
    config.completion.models = vec!["model-a".to_string(), "model-b".to_string()];
    config.catalog.api_key = Some("tmdb-key".to_string());
    config.catalog.base_url = catalog_url;
    config
}

fn completion_body(content: &str) -> String {
    json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }).to_string()
}

#[tokio::test]
async fn test_fenced_reply_is_enriched_from_catalog() {
    let mut llm = Server::new_async().await;
    let mut tmdb = Server::new_async().await;

    let reply = "```json\n[{\"title\":\"Inception\",\"titleTr\":\"Başlangıç\",\"year\":\"2010\",\"reason\":\"Zihin bükücü\"},]\n```";
    let completion = llm
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "model-a",
            "max_tokens": 4096
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(reply))
        .create_async()
        .await;

    let _search = tmdb
        .mock("GET", "/3/search/movie")
        .match_query(Matcher::UrlEncoded("query".into(), "Inception".into()))
        .with_status(200)
        .with_body(
            json!({ "results": [{
                "id": 27205,
                "title": "Inception",
                "original_language": "en",
                "poster_path": "/inception.jpg",
                "backdrop_path": "/inception-bg.jpg",
                "overview": "A thief who steals corporate secrets...",
                "vote_average": 8.369,
                "release_date": "2010-07-15"
            }]})
            .to_string(),
        )
        .create_async()
        .await;

    let _details = tmdb
        .mock("GET", "/3/movie/27205")
        .match_query(Matcher::UrlEncoded("language".into(), "tr-TR".into()))
        .with_status(200)
        .with_body(
            json!({
                "title": "Başlangıç",
                "overview": "Rüyalara girip fikir çalan bir hırsız...",
                "poster_path": "/tr-poster.jpg"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let _providers = tmdb
        .mock("GET", "/3/movie/27205/watch/providers")
        .match_query(Matcher::UrlEncoded("api_key".into(), "tmdb-key".into()))
        .with_status(200)
        .with_body(
            json!({ "results": {
                "TR": { "rent": [{ "provider_id": 2, "provider_name": "Apple TV" }] },
                "US": { "flatrate": [{ "provider_id": 8, "provider_name": "Netflix" }] }
            }})
            .to_string(),
        )
        .create_async()
        .await;

    let _credits = tmdb
        .mock("GET", "/3/movie/27205/credits")
        .match_query(Matcher::UrlEncoded("api_key".into(), "tmdb-key".into()))
        .with_status(200)
        .with_body(
            json!({ "cast": [
                { "id": 6193, "name": "Leonardo DiCaprio", "character": "Cobb", "profile_path": "/leo.jpg" }
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let _videos = tmdb
        .mock("GET", "/3/movie/27205/videos")
        .match_query(Matcher::UrlEncoded("api_key".into(), "tmdb-key".into()))
        .with_status(200)
        .with_body(
            json!({ "results": [
                { "key": "teaser1", "site": "YouTube", "type": "Teaser", "official": true },
                { "key": "fan", "site": "YouTube", "type": "Trailer", "official": false },
                { "key": "YoHD9XEInc0", "site": "YouTube", "type": "Trailer", "official": true }
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let results = Recommender::builder()
        .film()
        .category("Bilim Kurgu")
        .mood(Mood::Heyecanli)
        .prompt("rüyalarla ilgili")
        .config(config_for(&llm, tmdb.url()))
        .build()
        .await
        .unwrap();

    completion.assert_async().await;
    assert_eq!(results.len(), 1);

    let inception = &results[0];
    assert_eq!(inception.id, Some(27205));
    assert_eq!(inception.title, "Inception");
    assert_eq!(inception.title_tr, "Başlangıç");
    assert_eq!(inception.year, "2010");
    assert_eq!(inception.reason, "Zihin bükücü");
    assert_eq!(inception.media_type, MediaType::Movie);
    // Non-Turkish originals keep their original poster.
    assert_eq!(
        inception.poster.as_deref(),
        Some("https://image.tmdb.org/t/p/w500/inception.jpg")
    );
    assert_eq!(
        inception.overview.as_deref(),
        Some("Rüyalara girip fikir çalan bir hırsız...")
    );
    assert!(!inception.needs_overview_translation);
    assert_eq!(inception.rating.as_deref(), Some("8.4"));
    assert_eq!(inception.tmdb_url, "https://www.themoviedb.org/movie/27205");
    assert_eq!(inception.providers.len(), 1);
    assert_eq!(inception.providers[0].provider_name, "Apple TV");
    assert_eq!(inception.cast[0].character, "Cobb");
    assert_eq!(inception.trailer_key.as_deref(), Some("YoHD9XEInc0"));
}

#[tokio::test]
async fn test_falls_back_to_next_model() {
    let mut llm = Server::new_async().await;

    let failing = llm
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({ "model": "model-a" })))
        .with_status(503)
        .with_body(json!({ "error": { "message": "Provider overloaded" } }).to_string())
        .expect(1)
        .create_async()
        .await;

    let answering = llm
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({ "model": "model-b" })))
        .with_status(200)
        .with_body(completion_body(
            r#"[{"title":"Kış Uykusu","titleTr":"Kış Uykusu","year":"2014","reason":"Sakin"}]"#,
        ))
        .expect(1)
        .create_async()
        .await;

    // Nothing listens here, so every record degrades to a web-search link.
    let config = config_for(&llm, "http://127.0.0.1:9".to_string());

    let results = Recommender::builder()
        .dizi()
        .config(config)
        .build()
        .await
        .unwrap();

    failing.assert_async().await;
    answering.assert_async().await;
    assert_eq!(results[0].title, "Kış Uykusu");
    assert_eq!(results[0].media_type, MediaType::Tv);
    assert!(results[0].id.is_none());
    assert!(results[0]
        .tmdb_url
        .starts_with("https://www.google.com/search?q="));
}

#[tokio::test]
async fn test_all_models_failing_surfaces_last_error() {
    let mut llm = Server::new_async().await;

    let _first = llm
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({ "model": "model-a" })))
        .with_status(429)
        .with_body(json!({ "error": { "message": "Rate limit exceeded" } }).to_string())
        .create_async()
        .await;

    let _second = llm
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({ "model": "model-b" })))
        .with_status(500)
        .with_body("not json")
        .create_async()
        .await;

    let err = Recommender::builder()
        .config(config_for(&llm, "http://127.0.0.1:9".to_string()))
        .build()
        .await
        .unwrap_err();

    match err {
        RecommendError::ExhaustedCandidates(message) => assert_eq!(message, "API error: 500"),
        other => panic!("Expected ExhaustedCandidates, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unparseable_reply_has_user_message() {
    let mut llm = Server::new_async().await;

    let _mock = llm
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(completion_body(
            "Maalesef bu kriterlere uygun bir öneri bulamadım.",
        ))
        .create_async()
        .await;

    let err = Recommender::builder()
        .config(config_for(&llm, "http://127.0.0.1:9".to_string()))
        .build()
        .await
        .unwrap_err();

    assert!(matches!(err, RecommendError::UnrecoverableParse));
    assert_eq!(
        err.user_message(),
        "AI uygun öneri üretemedi. Lütfen farklı seçimlerle tekrar deneyin."
    );
}

#[tokio::test]
async fn test_history_is_recorded_after_success() {
    let mut llm = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();

    let _mock = llm
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(completion_body(
            r#"Öneriler: {"title": "Amélie", "titleTr": "Amelie", "year": "2001", "reason": "Neşeli"}"#,
        ))
        .create_async()
        .await;

    Recommender::builder()
        .mood(Mood::Mutlu)
        .history(dir.path())
        .config(config_for(&llm, "http://127.0.0.1:9".to_string()))
        .build()
        .await
        .unwrap();

    let history = film_recommender::History::new(film_recommender::FileStore::new(dir.path()));
    let entries = history.entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].prompt, "Genel öneri");
    assert_eq!(entries[0].filters.mood, Some(Mood::Mutlu));
    assert_eq!(entries[0].recommendations[0].title, "Amélie");
}

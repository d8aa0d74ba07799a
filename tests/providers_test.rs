//! Source adapter tests against mocked provider APIs.

use std::sync::Arc;

use medialog::config::{AniListConfig, GoogleBooksConfig, TmdbConfig};
use medialog::search::providers::{
    AniListSource, GoogleBooksSource, TmdbClient, TmdbMovieSource, TmdbTvSource,
};
use medialog::search::SearchSource;
use medialog_common::{Error, MediaKind, UNKNOWN_TITLE};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn tmdb_client(server: &MockServer, key: Option<&str>) -> Arc<TmdbClient> {
    let config = TmdbConfig {
        api_key: key.map(String::from),
        base_url: server.uri(),
        ..TmdbConfig::default()
    };
    Arc::new(TmdbClient::new(reqwest::Client::new(), &config))
}

fn books_source(server: &MockServer, key: Option<&str>) -> GoogleBooksSource {
    let config = GoogleBooksConfig {
        api_key: key.map(String::from),
        base_url: server.uri(),
    };
    GoogleBooksSource::new(reqwest::Client::new(), &config, 10)
}

fn anilist_source(server: &MockServer) -> AniListSource {
    let config = AniListConfig {
        endpoint: server.uri(),
    };
    AniListSource::new(reqwest::Client::new(), &config, 10)
}

// ---------------------------------------------------------------------------
// TMDB
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tmdb_movie_search_maps_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("query", "Inception"))
        .and(query_param("language", "en-US"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": [
                {"id": 27205, "title": "Inception", "release_date": "2010-07-15",
                 "poster_path": "/inception.jpg"},
                {"id": 64956, "title": "Inception: The Cobol Job", "release_date": "",
                 "poster_path": null}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = TmdbMovieSource::new(tmdb_client(&server, Some("test-key")), 10);
    let results = source.search("Inception").await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "tmdb-27205");
    assert_eq!(results[0].kind, MediaKind::Movie);
    assert_eq!(results[0].year, Some(2010));
    assert_eq!(
        results[0].image_url.as_deref(),
        Some("https://image.tmdb.org/t/p/w500/inception.jpg")
    );
    assert_eq!(results[1].year, None);
    assert!(results[1].image_url.is_none());
}

#[tokio::test]
async fn tmdb_tv_search_uses_tv_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/tv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": 1396, "name": "Breaking Bad", "first_air_date": "2008-01-20"}
            ]
        })))
        .mount(&server)
        .await;

    let source = TmdbTvSource::new(tmdb_client(&server, Some("k")), 10);
    let results = source.search("breaking bad").await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "tmdb-tv-1396");
    assert_eq!(results[0].title, "Breaking Bad");
    assert_eq!(results[0].kind, MediaKind::Tv);
}

#[tokio::test]
async fn tmdb_results_are_capped_in_provider_order() {
    let server = MockServer::start().await;
    let raw: Vec<_> = (0..15)
        .map(|i| json!({"id": i, "title": format!("Movie {i}")}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": raw})))
        .mount(&server)
        .await;

    let source = TmdbMovieSource::new(tmdb_client(&server, Some("k")), 10);
    let results = source.search("movie").await.unwrap();

    assert_eq!(results.len(), 10);
    assert_eq!(results[0].title, "Movie 0");
    assert_eq!(results[9].title, "Movie 9");
}

#[tokio::test]
async fn tmdb_without_key_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let source = TmdbMovieSource::new(tmdb_client(&server, None), 10);
    assert!(!source.is_available());
    assert!(source.search("Inception").await.is_err());
}

#[tokio::test]
async fn tmdb_server_error_is_source_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let source = TmdbMovieSource::new(tmdb_client(&server, Some("k")), 10);
    let err = source.search("Inception").await.unwrap_err();
    match err {
        Error::SourceUnavailable { provider, message } => {
            assert_eq!(provider, "tmdb-movie");
            assert!(message.contains("500"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn tmdb_retries_after_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1, "title": "After Retry"}]
        })))
        .mount(&server)
        .await;

    let source = TmdbMovieSource::new(tmdb_client(&server, Some("k")), 10);
    let results = source.search("retry").await.unwrap();
    assert_eq!(results[0].title, "After Retry");
}

#[tokio::test]
async fn tmdb_malformed_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let source = TmdbMovieSource::new(tmdb_client(&server, Some("k")), 10);
    assert!(source.search("Inception").await.is_err());
}

// ---------------------------------------------------------------------------
// AniList
// ---------------------------------------------------------------------------

#[tokio::test]
async fn anilist_posts_graphql_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": {"search": "Naruto", "page": 1, "perPage": 10}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"Page": {"media": [
                {"id": 20, "title": {"romaji": "NARUTO", "english": "Naruto"},
                 "coverImage": {"large": "https://s4.anilist.co/file/20.jpg"},
                 "startDate": {"year": 2002}},
                {"id": 1735, "title": {"romaji": "NARUTO: Shippuuden", "english": null},
                 "coverImage": null, "startDate": {"year": 2007}},
                {"id": null, "title": {"romaji": "No id"}}
            ]}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = anilist_source(&server).search("Naruto").await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "anilist-20");
    assert_eq!(results[0].title, "Naruto");
    assert_eq!(results[0].year, Some(2002));
    assert_eq!(results[1].title, "NARUTO: Shippuuden");
    assert!(results.iter().all(|r| r.kind == MediaKind::Anime));
}

#[tokio::test]
async fn anilist_graphql_errors_fail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "Too Many Requests."}]
        })))
        .mount(&server)
        .await;

    assert!(anilist_source(&server).search("Naruto").await.is_err());
}

// ---------------------------------------------------------------------------
// Google Books
// ---------------------------------------------------------------------------

#[tokio::test]
async fn google_books_maps_volumes_and_keeps_untitled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .and(query_param("q", "dune"))
        .and(query_param("maxResults", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalItems": 2,
            "items": [
                {"id": "B1hSG45JCX4C", "volumeInfo": {
                    "title": "Dune", "publishedDate": "1990-09-01",
                    "imageLinks": {"thumbnail": "http://books.google.com/dune.jpg"}}},
                {"id": "untitled", "volumeInfo": {"publishedDate": "2001"}}
            ]
        })))
        .mount(&server)
        .await;

    let results = books_source(&server, None).search("dune").await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "gbooks-B1hSG45JCX4C");
    assert_eq!(results[0].year, Some(1990));
    assert_eq!(results[1].title, UNKNOWN_TITLE);
    assert_eq!(results[1].year, Some(2001));
}

#[tokio::test]
async fn google_books_key_sent_only_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(|req: &Request| {
            let has_key = req.url.query_pairs().any(|(k, _)| k == "key");
            let id = if has_key { "keyed" } else { "anonymous" };
            ResponseTemplate::new(200).set_body_json(json!({"items": [{"id": id}]}))
        })
        .mount(&server)
        .await;

    let anonymous = books_source(&server, None).search("dune").await.unwrap();
    assert_eq!(anonymous[0].id, "gbooks-anonymous");

    let keyed = books_source(&server, Some("books-key"))
        .search("dune")
        .await
        .unwrap();
    assert_eq!(keyed[0].id, "gbooks-keyed");
}

#[tokio::test]
async fn google_books_without_items_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalItems": 0})))
        .mount(&server)
        .await;

    let results = books_source(&server, None).search("zzzz").await.unwrap();
    assert!(results.is_empty());
}

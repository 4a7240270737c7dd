//! Integration tests for the catalog HTTP endpoints, run against the
//! in-memory store.

use api_lib::config::Config;
use api_lib::web::{build_router, AppState};
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use book_catalog_core::{GenreToneLexicon, InMemoryCatalog};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

const BOUNDARY: &str = "catalog-test-boundary";

const EXPORT_HEADER: &str = "Book Id,Title,Author,Author l-f,Additional Authors,ISBN,ISBN13,\
My Rating,Average Rating,Publisher,Binding,Number of Pages,Year Published,\
Original Publication Year,Date Read,Date Added,Bookshelves,Exclusive Shelf,My Review";

/// Test helper: Create app over a fresh in-memory store
fn setup_app() -> Router {
    let state = AppState::new(
        Arc::new(InMemoryCatalog::new()),
        Arc::new(Config::for_tests()),
        GenreToneLexicon::builtin(),
    );
    build_router(Arc::new(state))
}

fn export(rows: &[&str]) -> String {
    let mut csv = String::from(EXPORT_HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv.push('\n');
    csv
}

fn sample_export() -> String {
    export(&[
        "1,The Road,Cormac McCarthy,\"McCarthy, Cormac\",,\"=\"\"0307387895\"\"\",\"=\"\"9780307387899\"\"\",5,3.98,Vintage,Paperback,287,2006,2006,2022/01/10,2022/01/01,\"dystopia, favorites\",read,A grey walk south.",
        "2,Emma,Jane Austen,\"Austen, Jane\",,,,4,4.03,Penguin,Paperback,474,2003,1815,2021/07/19,2021/07/01,\"classics, favorites\",read,\"Meddling, charmingly.\"",
        "3,Unreviewed,Some Author,\"Author, Some\",,,,3,3.50,,,100,2000,2000,,,to-read,to-read,",
    ])
}

fn import_request(file: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"goodreads.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n{file}\r\n--{b}--\r\n",
        b = BOUNDARY,
        file = file
    );
    Request::builder()
        .method("POST")
        .uri("/api/bookreviews/import")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn send_json(method: &str, uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

// =============================================================================
// Import
// =============================================================================

#[tokio::test]
async fn import_reports_counters_and_is_idempotent() {
    let app = setup_app();

    let (status, body) = call(&app, import_request(&sample_export())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported"], 2);
    assert_eq!(body["skipped_without_review"], 1);
    assert_eq!(body["bookshelves_created"], 3);
    assert_eq!(body["message"], "Successfully imported 2 book reviews");

    let (status, body) = call(&app, import_request(&sample_export())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported"], 0);
    assert_eq!(body["duplicates"], 2);
}

#[tokio::test]
async fn import_rejects_an_empty_upload() {
    let app = setup_app();
    let (status, body) = call(&app, import_request("")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("select a file"));
}

#[tokio::test]
async fn import_rejects_missing_columns() {
    let app = setup_app();
    let (status, body) = call(&app, import_request("Title,My Rating\nDune,5\n")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("missing required columns"));
    assert!(message.contains("Author l-f"));
}

// =============================================================================
// Reviews and Books
// =============================================================================

#[tokio::test]
async fn review_listing_defaults_to_favorites() {
    let app = setup_app();
    call(&app, import_request(&sample_export())).await;

    let (status, body) = call(&app, get("/api/bookreviews")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected_shelf"], "favorites");
    let reviews = body["reviews"].as_array().unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0]["title"], "The Road");
    assert_eq!(reviews[0]["reading_time_minutes"], 1);
    assert_eq!(reviews[0]["title_by_author"], "The Road by Cormac McCarthy");

    let review_id = reviews[0]["id"].as_str().unwrap().to_string();
    let book_id = reviews[0]["book_id"].as_str().unwrap().to_string();

    let (status, review) = call(&app, get(&format!("/api/bookreviews/{}", review_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["reviewer_full_name"], "Levi Hobbs");

    let (status, book) = call(&app, get(&format!("/api/books/{}", book_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["isbn13"], "9780307387899");
    assert_eq!(book["bookshelves"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn search_finds_reviews_by_author() {
    let app = setup_app();
    call(&app, import_request(&sample_export())).await;

    let (status, body) = call(&app, get("/api/bookreviews/search?q=austen")).await;
    assert_eq!(status, StatusCode::OK);
    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["title"], "Emma");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = setup_app();
    let missing = uuid::Uuid::new_v4();

    let (status, body) = call(&app, get(&format!("/api/books/{}", missing))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&missing.to_string()));

    let (status, _) = call(&app, get(&format!("/api/bookshelves/{}", missing))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Configuration and Tones
// =============================================================================

#[tokio::test]
async fn configured_genres_drive_tone_suggestions() {
    let app = setup_app();
    call(&app, import_request(&sample_export())).await;

    let (_, shelves) = call(&app, get("/api/bookshelves")).await;
    let dystopia = shelves
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "dystopia")
        .unwrap()["id"]
        .clone();

    let (status, config) = call(
        &app,
        send_json(
            "POST",
            "/api/bookshelves/configuration",
            json!({
                "enable_custom_mappings": true,
                "groupings": [
                    { "name": "Dystopian", "is_genre_based": true, "bookshelf_ids": [dystopia] }
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(config["enable_custom_mappings"], true);
    assert_eq!(config["groupings"][0]["name"], "Dystopian");

    let (status, tree) = call(
        &app,
        send_json(
            "POST",
            "/api/tones/configuration",
            json!({
                "tones": [
                    { "name": "Dark", "subtones": [ { "name": "Bleak" } ] },
                    { "name": "Witty" }
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tree[0]["name"], "Dark");
    let bleak = tree[0]["subtones"][0]["id"].as_str().unwrap().to_string();

    let (status, assignment) = call(&app, get("/api/tones/assignment")).await;
    assert_eq!(status, StatusCode::OK);
    let road = assignment["books_without_tones"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["title"] == "The Road")
        .unwrap()
        .clone();
    assert_eq!(road["genres"], json!(["Dystopian"]));
    let suggested: Vec<&str> = road["suggested_tone_ids"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(suggested.contains(&bleak.as_str()));

    let (status, saved) = call(
        &app,
        send_json(
            "POST",
            "/api/tones/assignment",
            json!({ "assignments": [ { "review_id": road["review_id"], "assigned_tone_ids": [bleak] } ] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["updated"], 1);

    let (_, book) = call(&app, get(&format!("/api/books/{}", road["book_id"].as_str().unwrap()))).await;
    assert_eq!(book["tones"][0]["name"], "Bleak");
}

#[tokio::test]
async fn duplicate_tone_names_are_rejected() {
    let app = setup_app();
    let (status, body) = call(
        &app,
        send_json(
            "POST",
            "/api/tones/configuration",
            json!({ "tones": [ { "name": "Dark" }, { "name": "dark" } ] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// =============================================================================
// Tone Recommendation Feedback
// =============================================================================

#[tokio::test]
async fn recommendation_feedback_round_trip() {
    let app = setup_app();
    call(&app, import_request(&sample_export())).await;
    let (_, listing) = call(&app, get("/api/bookreviews?recent=true")).await;
    let book_id = listing["reviews"][0]["book_id"].clone();

    let (status, created) = call(
        &app,
        send_json(
            "POST",
            "/api/book-tone-recommendations",
            json!({ "book_id": book_id, "tone": "Bleak", "feedback": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        send_json(
            "POST",
            "/api/book-tone-recommendations",
            json!({ "book_id": book_id, "tone": "Bleak", "feedback": 0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = call(
        &app,
        send_json(
            "PUT",
            &format!("/api/book-tone-recommendations/{}", id),
            json!({ "feedback": -2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["feedback"], -2);

    let (status, _) = call(
        &app,
        send_json(
            "PUT",
            &format!("/api/book-tone-recommendations/{}", id),
            json!({ "feedback": 5 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, by_book) = call(
        &app,
        get(&format!(
            "/api/book-tone-recommendations/book/{}",
            book_id.as_str().unwrap()
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_book.as_array().unwrap().len(), 1);

    let (status, filtered) = call(&app, get("/api/book-tone-recommendations?tone=Dark")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(filtered.as_array().unwrap().is_empty());
}

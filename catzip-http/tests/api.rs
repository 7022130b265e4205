use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use catzip_core::{Catalog, CatalogConfig, CatalogError, FileRecord, MemorySource, RecordSource};
use catzip_http::router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use zip::ZipArchive;

fn record(dir: &Path, name: &str, category: Option<&str>, exists: bool) -> FileRecord {
    let p = dir.join(name);
    if exists {
        fs::write(&p, name).unwrap();
    }
    FileRecord::new(name, p.to_string_lossy(), category)
}

fn app(records: Vec<FileRecord>) -> Router {
    app_with(records, CatalogConfig::default())
}

fn app_with(records: Vec<FileRecord>, config: CatalogConfig) -> Router {
    router(Arc::new(Catalog::new(MemorySource::new(records), config)))
}

/// Source whose backing database cannot be reached.
struct Offline;

impl RecordSource for Offline {
    async fn records(&self, _category: Option<&str>) -> catzip_core::Result<Vec<FileRecord>> {
        Err(CatalogError::SourceUnavailable("connection refused".into()))
    }
}

fn fixture(dir: &Path) -> Vec<FileRecord> {
    let mut records: Vec<_> = (1..=5)
        .map(|i| record(dir, &format!("보고서_00{i}.pdf"), Some("보고서"), true))
        .collect();
    records.push(record(dir, "회의록_001.txt", Some("회의록"), true));
    records.push(record(dir, "회의록_002.txt", Some("회의록"), false));
    records.push(record(dir, "숨김.txt", Some("회의록"), true).hidden());
    records.push(record(dir, "공지사항_001.txt", None, true));
    records
}

async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let res = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn zip_names(body: Vec<u8>) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(body)).unwrap();
    let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

fn encoded(s: &str) -> String {
    s.bytes().map(|b| format!("%{b:02X}")).collect()
}

#[tokio::test]
async fn lists_categories() {
    let dir = TempDir::new().unwrap();
    let (status, body) = get_json(app(fixture(dir.path())), "/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"], serde_json::json!(["보고서", "회의록"]));
}

#[tokio::test]
async fn lists_one_category() {
    let dir = TempDir::new().unwrap();
    let uri = format!("/api/files/category/{}", encoded("회의록"));
    let (status, body) = get_json(app(fixture(dir.path())), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["files"][0]["name"], "회의록_001.txt");
    assert!(body["files"][0]["path"].as_str().unwrap().ends_with("회의록_001.txt"));
}

#[tokio::test]
async fn unknown_category_is_404() {
    let dir = TempDir::new().unwrap();
    let (status, body) = get_json(app(fixture(dir.path())), "/api/files/category/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn lists_everything_grouped() {
    let dir = TempDir::new().unwrap();
    let (status, body) = get_json(app(fixture(dir.path())), "/api/files").await;
    assert_eq!(status, StatusCode::OK);
    let groups = body.as_object().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(body["보고서"].as_array().unwrap().len(), 5);
    assert_eq!(body["회의록"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_catalog_lists_as_empty_object() {
    let (status, body) = get_json(app(Vec::new()), "/api/files").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({}));
}

#[tokio::test]
async fn preview_limits_files_and_reports_totals() {
    let dir = TempDir::new().unwrap();
    let (status, body) = get_json(app(fixture(dir.path())), "/api/files/preview?limit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["보고서"]["files"].as_array().unwrap().len(), 3);
    assert_eq!(body["보고서"]["total_count"], 5);
    assert_eq!(body["보고서"]["files"][0]["name"], "보고서_001.pdf");
    assert_eq!(body["회의록"]["total_count"], 2);

    let (status, body) = get_json(app(fixture(dir.path())), "/api/files/preview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["보고서"]["files"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn preview_rejects_zero_limit() {
    let dir = TempDir::new().unwrap();
    let (status, body) = get_json(app(fixture(dir.path())), "/api/files/preview?limit=0").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn preview_rejects_malformed_limit_with_detail() {
    let dir = TempDir::new().unwrap();
    for uri in ["/api/files/preview?limit=abc", "/api/files/preview?limit=-1"] {
        let (status, headers, body) = get(app(fixture(dir.path())), uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(body["detail"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn downloads_category_flat() {
    let dir = TempDir::new().unwrap();
    let uri = format!("/api/download/category/{}", encoded("회의록"));
    let (status, headers, body) = get(app(fixture(dir.path())), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/zip");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        format!("attachment; filename*=UTF-8''{}.zip", encoded("회의록")).as_str()
    );
    assert_eq!(zip_names(body), ["회의록_001.txt"]);
}

#[tokio::test]
async fn downloads_everything_namespaced() {
    let dir = TempDir::new().unwrap();
    let (status, headers, body) = get(app(fixture(dir.path())), "/api/download/all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename*=UTF-8''all_documents_by_category.zip"
    );
    let names = zip_names(body);
    assert_eq!(names.len(), 7);
    assert!(names.contains(&"보고서/보고서_003.pdf".to_string()));
    assert!(names.contains(&"회의록/회의록_001.txt".to_string()));
    assert!(names.contains(&"기타/공지사항_001.txt".to_string()));
    assert!(names.iter().all(|n| !n.contains("숨김")));
}

#[tokio::test]
async fn download_over_entry_limit_is_413() {
    let dir = TempDir::new().unwrap();
    let mut config = CatalogConfig::default();
    config.archive.max_entries = Some(1);
    let uri = format!("/api/download/category/{}", encoded("보고서"));
    let (status, body) = get_json(app_with(fixture(dir.path()), config), &uri).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["detail"].as_str().unwrap().contains("max 1"));
}

#[tokio::test]
async fn unreachable_source_is_503() {
    let app = router(Arc::new(Catalog::new(Offline, CatalogConfig::default())));
    for uri in ["/api/categories", "/api/files", "/api/download/all"] {
        let (status, body) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert!(body["detail"].as_str().unwrap().contains("connection refused"));
    }
}

#[tokio::test]
async fn download_with_nothing_on_disk_is_404() {
    let dir = TempDir::new().unwrap();
    let records = vec![record(dir.path(), "gone.txt", Some("x"), false)];
    let (status, _, _) = get(app(records.clone()), "/api/download/category/x").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = get(app(records), "/api/download/all").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_of_empty_catalog_is_404() {
    let (status, body) = get_json(app(Vec::new()), "/api/download/all").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn health_and_cors() {
    let res = app(Vec::new())
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::get;
use catzip_core::{Catalog, CategoryIndex, FileRef, Preview, RecordSource};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::ApiError;
use crate::stream::archive_response;

pub const FULL_ARCHIVE_NAME: &str = "all_documents_by_category.zip";

type Shared<S> = State<Arc<Catalog<S>>>;

#[derive(Serialize)]
pub struct CategoriesBody {
    pub categories: Vec<String>,
}

#[derive(Serialize)]
pub struct CategoryFilesBody {
    pub files: Vec<FileRef>,
    pub count: usize,
}

#[derive(Deserialize)]
pub struct PreviewParams {
    pub limit: Option<usize>,
}

pub fn router<S: RecordSource + 'static>(catalog: Arc<Catalog<S>>) -> Router {
    let api = Router::new()
        .route("/categories", get(categories::<S>))
        .route("/files", get(all_files::<S>))
        .route("/files/preview", get(preview::<S>))
        .route("/files/category/{category}", get(category_files::<S>))
        .route("/download/category/{category}", get(download_category::<S>))
        .route("/download/all", get(download_all::<S>))
        .with_state(catalog);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
}

async fn categories<S: RecordSource>(
    State(catalog): Shared<S>,
) -> Result<Json<CategoriesBody>, ApiError> {
    let categories = catalog.categories().await?;
    Ok(Json(CategoriesBody { categories }))
}

async fn category_files<S: RecordSource>(
    State(catalog): Shared<S>,
    Path(category): Path<String>,
) -> Result<Json<CategoryFilesBody>, ApiError> {
    let files = catalog.list_category(&category).await?;
    Ok(Json(CategoryFilesBody {
        count: files.len(),
        files,
    }))
}

async fn all_files<S: RecordSource>(
    State(catalog): Shared<S>,
) -> Result<Json<CategoryIndex>, ApiError> {
    Ok(Json(catalog.list_all().await?))
}

async fn preview<S: RecordSource>(
    State(catalog): Shared<S>,
    params: Result<Query<PreviewParams>, QueryRejection>,
) -> Result<Json<Preview>, ApiError> {
    let Query(params) = params?;
    Ok(Json(catalog.preview(params.limit).await?))
}

async fn download_category<S: RecordSource>(
    State(catalog): Shared<S>,
    Path(category): Path<String>,
) -> Result<Response, ApiError> {
    let plan = catalog.plan_category_archive(&category).await?;
    info!(category = %category, entries = plan.entries.len(), "category download");
    archive_response(
        plan,
        catalog.config().archive.clone(),
        &format!("{category}.zip"),
    )
}

async fn download_all<S: RecordSource>(State(catalog): Shared<S>) -> Result<Response, ApiError> {
    let plan = catalog.plan_full_archive().await?;
    info!(entries = plan.entries.len(), "full download");
    archive_response(plan, catalog.config().archive.clone(), FULL_ARCHIVE_NAME)
}

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, anyhow};
use axum::Json;
use axum::extract::{Path as UrlPath, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum_auth::AuthBearer;
use axum_typed_multipart::TypedMultipart;
use log::info;

use super::error::{AppError, Result};
use super::state::AppState;
use super::types::*;
use crate::indexer::CaptionDocument;
use crate::metrics;

/// 上传图片并建立索引
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = UploadResponse),
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    AuthBearer(token): AuthBearer,
    data: TypedMultipart<UploadRequest>,
) -> Result<Json<UploadResponse>> {
    state.check_token(&token)?;

    let mut result = vec![];
    for file in &data.file {
        let filename = check_filename(&file.metadata.file_name)?;

        info!("正在上传图片: {}", filename);
        let id = state.indexer.upload_image(filename, &file.contents).await?;
        let document =
            state.indexer.get_document_by_id(&id).await.context("上传后的文档丢失")?;
        metrics::inc_upload_count();

        result.push(UploadedImage {
            id,
            filename: filename.to_string(),
            caption: document.text,
        });
    }

    Ok(Json(UploadResponse { result }))
}

/// 按文本查询搜索图片
#[utoipa::path(
    post,
    path = "/search",
    request_body = SearchRequest,
    responses(
        (status = 200, body = SearchResponse),
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    AuthBearer(token): AuthBearer,
    data: Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    state.check_token(&token)?;

    let count = data.count.unwrap_or(state.search.count);
    let start = Instant::now();

    info!("正在搜索: {}", data.query);
    let docs = state.indexer.retrieve_document_by_query(&data.query, count).await?;
    let result = to_hits(&state, docs).await;

    metrics::observe_search("text", start.elapsed().as_secs_f32());
    Ok(Json(SearchResponse { time: start.elapsed().as_millis() as u32, result }))
}

/// 以图搜图
#[utoipa::path(
    post,
    path = "/reverse",
    request_body(content = ReverseSearchForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = SearchResponse),
    )
)]
pub async fn reverse_handler(
    State(state): State<Arc<AppState>>,
    AuthBearer(token): AuthBearer,
    data: TypedMultipart<ReverseSearchRequest>,
) -> Result<Json<SearchResponse>> {
    state.check_token(&token)?;

    let filename = check_filename(&data.file.metadata.file_name)?;
    let count = data.count.unwrap_or(state.search.count);
    let start = Instant::now();

    info!("正在以图搜图: {}", filename);
    let docs = state
        .indexer
        .retrieve_documents_by_image(filename, &data.file.contents, count)
        .await?;
    let result = to_hits(&state, docs).await;

    metrics::observe_search("image", start.elapsed().as_secs_f32());
    Ok(Json(SearchResponse { time: start.elapsed().as_millis() as u32, result }))
}

/// 根据文档 ID 查询描述文档
#[utoipa::path(
    get,
    path = "/document/{id}",
    responses(
        (status = 200, body = CaptionDocument),
        (status = 404, description = "文档不存在"),
    )
)]
pub async fn document_handler(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<CaptionDocument>> {
    let document =
        state.indexer.get_document_by_id(&id).await.ok_or_else(|| AppError::not_found(&id))?;
    Ok(Json(document))
}

/// 根据文档 ID 获取图片内容
#[utoipa::path(
    get,
    path = "/image/{id}",
    responses(
        (status = 200, description = "图片内容"),
        (status = 404, description = "文档不存在"),
    )
)]
pub async fn image_handler(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
) -> Result<Response> {
    let path =
        state.indexer.get_image_path_by_id(&id).await.ok_or_else(|| AppError::not_found(&id))?;
    let data = tokio::fs::read(&path).await?;

    let ext = path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase());
    let content_type = match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    };
    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}

/// 把检索到的文档转换为搜索结果，附带图片路径
async fn to_hits(state: &AppState, docs: Vec<CaptionDocument>) -> Vec<SearchHit> {
    let mut hits = vec![];
    for doc in docs {
        let Some(image) = state.indexer.get_image_path_by_id(&doc.id).await else {
            continue;
        };
        hits.push(SearchHit {
            id: doc.id,
            caption: doc.text,
            image: image.to_string_lossy().to_string(),
        });
    }
    hits
}

/// 校验上传文件名：必须非空、只保留最后一级避免路径穿越、且为支持的图片格式
fn check_filename(file_name: &Option<String>) -> Result<&str> {
    let file_name = file_name.as_deref().ok_or_else(|| anyhow!("文件名不能为空"))?;
    let file_name = Path::new(file_name)
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("无效的文件名: {}", file_name))?;
    match Path::new(file_name).extension().and_then(|s| s.to_str()) {
        Some(ext) if matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png") => {
            Ok(file_name)
        }
        _ => Err(anyhow!("不支持的图片格式: {}", file_name).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::check_filename;

    #[test]
    fn filename_accepts_supported_formats() {
        for name in ["cat.jpg", "cat.JPEG", "cat.png"] {
            assert!(matches!(check_filename(&Some(name.to_string())), Ok(n) if n == name));
        }
    }

    #[test]
    fn filename_strips_directories() {
        assert!(matches!(check_filename(&Some("../../etc/cat.png".to_string())), Ok("cat.png")));
    }

    #[test]
    fn filename_rejects_unsupported() {
        assert!(check_filename(&None).is_err());
        assert!(check_filename(&Some("cat.gif".to_string())).is_err());
        assert!(check_filename(&Some("cat".to_string())).is_err());
    }
}

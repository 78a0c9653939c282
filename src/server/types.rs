use axum::body::Bytes;
use axum_typed_multipart::{FieldData, TryFromMultipart};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 上传请求参数
#[derive(TryFromMultipart)]
pub struct UploadRequest {
    pub file: Vec<FieldData<Bytes>>,
}

/// 上传表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct UploadForm {
    /// 上传的图片文件，可以是多张图片
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// 以图搜图请求参数
#[derive(TryFromMultipart)]
pub struct ReverseSearchRequest {
    pub file: FieldData<Bytes>,
    pub count: Option<usize>,
}

/// 以图搜图表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct ReverseSearchForm {
    /// 用于对比的图片文件
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// 返回的结果数量
    pub count: Option<usize>,
}

/// 文本搜索请求
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// 查询文本
    pub query: String,
    /// 返回的结果数量
    #[serde(default)]
    pub count: Option<usize>,
}

/// 单条搜索结果
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchHit {
    /// 文档 ID
    pub id: String,
    /// 图片描述
    pub caption: String,
    /// 图片路径
    pub image: String,
}

/// 搜索响应
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    /// 搜索耗时，单位为毫秒
    pub time: u32,
    /// 搜索结果，相似度从高到低排列
    pub result: Vec<SearchHit>,
}

/// 上传结果中的单张图片
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedImage {
    /// 文档 ID
    pub id: String,
    /// 图片文件名
    pub filename: String,
    /// 图片描述
    pub caption: String,
}

/// 上传响应
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub result: Vec<UploadedImage>,
}

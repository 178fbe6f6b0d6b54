//! 统一文档提取接口
//!
//! 每种文档格式的提取器都实现 `DocumentExtractor`，把二进制文件转换为纯文本和元数据。

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONTENT_TYPE_PDF: &str = "application/pdf";
pub const CONTENT_TYPE_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const CONTENT_TYPE_DOC: &str = "application/msword";

/// 待提取的文档来源
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// 磁盘上的文件
    Path(PathBuf),
    /// 已读入内存的文件内容
    Bytes(Vec<u8>),
}

impl DocumentSource {
    /// 用于日志和错误信息的简短描述
    pub fn describe(&self) -> String {
        match self {
            DocumentSource::Path(path) => path.display().to_string(),
            DocumentSource::Bytes(bytes) => format!("<内存 {} 字节>", bytes.len()),
        }
    }
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        DocumentSource::Path(path)
    }
}

impl From<Vec<u8>> for DocumentSource {
    fn from(bytes: Vec<u8>) -> Self {
        DocumentSource::Bytes(bytes)
    }
}

/// 产生内容的引擎角色（仅 PDF 有主/备两套引擎）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineRole {
    Primary,
    Fallback,
}

/// 提取元数据
///
/// 文档属性字段逐项可选：读取失败或文档未提供时为 `None`，不会影响提取本身。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// 实际产生内容的提取方式（如 `pdfium`、`lopdf`、`docx`）
    pub extraction_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraphs: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<String>,
}

/// 单个文档的提取结果，所有权完整交给调用方
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub content: String,
    pub metadata: ExtractionMetadata,
}

/// 统一文档提取接口
pub trait DocumentExtractor: Send + Sync {
    /// 提取纯文本与元数据
    ///
    /// 失败时返回 `CoreError::ExtractionFailed`，其中包含底层原因。
    fn extract(&self, source: &DocumentSource) -> Result<ExtractionResult>;

    /// 该提取器接受的声明类型
    fn supported_content_types(&self) -> &'static [&'static str];
}

/// 去掉首尾空白；全空白视为“没有可提取的文本”
pub fn require_text(content: &str, what: &str) -> Result<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::ExtractionFailed(format!(
            "{}中未找到可提取的文本内容",
            what
        )));
    }
    Ok(trimmed.to_string())
}

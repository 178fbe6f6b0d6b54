//! PDF 文本引擎接口

use docmask_core::DocumentSource;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("pdfium 库不可用: {0}")]
    Unavailable(String),

    #[error("加载 PDF 失败: {0}")]
    Load(String),

    #[error("读取第 {page} 页失败: {reason}")]
    Page { page: usize, reason: String },

    #[error("未找到可提取的文本内容")]
    NoText,
}

/// 文档信息字典中的属性
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub creation_date: Option<String>,
}

/// 一个引擎的原始提取结果：按页顺序的文本与文档属性
#[derive(Debug, Clone, Default)]
pub struct PdfText {
    pub pages: Vec<String>,
    pub info: PdfInfo,
}

/// PDF 文本引擎
///
/// 主引擎与回退引擎都实现此接口，`PdfExtractor` 依次调用，测试中可注入任意实现。
pub trait PdfTextEngine: Send + Sync {
    /// 引擎名称，写入元数据的 `extraction_method`
    fn name(&self) -> &'static str;

    fn extract(&self, source: &DocumentSource) -> Result<PdfText, EngineError>;
}

/// 去掉首尾空白，空串视为未提供
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

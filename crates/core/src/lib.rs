//! 脱敏核心：规则注册、实体识别、文本遮罩，以及文档提取器共享的类型。

pub mod document;
pub mod mask;
pub mod rules;

pub use document::{
    DocumentExtractor, DocumentSource, EngineRole, ExtractionMetadata, ExtractionResult,
    CONTENT_TYPE_DOC, CONTENT_TYPE_DOCX, CONTENT_TYPE_PDF,
};
pub use mask::{mask_entities, mask_records, mask_value, MaskConfig, MaskOutcome};
pub use rules::{extract_entities, EntityMatch, EntityRecord, EntityType, RuleSet};

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("不支持的文件类型: {0}")]
    UnsupportedContentType(String),
    #[error("{0}")]
    ExtractionFailed(String),
    #[error("无效的规则类型: {0}")]
    MalformedRuleSet(String),
    #[error("实体记录缺少字段: {0}")]
    MalformedEntityRecord(String),
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

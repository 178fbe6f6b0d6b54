//! Docmask：法律文书文本提取与敏感信息脱敏
//!
//! - `docmask_core`：规则、实体识别、遮罩
//! - `docmask_pdf` / `docmask_docx`：文档提取器
//! - 本 crate：并发提取调度、配置、共享规则与流水线

pub mod config;
pub mod orchestrator;
pub mod pipeline;
pub mod shared;
pub mod threading;

pub use config::{load_config, save_config, ConfigError, DocmaskConfig};
pub use orchestrator::{DocumentKind, ExtractionOrchestrator};
pub use pipeline::{
    anonymize_text, quick_anonymize, quick_extract, rules_info, validate_entity, AnonymizedText,
    DocumentPipeline, ProcessedDocument, ProcessingInfo, RulesInfo,
};
pub use shared::SharedRules;
pub use threading::{resolve_workers, worker_count, WorkerSource, WORKERS_ENV};

pub use docmask_core::{
    extract_entities, mask_entities, mask_records, mask_value, CoreError, DocumentExtractor,
    DocumentSource, EngineRole, EntityMatch, EntityRecord, EntityType, ExtractionMetadata,
    ExtractionResult, MaskConfig, MaskOutcome, RuleSet,
};
pub use docmask_docx::DocxExtractor;
pub use docmask_pdf::{LopdfEngine, PdfExtractor, PdfTextEngine, PdfiumEngine};

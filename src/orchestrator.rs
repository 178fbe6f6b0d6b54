//! 文档提取调度
//!
//! 按声明的内容类型选择提取器，在阻塞线程池中执行。信号量限制同时进行的提取数，
//! 超出上限的调用排队等待。
//!
//! 并发数不等于 PDF 的并行度：pdfium 主引擎在进程内串行执行（见 `docmask_pdf`
//! 的 pdfium 引擎说明），多个 PDF 同时提取时会在 pdfium 的锁上排队，
//! 只有回退引擎和 Word 提取能真正并行。

use crate::config::DocmaskConfig;
use crate::threading::resolve_workers;
use docmask_core::{
    CoreError, DocumentExtractor, DocumentSource, ExtractionResult, Result, CONTENT_TYPE_DOC,
    CONTENT_TYPE_DOCX, CONTENT_TYPE_PDF,
};
use docmask_docx::DocxExtractor;
use docmask_pdf::PdfExtractor;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// 文档类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// 流式文本（PDF）
    Pdf,
    /// 结构化标记（Word）
    Word,
}

impl DocumentKind {
    /// 只看声明的类型，不嗅探内容
    pub fn from_content_type(content_type: &str) -> Result<Self> {
        match content_type {
            CONTENT_TYPE_PDF => Ok(DocumentKind::Pdf),
            CONTENT_TYPE_DOCX | CONTENT_TYPE_DOC => Ok(DocumentKind::Word),
            other => Err(CoreError::UnsupportedContentType(other.to_string())),
        }
    }
}

pub struct ExtractionOrchestrator {
    pdf: Arc<dyn DocumentExtractor>,
    word: Arc<dyn DocumentExtractor>,
    permits: Arc<Semaphore>,
    workers: usize,
}

impl Default for ExtractionOrchestrator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ExtractionOrchestrator {
    /// `workers` 为 `None` 时按环境变量或 CPU 数决定
    pub fn new(workers: Option<usize>) -> Self {
        let (workers, source) = resolve_workers(workers);
        log::info!("[Orchestrator] 并发提取数: {} (来源: {})", workers, source);

        Self {
            pdf: Arc::new(PdfExtractor::default()),
            word: Arc::new(DocxExtractor),
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn from_config(config: &DocmaskConfig) -> Self {
        Self::new(config.extract_workers)
    }

    pub fn with_pdf_extractor(mut self, extractor: impl DocumentExtractor + 'static) -> Self {
        self.pdf = Arc::new(extractor);
        self
    }

    pub fn with_word_extractor(mut self, extractor: impl DocumentExtractor + 'static) -> Self {
        self.word = Arc::new(extractor);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// 当前空闲的提取槽位
    pub fn available_workers(&self) -> usize {
        self.permits.available_permits()
    }

    fn extractor_for(&self, kind: DocumentKind) -> Arc<dyn DocumentExtractor> {
        match kind {
            DocumentKind::Pdf => Arc::clone(&self.pdf),
            DocumentKind::Word => Arc::clone(&self.word),
        }
    }

    /// 提取磁盘文件
    pub async fn extract_content(
        &self,
        path: impl AsRef<Path>,
        content_type: &str,
    ) -> Result<ExtractionResult> {
        self.run(DocumentSource::Path(path.as_ref().to_path_buf()), content_type)
            .await
    }

    /// 提取内存中的文件内容
    pub async fn extract_bytes(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<ExtractionResult> {
        self.run(DocumentSource::Bytes(bytes), content_type).await
    }

    async fn run(&self, source: DocumentSource, content_type: &str) -> Result<ExtractionResult> {
        let kind = DocumentKind::from_content_type(content_type)?;
        let extractor = self.extractor_for(kind);

        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| CoreError::ExtractionFailed(e.to_string()))?;

        log::info!("[Orchestrator] 开始提取 {:?}: {}", kind, source.describe());

        // 槽位随阻塞任务一起释放，调用方放弃等待不会提前归还
        let result = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            extractor.extract(&source)
        })
        .await
        .map_err(|e| CoreError::ExtractionFailed(format!("提取任务异常终止: {}", e)))?;

        match &result {
            Ok(extracted) => log::info!(
                "[Orchestrator] 提取完成: {}, {} 字符",
                extracted.metadata.extraction_method,
                extracted.content.chars().count()
            ),
            Err(e) => log::warn!("[Orchestrator] 提取失败: {}", e),
        }
        result
    }
}

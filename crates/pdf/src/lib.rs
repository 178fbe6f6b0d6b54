//! PDF 文本提取
//!
//! 先用 pdfium 提取，失败（包括提取结果只有空白）时透明地回退到内容流解析。
//! 元数据中记录实际产出内容的引擎。

mod dates;
mod decode;
mod engine;
mod pdfium;
mod stream;

pub use dates::normalize_pdf_date;
pub use engine::{EngineError, PdfInfo, PdfText, PdfTextEngine};
pub use pdfium::{PdfiumEngine, PDFIUM_DIR_ENV};
pub use stream::LopdfEngine;

use docmask_core::{
    document::require_text, CoreError, DocumentExtractor, DocumentSource, EngineRole,
    ExtractionMetadata, ExtractionResult, CONTENT_TYPE_PDF,
};
use std::path::Path;

/// 主引擎 + 回退引擎
pub struct PdfExtractor {
    primary: Box<dyn PdfTextEngine>,
    fallback: Box<dyn PdfTextEngine>,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new(Box::new(PdfiumEngine), Box::new(LopdfEngine))
    }
}

impl PdfExtractor {
    pub fn new(primary: Box<dyn PdfTextEngine>, fallback: Box<dyn PdfTextEngine>) -> Self {
        Self { primary, fallback }
    }

    fn attempt(
        engine: &dyn PdfTextEngine,
        source: &DocumentSource,
    ) -> Result<(String, PdfInfo, usize), EngineError> {
        let text = engine.extract(source)?;
        let page_count = text.pages.len();
        let content = assemble_pages(&text.pages);
        if content.trim().is_empty() {
            return Err(EngineError::NoText);
        }
        Ok((content, text.info, page_count))
    }
}

impl DocumentExtractor for PdfExtractor {
    fn extract(&self, source: &DocumentSource) -> docmask_core::Result<ExtractionResult> {
        let (engine, role, (content, info, pages)) =
            match Self::attempt(self.primary.as_ref(), source) {
                Ok(out) => (self.primary.as_ref(), EngineRole::Primary, out),
                Err(primary_err) => {
                    log::warn!(
                        "[PdfExtract] {} 提取失败，回退到 {}: {}",
                        self.primary.name(),
                        self.fallback.name(),
                        primary_err
                    );
                    match Self::attempt(self.fallback.as_ref(), source) {
                        Ok(out) => (self.fallback.as_ref(), EngineRole::Fallback, out),
                        Err(fallback_err) => {
                            return Err(CoreError::ExtractionFailed(format!(
                                "PDF提取失败: primary({}): {}; fallback({}): {}",
                                self.primary.name(),
                                primary_err,
                                self.fallback.name(),
                                fallback_err
                            )));
                        }
                    }
                }
            };

        log::info!(
            "[PdfExtract] {} 提取完成: {} 页, {} 字符",
            engine.name(),
            pages,
            content.chars().count()
        );

        let metadata = ExtractionMetadata {
            extraction_method: engine.name().to_string(),
            engine: Some(role),
            pages: Some(pages),
            title: info.title,
            author: info.author,
            creator: info.creator,
            creation_date: info.creation_date.map(|d| normalize_pdf_date(&d)),
            ..Default::default()
        };

        Ok(ExtractionResult {
            content: require_text(&content, "PDF")?,
            metadata,
        })
    }

    fn supported_content_types(&self) -> &'static [&'static str] {
        &[CONTENT_TYPE_PDF]
    }
}

/// 按页拼接文本，每页前加页码标记
fn assemble_pages(pages: &[String]) -> String {
    let mut content = String::new();
    for (index, text) in pages.iter().enumerate() {
        if text.trim().is_empty() {
            continue;
        }
        content.push_str(&format!("\n--- 第 {} 页 ---\n", index + 1));
        content.push_str(text);
        content.push('\n');
    }
    content
}

/// 用默认引擎组合提取 PDF 文件
pub fn extract(path: &Path) -> docmask_core::Result<ExtractionResult> {
    PdfExtractor::default().extract(&DocumentSource::Path(path.to_path_buf()))
}

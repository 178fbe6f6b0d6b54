//! 主引擎：pdfium
//!
//! pdfium 对字体编码的处理比直接解析内容流准确得多，优先使用。
//! 动态库依次在 `DOCMASK_PDFIUM_DIR`、可执行文件目录、系统库中查找。
//!
//! pdfium-render 的 `thread_safe` 特性下，`Pdfium` 实例存活期间持有进程级互斥锁，
//! 所以本引擎的提取在进程内是串行的，并发提取数只对回退引擎和 Word 生效。

use crate::engine::{non_empty, EngineError, PdfInfo, PdfText, PdfTextEngine};
use docmask_core::DocumentSource;
use pdfium_render::prelude::*;
use std::path::PathBuf;

/// 显式指定 pdfium 所在目录
pub const PDFIUM_DIR_ENV: &str = "DOCMASK_PDFIUM_DIR";

fn library_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = std::env::var_os(PDFIUM_DIR_ENV)
        .map(PathBuf::from)
        .into_iter()
        .collect();

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
    {
        dirs.push(exe_dir.join("libs"));
        dirs.push(exe_dir);
    }
    dirs
}

/// 绑定 pdfium；锁在返回值释放前一直持有
fn bind_pdfium() -> Result<Pdfium, EngineError> {
    for dir in library_dirs() {
        let lib_path = Pdfium::pdfium_platform_library_name_at_path(&dir);
        match Pdfium::bind_to_library(&lib_path) {
            Ok(bindings) => {
                log::debug!("[Pdfium] 已加载 {:?}", lib_path);
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => log::debug!("[Pdfium] 跳过 {:?}: {}", lib_path, e),
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| EngineError::Unavailable(e.to_string()))
}

/// 基于 pdfium-render 的文本引擎
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumEngine;

impl PdfTextEngine for PdfiumEngine {
    fn name(&self) -> &'static str {
        "pdfium"
    }

    fn extract(&self, source: &DocumentSource) -> Result<PdfText, EngineError> {
        let pdfium = bind_pdfium()?;

        let document = match source {
            DocumentSource::Path(path) => pdfium.load_pdf_from_file(path, None),
            DocumentSource::Bytes(bytes) => pdfium.load_pdf_from_byte_slice(bytes, None),
        }
        .map_err(|e| EngineError::Load(e.to_string()))?;

        let mut pages = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            let text = page.text().map_err(|e| EngineError::Page {
                page: index + 1,
                reason: e.to_string(),
            })?;
            pages.push(text.all());
        }

        let metadata = document.metadata();
        let read = |tag: PdfDocumentMetadataTagType| {
            metadata.get(tag).and_then(|t| non_empty(t.value()))
        };
        let info = PdfInfo {
            title: read(PdfDocumentMetadataTagType::Title),
            author: read(PdfDocumentMetadataTagType::Author),
            creator: read(PdfDocumentMetadataTagType::Creator),
            creation_date: read(PdfDocumentMetadataTagType::CreationDate),
        };

        Ok(PdfText { pages, info })
    }
}

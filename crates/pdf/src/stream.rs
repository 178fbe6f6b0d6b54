//! 回退引擎：直接解析内容流
//!
//! pdfium 不可用或加载失败时使用。对使用自定义编码的字体效果有限，
//! 但不依赖任何动态库。

use crate::decode::{decode_text_string, extract_text_from_content};
use crate::engine::{non_empty, EngineError, PdfInfo, PdfText, PdfTextEngine};
use docmask_core::DocumentSource;
use lopdf::{Dictionary, Document, Object};

/// 基于 lopdf 的文本引擎
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfEngine;

impl PdfTextEngine for LopdfEngine {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, source: &DocumentSource) -> Result<PdfText, EngineError> {
        let doc = match source {
            DocumentSource::Path(path) => Document::load(path),
            DocumentSource::Bytes(bytes) => Document::load_mem(bytes),
        }
        .map_err(|e| EngineError::Load(e.to_string()))?;

        let mut pages = Vec::new();
        for (page_num, page_id) in doc.get_pages() {
            let text = match doc.get_page_content(page_id) {
                Ok(data) => extract_text_from_content(&data).unwrap_or_else(|e| {
                    log::warn!("[Lopdf] 第 {} 页内容流解析失败: {}", page_num, e);
                    String::new()
                }),
                Err(e) => {
                    log::warn!("[Lopdf] 读取第 {} 页内容失败: {}", page_num, e);
                    String::new()
                }
            };
            pages.push(text);
        }

        Ok(PdfText {
            pages,
            info: read_info(&doc),
        })
    }
}

/// 读取 trailer 中的 Info 字典
fn read_info(doc: &Document) -> PdfInfo {
    let info = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        },
        Ok(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    };

    let Some(info) = info else {
        return PdfInfo::default();
    };

    PdfInfo {
        title: text_entry(doc, info, b"Title"),
        author: text_entry(doc, info, b"Author"),
        creator: text_entry(doc, info, b"Creator"),
        creation_date: text_entry(doc, info, b"CreationDate"),
    }
}

fn text_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let object = match dict.get(key).ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    match object {
        Object::String(bytes, _) => non_empty(&decode_text_string(bytes)),
        _ => None,
    }
}

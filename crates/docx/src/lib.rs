//! Word 文档文本提取
//!
//! 直接读取 OOXML 包：正文来自 `word/document.xml`，属性来自 `docProps/core.xml`。
//! 属性读取失败只会缺少对应字段，不影响提取。

mod body;
mod properties;

pub use body::{parse_body, Body};
pub use properties::{parse_core_properties, CoreProperties};

use docmask_core::{
    document::require_text, CoreError, DocumentExtractor, DocumentSource, ExtractionMetadata,
    ExtractionResult, CONTENT_TYPE_DOC, CONTENT_TYPE_DOCX,
};
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use thiserror::Error;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";
const CORE_PART: &str = "docProps/core.xml";

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("无法打开文档包: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("XML 解析失败: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DocxError> for CoreError {
    fn from(err: DocxError) -> Self {
        CoreError::ExtractionFailed(format!("Word文档提取失败: {}", err))
    }
}

/// Word 文档提取器
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl DocumentExtractor for DocxExtractor {
    fn extract(&self, source: &DocumentSource) -> docmask_core::Result<ExtractionResult> {
        let (body, props) = open(source)?;

        let (content, paragraphs) = assemble(&body);
        log::info!(
            "[Docx] 提取完成: {} 段落, {} 表格, {} 字符",
            paragraphs,
            body.tables.len(),
            content.chars().count()
        );

        let content = require_text(&content, "Word文档").map_err(|e| {
            CoreError::ExtractionFailed(format!("Word文档提取失败: {}", e))
        })?;

        Ok(ExtractionResult {
            content,
            metadata: ExtractionMetadata {
                extraction_method: "docx".to_string(),
                paragraphs: Some(paragraphs),
                tables: Some(body.tables.len()),
                title: props.title,
                author: props.creator.clone(),
                creator: props.creator,
                creation_date: props.created,
                modified_date: props.modified,
                ..Default::default()
            },
        })
    }

    fn supported_content_types(&self) -> &'static [&'static str] {
        &[CONTENT_TYPE_DOCX, CONTENT_TYPE_DOC]
    }
}

fn open(source: &DocumentSource) -> Result<(Body, CoreProperties), DocxError> {
    match source {
        DocumentSource::Path(path) => read_package(ZipArchive::new(File::open(path)?)?),
        DocumentSource::Bytes(bytes) => {
            read_package(ZipArchive::new(Cursor::new(bytes.as_slice()))?)
        }
    }
}

fn read_package<R: Read + Seek>(
    mut archive: ZipArchive<R>,
) -> Result<(Body, CoreProperties), DocxError> {
    let xml = read_part(&mut archive, DOCUMENT_PART)?;
    let body = parse_body(&xml)?;

    let props = match read_part(&mut archive, CORE_PART) {
        Ok(xml) => parse_core_properties(&xml).unwrap_or_else(|e| {
            log::warn!("[Docx] 文档属性解析失败: {}", e);
            CoreProperties::default()
        }),
        Err(e) => {
            log::debug!("[Docx] 未读取到文档属性: {}", e);
            CoreProperties::default()
        }
    };

    Ok((body, props))
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String, DocxError> {
    let mut part = archive.by_name(name)?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// 拼接正文：非空段落后接空行，表格追加在所有段落之后
fn assemble(body: &Body) -> (String, usize) {
    let mut content = String::new();
    let mut paragraphs = 0;

    for text in &body.paragraphs {
        if text.trim().is_empty() {
            continue;
        }
        content.push_str(text);
        content.push_str("\n\n");
        paragraphs += 1;
    }

    if !body.tables.is_empty() {
        content.push_str("\n--- 表格内容 ---\n");
        for (index, table) in body.tables.iter().enumerate() {
            content.push_str(&format!("\n表格 {}:\n", index + 1));
            for row in table {
                content.push_str(&row.join(" | "));
                content.push('\n');
            }
            content.push('\n');
        }
    }

    (content, paragraphs)
}

/// 提取 Word 文件
pub fn extract(path: &Path) -> docmask_core::Result<ExtractionResult> {
    DocxExtractor.extract(&DocumentSource::Path(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const W_NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn paragraph(text: &str) -> String {
        format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text)
    }

    fn build_docx(body: &str, core: Option<&str>) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        writer.start_file(DOCUMENT_PART, options).unwrap();
        write!(
            writer,
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document {}><w:body>{}</w:body></w:document>"#,
            W_NS, body
        )
        .unwrap();

        if let Some(core) = core {
            writer.start_file(CORE_PART, options).unwrap();
            writer.write_all(core.as_bytes()).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_paragraphs_and_tables() {
        let body = format!(
            "{}{}{}<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
            paragraph("原告：张三"),
            paragraph("   "),
            paragraph("电话：13812345678"),
            paragraph("姓名"),
            paragraph("邮箱"),
            paragraph("李四"),
            paragraph("abc@x.com"),
        );
        let core = r#"<cp:coreProperties xmlns:cp="cp" xmlns:dc="dc" xmlns:dcterms="dcterms"><dc:title>起诉状</dc:title><dc:creator>王五</dc:creator><dcterms:created>2023-03-01T08:00:00Z</dcterms:created></cp:coreProperties>"#;
        let bytes = build_docx(&body, Some(core));

        let result = DocxExtractor.extract(&DocumentSource::Bytes(bytes)).unwrap();

        assert_eq!(
            result.content,
            "原告：张三\n\n电话：13812345678\n\n\n--- 表格内容 ---\n\n表格 1:\n姓名 | 邮箱\n李四 | abc@x.com"
        );
        let metadata = result.metadata;
        assert_eq!(metadata.extraction_method, "docx");
        assert_eq!(metadata.paragraphs, Some(2));
        assert_eq!(metadata.tables, Some(1));
        assert_eq!(metadata.title.as_deref(), Some("起诉状"));
        assert_eq!(metadata.author.as_deref(), Some("王五"));
        assert_eq!(metadata.creator.as_deref(), Some("王五"));
        assert_eq!(
            metadata.creation_date.as_deref(),
            Some("2023-03-01T08:00:00+00:00")
        );
        assert_eq!(metadata.modified_date, None);
    }

    #[test]
    fn test_broken_properties_do_not_fail() {
        let bytes = build_docx(&paragraph("正文"), Some("<cp:coreProperties><dc:title>"));
        let result = DocxExtractor.extract(&DocumentSource::Bytes(bytes)).unwrap();
        assert_eq!(result.content, "正文");
        assert_eq!(result.metadata.title, None);
    }

    #[test]
    fn test_missing_properties_part() {
        let bytes = build_docx(&paragraph("正文"), None);
        let result = DocxExtractor.extract(&DocumentSource::Bytes(bytes)).unwrap();
        assert_eq!(result.metadata.paragraphs, Some(1));
        assert_eq!(result.metadata.author, None);
    }

    #[test]
    fn test_whitespace_document_fails() {
        let bytes = build_docx(&format!("{}<w:p/>", paragraph(" ")), None);
        let err = DocxExtractor
            .extract(&DocumentSource::Bytes(bytes))
            .unwrap_err();
        assert!(matches!(err, CoreError::ExtractionFailed(_)));
        assert!(err.to_string().starts_with("Word文档提取失败"));
    }

    #[test]
    fn test_legacy_binary_fails() {
        // OLE 复合文档头
        let bytes = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0, 0, 0, 0];
        let err = DocxExtractor
            .extract(&DocumentSource::Bytes(bytes))
            .unwrap_err();
        assert!(matches!(err, CoreError::ExtractionFailed(_)));
    }

    #[test]
    fn test_extract_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("判决书.docx");
        std::fs::write(&path, build_docx(&paragraph("案号(2023)京01民初123号"), None)).unwrap();

        let result = extract(&path).unwrap();
        assert_eq!(result.content, "案号(2023)京01民初123号");
    }

    #[test]
    fn test_missing_file_fails() {
        let err = extract(Path::new("/nonexistent/docmask/a.docx")).unwrap_err();
        assert!(matches!(err, CoreError::ExtractionFailed(_)));
        assert!(err.to_string().contains("IO 错误"));
    }
}

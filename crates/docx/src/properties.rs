//! `docProps/core.xml` 文档属性

use chrono::DateTime;
use quick_xml::events::Event;
use quick_xml::Reader;

/// 核心属性，逐项可选
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Creator,
    Created,
    Modified,
}

/// 解析核心属性
///
/// 时间戳按 W3CDTF 解析并输出为 RFC 3339，无法解析的时间戳视为未提供。
pub fn parse_core_properties(xml: &str) -> Result<CoreProperties, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut props = CoreProperties::default();
    let mut field: Option<Field> = None;
    let mut value = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                field = match e.name().as_ref() {
                    b"dc:title" => Some(Field::Title),
                    b"dc:creator" => Some(Field::Creator),
                    b"dcterms:created" => Some(Field::Created),
                    b"dcterms:modified" => Some(Field::Modified),
                    _ => None,
                };
                value.clear();
            }
            Event::Text(t) if field.is_some() => value.push_str(&t.unescape()?),
            Event::End(_) => {
                if let Some(f) = field.take() {
                    let text = value.trim();
                    if !text.is_empty() {
                        match f {
                            Field::Title => props.title = Some(text.to_string()),
                            Field::Creator => props.creator = Some(text.to_string()),
                            Field::Created => props.created = normalize_timestamp(text),
                            Field::Modified => props.modified = normalize_timestamp(text),
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(props)
}

fn normalize_timestamp(raw: &str) -> Option<String> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.to_rfc3339()),
        Err(e) => {
            log::warn!("[Docx] 无法解析时间戳 {:?}: {}", raw, e);
            None
        }
    }
}

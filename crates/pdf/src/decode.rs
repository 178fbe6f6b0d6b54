//! 内容流文本解码
//!
//! 回退引擎不依赖字体映射，直接遍历内容流里的文本操作符（Tj/TJ/'/"），
//! 按 UTF-16BE、UTF-8、Latin-1 的顺序尝试解码字符串。

use lopdf::content::Content;
use lopdf::{Object, StringFormat};

/// TJ 数组中超过此值的负向偏移视为词间空格（单位：千分之一字号）
const WORD_GAP: f32 = 200.0;

/// 从内容流中提取纯文本
pub fn extract_text_from_content(content_data: &[u8]) -> Result<String, String> {
    let content = Content::decode(content_data).map_err(|e| e.to_string())?;
    let mut text = String::new();

    for op in &content.operations {
        match op.operator.as_str() {
            "Tj" => {
                if let Some(Object::String(bytes, format)) = op.operands.first() {
                    text.push_str(&decode_pdf_string(bytes, *format));
                }
            }
            "'" => {
                new_line(&mut text);
                if let Some(Object::String(bytes, format)) = op.operands.first() {
                    text.push_str(&decode_pdf_string(bytes, *format));
                }
            }
            "\"" => {
                new_line(&mut text);
                if let Some(Object::String(bytes, format)) = op.operands.get(2) {
                    text.push_str(&decode_pdf_string(bytes, *format));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, format) => {
                                text.push_str(&decode_pdf_string(bytes, *format));
                            }
                            Object::Integer(n) if (*n as f32) < -WORD_GAP => text.push(' '),
                            Object::Real(n) if (*n as f32) < -WORD_GAP => text.push(' '),
                            _ => {}
                        }
                    }
                }
            }
            "Td" | "TD" => {
                let moves_line = op
                    .operands
                    .get(1)
                    .and_then(number)
                    .map(|ty| ty != 0.0)
                    .unwrap_or(false);
                if moves_line {
                    new_line(&mut text);
                }
            }
            "T*" | "ET" => new_line(&mut text),
            _ => {}
        }
    }

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    Ok(lines.join("\n"))
}

fn new_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// 解码 PDF 字符串
///
/// lopdf 已经处理了转义与十六进制，这里只负责字符编码。
pub fn decode_pdf_string(bytes: &[u8], format: StringFormat) -> String {
    if let Some(decoded) = decode_utf16_with_bom(bytes) {
        return decoded;
    }

    // 十六进制串常见于 CID 字体，先尝试 UTF-16BE
    if format == StringFormat::Hexadecimal && bytes.len() >= 2 && bytes.len() % 2 == 0 {
        if let Some(decoded) = decode_utf16(bytes) {
            if decoded
                .chars()
                .all(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
            {
                return decoded;
            }
        }
    }

    if let Ok(decoded) = std::str::from_utf8(bytes) {
        return decoded.to_string();
    }

    // 回退到 Latin-1
    bytes
        .iter()
        .filter(|&&b| (32..127).contains(&b) || b >= 160)
        .map(|&b| b as char)
        .collect()
}

/// 解码信息字典中的文本字符串（带 BOM 的 UTF-16BE 或 PDFDocEncoding）
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(decoded) = decode_utf16_with_bom(bytes) {
        return decoded;
    }
    match std::str::from_utf8(bytes) {
        Ok(decoded) => decoded.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn decode_utf16_with_bom(bytes: &[u8]) -> Option<String> {
    bytes
        .strip_prefix(&[0xFE, 0xFF])
        .and_then(decode_utf16)
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

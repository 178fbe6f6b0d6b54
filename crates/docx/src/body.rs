//! `word/document.xml` 正文解析
//!
//! 只收集正文顶层的段落和表格。文本框（`w:txbxContent`）、兼容性备用内容
//! （`mc:Fallback`）和嵌套表格整体跳过，域代码（`w:instrText`）本身不是 `w:t`，
//! 自然不会进入结果。

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// 正文解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    /// 顶层段落文本（包含空段落）
    pub paragraphs: Vec<String>,
    /// 顶层表格：行 -> 单元格文本
    pub tables: Vec<Vec<Vec<String>>>,
}

struct Cell {
    paragraphs: Vec<String>,
    span: usize,
    /// 纵向合并的后续单元格，显示为合并起点的文本
    merged_down: bool,
}

#[derive(Default)]
struct BodyParser {
    body: Body,
    table: Option<Vec<Vec<String>>>,
    row: Option<Vec<String>>,
    cell: Option<Cell>,
    paragraph: Option<String>,
    in_run: bool,
    in_text: bool,
    /// 大于 0 时处于被跳过的子树中
    skip_depth: usize,
}

impl BodyParser {
    fn start(&mut self, e: &BytesStart) {
        if self.skip_depth > 0 {
            self.skip_depth += 1;
            return;
        }

        match e.name().as_ref() {
            b"w:txbxContent" | b"mc:Fallback" => self.skip_depth = 1,
            b"w:tbl" if self.table.is_some() => self.skip_depth = 1,
            b"w:tbl" => self.table = Some(Vec::new()),
            b"w:tr" if self.table.is_some() => self.row = Some(Vec::new()),
            b"w:tc" if self.row.is_some() => {
                self.cell = Some(Cell {
                    paragraphs: Vec::new(),
                    span: 1,
                    merged_down: false,
                })
            }
            b"w:p" => self.paragraph = Some(String::new()),
            b"w:r" => self.in_run = true,
            b"w:t" => self.in_text = self.in_run,
            _ => self.empty(e),
        }
    }

    /// 自闭合元素，以及按自闭合方式处理的开始标签
    fn empty(&mut self, e: &BytesStart) {
        if self.skip_depth > 0 {
            return;
        }

        match e.name().as_ref() {
            b"w:tab" => self.push_run_char('\t'),
            b"w:br" | b"w:cr" => self.push_run_char('\n'),
            b"w:gridSpan" => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.span = grid_span(e).unwrap_or(1);
                }
            }
            b"w:vMerge" => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.merged_down = attr_val(e).map_or(true, |v| v != "restart");
                }
            }
            b"w:p" => self.finish_paragraph(String::new()),
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return;
        }

        match name {
            b"w:t" => self.in_text = false,
            b"w:r" => self.in_run = false,
            b"w:p" => {
                if let Some(text) = self.paragraph.take() {
                    self.finish_paragraph(text);
                }
            }
            b"w:tc" => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    let above = self
                        .table
                        .as_ref()
                        .and_then(|table| table.last())
                        .and_then(|prev| prev.get(row.len()));
                    let text = match above {
                        Some(above) if cell.merged_down => above.clone(),
                        _ => cell.paragraphs.join("\n").trim().to_string(),
                    };
                    for _ in 0..cell.span {
                        row.push(text.clone());
                    }
                }
            }
            b"w:tr" => {
                if let (Some(row), Some(table)) = (self.row.take(), self.table.as_mut()) {
                    table.push(row);
                }
            }
            b"w:tbl" => {
                if let Some(table) = self.table.take() {
                    self.body.tables.push(table);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.skip_depth > 0 || !self.in_text {
            return;
        }
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.push_str(text);
        }
    }

    fn push_run_char(&mut self, c: char) {
        if !self.in_run {
            return;
        }
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.push(c);
        }
    }

    fn finish_paragraph(&mut self, text: String) {
        if let Some(cell) = self.cell.as_mut() {
            cell.paragraphs.push(text);
        } else if self.table.is_none() {
            self.body.paragraphs.push(text);
        }
    }
}

fn attr_val(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"w:val")
        .and_then(|attr| attr.unescape_value().ok())
        .map(|v| v.into_owned())
}

fn grid_span(e: &BytesStart) -> Option<usize> {
    attr_val(e)?.parse().ok().filter(|span| *span > 0)
}

/// 解析正文 XML
pub fn parse_body(xml: &str) -> Result<Body, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut parser = BodyParser::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => parser.start(&e),
            Event::Empty(e) => parser.empty(&e),
            Event::End(e) => parser.end(e.name().as_ref()),
            Event::Text(t) => parser.text(&t.unescape()?),
            Event::CData(t) => parser.text(&String::from_utf8_lossy(&t)),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(parser.body)
}

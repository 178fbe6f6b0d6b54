//! PDF 日期字符串规范化

use chrono::{FixedOffset, NaiveDate, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

/// `D:YYYYMMDDHHmmSSOHH'mm'`，除年份外各段均可省略
static PDF_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:D:)?(\d{4})(\d{2})?(\d{2})?(\d{2})?(\d{2})?(\d{2})?(?:([Zz+\-])(?:(\d{2})'?(?:(\d{2})'?)?)?)?$",
    )
    .unwrap()
});

/// 把 PDF 日期转为 RFC 3339，无法识别时原样返回
pub fn normalize_pdf_date(raw: &str) -> String {
    let raw = raw.trim();
    parse_pdf_date(raw).unwrap_or_else(|| raw.to_string())
}

fn parse_pdf_date(raw: &str) -> Option<String> {
    let caps = PDF_DATE.captures(raw)?;
    let field = |i: usize, default: u32| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(default),
        }
    };

    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(2, 1)?, field(3, 1)?)?;
    let datetime = date.and_hms_opt(field(4, 0)?, field(5, 0)?, field(6, 0)?)?;

    let offset_secs = match caps.get(7).map(|m| m.as_str()) {
        Some("+") | Some("-") => {
            let secs = (field(8, 0)? * 3600 + field(9, 0)? * 60) as i32;
            if caps.get(7)?.as_str() == "-" {
                -secs
            } else {
                secs
            }
        }
        _ => 0,
    };
    let offset = FixedOffset::east_opt(offset_secs)?;

    offset
        .from_local_datetime(&datetime)
        .single()
        .map(|dt| dt.to_rfc3339())
}

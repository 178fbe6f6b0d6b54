//! 内置实体类型的正则定义
//!
//! 单词边界使用 ASCII 的 `(?-u:\b)`：中文字符与数字相邻时（如 `电话13812345678`）
//! 仍视为边界。正则引擎保证线性时间匹配，长文档也会完整扫描。
//!
//! 银行卡的纯数字分支要排除身份证号。`regex` 不支持前瞻，这里把该分支放进命名分组
//! `bare`，匹配后再用身份证整串正则过滤：分支两端都有单词边界，命中的一定是整段
//! 数字，过滤结果与前瞻一致。

use super::EntityType;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

macro_rules! word_boundary {
    () => {
        r"(?-u:\b)"
    };
}

// 18 位：6 位地区码 + YYYYMMDD + 3 位顺序码 + 校验位
macro_rules! id_card_18 {
    () => {
        r"[1-9]\d{5}(?:18|19|20)\d{2}(?:0[1-9]|1[0-2])(?:0[1-9]|[12]\d|3[01])\d{3}[\dXx]"
    };
}

// 15 位：6 位地区码 + YYMMDD + 3 位顺序码
macro_rules! id_card_15 {
    () => {
        r"[1-9]\d{5}\d{2}(?:0[1-9]|1[0-2])(?:0[1-9]|[12]\d|3[01])\d{3}"
    };
}

pub const IDCARD: &str = concat!(
    word_boundary!(),
    "(?:",
    id_card_18!(),
    "|",
    id_card_15!(),
    ")",
    word_boundary!()
);

pub const PHONE: &str = concat!(word_boundary!(), r"1[3-9]\d{9}", word_boundary!());

pub const EMAIL: &str = concat!(
    word_boundary!(),
    r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
    word_boundary!()
);

pub const BANKCARD: &str = concat!(
    // 带分隔符：1234-5678-9012-3456
    word_boundary!(),
    r"(?:\d{4}[-\s]?){3}\d{1,4}",
    word_boundary!(),
    "|",
    // 连续数字，命中身份证号的在匹配后剔除
    word_boundary!(),
    r"(?P<bare>\d{13,19})",
    word_boundary!()
);

const ID_CARD_EXACT: &str = concat!("^(?:", id_card_18!(), "|", id_card_15!(), ")$");

// 例：(2023)京01民初123号、(2024)沪0101刑初第456号
pub const CASE_NUMBER: &str =
    r"(?i)\(\d{4}\)[^()]*?(?:民|刑|行|执|赔|知|破|清|仲|调|特|其他)[^()]*?(?:第\d+号|\d+号)";

/// 一个实体类型的编译结果
pub(crate) struct CompiledPattern {
    pub source: &'static str,
    /// 用于全文扫描
    pub finder: Regex,
    /// 整串匹配，用于校验单个值
    pub exact: Regex,
    /// `bare` 分组命中此正则时丢弃整条匹配
    excluded_bare: Option<Regex>,
}

impl CompiledPattern {
    fn accepts(&self, caps: &Captures<'_>) -> bool {
        match (&self.excluded_bare, caps.name("bare")) {
            (Some(excluded), Some(bare)) => !excluded.is_match(bare.as_str()),
            _ => true,
        }
    }

    /// 从左到右、互不重叠的全部命中，返回字节区间
    pub fn find_spans(&self, text: &str) -> Vec<(usize, usize)> {
        self.finder
            .captures_iter(text)
            .filter(|caps| self.accepts(caps))
            .filter_map(|caps| caps.get(0))
            .map(|m| (m.start(), m.end()))
            .collect()
    }

    /// 整个字符串是否为一个实体
    pub fn is_exact(&self, text: &str) -> bool {
        self.exact
            .captures(text)
            .map_or(false, |caps| self.accepts(&caps))
    }
}

fn compile(source: &'static str, excluded_bare: Option<&str>) -> CompiledPattern {
    CompiledPattern {
        source,
        finder: Regex::new(source).expect("内置规则正则无法编译"),
        exact: Regex::new(&format!("^(?:{})$", source)).expect("内置规则正则无法编译"),
        excluded_bare: excluded_bare.map(|p| Regex::new(p).expect("内置规则正则无法编译")),
    }
}

static COMPILED: Lazy<[CompiledPattern; 5]> = Lazy::new(|| {
    [
        compile(IDCARD, None),
        compile(PHONE, None),
        compile(EMAIL, None),
        compile(BANKCARD, Some(ID_CARD_EXACT)),
        compile(CASE_NUMBER, None),
    ]
});

pub(crate) fn source(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::IdCard => IDCARD,
        EntityType::Phone => PHONE,
        EntityType::Email => EMAIL,
        EntityType::BankCard => BANKCARD,
        EntityType::CaseNumber => CASE_NUMBER,
    }
}

pub(crate) fn compiled(entity_type: EntityType) -> &'static CompiledPattern {
    let pattern = &COMPILED[entity_type.index()];
    debug_assert_eq!(pattern.source, source(entity_type));
    pattern
}

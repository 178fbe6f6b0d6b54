//! 脱敏规则系统
//!
//! 内置一组固定的实体类型（身份证号、手机号、邮箱、银行卡号、案号），每种类型绑定一条
//! 编译好的正则。`RuleSet` 只保存“启用了哪些类型”，正则在进程内编译一次后共享，
//! 因此按请求克隆一份规则集的代价很低。

mod patterns;

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// 实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    /// 身份证号
    #[serde(rename = "IDCARD")]
    IdCard,
    /// 手机号
    #[serde(rename = "PHONE")]
    Phone,
    /// 邮箱
    #[serde(rename = "EMAIL")]
    Email,
    /// 银行卡号
    #[serde(rename = "BANKCARD")]
    BankCard,
    /// 案号
    #[serde(rename = "CASE_NUMBER")]
    CaseNumber,
}

impl EntityType {
    pub const ALL: [EntityType; 5] = [
        EntityType::IdCard,
        EntityType::Phone,
        EntityType::Email,
        EntityType::BankCard,
        EntityType::CaseNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::IdCard => "IDCARD",
            EntityType::Phone => "PHONE",
            EntityType::Email => "EMAIL",
            EntityType::BankCard => "BANKCARD",
            EntityType::CaseNumber => "CASE_NUMBER",
        }
    }

    fn index(self) -> usize {
        match self {
            EntityType::IdCard => 0,
            EntityType::Phone => 1,
            EntityType::Email => 2,
            EntityType::BankCard => 3,
            EntityType::CaseNumber => 4,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::MalformedRuleSet(s.to_string()))
    }
}

/// 识别出的敏感实体
///
/// `start`/`end` 为原文中的字符（Unicode 码点）下标，`end` 不含，
/// 即 `original` 等于原文第 `start..end` 个字符组成的串。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMatch {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub original: String,
}

/// 外部传入的实体记录
///
/// 调用方（如 HTTP 层）提交的 JSON 可能缺字段，遮罩时逐条校验，缺字段的记录被跳过。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
    #[serde(default, rename = "type")]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
}

impl EntityRecord {
    /// 取出遮罩所需的三个字段
    pub fn span(&self) -> Result<(usize, usize, &str)> {
        let start = self
            .start
            .ok_or_else(|| CoreError::MalformedEntityRecord("start".to_string()))?;
        let end = self
            .end
            .ok_or_else(|| CoreError::MalformedEntityRecord("end".to_string()))?;
        let original = self
            .original
            .as_deref()
            .ok_or_else(|| CoreError::MalformedEntityRecord("original".to_string()))?;
        Ok((start, end, original))
    }

    /// 转换为带类型的实体
    pub fn validate(&self) -> Result<EntityMatch> {
        let (start, end, original) = self.span()?;
        let entity_type = self
            .entity_type
            .as_deref()
            .ok_or_else(|| CoreError::MalformedEntityRecord("type".to_string()))?
            .parse()?;
        Ok(EntityMatch {
            start,
            end,
            entity_type,
            original: original.to_string(),
        })
    }
}

impl From<&EntityMatch> for EntityRecord {
    fn from(entity: &EntityMatch) -> Self {
        Self {
            start: Some(entity.start),
            end: Some(entity.end),
            entity_type: Some(entity.entity_type.to_string()),
            original: Some(entity.original.clone()),
        }
    }
}

/// 规则集合
///
/// 默认启用全部类型。启用/禁用只改变启用子集，不会改动正则定义。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    enabled: BTreeSet<EntityType>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::all()
    }
}

impl RuleSet {
    /// 启用全部规则
    pub fn all() -> Self {
        Self {
            enabled: EntityType::ALL.into_iter().collect(),
        }
    }

    /// 不启用任何规则
    pub fn none() -> Self {
        Self {
            enabled: BTreeSet::new(),
        }
    }

    /// 按名称构造规则集
    ///
    /// `None` 表示启用全部；`Some` 表示恰好启用列表中的类型。任一名称未知则整体拒绝。
    pub fn from_names<S: AsRef<str>>(names: Option<&[S]>) -> Result<Self> {
        match names {
            None => Ok(Self::all()),
            Some(names) => {
                let mut rules = Self::none();
                rules.set_enabled_rules(names)?;
                Ok(rules)
            }
        }
    }

    pub fn supported_types(&self) -> &'static [EntityType] {
        &EntityType::ALL
    }

    pub fn enable(&mut self, entity_type: EntityType) -> bool {
        self.enabled.insert(entity_type);
        true
    }

    pub fn disable(&mut self, entity_type: EntityType) -> bool {
        self.enabled.remove(&entity_type)
    }

    /// 按名称启用；名称未知时返回 false
    pub fn enable_rule(&mut self, name: &str) -> bool {
        match name.parse() {
            Ok(entity_type) => self.enable(entity_type),
            Err(_) => false,
        }
    }

    /// 按名称禁用；名称未知或本就未启用时返回 false
    pub fn disable_rule(&mut self, name: &str) -> bool {
        match name.parse() {
            Ok(entity_type) => self.disable(entity_type),
            Err(_) => false,
        }
    }

    pub fn is_enabled(&self, entity_type: EntityType) -> bool {
        self.enabled.contains(&entity_type)
    }

    pub fn set_enabled(&mut self, types: impl IntoIterator<Item = EntityType>) {
        self.enabled = types.into_iter().collect();
    }

    /// 整体替换启用子集；含未知名称时返回错误且不修改当前状态
    pub fn set_enabled_rules<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let types = names
            .iter()
            .map(|name| name.as_ref().parse::<EntityType>())
            .collect::<Result<BTreeSet<_>>>()?;
        self.enabled = types;
        Ok(())
    }

    /// 当前启用的类型（按类型定义顺序）
    pub fn enabled_types(&self) -> Vec<EntityType> {
        self.enabled.iter().copied().collect()
    }

    /// 规则的正则定义，用于展示与调试
    pub fn pattern_source(&self, entity_type: EntityType) -> &'static str {
        patterns::source(entity_type)
    }

    /// 全部类型的正则定义
    pub fn pattern_info(&self) -> BTreeMap<EntityType, &'static str> {
        EntityType::ALL
            .into_iter()
            .map(|t| (t, patterns::source(t)))
            .collect()
    }

    /// 检查整个字符串是否符合指定类型
    pub fn validate(&self, text: &str, entity_type: EntityType) -> bool {
        patterns::compiled(entity_type).is_exact(text)
    }

    /// 对文本进行规则匹配
    ///
    /// 每个启用的类型各自做一遍从左到右、互不重叠的扫描，再把结果合并并按 `start`
    /// 稳定排序。不同类型之间的匹配可能重叠，这里不做去重；`start` 相同的实体
    /// 仅保持类型扫描顺序，不保证其他顺序。
    pub fn match_text(&self, text: &str) -> Vec<EntityMatch> {
        let mut spans: Vec<(usize, usize, EntityType)> = Vec::new();
        for &entity_type in &self.enabled {
            spans.extend(
                patterns::compiled(entity_type)
                    .find_spans(text)
                    .into_iter()
                    .map(|(start, end)| (start, end, entity_type)),
            );
        }

        // 按起始位置排序
        spans.sort_by_key(|(start, _, _)| *start);

        // 字节偏移 -> 字符下标，起点有序，只需向前扫一遍
        let mut byte_cursor = 0;
        let mut char_cursor = 0;
        spans
            .into_iter()
            .map(|(start, end, entity_type)| {
                char_cursor += text[byte_cursor..start].chars().count();
                byte_cursor = start;
                let original = &text[start..end];
                EntityMatch {
                    start: char_cursor,
                    end: char_cursor + original.chars().count(),
                    entity_type,
                    original: original.to_string(),
                }
            })
            .collect()
    }
}

/// 用给定规则集提取文本中的敏感实体
pub fn extract_entities(text: &str, rules: &RuleSet) -> Vec<EntityMatch> {
    rules.match_text(text)
}

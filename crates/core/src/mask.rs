//! 文本遮罩
//!
//! 按 `start` 从大到小（从右往左）替换实体，先替换的高位区间不会影响低位区间的偏移。
//! 偏移与长度都按字符计算，遮罩后的实体保持原字符数。

use crate::rules::{EntityMatch, EntityRecord};
use serde::{Deserialize, Serialize};

/// 遮罩配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaskConfig {
    /// 遮罩字符
    pub mask_char: char,
    /// 保留前缀字符数
    pub keep_prefix: usize,
    /// 保留后缀字符数
    pub keep_suffix: usize,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            mask_char: '*',
            keep_prefix: 2,
            keep_suffix: 2,
        }
    }
}

impl MaskConfig {
    pub fn with_mask_char(mask_char: char) -> Self {
        Self {
            mask_char,
            ..Self::default()
        }
    }
}

/// 遮罩结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskOutcome {
    pub masked_text: String,
    pub entities_applied: usize,
}

/// 遮罩单个值
///
/// 字符数不超过 `keep_prefix + keep_suffix` 时整体替换为遮罩字符，
/// 否则保留首尾、中间替换。
pub fn mask_value(original: &str, config: &MaskConfig) -> String {
    let chars: Vec<char> = original.chars().collect();
    let len = chars.len();
    let kept = config.keep_prefix.saturating_add(config.keep_suffix);

    if len <= kept {
        return std::iter::repeat(config.mask_char).take(len).collect();
    }

    let mut masked = String::with_capacity(original.len());
    masked.extend(&chars[..config.keep_prefix]);
    masked.extend(std::iter::repeat(config.mask_char).take(len - kept));
    masked.extend(&chars[len - config.keep_suffix..]);
    masked
}

/// 用已识别的实体遮罩文本
pub fn mask_entities(text: &str, entities: &[EntityMatch], config: &MaskConfig) -> MaskOutcome {
    let spans = entities
        .iter()
        .map(|e| (e.start, e.end, e.original.as_str()))
        .collect();
    apply(text, spans, config)
}

/// 用外部提交的实体记录遮罩文本
///
/// 缺少 `start`、`end` 或 `original` 的记录被跳过，不计入 `entities_applied`。
pub fn mask_records(text: &str, records: &[EntityRecord], config: &MaskConfig) -> MaskOutcome {
    let spans = records
        .iter()
        .filter_map(|record| match record.span() {
            Ok(span) => Some(span),
            Err(e) => {
                log::warn!("[Mask] 跳过实体记录: {}", e);
                None
            }
        })
        .collect();
    apply(text, spans, config)
}

fn apply(text: &str, mut spans: Vec<(usize, usize, &str)>, config: &MaskConfig) -> MaskOutcome {
    if spans.is_empty() {
        return MaskOutcome {
            masked_text: text.to_string(),
            entities_applied: 0,
        };
    }

    let mut chars: Vec<char> = text.chars().collect();
    let mut applied = 0;

    spans.sort_by_key(|(start, _, _)| *start);
    for (start, end, original) in spans.into_iter().rev() {
        if end > chars.len() {
            log::warn!("[Mask] 实体偏移越界: {}..{}", start, end);
            continue;
        }
        if start >= end {
            log::warn!("[Mask] 实体区间为空: {}..{}", start, end);
            continue;
        }

        chars.splice(start..end, mask_value(original, config).chars());
        applied += 1;
    }

    MaskOutcome {
        masked_text: chars.into_iter().collect(),
        entities_applied: applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{EntityType, RuleSet};

    fn dot_config() -> MaskConfig {
        MaskConfig::with_mask_char('●')
    }

    #[test]
    fn test_mask_value_keeps_prefix_and_suffix() {
        let masked = mask_value("13812345678", &dot_config());
        assert_eq!(masked, "13●●●●●●●78");
        assert_eq!(masked.chars().count(), 11);
    }

    #[test]
    fn test_mask_value_short_entity() {
        assert_eq!(mask_value("1234", &dot_config()), "●●●●");
        assert_eq!(mask_value("ab", &MaskConfig::default()), "**");
    }

    #[test]
    fn test_mask_value_without_suffix() {
        let config = MaskConfig {
            mask_char: '#',
            keep_prefix: 3,
            keep_suffix: 0,
        };
        assert_eq!(mask_value("abcdefg", &config), "abc####");
    }

    #[test]
    fn test_mask_value_counts_characters() {
        let config = MaskConfig {
            mask_char: '*',
            keep_prefix: 1,
            keep_suffix: 1,
        };
        assert_eq!(
            mask_value("(2023)京01民初123号", &config),
            format!("({}号", "*".repeat(13))
        );
    }

    #[test]
    fn test_mask_id_card_and_phone() {
        let text = "身份证：110101199003078765，电话13812345678";
        let entities = RuleSet::all().match_text(text);
        let outcome = mask_entities(text, &entities, &dot_config());

        assert_eq!(outcome.entities_applied, 2);
        assert_eq!(
            outcome.masked_text,
            format!("身份证：11{}65，电话13{}78", "●".repeat(14), "●".repeat(7))
        );
        assert_eq!(outcome.masked_text.chars().count(), text.chars().count());
    }

    #[test]
    fn test_no_rules_leaves_text_unchanged() {
        let text = "abc@x.com 13812345678";
        let entities = RuleSet::none().match_text(text);
        let outcome = mask_entities(text, &entities, &dot_config());
        assert_eq!(outcome.masked_text, text);
        assert_eq!(outcome.entities_applied, 0);
    }

    #[test]
    fn test_empty_entities_for_any_config() {
        let text = "(2023)京01民初123号";
        for config in [MaskConfig::default(), dot_config(), MaskConfig {
            mask_char: 'x',
            keep_prefix: 0,
            keep_suffix: 9,
        }] {
            let outcome = mask_entities(text, &[], &config);
            assert_eq!(outcome.masked_text, text);
            assert_eq!(outcome.entities_applied, 0);
        }
    }

    #[test]
    fn test_records_missing_fields_are_skipped() {
        let text = "电话13812345678，邮箱abc@x.com";
        let entities = RuleSet::all().match_text(text);
        assert_eq!(entities.len(), 2);

        let mut records: Vec<EntityRecord> = entities.iter().map(EntityRecord::from).collect();
        records[1].end = None;
        records.push(EntityRecord {
            start: Some(0),
            original: Some("电话".to_string()),
            ..Default::default()
        });

        let outcome = mask_records(text, &records, &dot_config());
        assert_eq!(outcome.entities_applied, 1);
        assert_eq!(outcome.masked_text, "电话13●●●●●●●78，邮箱abc@x.com");
    }

    #[test]
    fn test_out_of_range_entities_do_not_panic() {
        let text = "电话13812345678";
        let entities = vec![
            EntityMatch {
                start: 4,
                end: 2,
                entity_type: EntityType::Phone,
                original: "话".to_string(),
            },
            EntityMatch {
                start: 2,
                end: 99,
                entity_type: EntityType::Phone,
                original: "13812345678".to_string(),
            },
        ];
        let outcome = mask_entities(text, &entities, &dot_config());
        assert_eq!(outcome.entities_applied, 0);
        assert_eq!(outcome.masked_text, text);
    }

    #[test]
    fn test_overlapping_entities_keep_length() {
        let text = "110105491231002";
        let entities = RuleSet::all().match_text(text);
        assert!(entities.len() >= 2);

        let outcome = mask_entities(text, &entities, &dot_config());
        assert_eq!(outcome.entities_applied, entities.len());
        assert_eq!(outcome.masked_text, format!("11{}02", "●".repeat(11)));
    }

    #[test]
    fn test_records_use_character_offsets() {
        let text = "身份证：110101199003078765";
        let records: Vec<EntityRecord> = serde_json::from_str(
            r#"[{"start": 4, "end": 22, "type": "IDCARD", "original": "110101199003078765"}]"#,
        )
        .unwrap();

        let outcome = mask_records(text, &records, &dot_config());
        assert_eq!(outcome.entities_applied, 1);
        assert_eq!(outcome.masked_text, format!("身份证：11{}65", "●".repeat(14)));
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = mask_entities("abc", &[], &MaskConfig::default());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["maskedText"], "abc");
        assert_eq!(json["entitiesApplied"], 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn legal_text() -> impl Strategy<Value = String> {
            proptest::collection::vec(
                prop_oneof![
                    "[0-9]{1,19}",
                    "[a-z]{1,6}@[a-z]{1,4}\\.com",
                    r"[\u{4e00}-\u{9fa5}，]{1,4}",
                    " ",
                ],
                0..30,
            )
            .prop_map(|parts| parts.concat())
        }

        fn mask_config() -> impl Strategy<Value = MaskConfig> {
            (prop_oneof![Just('*'), Just('●'), Just('#')], 0usize..4, 0usize..4).prop_map(
                |(mask_char, keep_prefix, keep_suffix)| MaskConfig {
                    mask_char,
                    keep_prefix,
                    keep_suffix,
                },
            )
        }

        proptest! {
            #[test]
            fn test_masking_keeps_character_count(text in legal_text(), config in mask_config()) {
                let entities = RuleSet::all().match_text(&text);
                // 不同类型可能重叠，只取互不重叠的一组
                let mut disjoint: Vec<EntityMatch> = Vec::new();
                for entity in entities {
                    if disjoint.last().map_or(true, |last| last.end <= entity.start) {
                        disjoint.push(entity);
                    }
                }

                let outcome = mask_entities(&text, &disjoint, &config);
                prop_assert_eq!(outcome.entities_applied, disjoint.len());
                prop_assert_eq!(outcome.masked_text.chars().count(), text.chars().count());
            }

            #[test]
            fn test_no_rules_returns_text(text in legal_text(), config in mask_config()) {
                let entities = RuleSet::none().match_text(&text);
                let outcome = mask_entities(&text, &entities, &config);
                prop_assert_eq!(outcome.masked_text, text);
                prop_assert_eq!(outcome.entities_applied, 0);
            }

            #[test]
            fn test_mask_value_length(value in "[0-9a-z\\u{4e00}-\\u{9fa5}]{1,24}", config in mask_config()) {
                let len = value.chars().count();
                let masked = mask_value(&value, &config);
                prop_assert_eq!(masked.chars().count(), len);
                if len > config.keep_prefix + config.keep_suffix {
                    let prefix: String = value.chars().take(config.keep_prefix).collect();
                    prop_assert!(masked.starts_with(&prefix));
                }
            }
        }
    }
}

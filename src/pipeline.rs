//! 提取 + 脱敏流水线
//!
//! 提取与脱敏是两个独立阶段，这里把常用组合封装起来：纯文本的识别/遮罩，
//! 以及“提取文档 -> 识别实体 -> 遮罩”的完整流程。

use crate::config::DocmaskConfig;
use crate::orchestrator::ExtractionOrchestrator;
use crate::shared::SharedRules;
use docmask_core::{
    mask_entities, EntityMatch, EntityType, ExtractionMetadata, ExtractionResult,
    MaskConfig, Result, RuleSet,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// 文本脱敏结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymizedText {
    pub masked_text: String,
    pub entities: Vec<EntityMatch>,
    pub entities_applied: usize,
}

/// 识别并遮罩文本中的敏感实体
pub fn anonymize_text(text: &str, rules: &RuleSet, mask: &MaskConfig) -> AnonymizedText {
    let entities = rules.match_text(text);
    let outcome = mask_entities(text, &entities, mask);
    AnonymizedText {
        masked_text: outcome.masked_text,
        entities,
        entities_applied: outcome.entities_applied,
    }
}

/// 按规则名称识别实体，`None` 表示全部规则
pub fn quick_extract<S: AsRef<str>>(text: &str, enabled: Option<&[S]>) -> Result<Vec<EntityMatch>> {
    Ok(RuleSet::from_names(enabled)?.match_text(text))
}

/// 按规则名称识别并遮罩
pub fn quick_anonymize<S: AsRef<str>>(
    text: &str,
    enabled: Option<&[S]>,
    mask: &MaskConfig,
) -> Result<AnonymizedText> {
    Ok(anonymize_text(text, &RuleSet::from_names(enabled)?, mask))
}

/// 检查整个字符串是否是指定类型的实体
pub fn validate_entity(text: &str, entity_type: &str) -> Result<bool> {
    let entity_type: EntityType = entity_type.parse()?;
    Ok(RuleSet::all().validate(text, entity_type))
}

/// 规则说明
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RulesInfo {
    pub supported_rules: Vec<EntityType>,
    pub enabled_rules: Vec<EntityType>,
    pub patterns: BTreeMap<EntityType, &'static str>,
}

pub fn rules_info(rules: &RuleSet) -> RulesInfo {
    RulesInfo {
        supported_rules: rules.supported_types().to_vec(),
        enabled_rules: rules.enabled_types(),
        patterns: rules.pattern_info(),
    }
}

/// 处理统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingInfo {
    /// 原文字符数
    pub original_length: usize,
    /// 脱敏后字符数
    pub anonymized_length: usize,
    pub entities_found: usize,
    pub entity_types: Vec<EntityType>,
}

/// 单个文档的处理结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub original_content: String,
    pub anonymized_content: String,
    pub sensitive_entities: Vec<EntityMatch>,
    pub entity_statistics: BTreeMap<EntityType, usize>,
    pub metadata: ExtractionMetadata,
    pub processing_info: ProcessingInfo,
}

impl ProcessedDocument {
    fn build(extracted: ExtractionResult, rules: &RuleSet, mask: &MaskConfig) -> Self {
        let anonymized = anonymize_text(&extracted.content, rules, mask);

        let mut statistics: BTreeMap<EntityType, usize> = BTreeMap::new();
        for entity in &anonymized.entities {
            *statistics.entry(entity.entity_type).or_default() += 1;
        }

        let processing_info = ProcessingInfo {
            original_length: extracted.content.chars().count(),
            anonymized_length: anonymized.masked_text.chars().count(),
            entities_found: anonymized.entities.len(),
            entity_types: statistics.keys().copied().collect(),
        };

        Self {
            original_content: extracted.content,
            anonymized_content: anonymized.masked_text,
            sensitive_entities: anonymized.entities,
            entity_statistics: statistics,
            metadata: extracted.metadata,
            processing_info,
        }
    }
}

/// 文档流水线：调度器 + 共享规则 + 遮罩配置
pub struct DocumentPipeline {
    orchestrator: ExtractionOrchestrator,
    rules: SharedRules,
    mask: MaskConfig,
}

impl DocumentPipeline {
    pub fn new(orchestrator: ExtractionOrchestrator, rules: RuleSet, mask: MaskConfig) -> Self {
        Self {
            orchestrator,
            rules: SharedRules::new(rules),
            mask,
        }
    }

    /// 配置中的规则名无效时报错
    pub fn from_config(config: &DocmaskConfig) -> Result<Self> {
        Ok(Self::new(
            ExtractionOrchestrator::from_config(config),
            config.rule_set()?,
            config.mask_config(),
        ))
    }

    pub fn orchestrator(&self) -> &ExtractionOrchestrator {
        &self.orchestrator
    }

    pub fn rules(&self) -> &SharedRules {
        &self.rules
    }

    pub fn mask_config(&self) -> &MaskConfig {
        &self.mask
    }

    /// 用共享规则脱敏一段文本
    pub fn anonymize(&self, text: &str) -> AnonymizedText {
        anonymize_text(text, &self.rules.snapshot(), &self.mask)
    }

    /// 提取并脱敏磁盘文件
    pub async fn process_document(
        &self,
        path: &Path,
        content_type: &str,
    ) -> Result<ProcessedDocument> {
        let extracted = self.orchestrator.extract_content(path, content_type).await?;
        Ok(self.finish(extracted))
    }

    /// 提取并脱敏内存中的文件
    pub async fn process_bytes(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<ProcessedDocument> {
        let extracted = self.orchestrator.extract_bytes(bytes, content_type).await?;
        Ok(self.finish(extracted))
    }

    fn finish(&self, extracted: ExtractionResult) -> ProcessedDocument {
        let processed = ProcessedDocument::build(extracted, &self.rules.snapshot(), &self.mask);
        log::info!(
            "[Pipeline] 原文 {} 字符，发现 {} 个敏感实体",
            processed.processing_info.original_length,
            processed.processing_info.entities_found
        );
        processed
    }
}

use docmask_core::{MaskConfig, RuleSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 脱敏与提取配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DocmaskConfig {
    // ============ 脱敏规则 ============
    /// 启用的规则名称，`None` 表示全部启用，空列表表示全部停用
    pub enabled_rules: Option<Vec<String>>,

    // ============ 遮罩 ============
    /// 遮罩字符
    pub mask_char: char,
    /// 保留前缀字符数
    pub keep_prefix: usize,
    /// 保留后缀字符数
    pub keep_suffix: usize,

    // ============ 提取 ============
    /// 并发提取数，未设置时读取环境变量或按 CPU 数决定
    pub extract_workers: Option<usize>,
}

impl Default for DocmaskConfig {
    fn default() -> Self {
        Self {
            enabled_rules: None,
            mask_char: '●',
            keep_prefix: 2,
            keep_suffix: 2,
            extract_workers: None,
        }
    }
}

impl DocmaskConfig {
    pub fn mask_config(&self) -> MaskConfig {
        MaskConfig {
            mask_char: self.mask_char,
            keep_prefix: self.keep_prefix,
            keep_suffix: self.keep_suffix,
        }
    }

    /// 按 `enabled_rules` 构建规则集，含未知规则名时报错
    pub fn rule_set(&self) -> docmask_core::Result<RuleSet> {
        RuleSet::from_names(self.enabled_rules.as_deref())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 读取配置文件，文件不存在时返回默认配置
pub fn load_config(path: &Path) -> Result<DocmaskConfig, ConfigError> {
    if !path.exists() {
        return Ok(DocmaskConfig::default());
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn save_config(path: &Path, config: &DocmaskConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let raw = serde_json::to_string_pretty(config)?;
    fs::write(path, raw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmask_core::EntityType;

    #[test]
    fn test_defaults() {
        let config = DocmaskConfig::default();
        assert_eq!(config.mask_config(), MaskConfig::with_mask_char('●'));
        assert_eq!(config.rule_set().unwrap(), RuleSet::all());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DocmaskConfig =
            serde_json::from_str(r#"{"enabledRules": ["EMAIL", "PHONE"], "keepSuffix": 0}"#)
                .unwrap();
        assert_eq!(config.mask_char, '●');
        assert_eq!(config.keep_prefix, 2);
        assert_eq!(config.keep_suffix, 0);

        let rules = config.rule_set().unwrap();
        assert_eq!(rules.enabled_types(), vec![EntityType::Phone, EntityType::Email]);
    }

    #[test]
    fn test_empty_rule_list_disables_all() {
        let config = DocmaskConfig {
            enabled_rules: Some(Vec::new()),
            ..Default::default()
        };
        assert!(config.rule_set().unwrap().enabled_types().is_empty());
    }

    #[test]
    fn test_unknown_rule_is_rejected() {
        let config = DocmaskConfig {
            enabled_rules: Some(vec!["PASSPORT".to_string()]),
            ..Default::default()
        };
        assert!(config.rule_set().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docmask").join("config.json");

        assert_eq!(load_config(&path).unwrap(), DocmaskConfig::default());

        let config = DocmaskConfig {
            enabled_rules: Some(vec!["CASE_NUMBER".to_string()]),
            mask_char: '#',
            extract_workers: Some(2),
            ..Default::default()
        };
        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"maskChar\": \"#\""));
        assert!(raw.contains("\"extractWorkers\": 2"));
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Json(_))));
    }
}

//! 进程内共享的默认规则集
//!
//! 写入方复制当前规则集、修改副本后整体替换；读取方拿到 `Arc` 快照后即可释放锁，
//! 扫描期间不会看到中途修改。

use docmask_core::RuleSet;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct SharedRules {
    current: RwLock<Arc<RuleSet>>,
}

impl SharedRules {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(rules)),
        }
    }

    /// 当前规则集的快照
    pub fn snapshot(&self) -> Arc<RuleSet> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 在副本上修改并替换当前规则集
    pub fn update<R>(&self, f: impl FnOnce(&mut RuleSet) -> R) -> R {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = RuleSet::clone(&current);
        let out = f(&mut next);
        *current = Arc::new(next);
        out
    }

    pub fn enable_rule(&self, name: &str) -> bool {
        self.update(|rules| rules.enable_rule(name))
    }

    pub fn disable_rule(&self, name: &str) -> bool {
        self.update(|rules| rules.disable_rule(name))
    }

    pub fn set_enabled_rules<S: AsRef<str>>(&self, names: &[S]) -> docmask_core::Result<()> {
        self.update(|rules| rules.set_enabled_rules(names))
    }

    /// 请求级规则集：未指定时使用共享快照，指定时新建一份，不影响共享状态
    pub fn for_request<S: AsRef<str>>(
        &self,
        names: Option<&[S]>,
    ) -> docmask_core::Result<Arc<RuleSet>> {
        match names {
            None => Ok(self.snapshot()),
            Some(names) => RuleSet::from_names(Some(names)).map(Arc::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmask_core::EntityType;

    #[test]
    fn test_snapshot_is_stable_across_updates() {
        let shared = SharedRules::default();
        let before = shared.snapshot();

        assert!(shared.disable_rule("PHONE"));
        assert!(!shared.disable_rule("PHONE"));
        assert!(!shared.enable_rule("PASSPORT"));

        assert!(before.is_enabled(EntityType::Phone));
        assert!(!shared.snapshot().is_enabled(EntityType::Phone));
    }

    #[test]
    fn test_failed_update_keeps_rules() {
        let shared = SharedRules::new(RuleSet::none());
        assert!(shared.set_enabled_rules(&["EMAIL", "FAX"]).is_err());
        assert!(shared.snapshot().enabled_types().is_empty());

        shared.set_enabled_rules(&["EMAIL"]).unwrap();
        assert_eq!(shared.snapshot().enabled_types(), vec![EntityType::Email]);
    }

    #[test]
    fn test_request_rules_do_not_leak() {
        let shared = SharedRules::default();
        let custom = shared.for_request(Some(&["CASE_NUMBER"][..])).unwrap();
        assert_eq!(custom.enabled_types(), vec![EntityType::CaseNumber]);
        assert_eq!(*shared.snapshot(), RuleSet::all());

        let default = shared.for_request::<&str>(None).unwrap();
        assert_eq!(*default, RuleSet::all());
        assert!(shared.for_request(Some(&["nope"][..])).is_err());
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let shared = Arc::new(SharedRules::default());
        let text = "电话13812345678";

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let found = shared.snapshot().match_text(text).len();
                        assert!(found <= 1);
                    }
                })
            })
            .collect();

        for i in 0..50 {
            if i % 2 == 0 {
                shared.disable_rule("PHONE");
            } else {
                shared.enable_rule("PHONE");
            }
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}

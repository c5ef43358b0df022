//! 模式注册表 - 持有全部 (模式, 处理器) 绑定
//!
//! 启动时由唯一的初始化流程逐个 `register`，然后 `seal` 冻结。
//! 冻结后只读，多个请求线程可以无锁并发读取。

use tracing::info;

use crate::error::RegistryFrozenError;
use crate::routing::binding::PatternBinding;

/// 优先级有序的模式绑定注册表
#[derive(Debug, Default)]
pub struct PatternRegistry {
    /// 按注册顺序存放；同名重注册原位替换
    bindings: Vec<PatternBinding>,
    sealed: bool,
}

impl PatternRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            sealed: false,
        }
    }

    /// 注册或按名称替换一条绑定
    ///
    /// 同名重注册采用"后注册者胜"原位替换（保留原注册位次），
    /// 用于开发期热修补。封存后调用返回 [`RegistryFrozenError`]。
    pub fn register(&mut self, binding: PatternBinding) -> Result<(), RegistryFrozenError> {
        if self.sealed {
            return Err(RegistryFrozenError {
                binding: binding.name.clone(),
            });
        }

        info!(
            binding = %binding.name,
            priority = binding.priority,
            enabled = binding.enabled,
            "Registering pattern binding"
        );

        if let Some(slot) = self.bindings.iter_mut().find(|b| b.name == binding.name) {
            *slot = binding;
        } else {
            self.bindings.push(binding);
        }
        Ok(())
    }

    /// 冻结注册表；幂等
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 已注册的绑定名称（按注册顺序）
    pub fn binding_names(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.name.as_str()).collect()
    }

    /// 按分发顺序返回绑定：优先级降序，同优先级按注册顺序
    ///
    /// 稳定排序保证同一进程内重复调用得到完全相同的顺序，
    /// 与底层存储的迭代顺序无关。
    pub fn ordered_bindings(&self) -> Vec<&PatternBinding> {
        let mut ordered: Vec<&PatternBinding> = self.bindings.iter().collect();
        ordered.sort_by_key(|b| std::cmp::Reverse(b.priority));
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::RenderBlock;
    use crate::routing::binding::{handler_fn, HandlerFn, MatchTarget};

    fn noop_handler() -> HandlerFn {
        handler_fn(|_, _| Ok(vec![RenderBlock::section("ok")]))
    }

    fn contains_binding(name: &str, priority: i32) -> PatternBinding {
        PatternBinding::contains(name, MatchTarget::Message, name.to_string(), noop_handler())
            .with_priority(priority)
    }

    #[test]
    fn test_register_and_names() {
        let mut registry = PatternRegistry::new();
        registry.register(contains_binding("a", 10)).unwrap();
        registry.register(contains_binding("b", 20)).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.binding_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_name_replaces_in_place() {
        let mut registry = PatternRegistry::new();
        registry.register(contains_binding("a", 10)).unwrap();
        registry.register(contains_binding("b", 20)).unwrap();
        // 热修补 a，注册位次保持不变
        registry.register(contains_binding("a", 99)).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.binding_names(), vec!["a", "b"]);
        let ordered = registry.ordered_bindings();
        assert_eq!(ordered[0].name, "a");
        assert_eq!(ordered[0].priority, 99);
    }

    #[test]
    fn test_register_after_seal_fails() {
        let mut registry = PatternRegistry::new();
        registry.register(contains_binding("a", 10)).unwrap();
        registry.seal();
        assert!(registry.is_sealed());

        let err = registry.register(contains_binding("late", 0)).unwrap_err();
        assert_eq!(err.binding, "late");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_seal_is_idempotent() {
        let mut registry = PatternRegistry::new();
        registry.seal();
        registry.seal();
        assert!(registry.is_sealed());
    }

    #[test]
    fn test_ordered_by_priority_descending() {
        let mut registry = PatternRegistry::new();
        registry.register(contains_binding("low", 10)).unwrap();
        registry.register(contains_binding("high", 90)).unwrap();
        registry.register(contains_binding("mid", 50)).unwrap();
        registry.seal();

        let names: Vec<&str> = registry
            .ordered_bindings()
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let mut registry = PatternRegistry::new();
        registry.register(contains_binding("first", 50)).unwrap();
        registry.register(contains_binding("second", 50)).unwrap();
        registry.register(contains_binding("third", 50)).unwrap();
        registry.seal();

        let names: Vec<&str> = registry
            .ordered_bindings()
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);

        // 重复调用顺序稳定
        let again: Vec<&str> = registry
            .ordered_bindings()
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(names, again);
    }
}

//! 内置通知处理器 - 随 crate 发布的领域格式化器
//!
//! 每个处理器模块暴露一个 `binding()` 构造函数，由这里的
//! `build_registry` 在启动时逐个显式注册再封存。新增处理器时在
//! `build_registry` 里加一行注册调用即可，分发核心不需要改动。
//! 注意给新绑定选一个足够高的优先级，避免被更宽松的低优先级
//! catch-all 模式抢先。

pub mod alarm;
pub mod pipeline;
pub mod security;

use anyhow::Result;

use crate::routing::PatternRegistry;

/// 启动入口：注册全部内置绑定并封存注册表
///
/// 这是进程里唯一的注册流程；返回的注册表已封存，
/// 交给 `DispatchCoordinator` 后即可并发分发。
pub fn build_registry() -> Result<PatternRegistry> {
    let mut registry = PatternRegistry::new();

    registry.register(alarm::binding())?;
    registry.register(pipeline::binding())?;
    registry.register(security::binding()?)?;

    registry.seal();
    Ok(registry)
}

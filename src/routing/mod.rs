//! 路由核心 - 优先级有序、可插拔的通知分发引擎
//!
//! # 设计目标
//! 1. 确定性：优先级降序 + 注册顺序决定唯一的分发顺序
//! 2. 可扩展：新增通知类型只需注册新绑定，不改动分发器本身
//! 3. 故障隔离：谓词/处理器的任何错误都被就地吞掉并降级
//! 4. 显式构造：启动流程构造并封存注册表，不存在全局单例
//!
//! # 使用示例
//! ```ignore
//! use cloud_notify_router::routing::{DispatchCoordinator, PatternRegistry};
//! use cloud_notify_router::{NotificationEnvelope, NullChatClient};
//!
//! let mut registry = PatternRegistry::new();
//! registry.register(my_binding)?;
//! registry.seal();
//!
//! let coordinator = DispatchCoordinator::new(registry);
//! let result = coordinator.dispatch(&envelope, &NullChatClient);
//! ```

pub mod binding;
pub mod dispatcher;
pub mod fallback;
pub mod matcher;
pub mod registry;

pub use binding::{
    handler_fn, predicate_fn, HandlerFn, MatchRule, MatchTarget, PatternBinding, PredicateFn,
};
pub use dispatcher::{DispatchCoordinator, DispatchOutcome, DispatchResult, FALLBACK_PATTERN};
pub use registry::PatternRegistry;

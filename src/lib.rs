//! Cloud Notify Router - 把云端 pub/sub 通知路由到正确的聊天格式化器
//!
//! 核心是一个优先级有序、可插拔的模式匹配分发引擎：对任意松散
//! 结构的入站通知，确定性地选出应当处理它的绑定，在故障边界内
//! 调用其处理器，并保证无论如何都返回一个可渲染的结果。
//!
//! 典型接入方式（HTTP 入口属于外部协作方，不在本 crate 内）：
//! 1. 启动时调用 [`handlers::build_registry`]（或自行注册绑定后 `seal`）
//! 2. 用封存的注册表构造 [`DispatchCoordinator`]
//! 3. 每收到一条 webhook：`normalize` → `dispatch` → 把 blocks 交给投递方

pub mod block;
pub mod chat;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod routing;

pub use block::{BlockField, RenderBlock};
pub use chat::{ChatClient, ChatGatewayConfig, NullChatClient, WebhookChatClient};
pub use envelope::{EnvelopeKind, NotificationEnvelope};
pub use error::{RegistryFrozenError, ValidationError};
pub use routing::{
    handler_fn, predicate_fn, DispatchCoordinator, DispatchOutcome, DispatchResult, HandlerFn,
    MatchRule, MatchTarget, PatternBinding, PatternRegistry, PredicateFn, FALLBACK_PATTERN,
};

//! 分发协调器 - 为一条信封选择并调用正确的处理器
//!
//! 按优先级顺序遍历注册表，第一个命中的启用绑定胜出（first match
//! wins：每条通知必须恰好产出一条聊天消息，多重渲染只会制造噪音）。
//! 处理器在故障边界内调用，`dispatch` 对调用方保证永不抛错：
//! 一条畸形通知或一个有 bug 的处理器绝不能影响其他通知的处理，
//! 也绝不能击穿入口端点。

use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

use crate::block::RenderBlock;
use crate::chat::ChatClient;
use crate::envelope::{EnvelopeKind, NotificationEnvelope};
use crate::routing::binding::PatternBinding;
use crate::routing::registry::PatternRegistry;
use crate::routing::{fallback, matcher};

/// 兜底结果使用的哨兵模式名
pub const FALLBACK_PATTERN: &str = "<fallback>";

/// 一次分发的结局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 命中绑定且处理器成功
    Handled,
    /// 非 Notification 短路，或无绑定命中
    Fallback,
    /// 命中绑定但处理器失败，渲染块来自兜底格式化器
    HandlerError,
}

/// 一次分发的结果，由调用方（HTTP 入口）持有
#[derive(Debug, Clone)]
pub struct DispatchResult {
    /// 命中的绑定名，兜底时为 [`FALLBACK_PATTERN`]
    pub matched_pattern: String,
    /// 有序渲染块，保证非空
    pub blocks: Vec<RenderBlock>,
    pub outcome: DispatchOutcome,
}

/// 分发协调器，持有封存后的注册表
///
/// 显式构造、依赖注入，不做任何全局查找。封存后的注册表只读，
/// 多个请求线程共享一个协调器即可无锁并发分发。
#[derive(Debug)]
pub struct DispatchCoordinator {
    registry: PatternRegistry,
}

impl DispatchCoordinator {
    /// 用已封存的注册表构造协调器
    pub fn new(registry: PatternRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// 分发一条信封；保证总是返回结果，永不向调用方抛错
    pub fn dispatch(
        &self,
        envelope: &NotificationEnvelope,
        chat: &dyn ChatClient,
    ) -> DispatchResult {
        // 订阅/退订确认只做确认回执，不参与内容匹配
        if envelope.kind() != EnvelopeKind::Notification {
            debug!(
                kind = %envelope.kind(),
                message_id = envelope.message_id(),
                "Non-notification envelope, short-circuit to fallback"
            );
            return self.fallback_result(envelope);
        }

        for binding in self.registry.ordered_bindings() {
            if !binding.enabled {
                continue;
            }
            if matcher::matches(binding, envelope) {
                return self.invoke(binding, envelope, chat);
            }
        }

        debug!(
            message_id = envelope.message_id(),
            topic_id = envelope.topic_id(),
            "No pattern matched, using fallback formatter"
        );
        self.fallback_result(envelope)
    }

    /// 在故障边界内调用处理器
    ///
    /// 失败时只记录绑定名、错误和来源元信息，绝不记录消息体
    /// （可能携带敏感账号数据）。
    fn invoke(
        &self,
        binding: &PatternBinding,
        envelope: &NotificationEnvelope,
        chat: &dyn ChatClient,
    ) -> DispatchResult {
        let outcome = catch_unwind(AssertUnwindSafe(|| (binding.handler)(envelope, chat)));

        match outcome {
            Ok(Ok(blocks)) => {
                let blocks = if blocks.is_empty() {
                    // 处理器返回空渲染：用兜底渲染补齐，保证下游总有内容可发
                    warn!(
                        binding = %binding.name,
                        message_id = envelope.message_id(),
                        "Handler returned no blocks, substituting fallback render"
                    );
                    fallback::format(envelope)
                } else {
                    blocks
                };
                DispatchResult {
                    matched_pattern: binding.name.clone(),
                    blocks,
                    outcome: DispatchOutcome::Handled,
                }
            }
            Ok(Err(e)) => {
                warn!(
                    binding = %binding.name,
                    error = %e,
                    message_id = envelope.message_id(),
                    topic_id = envelope.topic_id(),
                    "Handler failed, rendering fallback"
                );
                self.handler_error_result(binding, envelope)
            }
            Err(_) => {
                warn!(
                    binding = %binding.name,
                    message_id = envelope.message_id(),
                    topic_id = envelope.topic_id(),
                    "Handler panicked, rendering fallback"
                );
                self.handler_error_result(binding, envelope)
            }
        }
    }

    fn fallback_result(&self, envelope: &NotificationEnvelope) -> DispatchResult {
        DispatchResult {
            matched_pattern: FALLBACK_PATTERN.to_string(),
            blocks: fallback::format(envelope),
            outcome: DispatchOutcome::Fallback,
        }
    }

    fn handler_error_result(
        &self,
        binding: &PatternBinding,
        envelope: &NotificationEnvelope,
    ) -> DispatchResult {
        DispatchResult {
            matched_pattern: binding.name.clone(),
            blocks: fallback::format(envelope),
            outcome: DispatchOutcome::HandlerError,
        }
    }
}

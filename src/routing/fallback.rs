//! 兜底格式化器 - 无匹配或处理器失败时的降级渲染
//!
//! 产出一个最小但仍然有用的渲染：通知类型、subject（如有）、
//! 截断后的原始消息、来源元信息，足够运维人员手工分流。
//! 保证永不失败：内部出任何问题都退化为只含 messageId 的纯文本块。

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::block::RenderBlock;
use crate::envelope::NotificationEnvelope;

/// 原始消息预览的最大字符数
const MAX_RAW_PREVIEW: usize = 500;

/// Fallback message constants (Chinese)
mod msg {
    pub const UNROUTED: &str = "未识别的云通知";
    pub const KIND: &str = "类型";
    pub const TOPIC: &str = "来源 topic";
    pub const MESSAGE_ID: &str = "消息 ID";
    pub const TIMESTAMP: &str = "时间";
}

/// 生成兜底渲染块，永不失败
pub fn format(envelope: &NotificationEnvelope) -> Vec<RenderBlock> {
    catch_unwind(AssertUnwindSafe(|| render(envelope))).unwrap_or_else(|_| {
        vec![RenderBlock::section(format!(
            "{}: {}",
            msg::MESSAGE_ID,
            envelope.message_id()
        ))]
    })
}

fn render(envelope: &NotificationEnvelope) -> Vec<RenderBlock> {
    let mut blocks = Vec::new();

    match envelope.subject() {
        Some(subject) if !subject.is_empty() => {
            blocks.push(RenderBlock::header(subject));
        }
        _ => blocks.push(RenderBlock::header(msg::UNROUTED)),
    }

    if !envelope.message_raw().is_empty() {
        blocks.push(RenderBlock::section(truncate_chars(
            envelope.message_raw(),
            MAX_RAW_PREVIEW,
        )));
    }

    let mut provenance = vec![(msg::KIND, envelope.kind().as_str())];
    if !envelope.topic_id().is_empty() {
        provenance.push((msg::TOPIC, envelope.topic_id()));
    }
    if !envelope.message_id().is_empty() {
        provenance.push((msg::MESSAGE_ID, envelope.message_id()));
    }
    if !envelope.timestamp().is_empty() {
        provenance.push((msg::TIMESTAMP, envelope.timestamp()));
    }
    blocks.push(RenderBlock::fields(provenance));

    blocks
}

/// 按字符截断（不是字节，避免切在多字节字符中间）
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut truncated: String = s.chars().take(max).collect();
        truncated.push_str("...");
        truncated
    }
}

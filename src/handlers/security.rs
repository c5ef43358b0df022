//! 凭证事件处理器 - 识别消息正文中的密钥/凭证相关事件
//!
//! 用正则在原始 message 文本上做部分匹配，不要求消息体可解析。
//! 渲染时只引用 subject 和截断后的正文，绝不展开结构化内容，
//! 这类消息可能携带敏感账号信息。

use anyhow::Result;

use crate::block::RenderBlock;
use crate::chat::ChatClient;
use crate::envelope::NotificationEnvelope;
use crate::routing::{fallback, handler_fn, MatchTarget, PatternBinding};

const PRIORITY: i32 = 60;

/// 正文预览上限，比通用兜底更保守
const PREVIEW_CHARS: usize = 200;

pub fn binding() -> Result<PatternBinding, regex::Error> {
    PatternBinding::regex(
        "credential-event",
        MatchTarget::Message,
        r"API_KEY|ACCESS_KEY|SECRET_KEY|credential",
        handler_fn(handle),
    )
    .map(|b| b.with_priority(PRIORITY))
}

fn handle(envelope: &NotificationEnvelope, _chat: &dyn ChatClient) -> Result<Vec<RenderBlock>> {
    let mut blocks = vec![RenderBlock::header("🔐 凭证相关事件")];

    if let Some(subject) = envelope.subject() {
        if !subject.is_empty() {
            blocks.push(RenderBlock::section(subject));
        }
    }

    blocks.push(RenderBlock::context(fallback::truncate_chars(
        envelope.message_raw(),
        PREVIEW_CHARS,
    )));

    if !envelope.message_id().is_empty() {
        blocks.push(RenderBlock::fields([("消息 ID", envelope.message_id())]));
    }

    Ok(blocks)
}

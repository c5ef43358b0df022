//! 指标告警处理器 - 格式化监控系统的告警状态变更
//!
//! 通过结构检查识别告警消息体（要求 `AlarmName` 和 `NewStateValue`
//! 两个键同时存在），渲染成 标题 + 原因 + 元信息 三段式消息。

use anyhow::Result;
use serde_json::Value;

use crate::block::RenderBlock;
use crate::chat::ChatClient;
use crate::envelope::NotificationEnvelope;
use crate::routing::{handler_fn, PatternBinding};

/// 告警绑定的优先级，需要压过所有宽松模式
const PRIORITY: i32 = 80;

/// 构造告警绑定
pub fn binding() -> PatternBinding {
    PatternBinding::structure(
        "metric-alarm",
        ["AlarmName", "NewStateValue"],
        handler_fn(handle),
    )
    .with_priority(PRIORITY)
}

fn handle(envelope: &NotificationEnvelope, _chat: &dyn ChatClient) -> Result<Vec<RenderBlock>> {
    // 结构检查保证了 message_parsed 存在且两个键都在
    let parsed = envelope
        .message_parsed()
        .ok_or_else(|| anyhow::anyhow!("alarm handler invoked without parsed message"))?;

    let alarm_name = str_field(parsed, "AlarmName").unwrap_or("unknown-alarm");
    let new_state = str_field(parsed, "NewStateValue").unwrap_or("UNKNOWN");

    let icon = match new_state {
        "ALARM" => "🔴",
        "OK" => "🟢",
        _ => "⚪",
    };

    let mut blocks = vec![RenderBlock::header(format!(
        "{} 告警 {}: {}",
        icon, alarm_name, new_state
    ))];

    if let Some(reason) = str_field(parsed, "NewStateReason") {
        blocks.push(RenderBlock::section(reason));
    }

    let mut fields: Vec<(&str, &str)> = Vec::new();
    if let Some(region) = str_field(parsed, "Region") {
        fields.push(("区域", region));
    }
    if let Some(changed_at) = str_field(parsed, "StateChangeTime") {
        fields.push(("变更时间", changed_at));
    }
    if !envelope.topic_id().is_empty() {
        fields.push(("topic", envelope.topic_id()));
    }
    if !fields.is_empty() {
        blocks.push(RenderBlock::fields(fields));
    }

    Ok(blocks)
}

fn str_field<'a>(parsed: &'a Value, key: &str) -> Option<&'a str> {
    parsed.get(key).and_then(|v| v.as_str())
}

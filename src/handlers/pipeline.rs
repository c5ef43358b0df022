//! 流水线状态处理器 - 格式化 CI/CD 流水线的状态变更事件
//!
//! 事件总线风格的消息体，要求 `detail.state` 和 `detail.pipeline`
//! 两条路径同时存在。

use anyhow::Result;
use serde_json::Value;

use crate::block::RenderBlock;
use crate::chat::ChatClient;
use crate::envelope::NotificationEnvelope;
use crate::routing::{handler_fn, PatternBinding};

const PRIORITY: i32 = 70;

pub fn binding() -> PatternBinding {
    PatternBinding::structure(
        "pipeline-state",
        ["detail.state", "detail.pipeline"],
        handler_fn(handle),
    )
    .with_priority(PRIORITY)
}

fn handle(envelope: &NotificationEnvelope, _chat: &dyn ChatClient) -> Result<Vec<RenderBlock>> {
    let parsed = envelope
        .message_parsed()
        .ok_or_else(|| anyhow::anyhow!("pipeline handler invoked without parsed message"))?;
    let detail = parsed
        .get("detail")
        .ok_or_else(|| anyhow::anyhow!("pipeline event missing detail"))?;

    let pipeline = str_field(detail, "pipeline").unwrap_or("unknown");
    let state = str_field(detail, "state").unwrap_or("UNKNOWN");

    let icon = match state {
        "SUCCEEDED" => "✅",
        "FAILED" => "❌",
        "STARTED" | "RUNNING" => "▶️",
        _ => "ℹ️",
    };

    let mut blocks = vec![RenderBlock::header(format!(
        "{} 流水线 {}: {}",
        icon, pipeline, state
    ))];

    let mut fields: Vec<(&str, &str)> = Vec::new();
    if let Some(stage) = str_field(detail, "stage") {
        fields.push(("阶段", stage));
    }
    if let Some(execution) = str_field(detail, "execution-id") {
        fields.push(("执行 ID", execution));
    }
    if !envelope.timestamp().is_empty() {
        fields.push(("时间", envelope.timestamp()));
    }
    if !fields.is_empty() {
        blocks.push(RenderBlock::fields(fields));
    }

    Ok(blocks)
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(|v| v.as_str())
}

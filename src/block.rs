//! 渲染块 - 发送给聊天平台的结构化输出单元
//!
//! 处理器输出的是有序的 `RenderBlock` 序列，具体的聊天标记渲染
//! 由下游的消息投递方负责，本 crate 只定义结构契约。

use serde::{Deserialize, Serialize};

/// 单个渲染块，形如 `{type, text, fields}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderBlock {
    /// 块类型: "header" | "section" | "context" | "fields"
    #[serde(rename = "type")]
    pub block_type: String,
    /// 文本内容（fields 块为空）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// 键值对列表（仅 fields 块使用）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<BlockField>,
}

/// fields 块中的一个键值对
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockField {
    pub label: String,
    pub value: String,
}

impl RenderBlock {
    /// 标题块
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            block_type: "header".to_string(),
            text: Some(text.into()),
            fields: Vec::new(),
        }
    }

    /// 正文块
    pub fn section(text: impl Into<String>) -> Self {
        Self {
            block_type: "section".to_string(),
            text: Some(text.into()),
            fields: Vec::new(),
        }
    }

    /// 辅助信息块（小字显示）
    pub fn context(text: impl Into<String>) -> Self {
        Self {
            block_type: "context".to_string(),
            text: Some(text.into()),
            fields: Vec::new(),
        }
    }

    /// 键值对块
    pub fn fields<L, V>(pairs: impl IntoIterator<Item = (L, V)>) -> Self
    where
        L: Into<String>,
        V: Into<String>,
    {
        Self {
            block_type: "fields".to_string(),
            text: None,
            fields: pairs
                .into_iter()
                .map(|(label, value)| BlockField {
                    label: label.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }
}

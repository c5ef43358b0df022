//! 通知信封模块 - 校验并规范化原始 pub/sub 通知
//!
//! HTTP 入口把 webhook 请求体解析成 JSON 后交给 `normalize`，
//! 得到一个规范化、不可变的 `NotificationEnvelope`。
//! 嵌入的 message 字段会尝试解析为结构化数据（只尝试一次并缓存），
//! 解析失败时退化为纯文本，绝不抛错。

use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

/// 信封类型，只有 `Notification` 会参与内容分发
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnvelopeKind {
    Notification,
    SubscriptionConfirmation,
    UnsubscribeConfirmation,
}

impl EnvelopeKind {
    /// 从线上格式的字符串解析
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "Notification" => Some(EnvelopeKind::Notification),
            "SubscriptionConfirmation" => Some(EnvelopeKind::SubscriptionConfirmation),
            "UnsubscribeConfirmation" => Some(EnvelopeKind::UnsubscribeConfirmation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeKind::Notification => "Notification",
            EnvelopeKind::SubscriptionConfirmation => "SubscriptionConfirmation",
            EnvelopeKind::UnsubscribeConfirmation => "UnsubscribeConfirmation",
        }
    }
}

impl std::fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 一条入站通知的规范化表示
///
/// 字段私有，`normalize` 之后不可变；并发分发时可安全共享只读引用。
#[derive(Debug, Clone, Serialize)]
pub struct NotificationEnvelope {
    kind: EnvelopeKind,
    subject: Option<String>,
    message_raw: String,
    /// message_raw 解析为 JSON 对象后的缓存，解析失败时为 None
    message_parsed: Option<Value>,
    topic_id: String,
    message_id: String,
    timestamp: String,
}

impl NotificationEnvelope {
    /// 校验并规范化原始信封
    ///
    /// 必填字段: `kind`、`messageRaw`。缺失或类型错误返回
    /// [`ValidationError`]，由调用方（HTTP 层）转换成 4xx 响应。
    /// `messageRaw` 的结构化解析失败只会让 `message_parsed` 为 None，
    /// 不会向外抛错。纯转换，无日志、无副作用。
    pub fn normalize(raw: &Value) -> Result<Self, ValidationError> {
        let obj = raw.as_object().ok_or(ValidationError::NotAnObject)?;

        let kind_str = obj
            .get("kind")
            .and_then(|v| v.as_str())
            .ok_or(ValidationError::MissingField("kind"))?;
        let kind = EnvelopeKind::from_wire(kind_str)
            .ok_or_else(|| ValidationError::InvalidKind(kind_str.to_string()))?;

        let message_raw = obj
            .get("messageRaw")
            .and_then(|v| v.as_str())
            .ok_or(ValidationError::MissingField("messageRaw"))?
            .to_string();

        // 只尝试一次；只有解析出 JSON 对象才算结构化数据
        let message_parsed = serde_json::from_str::<Value>(&message_raw)
            .ok()
            .filter(|v| v.is_object());

        let opt_str = |key: &str| {
            obj.get(key)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };

        Ok(Self {
            kind,
            subject: obj
                .get("subject")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            message_raw,
            message_parsed,
            topic_id: opt_str("topicId"),
            message_id: opt_str("messageId"),
            timestamp: opt_str("timestamp"),
        })
    }

    pub fn kind(&self) -> EnvelopeKind {
        self.kind
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn message_raw(&self) -> &str {
        &self.message_raw
    }

    /// 缓存的结构化解析结果
    pub fn message_parsed(&self) -> Option<&Value> {
        self.message_parsed.as_ref()
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

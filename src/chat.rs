//! 聊天客户端能力 - 注入给处理器的 "post message" 能力
//!
//! 分发核心本身不发消息，只把 `ChatClient` 透传给处理器。
//! 内置一个通过 HTTP Webhook 调用聊天网关的实现。

use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::block::RenderBlock;

/// 聊天客户端能力，至少提供一个发消息操作
pub trait ChatClient: Send + Sync {
    /// 发送一条消息（text 为降级纯文本，blocks 为结构化渲染块）
    fn post_message(&self, text: &str, blocks: &[RenderBlock]) -> Result<()>;
}

/// 什么都不发的客户端，用于测试和 dry-run
#[derive(Debug, Default)]
pub struct NullChatClient;

impl ChatClient for NullChatClient {
    fn post_message(&self, _text: &str, _blocks: &[RenderBlock]) -> Result<()> {
        Ok(())
    }
}

/// 聊天网关配置
#[derive(Debug, Clone)]
pub struct ChatGatewayConfig {
    /// Gateway URL (如 http://localhost:9080)
    pub gateway_url: String,
    /// Hooks token (认证用)
    pub hook_token: String,
    /// 目标 channel: "telegram" | "slack" | 等
    pub channel: String,
    /// 超时时间 (秒)
    pub timeout_secs: u64,
}

impl Default for ChatGatewayConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://localhost:9080".to_string(),
            hook_token: String::new(),
            channel: "slack".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Webhook 请求载荷
#[derive(Debug, Serialize)]
struct GatewayPayload<'a> {
    /// 降级纯文本
    message: &'a str,
    /// 结构化渲染块
    blocks: &'a [RenderBlock],
    /// 目标 channel
    channel: &'a str,
    /// 发送时间
    ts: String,
}

/// Webhook 响应
#[derive(Debug, Deserialize)]
struct GatewayResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// 通过 HTTP Webhook 调用聊天网关的客户端
#[derive(Debug)]
pub struct WebhookChatClient {
    client: Client,
    config: ChatGatewayConfig,
}

impl WebhookChatClient {
    /// 创建新的客户端
    pub fn new(config: ChatGatewayConfig) -> Result<Self> {
        if config.hook_token.is_empty() {
            return Err(anyhow!("hook_token is required"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }
}

impl ChatClient for WebhookChatClient {
    fn post_message(&self, text: &str, blocks: &[RenderBlock]) -> Result<()> {
        let url = format!("{}/hooks/notify", self.config.gateway_url);

        let payload = GatewayPayload {
            message: text,
            blocks,
            channel: &self.config.channel,
            ts: Utc::now().to_rfc3339(),
        };

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.hook_token),
            )
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .map_err(|e| anyhow!("HTTP request failed: {}", e))?;

        let gateway_response: GatewayResponse = response
            .json()
            .map_err(|e| anyhow!("Failed to parse response: {}", e))?;

        if gateway_response.ok {
            Ok(())
        } else {
            Err(anyhow!(
                "gateway rejected message: {}",
                gateway_response
                    .error
                    .unwrap_or_else(|| "Unknown error".to_string())
            ))
        }
    }
}

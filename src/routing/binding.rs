//! 模式绑定 - 一条可注册的 (模式, 处理器) 规则
//!
//! 每个处理器模块在启动时构造一个 `PatternBinding` 并注册到
//! `PatternRegistry`。谓词和处理器都以一等函数值的形式持有，
//! 注册时直接传引用，不做运行期字符串查找。

use anyhow::Result;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::block::RenderBlock;
use crate::chat::ChatClient;
use crate::envelope::NotificationEnvelope;

/// 处理器函数：接收信封和注入的聊天客户端，返回有序渲染块
pub type HandlerFn =
    Arc<dyn Fn(&NotificationEnvelope, &dyn ChatClient) -> Result<Vec<RenderBlock>> + Send + Sync>;

/// 自定义谓词函数：接收信封和缓存的结构化解析结果
pub type PredicateFn =
    Arc<dyn Fn(&NotificationEnvelope, Option<&Value>) -> Result<bool> + Send + Sync>;

/// 把闭包包装成 [`HandlerFn`]
pub fn handler_fn<F>(f: F) -> HandlerFn
where
    F: Fn(&NotificationEnvelope, &dyn ChatClient) -> Result<Vec<RenderBlock>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// 把闭包包装成 [`PredicateFn`]
pub fn predicate_fn<F>(f: F) -> PredicateFn
where
    F: Fn(&NotificationEnvelope, Option<&Value>) -> Result<bool> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// 匹配规则（带标签变体）
pub enum MatchRule {
    /// 正则搜索匹配（非全串），构造时即编译
    Regex(Regex),
    /// 大小写敏感的子串匹配
    Contains(String),
    /// 自定义谓词，出错或 panic 一律视为不匹配
    Predicate(PredicateFn),
    /// 结构检查：要求 message_parsed 中存在所有点分路径
    StructureCheck(Vec<String>),
}

impl fmt::Debug for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRule::Regex(re) => write!(f, "Regex({:?})", re.as_str()),
            MatchRule::Contains(s) => write!(f, "Contains({:?})", s),
            MatchRule::Predicate(_) => write!(f, "Predicate(<fn>)"),
            MatchRule::StructureCheck(paths) => write!(f, "StructureCheck({:?})", paths),
        }
    }
}

/// 匹配目标：决定规则测试信封的哪个字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTarget {
    /// 原始 message 文本
    Message,
    /// subject（可能缺失）
    Subject,
    /// 来源 topic
    TopicId,
    /// 结构化解析结果（仅 StructureCheck / Predicate 使用）
    ParsedMessage,
}

/// 一条可注册的模式绑定
pub struct PatternBinding {
    /// 唯一标识，重启后保持稳定（用于诊断和幂等重注册）
    pub name: String,
    pub(crate) rule: MatchRule,
    pub target: MatchTarget,
    /// 数值越大越先被评估
    pub priority: i32,
    /// 禁用的绑定会被整个跳过
    pub enabled: bool,
    pub(crate) handler: HandlerFn,
}

impl PatternBinding {
    /// 创建新的绑定（默认 priority = 0、enabled = true）
    pub fn new(
        name: impl Into<String>,
        rule: MatchRule,
        target: MatchTarget,
        handler: HandlerFn,
    ) -> Self {
        Self {
            name: name.into(),
            rule,
            target,
            priority: 0,
            enabled: true,
            handler,
        }
    }

    /// 正则绑定；非法正则在构造时报错，而不是留到分发时
    pub fn regex(
        name: impl Into<String>,
        target: MatchTarget,
        pattern: &str,
        handler: HandlerFn,
    ) -> Result<Self, regex::Error> {
        Ok(Self::new(
            name,
            MatchRule::Regex(Regex::new(pattern)?),
            target,
            handler,
        ))
    }

    /// 子串绑定
    pub fn contains(
        name: impl Into<String>,
        target: MatchTarget,
        needle: impl Into<String>,
        handler: HandlerFn,
    ) -> Self {
        Self::new(name, MatchRule::Contains(needle.into()), target, handler)
    }

    /// 谓词绑定
    pub fn predicate(name: impl Into<String>, pred: PredicateFn, handler: HandlerFn) -> Self {
        Self::new(
            name,
            MatchRule::Predicate(pred),
            MatchTarget::ParsedMessage,
            handler,
        )
    }

    /// 结构检查绑定；目标固定为 ParsedMessage
    pub fn structure<P>(
        name: impl Into<String>,
        paths: impl IntoIterator<Item = P>,
        handler: HandlerFn,
    ) -> Self
    where
        P: Into<String>,
    {
        Self::new(
            name,
            MatchRule::StructureCheck(paths.into_iter().map(Into::into).collect()),
            MatchTarget::ParsedMessage,
            handler,
        )
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 禁用该绑定
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub(crate) fn rule(&self) -> &MatchRule {
        &self.rule
    }
}

impl fmt::Debug for PatternBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternBinding")
            .field("name", &self.name)
            .field("rule", &self.rule)
            .field("target", &self.target)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .finish()
    }
}

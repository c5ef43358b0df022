//! 匹配评估器 - 判断单条绑定是否命中信封
//!
//! 边界策略：目标字段缺失/为空一律视为不匹配，绝不报错；
//! 谓词出错或 panic 也只算不匹配，保护外层的分发循环。

use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

use crate::envelope::NotificationEnvelope;
use crate::routing::binding::{MatchRule, MatchTarget, PatternBinding, PredicateFn};

/// 评估一条绑定是否匹配信封
pub fn matches(binding: &PatternBinding, envelope: &NotificationEnvelope) -> bool {
    match binding.rule() {
        MatchRule::Regex(re) => {
            target_str(envelope, binding.target).is_some_and(|s| re.is_match(s))
        }
        MatchRule::Contains(needle) => {
            target_str(envelope, binding.target).is_some_and(|s| s.contains(needle.as_str()))
        }
        MatchRule::Predicate(pred) => run_predicate(&binding.name, pred, envelope),
        MatchRule::StructureCheck(paths) => {
            // 结构检查只对 ParsedMessage 目标有意义
            if binding.target != MatchTarget::ParsedMessage {
                return false;
            }
            match envelope.message_parsed() {
                Some(parsed) => paths.iter().all(|p| resolve_path(parsed, p).is_some()),
                None => false,
            }
        }
    }
}

/// 解析匹配目标对应的字符串值；缺失返回 None
fn target_str<'a>(envelope: &'a NotificationEnvelope, target: MatchTarget) -> Option<&'a str> {
    match target {
        MatchTarget::Message => Some(envelope.message_raw()),
        MatchTarget::Subject => envelope.subject(),
        MatchTarget::TopicId => {
            let topic = envelope.topic_id();
            if topic.is_empty() {
                None
            } else {
                Some(topic)
            }
        }
        // 结构化目标没有字符串视图
        MatchTarget::ParsedMessage => None,
    }
}

/// 在故障边界内执行谓词；Err 和 panic 均视为不匹配
fn run_predicate(name: &str, pred: &PredicateFn, envelope: &NotificationEnvelope) -> bool {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        pred(envelope, envelope.message_parsed())
    }));

    match outcome {
        Ok(Ok(matched)) => matched,
        Ok(Err(e)) => {
            warn!(binding = %name, error = %e, "Predicate matcher failed, treating as no match");
            false
        }
        Err(_) => {
            warn!(binding = %name, "Predicate matcher panicked, treating as no match");
            false
        }
    }
}

/// 沿点分路径在 JSON 对象中逐层下钻
///
/// 路径穿过数组属于未定义行为，按不支持处理：每一层都必须是对象，
/// 遇到数组即解析失败（不猜测下标语义）。
fn resolve_path<'a>(root: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::RenderBlock;
    use crate::routing::binding::{handler_fn, predicate_fn, HandlerFn};
    use serde_json::json;

    fn noop_handler() -> HandlerFn {
        handler_fn(|_, _| Ok(vec![RenderBlock::section("ok")]))
    }

    fn envelope(raw: serde_json::Value) -> NotificationEnvelope {
        NotificationEnvelope::normalize(&raw).unwrap()
    }

    fn notification(message: &str) -> NotificationEnvelope {
        envelope(json!({ "kind": "Notification", "messageRaw": message }))
    }

    #[test]
    fn test_regex_partial_match() {
        let binding = PatternBinding::regex(
            "api-key",
            MatchTarget::Message,
            "API_KEY",
            noop_handler(),
        )
        .unwrap();

        assert!(matches(
            &binding,
            &notification("Your API_KEY has been rotated")
        ));
        assert!(!matches(&binding, &notification("disk usage high")));
    }

    #[test]
    fn test_regex_absent_subject_is_no_match() {
        let binding =
            PatternBinding::regex("subj", MatchTarget::Subject, ".*", noop_handler()).unwrap();
        // subject 缺失时连 .* 都不应匹配
        assert!(!matches(&binding, &notification("anything")));
    }

    #[test]
    fn test_contains_is_case_sensitive() {
        let binding =
            PatternBinding::contains("alarm", MatchTarget::Message, "ALARM", noop_handler());
        assert!(matches(&binding, &notification("state is now ALARM")));
        assert!(!matches(&binding, &notification("state is now alarm")));
    }

    #[test]
    fn test_contains_on_topic_id() {
        let binding =
            PatternBinding::contains("ops", MatchTarget::TopicId, "ops-", noop_handler());

        let hit = envelope(json!({
            "kind": "Notification",
            "messageRaw": "x",
            "topicId": "ops-alerts"
        }));
        assert!(matches(&binding, &hit));

        // topicId 缺省为空串，视为缺失
        assert!(!matches(&binding, &notification("x")));
    }

    #[test]
    fn test_predicate_match() {
        let pred = predicate_fn(|_, parsed| {
            Ok(parsed
                .and_then(|v| v.get("severity"))
                .and_then(|v| v.as_str())
                == Some("critical"))
        });
        let binding = PatternBinding::predicate("critical", pred, noop_handler());

        assert!(matches(&binding, &notification(r#"{"severity": "critical"}"#)));
        assert!(!matches(&binding, &notification(r#"{"severity": "info"}"#)));
        assert!(!matches(&binding, &notification("plain text")));
    }

    #[test]
    fn test_predicate_error_is_no_match() {
        let pred = predicate_fn(|_, _| anyhow::bail!("db unavailable"));
        let binding = PatternBinding::predicate("flaky", pred, noop_handler());
        assert!(!matches(&binding, &notification("anything")));
    }

    #[test]
    fn test_predicate_panic_is_no_match() {
        let pred = predicate_fn(|_, _| panic!("matcher bug"));
        let binding = PatternBinding::predicate("buggy", pred, noop_handler());
        assert!(!matches(&binding, &notification("anything")));
    }

    #[test]
    fn test_structure_check_nested_path() {
        let binding = PatternBinding::structure("state", ["detail.state"], noop_handler());

        assert!(matches(
            &binding,
            &notification(r#"{"detail": {"state": "RUNNING"}}"#)
        ));
        assert!(!matches(&binding, &notification(r#"{"detail": {}}"#)));
        assert!(!matches(&binding, &notification("not structured at all")));
    }

    #[test]
    fn test_structure_check_multiple_paths() {
        let binding = PatternBinding::structure(
            "alarm",
            ["AlarmName", "NewStateValue"],
            noop_handler(),
        );

        assert!(matches(
            &binding,
            &notification(r#"{"AlarmName": "cpu", "NewStateValue": "ALARM"}"#)
        ));
        assert!(!matches(
            &binding,
            &notification(r#"{"AlarmName": "cpu"}"#)
        ));
    }

    #[test]
    fn test_structure_check_through_array_unsupported() {
        let binding = PatternBinding::structure("deep", ["items.state"], noop_handler());
        // 路径穿过数组：不猜测下标语义，一律不匹配
        assert!(!matches(
            &binding,
            &notification(r#"{"items": [{"state": "ok"}]}"#)
        ));
    }

    #[test]
    fn test_structure_check_wrong_target_is_no_match() {
        let mut binding = PatternBinding::structure("misconfigured", ["a"], noop_handler());
        binding.target = MatchTarget::Message;
        assert!(!matches(&binding, &notification(r#"{"a": 1}"#)));
    }

    #[test]
    fn test_resolve_path() {
        let value = json!({"a": {"b": {"c": 1}}});
        assert!(resolve_path(&value, "a.b.c").is_some());
        assert!(resolve_path(&value, "a.b").is_some());
        assert!(resolve_path(&value, "a.x").is_none());
        assert!(resolve_path(&value, "a.b.c.d").is_none());
    }
}

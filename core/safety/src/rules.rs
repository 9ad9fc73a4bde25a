//! Permission rule evaluation (spec §4.4.2): matches a tool call (and an
//! optional path argument) against the configured rule set, with session
//! rules taking priority over workspace rules, which take priority over
//! built-in defaults. Among equal-priority matches the most restrictive
//! action wins (deny beats ask beats allow).

use std::path::Path;

use journeyman_protocol::PermissionDecision;
use journeyman_protocol::PermissionRule;
use journeyman_protocol::RuleAction;
use journeyman_protocol::RuleSource;

#[derive(Debug, Clone, Default)]
pub struct PermissionRuleEvaluator {
    rules: Vec<PermissionRule>,
}

impl PermissionRuleEvaluator {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rules(rules: Vec<PermissionRule>) -> Self {
        Self { rules }
    }

    pub fn add_rule(&mut self, rule: PermissionRule) {
        self.rules.push(rule);
    }

    /// Evaluates rules for a tool call. Returns `None` if no rule matches,
    /// in which case the tool's own `check_permission` stage decides.
    pub fn evaluate(&self, tool_name: &str, path: Option<&Path>) -> Option<PermissionDecision> {
        let mut matching: Vec<&PermissionRule> = self
            .rules
            .iter()
            .filter(|r| matches_tool(&r.tool_pattern, tool_name))
            .filter(|r| matches_path(&r.path_pattern, path))
            .collect();

        matching.sort_by(|a, b| {
            source_priority(a.source)
                .cmp(&source_priority(b.source))
                .then(action_priority(a.action).cmp(&action_priority(b.action)))
        });

        matching.first().map(|rule| match rule.action {
            RuleAction::Allow => PermissionDecision::Allowed,
            RuleAction::Deny => PermissionDecision::Denied {
                reason: format!("denied by {:?} rule for {tool_name}", rule.source),
            },
            // Ask falls through to the tool's own check; treat as allowed
            // here so that stage decides whether to prompt.
            RuleAction::Ask => PermissionDecision::Allowed,
        })
    }
}

fn source_priority(source: RuleSource) -> u8 {
    match source {
        RuleSource::Session => 0,
        RuleSource::Workspace => 1,
        RuleSource::Default => 2,
    }
}

fn action_priority(action: RuleAction) -> u8 {
    match action {
        RuleAction::Deny => 0,
        RuleAction::Ask => 1,
        RuleAction::Allow => 2,
    }
}

fn matches_tool(pattern: &str, tool_name: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    let tool_part = pattern.split([':', '(']).next().unwrap_or(pattern);
    tool_part == tool_name
}

fn matches_path(pattern: &Option<String>, path: Option<&Path>) -> bool {
    match (pattern, path) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(pat), Some(path)) => {
            let path_str = path.to_string_lossy();
            if pat == "*" {
                return true;
            }
            if let Some(ext) = pat.strip_prefix("*.") {
                return path_str.ends_with(ext);
            }
            if let Some((prefix, suffix)) = pat.split_once("**") {
                let prefix = prefix.trim_end_matches('/');
                let suffix = suffix.trim_start_matches('/');
                let prefix_ok = prefix.is_empty() || path_str.starts_with(prefix);
                let suffix_ok = suffix.is_empty() || path_str.ends_with(suffix);
                return prefix_ok && suffix_ok;
            }
            path_str.contains(pat.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(source: RuleSource, tool: &str, action: RuleAction) -> PermissionRule {
        PermissionRule {
            source,
            tool_pattern: tool.to_string(),
            path_pattern: None,
            action,
        }
    }

    #[test]
    fn no_rule_matches_returns_none() {
        let eval = PermissionRuleEvaluator::new();
        assert!(eval.evaluate("shell", None).is_none());
    }

    #[test]
    fn session_rule_overrides_workspace_rule() {
        let eval = PermissionRuleEvaluator::with_rules(vec![
            rule(RuleSource::Workspace, "shell", RuleAction::Deny),
            rule(RuleSource::Session, "shell", RuleAction::Allow),
        ]);
        assert_eq!(
            eval.evaluate("shell", None),
            Some(PermissionDecision::Allowed)
        );
    }

    #[test]
    fn equal_priority_deny_beats_allow() {
        let eval = PermissionRuleEvaluator::with_rules(vec![
            rule(RuleSource::Default, "shell", RuleAction::Allow),
            rule(RuleSource::Default, "shell", RuleAction::Deny),
        ]);
        assert!(matches!(
            eval.evaluate("shell", None),
            Some(PermissionDecision::Denied { .. })
        ));
    }

    #[test]
    fn wildcard_path_pattern_matches_extension() {
        let mut eval = PermissionRuleEvaluator::new();
        eval.add_rule(PermissionRule {
            source: RuleSource::Default,
            tool_pattern: "*".to_string(),
            path_pattern: Some("*.rs".to_string()),
            action: RuleAction::Allow,
        });
        assert_eq!(
            eval.evaluate("write_file_diff", Some(Path::new("src/lib.rs"))),
            Some(PermissionDecision::Allowed)
        );
        assert_eq!(eval.evaluate("write_file_diff", Some(Path::new("src/lib.py"))), None);
    }
}

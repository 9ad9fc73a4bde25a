//! The CLI's [`Authorizer`] (spec §4.4.2 "ask the frontend synchronously"):
//! prompts on the controlling terminal when one is attached, otherwise
//! falls back to deny, matching [`journeyman_safety::TimeoutDenyAuthorizer`]'s
//! headless behavior.

use async_trait::async_trait;
use journeyman_protocol::PermissionDecision;
use journeyman_safety::Authorizer;
use std::io::IsTerminal;
use std::path::Path;
use std::path::PathBuf;

/// Prompts `tool_name: description [y/N/a]?` on stderr and reads an answer
/// from stdin when one is attached to a terminal. `a`/`always` widens the
/// approval to the rest of the session (`AllowedForSession`).
pub struct CliAuthorizer;

#[async_trait]
impl Authorizer for CliAuthorizer {
    async fn authorize(&self, tool_name: &str, path: Option<&Path>, description: &str) -> PermissionDecision {
        if !std::io::stdin().is_terminal() {
            return PermissionDecision::Denied {
                reason: format!("{tool_name} requires approval but no terminal is attached; defaulting to denied"),
            };
        }

        let prompt = match path {
            Some(path) => format!("{description} ({})? [y/N/a] ", path.display()),
            None => format!("{description}? [y/N/a] "),
        };

        let answer = tokio::task::spawn_blocking(move || {
            eprint!("{prompt}");
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).ok();
            line
        })
        .await
        .unwrap_or_default();

        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => PermissionDecision::Allowed,
            "a" | "always" => PermissionDecision::AllowedForSession,
            _ => PermissionDecision::Denied {
                reason: format!("{tool_name} denied by user"),
            },
        }
    }
}

/// Builds the [`journeyman_safety::PermissionRuleEvaluator`]'s seed rules
/// from `config.yaml`'s `permissions` section plus CLI preauthorize flags.
pub struct PreauthorizeFlags {
    pub allow_dirs: Vec<PathBuf>,
    pub allow_files: Vec<PathBuf>,
    pub allow_shell: bool,
    pub allow_network: bool,
}

pub fn config_rules(permissions: &journeyman_config::PermissionsConfig) -> Vec<journeyman_protocol::PermissionRule> {
    use journeyman_protocol::PermissionRule;
    use journeyman_protocol::RuleAction;
    use journeyman_protocol::RuleSource;

    let mut rules = Vec::new();
    for pattern in &permissions.deny {
        rules.push(PermissionRule {
            source: RuleSource::Default,
            tool_pattern: pattern.clone(),
            path_pattern: None,
            action: RuleAction::Deny,
        });
    }
    for pattern in &permissions.ask {
        rules.push(PermissionRule {
            source: RuleSource::Default,
            tool_pattern: pattern.clone(),
            path_pattern: None,
            action: RuleAction::Ask,
        });
    }
    for pattern in &permissions.allow {
        rules.push(PermissionRule {
            source: RuleSource::Default,
            tool_pattern: pattern.clone(),
            path_pattern: None,
            action: RuleAction::Allow,
        });
    }
    rules
}

/// CLI preauthorize flags are session-scoped: they take priority over
/// `config.yaml`'s workspace/default rules (spec §4.4.2 priority order).
pub fn preauthorize_rules(flags: &PreauthorizeFlags) -> Vec<journeyman_protocol::PermissionRule> {
    use journeyman_protocol::PermissionRule;
    use journeyman_protocol::RuleAction;
    use journeyman_protocol::RuleSource;

    let mut rules = Vec::new();
    for dir in &flags.allow_dirs {
        rules.push(PermissionRule {
            source: RuleSource::Session,
            tool_pattern: "*".to_string(),
            path_pattern: Some(format!("{}/**", dir.display())),
            action: RuleAction::Allow,
        });
    }
    for file in &flags.allow_files {
        rules.push(PermissionRule {
            source: RuleSource::Session,
            tool_pattern: "*".to_string(),
            path_pattern: Some(file.display().to_string()),
            action: RuleAction::Allow,
        });
    }
    if flags.allow_shell {
        rules.push(PermissionRule {
            source: RuleSource::Session,
            tool_pattern: "shell".to_string(),
            path_pattern: None,
            action: RuleAction::Allow,
        });
    }
    if flags.allow_network {
        for tool in ["shell", "go_sandbox", "read_url", "web_search"] {
            rules.push(PermissionRule {
                source: RuleSource::Session,
                tool_pattern: tool.to_string(),
                path_pattern: None,
                action: RuleAction::Allow,
            });
        }
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeyman_config::PermissionsConfig;

    #[test]
    fn config_rules_map_each_list_to_its_action() {
        let config = PermissionsConfig {
            allow: vec!["read_file".to_string()],
            deny: vec!["shell".to_string()],
            ask: vec!["write_file_diff".to_string()],
        };
        let rules = config_rules(&config);
        assert_eq!(rules.len(), 3);
        assert!(rules.iter().any(|r| r.tool_pattern == "shell" && matches!(r.action, journeyman_protocol::RuleAction::Deny)));
    }

    #[test]
    fn preauthorize_dir_becomes_a_session_scoped_glob_rule() {
        let flags = PreauthorizeFlags {
            allow_dirs: vec![PathBuf::from("/work/proj")],
            allow_files: Vec::new(),
            allow_shell: false,
            allow_network: false,
        };
        let rules = preauthorize_rules(&flags);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].path_pattern.as_deref(), Some("/work/proj/**"));
    }

    #[test]
    fn allow_network_widens_four_network_capable_tools() {
        let flags = PreauthorizeFlags {
            allow_dirs: Vec::new(),
            allow_files: Vec::new(),
            allow_shell: false,
            allow_network: true,
        };
        assert_eq!(preauthorize_rules(&flags).len(), 4);
    }
}

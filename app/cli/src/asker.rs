//! The CLI's [`UserAsker`] for `ask_user` (spec §4.5): reads a free-form
//! answer from the controlling terminal, mirroring [`crate::authorizer::CliAuthorizer`].

use async_trait::async_trait;
use journeyman_tools::UserAsker;
use std::io::IsTerminal;

pub struct CliAsker;

#[async_trait]
impl UserAsker for CliAsker {
    async fn ask(&self, question: &str) -> String {
        if !std::io::stdin().is_terminal() {
            return "no answer available: running without an interactive frontend".to_string();
        }

        let question = question.to_string();
        tokio::task::spawn_blocking(move || {
            eprintln!("{question}");
            eprint!("> ");
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).ok();
            line.trim().to_string()
        })
        .await
        .unwrap_or_default()
    }
}

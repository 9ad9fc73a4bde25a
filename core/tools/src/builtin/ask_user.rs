//! `ask_user` (spec §4.5): a planning sub-agent's way of posing a
//! free-form question to whatever frontend is driving the session,
//! separate from the authorization-approval flow.

use crate::asker::UnattendedAsker;
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::Tool;
use async_trait::async_trait;
use journeyman_protocol::LoopEvent;
use journeyman_protocol::ToolOutput;
use serde_json::Value;

pub struct AskUserTool;

impl AskUserTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AskUserTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for AskUserTool {
    fn name(&self) -> &str {
        "ask_user"
    }

    fn description(&self) -> &str {
        "Poses a free-form question to the user and returns their answer. Use sparingly - prefer making a reasonable assumption and stating it."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "question": {"type": "string"}
            },
            "required": ["question"]
        })
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
        let question = input["question"].as_str().ok_or_else(|| ToolError::invalid_input("question must be a string"))?;

        ctx.emit(LoopEvent::QuestionAsked {
            call_id: ctx.call_id.clone(),
            question: question.to_string(),
        })
        .await;

        let answer = match &ctx.asker {
            Some(asker) => asker.ask(question).await,
            None => UnattendedAsker::default().ask(question).await,
        };

        Ok(ToolOutput::text(answer))
    }
}

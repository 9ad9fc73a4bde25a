//! `Verification` (spec §4.9): an advisory, at-most-once-per-prompt re-entry
//! after the model declares completion. It only ever calls the model with a
//! text-only sub-prompt describing what changed; no tools are offered, so it
//! cannot mutate files (spec §9 open question: verification stays strictly
//! advisory, a "fixing" pass would need its own explicit tool).

use journeyman_inference::CompletionRequest;
use journeyman_inference::InferenceError;
use journeyman_inference::Model;
use journeyman_protocol::Message;
use std::path::PathBuf;

/// Builds the verification sub-prompt from what the turn actually touched.
pub fn build_verification_prompt(modified_files: &[PathBuf], pending_todos: &[String]) -> String {
    let mut out = String::from(
        "Review the changes you just made. Without making further edits, report: \
         (1) whether the modified files plausibly satisfy the user's request, \
         (2) any pending todo items left incomplete, and (3) anything that looks wrong.\n\n",
    );

    if modified_files.is_empty() {
        out.push_str("No files were modified this turn.\n");
    } else {
        out.push_str("Modified files:\n");
        for path in modified_files {
            out.push_str("- ");
            out.push_str(&path.display().to_string());
            out.push('\n');
        }
    }

    if !pending_todos.is_empty() {
        out.push_str("\nPending todo items:\n");
        for todo in pending_todos {
            out.push_str("- ");
            out.push_str(todo);
            out.push('\n');
        }
    }

    out
}

/// Runs the verification pass: a single tool-free completion call.
pub async fn run_verification(
    model: &dyn Model,
    modified_files: &[PathBuf],
    pending_todos: &[String],
) -> Result<String, InferenceError> {
    let prompt = build_verification_prompt(modified_files, pending_todos);
    let request = CompletionRequest::new(vec![Message::user(prompt)]);
    let response = model.complete(request).await?;
    Ok(response.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_modified_files_and_pending_todos() {
        let prompt = build_verification_prompt(&[PathBuf::from("src/lib.rs")], &["write docs".to_string()]);
        assert!(prompt.contains("src/lib.rs"));
        assert!(prompt.contains("write docs"));
    }

    #[test]
    fn prompt_notes_when_nothing_was_modified() {
        let prompt = build_verification_prompt(&[], &[]);
        assert!(prompt.contains("No files were modified"));
    }

    #[tokio::test]
    async fn verification_call_returns_model_text() {
        use journeyman_inference::MockModel;
        let model = MockModel::always_text("judge", "looks good");
        let out = run_verification(&model, &[], &[]).await.expect("verify");
        assert_eq!(out, "looks good");
    }
}

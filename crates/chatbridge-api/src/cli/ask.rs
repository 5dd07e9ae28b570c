//! One-shot question through a conversation session.

use std::time::Instant;

use anyhow::Result;
use console::style;

use chatbridge_core::chat::SessionConfig;
use chatbridge_core::retry::RetryPolicy;
use chatbridge_types::chat::AskOptions;

use crate::state::AppState;

/// Ask `question` in the `chat_id` conversation and print the answer.
pub async fn ask(state: &AppState, question: &str, chat_id: &str, json: bool) -> Result<()> {
    let session = state.sessions.get_or_create(
        chat_id,
        SessionConfig::default().with_model(state.config.backend.model.clone()),
    )?;
    let policy = RetryPolicy::from(&state.config.retry);

    let start = Instant::now();
    let answer = session
        .ask_with_retry(question, AskOptions::default().with_author("cli"), &policy)
        .await?;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    let conversation = session.state();

    if json {
        let output = serde_json::json!({
            "chat_id": chat_id,
            "question": question,
            "answer": answer,
            "conversation_id": conversation.conversation_id,
            "message_id": conversation.last_message_id,
            "response_time_ms": elapsed_ms,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style("Q").bold().cyan(), question);
    println!();
    for line in answer.lines() {
        println!("  {line}");
    }
    println!();
    println!(
        "  {}",
        style(format!(
            "{} via {} in {elapsed_ms} ms",
            conversation.conversation_id.as_deref().unwrap_or("-"),
            state.sessions.backend_name()
        ))
        .dim()
    );
    println!();
    Ok(())
}

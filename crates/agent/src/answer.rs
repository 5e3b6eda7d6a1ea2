//! Answer accumulation from the turns an agent run appended.

use scrivener_core::message::{Message, Role};

/// Append the fragments one turn contributes to the answer.
///
/// Only assistant turns count. Text is followed by a newline, and each
/// requested tool call adds a `Tool Used:` line. Empty text alongside tool
/// calls is skipped.
pub fn push_fragments(answer: &mut String, turn: &Message) {
    if turn.role != Role::Assistant {
        return;
    }

    if turn.tool_calls.is_empty() {
        answer.push_str(&turn.content);
        answer.push('\n');
        return;
    }

    if !turn.content.is_empty() {
        answer.push_str(&turn.content);
        answer.push('\n');
    }
    for call in &turn.tool_calls {
        answer.push_str("Tool Used: ");
        answer.push_str(&call.name);
        answer.push('\n');
    }
}

/// Build the answer from a run's appended turns, in order.
pub fn accumulate(appended: &[Message]) -> String {
    let mut answer = String::new();
    for turn in appended {
        push_fragments(&mut answer, turn);
    }
    answer
}

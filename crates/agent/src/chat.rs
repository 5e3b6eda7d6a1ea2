//! Conversion between the chat UI's entries and model turns.

use scrivener_core::chat::{ChatEntry, ChatRole};
use scrivener_core::message::{Message, Role};

pub const TOOL_CALL_TITLE_PREFIX: &str = "🛠️ Used tool ";
pub const TOOL_RESULT_TITLE: &str = "📋 Tool result";

/// Turn the chat history into model turns. Annotation entries are
/// display-only and dropped.
pub fn history_from_chat(entries: &[ChatEntry]) -> Vec<Message> {
    entries
        .iter()
        .filter(|e| !e.is_annotation())
        .map(|e| match e.role {
            ChatRole::User => Message::user(&e.content),
            ChatRole::Assistant => Message::assistant(&e.content),
        })
        .collect()
}

/// Fold one streamed turn into the chat list.
///
/// Assistant text becomes an assistant entry. With `show_tool_usage`, each
/// tool call and each tool result also gets an annotation entry. Other roles
/// are ignored.
pub fn apply_turn(entries: &mut Vec<ChatEntry>, turn: &Message, show_tool_usage: bool) {
    match turn.role {
        Role::Assistant => {
            if !turn.content.is_empty() {
                entries.push(ChatEntry::assistant(&turn.content));
            }
            if show_tool_usage {
                for call in &turn.tool_calls {
                    entries.push(ChatEntry::annotation(
                        format!("{TOOL_CALL_TITLE_PREFIX}{}", call.name),
                        &call.arguments,
                    ));
                }
            }
        }
        Role::Tool if show_tool_usage => {
            entries.push(ChatEntry::annotation(TOOL_RESULT_TITLE, &turn.content));
        }
        _ => {}
    }
}

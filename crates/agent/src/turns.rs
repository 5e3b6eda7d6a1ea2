//! Turn-list normalization.

use scrivener_core::message::Message;

/// Make `system_prompt` the first turn.
///
/// An existing system turn at position zero is overwritten; otherwise a new
/// one is inserted. No other turn is touched.
pub fn ensure_instruction_turn(turns: &mut Vec<Message>, system_prompt: &str) {
    match turns.first() {
        Some(first) if first.is_system() => turns[0] = Message::system(system_prompt),
        _ => turns.insert(0, Message::system(system_prompt)),
    }
}

pub fn append_user_turn(turns: &mut Vec<Message>, text: &str) {
    turns.push(Message::user(text));
}

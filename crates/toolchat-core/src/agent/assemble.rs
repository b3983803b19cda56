//! Request assembly helpers

use crate::types::{Message, MessageRole};

/// Pick the instruction for a call
///
/// A per-call value always wins over the default, including an empty one.
/// The result is `None` when there is nothing to insert.
pub fn resolve_instruction(per_call: Option<&str>, default: Option<&str>) -> Option<String> {
    per_call
        .or(default)
        .filter(|instruction| !instruction.is_empty())
        .map(str::to_string)
}

/// Place `instruction` first in `messages`
///
/// A leading system message is replaced, never duplicated. With no
/// instruction the sequence is left as it is.
pub fn apply_system_instruction(messages: &mut Vec<Message>, instruction: Option<String>) {
    let Some(instruction) = instruction else {
        return;
    };
    match messages.first_mut() {
        Some(first) if first.role == MessageRole::System => first.content = instruction,
        _ => messages.insert(0, Message::system(instruction)),
    }
}

/// Keep only complete tool exchanges from loaded history
///
/// A bounded read can start inside an exchange or end before its results.
/// Tool messages without a preceding call are removed, and so is an
/// assistant tool-call message whose calls are not all answered by the tool
/// messages right after it.
pub fn pair_tool_exchanges(messages: Vec<Message>) -> Vec<Message> {
    let mut kept = Vec::with_capacity(messages.len());
    let mut iter = messages.into_iter().peekable();
    while let Some(message) = iter.next() {
        if message.role == MessageRole::Tool {
            continue;
        }
        if !message.has_tool_calls() {
            kept.push(message);
            continue;
        }

        let mut results = Vec::new();
        while let Some(result) = iter.next_if(|m| m.role == MessageRole::Tool) {
            results.push(result);
        }
        let answered = message.calls().iter().all(|call| {
            results
                .iter()
                .any(|r| r.tool_call_id.as_deref() == Some(call.id.as_str()))
        });
        if answered {
            kept.push(message);
            kept.extend(results);
        }
    }
    kept
}

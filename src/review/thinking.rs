//! Thinking-trace handling for reasoning models that prefix their answer with
//! a `<think>...</think>` block.

const OPEN: &str = "<think>";
const CLOSE: &str = "</think>";

/// Remove every thinking segment and trim the remaining answer.
///
/// A closing tag with no opening tag before it ends a preamble that started at
/// the beginning of the text. An unterminated opening tag swallows the rest.
pub fn strip_thinking(text: &str) -> String {
    let mut rest = text;
    if let Some(close) = rest.find(CLOSE) {
        if !rest[..close].contains(OPEN) {
            rest = &rest[close + CLOSE.len()..];
        }
    }

    let mut answer = String::with_capacity(rest.len());
    while let Some(start) = rest.find(OPEN) {
        answer.push_str(&rest[..start]);
        match rest[start..].find(CLOSE) {
            Some(end) => rest = &rest[start + end + CLOSE.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    answer.push_str(rest);
    answer.trim().to_string()
}

/// Fold a separately returned reasoning trace into the answer as a leading
/// thinking block, unless the answer already carries one.
pub fn merge_reasoning(content: &str, reasoning: Option<&str>) -> String {
    match reasoning.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reasoning) if !content.contains(OPEN) && !content.contains(CLOSE) => {
            format!("{OPEN}\n{reasoning}\n{CLOSE}\n\n{}", content.trim())
        }
        _ => content.trim().to_string(),
    }
}

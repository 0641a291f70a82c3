//! Provider formatting helpers.

use crate::types::ContentBlock;

/// Join the textual segments of a response with newlines.
///
/// Non-text segments (tool use, thinking, ...) are dropped; order is kept.
pub fn format_text_content(content: &[ContentBlock]) -> String {
    content
        .iter()
        .filter_map(ContentBlock::as_text)
        .collect::<Vec<_>>()
        .join("\n")
}

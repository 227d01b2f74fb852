//! Locating the metadata declaration inside an about file.
//!
//! The declaration starts on the first line whose trimmed text begins with
//! [`DECLARATION_MARKER`] and ends on the first line (possibly the same one)
//! whose trimmed text ends with one of [`CLOSING_MARKERS`]. Everything else
//! in the file is ignored.

use super::ExtractError;

/// Variable the declaration assigns to.
pub const DECLARATION_MARKER: &str = "$ThemeInfo";

/// Line endings that close the declaration.
pub const CLOSING_MARKERS: [&str; 2] = [");", "];"];

/// The raw text of a declaration and where it starts in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationBlock {
    /// 1-based line number of the marker line.
    pub first_line: usize,
    /// Buffered lines, newline-joined.
    pub text: String,
}

/// Find the declaration block in `source`.
///
/// Returns `Ok(None)` when no line carries the marker and
/// [`ExtractError::Unterminated`] when the block is never closed.
pub fn find_declaration_block(source: &str) -> Result<Option<DeclarationBlock>, ExtractError> {
    let mut block: Option<DeclarationBlock> = None;

    for (index, line) in source.lines().enumerate() {
        let trimmed = line.trim();

        match block.as_mut() {
            None => {
                if !starts_declaration(trimmed) {
                    continue;
                }
                block = Some(DeclarationBlock {
                    first_line: index + 1,
                    text: line.to_string(),
                });
            }
            Some(open) => {
                open.text.push('\n');
                open.text.push_str(line);
            }
        }

        if CLOSING_MARKERS.iter().any(|m| trimmed.ends_with(m)) {
            return Ok(block);
        }
    }

    match block {
        Some(open) => Err(ExtractError::Unterminated {
            line: open.first_line,
        }),
        None => Ok(None),
    }
}

/// `$ThemeInfo` followed by something that cannot continue the name.
fn starts_declaration(trimmed: &str) -> bool {
    trimmed
        .strip_prefix(DECLARATION_MARKER)
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
}

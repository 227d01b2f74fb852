//! Theme metadata extraction from about files.
//!
//! An about file carries one declaration of the form:
//!
//! ```php
//! $ThemeInfo['ocean'] = array(
//!    'Name' => 'Ocean',
//!    'Description' => 'Blue and calm.',
//!    'RequiredApplications' => array('Forum' => '2.0'),
//!    'Options' => array(
//!       'Styles' => array('Default' => '%s_default', 'Night' => array('%s_night')),
//!    ),
//! );
//! ```
//!
//! The declaration is located line-wise ([`block`]), tokenized ([`lexer`]) and
//! parsed by a constrained grammar ([`parser`]) into a [`MetaValue`] tree. The
//! file is never executed; anything outside the grammar is an error.

pub mod block;
mod lexer;
pub mod parser;
pub mod value;

pub use block::{DECLARATION_MARKER, DeclarationBlock, find_declaration_block};
pub use parser::MAX_NESTING;
pub use value::{MetaValue, field_key, get_field};

use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Why an about file could not be turned into a declaration.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The marker line was found but no closing line followed.
    #[error("metadata declaration starting on line {line} is never closed")]
    Unterminated { line: usize },

    /// A bracket was closed by the wrong delimiter or never closed.
    #[error("unbalanced brackets at line {line}, column {column}: expected {expected}")]
    Unbalanced {
        line: usize,
        column: usize,
        expected: String,
    },

    /// The declaration uses syntax outside the accepted grammar.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// Arrays nest deeper than [`MAX_NESTING`].
    #[error("arrays nested deeper than {max} levels at line {line}")]
    TooDeep { line: usize, max: usize },

    /// The declaration assigns an empty association list.
    #[error("metadata declaration does not name a theme")]
    Empty,

    /// The declaration names more than one theme.
    #[error("metadata declaration names {} themes ({}); expected exactly one", .keys.len(), .keys.join(", "))]
    Ambiguous { keys: Vec<String> },

    /// The theme's entry is a scalar or list rather than an association list.
    #[error("metadata for '{0}' is not an association list")]
    NotAMap(String),

    /// The about file resolves outside its theme directory.
    #[error("about file resolves to '{resolved}', outside of '{root}'")]
    OutsideRoot { resolved: String, root: String },

    /// The about file could not be read.
    #[error("failed to read about file: {0}")]
    Io(#[from] std::io::Error),
}

/// The single theme declared by an about file.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// The declaration's only top-level key.
    pub identifier: String,
    /// Fields declared for the theme, as written.
    pub fields: BTreeMap<String, MetaValue>,
}

/// Extract the declaration from about-file source text.
///
/// `Ok(None)` means the text carries no declaration at all.
pub fn parse_declaration_source(source: &str) -> Result<Option<Declaration>, ExtractError> {
    let Some(block) = find_declaration_block(source)? else {
        return Ok(None);
    };

    let variable = DECLARATION_MARKER.trim_start_matches('$');
    let parsed = parser::parse_statement(&block.text, variable, block.first_line)?;

    let top = match parsed {
        MetaValue::Map(map) => map,
        MetaValue::List(items) if items.is_empty() => return Err(ExtractError::Empty),
        MetaValue::List(items) => {
            // Positional top level, e.g. `$ThemeInfo = array(array(...))`.
            let keys = (0..items.len()).map(|i| i.to_string()).collect::<Vec<_>>();
            if keys.len() > 1 {
                return Err(ExtractError::Ambiguous { keys });
            }
            return Err(ExtractError::NotAMap("0".to_string()));
        }
        _ => return Err(ExtractError::Empty),
    };

    if top.len() > 1 {
        return Err(ExtractError::Ambiguous {
            keys: top.keys().cloned().collect(),
        });
    }

    let Some((identifier, value)) = top.into_iter().next() else {
        return Err(ExtractError::Empty);
    };

    match value {
        MetaValue::Map(fields) => Ok(Some(Declaration { identifier, fields })),
        // `array()` parses as an empty list; a theme with no fields is fine.
        MetaValue::List(items) if items.is_empty() => Ok(Some(Declaration {
            identifier,
            fields: BTreeMap::new(),
        })),
        _ => Err(ExtractError::NotAMap(identifier)),
    }
}

/// Read `path` and extract its declaration.
pub fn scan_about_file(path: &Path) -> Result<Option<Declaration>, ExtractError> {
    let bytes = std::fs::read(path)?;
    let source = String::from_utf8_lossy(&bytes);
    let declaration = parse_declaration_source(&source)?;
    if let Some(ref d) = declaration {
        log::debug!(
            "Parsed theme declaration '{}' ({} field(s)) from {}",
            d.identifier,
            d.fields.len(),
            path.display()
        );
    }
    Ok(declaration)
}

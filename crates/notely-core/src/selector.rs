//! Compound element selectors
//!
//! Supports a single compound selector: an optional tag name followed by any
//! number of `.class`, `#id`, `[attr]` and `[attr="value"]` parts. Combinators
//! and pseudo-classes are rejected at parse time.

use std::fmt;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

use thiserror::Error;

use crate::dom::Element;

/// Errors produced while parsing a selector
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("selector is empty")]
    Empty,
    #[error("expected a name at position {position}")]
    EmptyName { position: usize },
    #[error("unexpected character {ch:?} at position {position}")]
    UnexpectedChar { position: usize, ch: char },
    #[error("unsupported combinator or pseudo-class {ch:?} at position {position}")]
    Unsupported { position: usize, ch: char },
    #[error("unterminated attribute selector starting at position {position}")]
    UnterminatedAttribute { position: usize },
}

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatcher>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeMatcher {
    name: String,
    value: Option<String>,
}

type Cursor<'a> = Peekable<CharIndices<'a>>;

impl Selector {
    /// Parse a selector such as `.notes-container` or `button[data-note-id]`.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut selector = Self {
            source: trimmed.to_string(),
            tag: None,
            ids: Vec::new(),
            classes: Vec::new(),
            attributes: Vec::new(),
        };
        let mut cursor = trimmed.char_indices().peekable();

        if matches!(cursor.peek(), Some(&(_, ch)) if ch.is_ascii_alphabetic()) {
            selector.tag = Some(take_name(&mut cursor).to_ascii_lowercase());
        }

        while let Some((position, ch)) = cursor.next() {
            match ch {
                '.' => selector.classes.push(expect_name(&mut cursor, position)?),
                '#' => selector.ids.push(expect_name(&mut cursor, position)?),
                '[' => selector
                    .attributes
                    .push(parse_attribute(&mut cursor, position)?),
                ch if ch.is_whitespace() || matches!(ch, '>' | '+' | '~' | ',' | ':') => {
                    return Err(SelectorError::Unsupported { position, ch });
                }
                ch => return Err(SelectorError::UnexpectedChar { position, ch }),
            }
        }

        Ok(selector)
    }

    /// The selector text as it was parsed (outer whitespace trimmed).
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `element` satisfies every part of this selector.
    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if element.tag() != tag {
                return false;
            }
        }

        self.ids
            .iter()
            .all(|id| element.attribute("id") == Some(id.as_str()))
            && self.classes.iter().all(|class| element.has_class(class))
            && self.attributes.iter().all(|matcher| {
                let actual = element.attribute(&matcher.name);
                match &matcher.value {
                    Some(expected) => actual == Some(expected.as_str()),
                    None => actual.is_some(),
                }
            })
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

const fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn take_name(cursor: &mut Cursor<'_>) -> String {
    let mut name = String::new();
    while let Some(&(_, ch)) = cursor.peek() {
        if !is_name_char(ch) {
            break;
        }
        name.push(ch);
        cursor.next();
    }
    name
}

fn expect_name(cursor: &mut Cursor<'_>, position: usize) -> Result<String, SelectorError> {
    let name = take_name(cursor);
    if name.is_empty() {
        Err(SelectorError::EmptyName { position })
    } else {
        Ok(name)
    }
}

fn parse_attribute(cursor: &mut Cursor<'_>, open: usize) -> Result<AttributeMatcher, SelectorError> {
    let name = expect_name(cursor, open)?.to_ascii_lowercase();

    match cursor.next() {
        Some((_, ']')) => Ok(AttributeMatcher { name, value: None }),
        Some((_, '=')) => {
            let value = match cursor.peek() {
                Some(&(_, quote @ ('"' | '\''))) => {
                    cursor.next();
                    let mut value = String::new();
                    loop {
                        match cursor.next() {
                            Some((_, ch)) if ch == quote => break,
                            Some((_, ch)) => value.push(ch),
                            None => {
                                return Err(SelectorError::UnterminatedAttribute { position: open })
                            }
                        }
                    }
                    value
                }
                _ => expect_name(cursor, open)?,
            };

            match cursor.next() {
                Some((_, ']')) => Ok(AttributeMatcher {
                    name,
                    value: Some(value),
                }),
                Some((position, ch)) => Err(SelectorError::UnexpectedChar { position, ch }),
                None => Err(SelectorError::UnterminatedAttribute { position: open }),
            }
        }
        Some((position, ch)) => Err(SelectorError::UnexpectedChar { position, ch }),
        None => Err(SelectorError::UnterminatedAttribute { position: open }),
    }
}

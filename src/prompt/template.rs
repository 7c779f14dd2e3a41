//! Prompt templates with `{product}` and `{n}` slots
//!
//! Slots use single braces; `{{` and `}}` produce literal braces. Both slots
//! must be present, and no other slot names are accepted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CopytuneError, Result};

/// Slot filled with the product name
pub const PRODUCT_SLOT: &str = "product";

/// Slot filled with the requested number of copies
pub const COUNT_SLOT: &str = "n";

/// Template used when neither config nor CLI supplies one
pub const DEFAULT_TEMPLATE: &str =
    "Generate {n} short, catchy marketing copies for {product}.Each copy should be under 20 words.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Literal(String),
    Slot(&'a str),
}

/// A generation prompt with named substitution slots
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Template(String);

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Slot names in order of appearance, duplicates included
    pub fn slots(&self) -> Result<Vec<&str>> {
        Ok(self
            .segments()?
            .into_iter()
            .filter_map(|s| match s {
                Segment::Slot(name) => Some(name),
                Segment::Literal(_) => None,
            })
            .collect())
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.slots().map(|s| s.contains(&name)).unwrap_or(false)
    }

    /// Fill the slots with the product name and count
    pub fn format(&self, product: &str, n: usize) -> Result<String> {
        let segments = self.segments()?;

        for required in [PRODUCT_SLOT, COUNT_SLOT] {
            if !segments.contains(&Segment::Slot(required)) {
                return Err(CopytuneError::Format(format!(
                    "template is missing the {{{}}} slot",
                    required
                )));
            }
        }

        let count = n.to_string();
        let mut out = String::with_capacity(self.0.len() + product.len());
        for segment in segments {
            match segment {
                Segment::Literal(text) => out.push_str(&text),
                Segment::Slot(PRODUCT_SLOT) => out.push_str(product),
                Segment::Slot(COUNT_SLOT) => out.push_str(&count),
                Segment::Slot(other) => {
                    return Err(CopytuneError::Format(format!("unknown slot {{{}}}", other)));
                }
            }
        }

        Ok(out)
    }

    fn segments(&self) -> Result<Vec<Segment<'_>>> {
        let text = self.0.as_str();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|&(_, next)| next) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let start = i + 1;
                    let end = loop {
                        match chars.next() {
                            Some((j, '}')) => break j,
                            Some((_, '{')) | None => {
                                return Err(CopytuneError::Format(format!(
                                    "unclosed '{{' at byte {} in template",
                                    i
                                )));
                            }
                            Some(_) => {}
                        }
                    };
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(&text[start..end]));
                }
                '}' if chars.peek().map(|&(_, next)| next) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(CopytuneError::Format(format!(
                        "single '}}' at byte {} in template",
                        i
                    )));
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(segments)
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Template {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Template {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Template {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

//! Per-primitive `<input>` bindings.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use super::cursor::EventCursor;
use super::numbers::{parse_count, strip_sigil};
use super::vertices::VertexAliases;
use crate::error::{Error, Result};

/// Role of an attribute channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Semantic {
    /// Position
    Vertex,
    Normal,
    Texcoord,
}

impl Semantic {
    pub const ALL: [Semantic; 3] = [Semantic::Vertex, Semantic::Normal, Semantic::Texcoord];

    /// Floats per element in bulk data and in output buffers.
    pub fn stride(self) -> usize {
        match self {
            Semantic::Texcoord => 2,
            Semantic::Vertex | Semantic::Normal => 3,
        }
    }

    /// Position of this semantic in per-semantic arrays.
    pub fn slot(self) -> usize {
        match self {
            Semantic::Vertex => 0,
            Semantic::Normal => 1,
            Semantic::Texcoord => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Semantic::Vertex => "VERTEX",
            Semantic::Normal => "NORMAL",
            Semantic::Texcoord => "TEXCOORD",
        }
    }
}

impl FromStr for Semantic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "VERTEX" => Ok(Semantic::Vertex),
            "NORMAL" => Ok(Semantic::Normal),
            "TEXCOORD" => Ok(Semantic::Texcoord),
            other => Err(Error::UnsupportedSemantic {
                semantic: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<input>` of a primitive block, with its source alias-resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBinding {
    pub offset: usize,
    pub semantic: Semantic,
    pub source: String,
}

/// The bindings of one primitive block, at most one per semantic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSet {
    bindings: Vec<InputBinding>,
    max_offset: Option<usize>,
}

impl InputSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding. A semantic that is already bound keeps its first
    /// binding (extra TEXCOORD sets are ignored), but the ignored input
    /// still widens the index stride.
    pub fn push(&mut self, binding: InputBinding) {
        self.max_offset = self.max_offset.max(Some(binding.offset));
        if self.get(binding.semantic).is_some() {
            tracing::debug!(
                "Ignoring additional {} input bound to '{}'",
                binding.semantic,
                binding.source
            );
            return;
        }
        self.bindings.push(binding);
    }

    pub fn get(&self, semantic: Semantic) -> Option<&InputBinding> {
        self.bindings.iter().find(|b| b.semantic == semantic)
    }

    pub fn has(&self, semantic: Semantic) -> bool {
        self.get(semantic).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputBinding> {
        self.bindings.iter()
    }

    /// Indices per vertex in the raw `<p>` stream: `max offset + 1`.
    pub fn stride(&self) -> usize {
        self.max_offset.map_or(1, |max| max + 1)
    }
}

/// Parse the `<input>` the cursor is on.
pub fn parse_input<R: BufRead>(
    cursor: &EventCursor<R>,
    aliases: &VertexAliases,
) -> Result<InputBinding> {
    let offset = parse_count(cursor.required_attribute("offset")?, "input")?;
    let semantic: Semantic = cursor.required_attribute("semantic")?.parse()?;
    let source = strip_sigil(cursor.required_attribute("source")?);

    Ok(InputBinding {
        offset,
        semantic,
        source: aliases.resolve(source).to_string(),
    })
}

//! `<vertices>` aliases.
//!
//! A `<vertices>` element gives an id to the position source of a mesh; the
//! VERTEX input of a primitive block names that id instead of the source.

use std::collections::HashMap;
use std::io::BufRead;

use super::cursor::EventCursor;
use super::numbers::strip_sigil;
use crate::error::Result;

/// `vertices id -> source id`, one hop only.
#[derive(Debug, Default)]
pub struct VertexAliases {
    aliases: HashMap<String, String>,
}

impl VertexAliases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, vertices_id: String, source_id: String) {
        self.aliases.insert(vertices_id, source_id);
    }

    /// The source behind `id`, or `id` itself when it is not an alias.
    pub fn resolve<'a>(&'a self, id: &'a str) -> &'a str {
        self.aliases.get(id).map_or(id, String::as_str)
    }
}

/// Parse a `<vertices>` element; the cursor must be on its start tag.
///
/// Returns `(vertices id, source id)`. The POSITION input is preferred; any
/// other input is used only when there is no POSITION.
pub fn parse_vertices<R: BufRead>(cursor: &mut EventCursor<R>) -> Result<Option<(String, String)>> {
    let id = cursor.required_attribute("id")?.to_string();
    let mut source: Option<String> = None;

    while let Some(name) = cursor.next_start_within("vertices")? {
        if name != "input" {
            continue;
        }
        let is_position = cursor.attribute("semantic") == Some("POSITION");
        if source.is_none() || is_position {
            source = Some(strip_sigil(cursor.required_attribute("source")?).to_string());
        }
    }

    match source {
        Some(source) => Ok(Some((id, source))),
        None => {
            tracing::warn!("Vertices '{}' has no input, alias not registered", id);
            Ok(None)
        }
    }
}

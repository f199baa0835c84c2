//! `<source>` bulk data.

use std::collections::HashMap;
use std::io::BufRead;

use super::cursor::EventCursor;
use super::numbers::{parse_count, parse_counted_floats};
use crate::error::{Error, Result};

/// A flat float array addressed by id.
///
/// The stride is not stored: consumers read 3 floats per element, or 2 for
/// texture coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkArray {
    pub id: String,
    pub values: Vec<f32>,
}

impl BulkArray {
    /// The `stride` floats of element `index`.
    pub fn element(&self, index: u32, stride: usize) -> Result<&[f32]> {
        let start = index as usize * stride;
        self.values
            .get(start..start + stride)
            .ok_or_else(|| Error::IndexOutOfRange {
                source_id: self.id.clone(),
                index: index as usize,
                len: self.values.len(),
            })
    }
}

/// Every bulk array read so far in the document.
#[derive(Debug, Default)]
pub struct BulkDataStore {
    arrays: HashMap<String, BulkArray>,
}

impl BulkDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, array: BulkArray) {
        if let Some(previous) = self.arrays.insert(array.id.clone(), array) {
            tracing::debug!("Source '{}' redefined, previous data replaced", previous.id);
        }
    }

    /// Look up an array; a missing id is `UnknownSource`.
    pub fn get(&self, id: &str) -> Result<&BulkArray> {
        self.arrays.get(id).ok_or_else(|| Error::UnknownSource { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.arrays.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}

/// Parse a `<source>` element; the cursor must be on its start tag.
///
/// Only `<float_array>` payloads are read. A source without one yields an
/// empty array, which fails later if an index ever reaches into it.
pub fn parse_source<R: BufRead>(cursor: &mut EventCursor<R>) -> Result<BulkArray> {
    let id = cursor.required_attribute("id")?.to_string();
    let mut values = Vec::new();

    while let Some(name) = cursor.next_start_within("source")? {
        if name == "float_array" {
            let declared = parse_count(cursor.required_attribute("count")?, "float_array")?;
            let text = cursor.text_content("float_array")?;
            values = parse_counted_floats(&text, "float_array", Some(&id), declared)?;
        }
    }

    tracing::debug!("Loaded source '{}' ({} values)", id, values.len());
    Ok(BulkArray { id, values })
}

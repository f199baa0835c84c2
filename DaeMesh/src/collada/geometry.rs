//! `<library_geometries>` parsing.
//!
//! Each `<geometry>` gets its own [`MeshBuilder`]. Sources and vertex
//! aliases are registered as they stream by, and every `<polylist>` or
//! `<triangles>` block is consolidated into the builder as soon as its
//! index payload has been read.

use std::io::BufRead;

use super::cursor::EventCursor;
use super::input::{InputSet, parse_input};
use super::numbers::{parse_count, parse_indices};
use super::source::{BulkDataStore, parse_source};
use super::vertices::{VertexAliases, parse_vertices};
use crate::error::{Error, Result};
use crate::mesh::MeshBuilder;

/// Primitive elements that are recognised but not imported.
const SKIPPED_PRIMITIVES: [&str; 5] = ["trifans", "tristrips", "polygons", "lines", "linestrips"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Triangles,
    Polylist,
}

impl PrimitiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Triangles => "triangles",
            Self::Polylist => "polylist",
        }
    }
}

/// One primitive block, read but not yet consolidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveBlock {
    pub kind: PrimitiveKind,
    /// Local material id from the `material` attribute.
    pub material: Option<String>,
    /// `count` attribute, when the element carries one.
    pub declared_count: Option<usize>,
    pub inputs: InputSet,
    /// Corners per polygon (`<vcount>`); `None` means 3 each.
    pub polygon_sizes: Option<Vec<u32>>,
    /// Raw index stream (`<p>`).
    pub indices: Vec<u32>,
}

/// Geometry-scan state shared by every `<library_geometries>` section.
#[derive(Debug, Default)]
pub struct GeometryTables {
    pub sources: BulkDataStore,
    pub aliases: VertexAliases,
    pub builders: Vec<MeshBuilder>,
}

impl GeometryTables {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Parse a `<library_geometries>` section.
pub fn parse_library_geometries<R: BufRead>(
    cursor: &mut EventCursor<R>,
    tables: &mut GeometryTables,
) -> Result<()> {
    while let Some(name) = cursor.next_start_within("library_geometries")? {
        if name == "geometry" {
            let builder = parse_geometry(cursor, tables)?;
            tables.builders.push(builder);
        } else {
            cursor.skip_element(&name)?;
        }
    }
    Ok(())
}

fn parse_geometry<R: BufRead>(
    cursor: &mut EventCursor<R>,
    tables: &mut GeometryTables,
) -> Result<MeshBuilder> {
    let id = cursor.attribute("id").map(str::to_string);
    if id.is_none() {
        tracing::debug!("Geometry without id, importing it unnamed");
    }
    let mut builder = MeshBuilder::new(id);

    while let Some(name) = cursor.next_start_within("geometry")? {
        if name == "mesh" {
            parse_mesh(cursor, tables, &mut builder)?;
        } else {
            if name != "extra" && name != "asset" {
                tracing::warn!(
                    "Geometry '{}': <{}> is not supported, skipping",
                    builder.display_name(),
                    name
                );
            }
            cursor.skip_element(&name)?;
        }
    }

    tracing::debug!(
        "Geometry '{}': {} vertices, {} triangles",
        builder.display_name(),
        builder.vertex_count(),
        builder.triangle_count()
    );
    Ok(builder)
}

fn parse_mesh<R: BufRead>(
    cursor: &mut EventCursor<R>,
    tables: &mut GeometryTables,
    builder: &mut MeshBuilder,
) -> Result<()> {
    while let Some(name) = cursor.next_start_within("mesh")? {
        match name.as_str() {
            "source" => {
                let array = parse_source(cursor)?;
                tables.sources.insert(array);
            }
            "vertices" => {
                if let Some((id, source)) = parse_vertices(cursor)? {
                    tables.aliases.insert(id, source);
                }
            }
            "polylist" => {
                let block = parse_polylist(cursor, &tables.aliases)?;
                builder.add_block(&block, &tables.sources)?;
            }
            "triangles" => {
                let block = parse_triangles(cursor, &tables.aliases)?;
                builder.add_block(&block, &tables.sources)?;
            }
            other => {
                if SKIPPED_PRIMITIVES.contains(&other) {
                    tracing::warn!(
                        "Geometry '{}': <{}> primitives are not supported, skipping",
                        builder.display_name(),
                        other
                    );
                }
                cursor.skip_element(other)?;
            }
        }
    }
    Ok(())
}

/// Parse a `<polylist>`; the cursor must be on its start tag.
///
/// `count` is mandatory and must match the number of `<vcount>` entries;
/// an empty polylist may omit `<vcount>`.
/// Inputs are only read before the index payload starts.
pub fn parse_polylist<R: BufRead>(
    cursor: &mut EventCursor<R>,
    aliases: &VertexAliases,
) -> Result<PrimitiveBlock> {
    let material = cursor.attribute("material").map(str::to_string);
    let count = parse_count(cursor.required_attribute("count")?, "polylist")?;

    let mut inputs = InputSet::new();
    let mut polygon_sizes: Option<Vec<u32>> = None;
    let mut indices: Option<Vec<u32>> = None;

    while let Some(name) = cursor.next_start_within("polylist")? {
        match name.as_str() {
            "input" if polygon_sizes.is_none() && indices.is_none() => {
                inputs.push(parse_input(cursor, aliases)?);
            }
            "input" => {
                tracing::debug!("Ignoring <input> after polylist index data");
            }
            "vcount" => {
                let sizes = parse_indices(&cursor.text_content("vcount")?, "vcount")?;
                if sizes.len() != count {
                    return Err(Error::count_mismatch("vcount", None, count, sizes.len()));
                }
                polygon_sizes = Some(sizes);
            }
            "p" => {
                indices = Some(parse_indices(&cursor.text_content("p")?, "p")?);
            }
            other => cursor.skip_element(other)?,
        }
    }

    let polygon_sizes = match polygon_sizes {
        Some(sizes) => sizes,
        None if count == 0 => Vec::new(),
        None => return Err(Error::count_mismatch("vcount", None, count, 0)),
    };

    Ok(PrimitiveBlock {
        kind: PrimitiveKind::Polylist,
        material,
        declared_count: Some(count),
        inputs,
        polygon_sizes: Some(polygon_sizes),
        indices: indices.unwrap_or_default(),
    })
}

/// Parse a `<triangles>`; the cursor must be on its start tag.
pub fn parse_triangles<R: BufRead>(
    cursor: &mut EventCursor<R>,
    aliases: &VertexAliases,
) -> Result<PrimitiveBlock> {
    let material = cursor.attribute("material").map(str::to_string);
    let declared_count = cursor
        .attribute("count")
        .map(|count| parse_count(count, "triangles"))
        .transpose()?;

    let mut inputs = InputSet::new();
    let mut indices: Option<Vec<u32>> = None;

    while let Some(name) = cursor.next_start_within("triangles")? {
        match name.as_str() {
            "input" if indices.is_none() => inputs.push(parse_input(cursor, aliases)?),
            "input" => tracing::debug!("Ignoring <input> after triangles index data"),
            "p" => indices = Some(parse_indices(&cursor.text_content("p")?, "p")?),
            other => cursor.skip_element(other)?,
        }
    }

    Ok(PrimitiveBlock {
        kind: PrimitiveKind::Triangles,
        material,
        declared_count,
        inputs,
        polygon_sizes: None,
        indices: indices.unwrap_or_default(),
    })
}

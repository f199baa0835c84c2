//! Vertex consolidation for one geometry.
//!
//! Every stride of a primitive block's raw index stream is a composite key
//! holding one raw index per bound semantic. Keys are mapped to dense
//! indices in first-seen order; a new key appends its attribute slices to
//! the flat output buffers.
//!
//! All three attribute buffers always hold one element per dense vertex.
//! Semantics a block leaves unbound are zero-filled, and normals of blocks
//! without NORMAL input are synthesized per triangle afterwards.

use std::collections::HashMap;

use glam::Vec3;

use super::triangulate::{face_normal, triangulate_polygon};
use crate::collada::geometry::{PrimitiveBlock, PrimitiveKind};
use crate::collada::input::Semantic;
use crate::collada::source::{BulkArray, BulkDataStore};
use crate::error::{Error, Result};

/// One raw index per semantic, indexed by [`Semantic::slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositeVertexKey([Option<u32>; 3]);

impl CompositeVertexKey {
    pub fn raw_index(&self, semantic: Semantic) -> Option<u32> {
        self.0[semantic.slot()]
    }
}

/// Contiguous triangle-index range bound to one local material id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialSpan {
    pub material: Option<String>,
    /// First entry in the triangle index buffer.
    pub offset: usize,
    /// Number of entries (a multiple of 3).
    pub count: usize,
}

/// Buffers handed over by a finished builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuilderOutput {
    pub name: Option<String>,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    /// Empty when no block bound TEXCOORD.
    pub texcoords: Vec<f32>,
    pub indices: Vec<u32>,
    pub spans: Vec<MaterialSpan>,
}

/// Accumulates consolidated vertices and triangles for one `<geometry>`.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    name: Option<String>,
    vertex_map: HashMap<CompositeVertexKey, u32>,
    next_index: u32,
    attributes: [Vec<f32>; 3],
    has_texcoords: bool,
    triangle_indices: Vec<u32>,
    material_spans: Vec<MaterialSpan>,
}

impl MeshBuilder {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name for log messages.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    pub fn vertex_count(&self) -> usize {
        self.next_index as usize
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_indices.is_empty()
    }

    pub fn attribute(&self, semantic: Semantic) -> &[f32] {
        &self.attributes[semantic.slot()]
    }

    pub fn triangle_indices(&self) -> &[u32] {
        &self.triangle_indices
    }

    pub fn material_spans(&self) -> &[MaterialSpan] {
        &self.material_spans
    }

    /// Dense index of `key`, inserting it (and its attribute data) on a miss.
    pub fn insert_vertex(
        &mut self,
        key: CompositeVertexKey,
        arrays: &[Option<&BulkArray>; 3],
    ) -> Result<u32> {
        if let Some(&index) = self.vertex_map.get(&key) {
            return Ok(index);
        }

        for semantic in Semantic::ALL {
            let stride = semantic.stride();
            let buffer = &mut self.attributes[semantic.slot()];
            match (key.raw_index(semantic), arrays[semantic.slot()]) {
                (Some(raw), Some(array)) => buffer.extend_from_slice(array.element(raw, stride)?),
                _ => buffer.resize(buffer.len() + stride, 0.0),
            }
        }

        let index = self.next_index;
        self.next_index += 1;
        self.vertex_map.insert(key, index);
        Ok(index)
    }

    /// Consolidate, triangulate and record one primitive block.
    pub fn add_block(&mut self, block: &PrimitiveBlock, store: &BulkDataStore) -> Result<()> {
        if !block.inputs.has(Semantic::Vertex) {
            tracing::warn!(
                "Geometry '{}': <{}> has no VERTEX input, skipping",
                self.display_name(),
                block.kind.as_str()
            );
            return Ok(());
        }

        let mut arrays: [Option<&BulkArray>; 3] = [None; 3];
        for binding in block.inputs.iter() {
            arrays[binding.semantic.slot()] = Some(store.get(&binding.source)?);
        }

        let stride = block.inputs.stride();
        if block.indices.len() % stride != 0 {
            return Err(Error::count_mismatch(
                "p",
                self.name(),
                block.indices.len().div_ceil(stride) * stride,
                block.indices.len(),
            ));
        }
        let corner_count = block.indices.len() / stride;
        self.check_polygon_counts(block, corner_count)?;

        let mut dense = Vec::with_capacity(corner_count);
        for raw in block.indices.chunks_exact(stride) {
            let mut key = [None; 3];
            for binding in block.inputs.iter() {
                key[binding.semantic.slot()] = Some(raw[binding.offset]);
            }
            dense.push(self.insert_vertex(CompositeVertexKey(key), &arrays)?);
        }

        if block.inputs.has(Semantic::Texcoord) {
            self.has_texcoords = true;
        }

        let offset = self.triangle_indices.len();
        let synthesize = !block.inputs.has(Semantic::Normal);
        let mut start = 0;
        for size in polygon_sizes(block, corner_count) {
            let polygon = &dense[start..start + size];
            start += size;
            if size < 3 {
                tracing::warn!(
                    "Geometry '{}': skipping polygon with {} vertices",
                    self.display_name(),
                    size
                );
                continue;
            }
            self.append_polygon(polygon, synthesize);
        }

        let count = self.triangle_indices.len() - offset;
        if count == 0 {
            tracing::debug!("Geometry '{}': block produced no triangles", self.display_name());
            return Ok(());
        }
        self.material_spans.push(MaterialSpan {
            material: block.material.clone(),
            offset,
            count,
        });
        Ok(())
    }

    fn check_polygon_counts(&self, block: &PrimitiveBlock, corner_count: usize) -> Result<()> {
        match (&block.polygon_sizes, block.kind) {
            (Some(sizes), _) => {
                let total: usize = sizes.iter().map(|&size| size as usize).sum();
                if total != corner_count {
                    return Err(Error::count_mismatch("vcount", self.name(), corner_count, total));
                }
            }
            (None, PrimitiveKind::Triangles) => {
                if corner_count % 3 != 0 {
                    return Err(Error::count_mismatch(
                        "p",
                        self.name(),
                        corner_count.div_ceil(3) * 3,
                        corner_count,
                    ));
                }
                let triangles = corner_count / 3;
                if let Some(declared) = block.declared_count.filter(|&declared| declared != triangles) {
                    return Err(Error::count_mismatch("triangles", self.name(), declared, triangles));
                }
            }
            (None, PrimitiveKind::Polylist) => {}
        }
        Ok(())
    }

    fn position(&self, index: u32) -> Vec3 {
        let start = index as usize * 3;
        Vec3::from_slice(&self.attributes[Semantic::Vertex.slot()][start..start + 3])
    }

    fn append_polygon(&mut self, polygon: &[u32], synthesize_normals: bool) {
        let corners: Vec<Vec3> = polygon.iter().map(|&index| self.position(index)).collect();

        for [a, b, c] in triangulate_polygon(&corners) {
            let triangle = [polygon[a], polygon[b], polygon[c]];
            self.triangle_indices.extend_from_slice(&triangle);

            if synthesize_normals {
                let normal = face_normal(corners[a], corners[b], corners[c]);
                let normals = &mut self.attributes[Semantic::Normal.slot()];
                for index in triangle {
                    let start = index as usize * 3;
                    normal.write_to_slice(&mut normals[start..start + 3]);
                }
            }
        }
    }

    /// Hand the buffers over; the builder is consumed.
    pub fn finish(self) -> BuilderOutput {
        let [positions, normals, texcoords] = self.attributes;
        BuilderOutput {
            name: self.name,
            positions,
            normals,
            texcoords: if self.has_texcoords { texcoords } else { Vec::new() },
            indices: self.triangle_indices,
            spans: self.material_spans,
        }
    }
}

/// Corner counts of the polygons in a block.
fn polygon_sizes(block: &PrimitiveBlock, corner_count: usize) -> Vec<usize> {
    match &block.polygon_sizes {
        Some(sizes) => sizes.iter().map(|&size| size as usize).collect(),
        None => vec![3; corner_count / 3],
    }
}

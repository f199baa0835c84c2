//! Finished, renderer-ready mesh types.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::material::MaterialDefinition;

/// Range of a mesh's index buffer drawn with one material.
#[derive(Debug, Clone, PartialEq)]
pub struct SubMesh {
    /// `None` when the material reference could not be resolved.
    pub material: Option<Arc<MaterialDefinition>>,
    pub offset: usize,
    pub count: usize,
}

impl SubMesh {
    pub fn triangle_count(&self) -> usize {
        self.count / 3
    }
}

/// Consolidated geometry with flat attribute buffers.
///
/// `positions` and `normals` hold 3 floats per vertex, `texcoords` 2 (or
/// nothing when the geometry has no texture coordinates). `indices` holds
/// 3 entries per triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: Option<String>,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub texcoords: Vec<f32>,
    pub indices: Vec<u32>,
    pub sub_meshes: Vec<SubMesh>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn has_texcoords(&self) -> bool {
        !self.texcoords.is_empty()
    }

    /// The triangle indices drawn by `sub_mesh`.
    pub fn sub_mesh_indices(&self, sub_mesh: &SubMesh) -> &[u32] {
        self.indices
            .get(sub_mesh.offset..sub_mesh.offset + sub_mesh.count)
            .unwrap_or_default()
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    pub fn texcoord_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texcoords)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Wrapper the scene graph instantiates; one per imported geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Representation {
    pub name: Option<String>,
    pub meshes: Vec<Mesh>,
}

impl Representation {
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

/// A representation placed under the scene root.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub reference: Representation,
}

/// Result of importing one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneRoot {
    /// `version` attribute of the `<COLLADA>` root.
    pub version: String,
    pub instances: Vec<Instance>,
}

impl SceneRoot {
    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.instances
            .iter()
            .flat_map(|instance| instance.reference.meshes.iter())
    }

    /// Distinct materials bound by any sub-mesh, in first-use order.
    pub fn materials(&self) -> Vec<Arc<MaterialDefinition>> {
        let mut materials: Vec<Arc<MaterialDefinition>> = Vec::new();
        for material in self
            .meshes()
            .flat_map(|mesh| mesh.sub_meshes.iter())
            .filter_map(|sub_mesh| sub_mesh.material.as_ref())
        {
            if !materials.iter().any(|known| Arc::ptr_eq(known, material)) {
                materials.push(Arc::clone(material));
            }
        }
        materials
    }

    /// Find a mesh by geometry id.
    pub fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes().find(|mesh| mesh.name.as_deref() == Some(name))
    }

    pub fn total_vertices(&self) -> usize {
        self.meshes().map(Mesh::vertex_count).sum()
    }

    pub fn total_triangles(&self) -> usize {
        self.meshes().map(Mesh::triangle_count).sum()
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            version: self.version.clone(),
            total_vertices: self.total_vertices(),
            total_triangles: self.total_triangles(),
            meshes: self.meshes().map(MeshSummary::from_mesh).collect(),
            materials: self.materials().iter().map(|material| (**material).clone()).collect(),
        }
    }

    /// Pretty-printed JSON of [`SceneRoot::summary`].
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.summary())?)
    }
}

// ============================================================================
// Summary Types
// ============================================================================

/// Serializable overview of an imported scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSummary {
    pub version: String,
    pub total_vertices: usize,
    pub total_triangles: usize,
    pub meshes: Vec<MeshSummary>,
    pub materials: Vec<MaterialDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshSummary {
    pub name: Option<String>,
    pub vertices: usize,
    pub triangles: usize,
    pub has_texcoords: bool,
    pub sub_meshes: Vec<SubMeshSummary>,
}

impl MeshSummary {
    fn from_mesh(mesh: &Mesh) -> Self {
        Self {
            name: mesh.name.clone(),
            vertices: mesh.vertex_count(),
            triangles: mesh.triangle_count(),
            has_texcoords: mesh.has_texcoords(),
            sub_meshes: mesh
                .sub_meshes
                .iter()
                .map(|sub_mesh| SubMeshSummary {
                    material: sub_mesh.material.as_ref().map(|material| material.name.clone()),
                    texture: sub_mesh
                        .material
                        .as_ref()
                        .and_then(|material| material.texture.as_ref())
                        .map(|texture| texture.path.clone()),
                    triangles: sub_mesh.triangle_count(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubMeshSummary {
    pub material: Option<String>,
    pub texture: Option<PathBuf>,
    pub triangles: usize,
}

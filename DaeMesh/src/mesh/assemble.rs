//! Final assembly: builders become meshes, representations and instances.

use crate::material::MaterialLibrary;

use super::builder::MeshBuilder;
use super::types::{Instance, Mesh, Representation, SceneRoot, SubMesh};

/// Turn one finished builder into a mesh, binding each material span.
///
/// Spans whose local material id does not resolve get `None`.
pub fn assemble_mesh(builder: MeshBuilder, library: &MaterialLibrary) -> Mesh {
    let output = builder.finish();
    let display_name = output.name.as_deref().unwrap_or("<unnamed>");

    let sub_meshes = output
        .spans
        .iter()
        .map(|span| {
            let material = span.material.as_deref().and_then(|local_id| {
                let material = library.lookup(local_id);
                if material.is_none() {
                    tracing::warn!(
                        "Geometry '{}': material '{}' could not be resolved, sub-mesh left unbound",
                        display_name,
                        local_id
                    );
                }
                material
            });
            SubMesh {
                material,
                offset: span.offset,
                count: span.count,
            }
        })
        .collect();

    Mesh {
        name: output.name,
        positions: output.positions,
        normals: output.normals,
        texcoords: output.texcoords,
        indices: output.indices,
        sub_meshes,
    }
}

/// Assemble every geometry of a document under a new scene root.
///
/// Each geometry gets its own representation and instance. Unless
/// `keep_empty_meshes` is set, meshes without triangles are dropped and a
/// representation left empty is not instantiated.
pub fn assemble_scene(
    version: String,
    builders: Vec<MeshBuilder>,
    library: &MaterialLibrary,
    keep_empty_meshes: bool,
) -> SceneRoot {
    let mut root = SceneRoot {
        version,
        instances: Vec::with_capacity(builders.len()),
    };

    for builder in builders {
        let mesh = assemble_mesh(builder, library);
        let mut representation = Representation {
            name: mesh.name.clone(),
            meshes: Vec::new(),
        };

        if mesh.is_empty() && !keep_empty_meshes {
            tracing::debug!(
                "Dropping empty mesh '{}'",
                mesh.name.as_deref().unwrap_or("<unnamed>")
            );
        } else {
            representation.meshes.push(mesh);
        }

        if !representation.is_empty() {
            root.instances.push(Instance {
                reference: representation,
            });
        }
    }

    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collada::geometry::{PrimitiveBlock, PrimitiveKind};
    use crate::collada::input::{InputBinding, InputSet, Semantic};
    use crate::collada::source::{BulkArray, BulkDataStore};
    use crate::material::{MaterialDefinition, MaterialTables};
    use crate::material::resolver::LinkSettings;
    use std::path::Path;
    use std::sync::Arc;

    fn library() -> MaterialLibrary {
        let mut tables = MaterialTables::new();
        tables.effects.insert("Red-effect".to_string(), MaterialDefinition::new("Red-effect"));
        tables.material_effects.insert("Red-material".to_string(), "Red-effect".to_string());
        tables.link(&LinkSettings {
            resolve_textures: false,
            check_texture_files: false,
            texture_root: Path::new("."),
        })
    }

    fn triangle_builder(material: &str) -> MeshBuilder {
        let mut store = BulkDataStore::new();
        store.insert(BulkArray {
            id: "P".to_string(),
            values: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        });
        let mut inputs = InputSet::new();
        inputs.push(InputBinding {
            offset: 0,
            semantic: Semantic::Vertex,
            source: "P".to_string(),
        });
        let mut builder = MeshBuilder::new(Some("Tri-mesh".to_string()));
        for _ in 0..2 {
            builder
                .add_block(
                    &PrimitiveBlock {
                        kind: PrimitiveKind::Triangles,
                        material: Some(material.to_string()),
                        declared_count: Some(1),
                        inputs: inputs.clone(),
                        polygon_sizes: None,
                        indices: vec![0, 1, 2],
                    },
                    &store,
                )
                .unwrap();
        }
        builder
    }

    #[test]
    fn test_sub_meshes_share_material() {
        let mesh = assemble_mesh(triangle_builder("Red-material"), &library());
        assert_eq!(mesh.sub_meshes.len(), 2);
        let first = mesh.sub_meshes[0].material.as_ref().unwrap();
        let second = mesh.sub_meshes[1].material.as_ref().unwrap();
        assert!(Arc::ptr_eq(first, second));
        assert_eq!(mesh.sub_mesh_indices(&mesh.sub_meshes[1]), &[0_u32, 1, 2]);
    }

    #[test]
    fn test_unresolved_material_is_none() {
        let mesh = assemble_mesh(triangle_builder("Missing-material"), &library());
        assert!(mesh.sub_meshes.iter().all(|sub_mesh| sub_mesh.material.is_none()));
    }

    #[test]
    fn test_empty_meshes() {
        let builders = || vec![triangle_builder("Red-material"), MeshBuilder::new(Some("Empty".to_string()))];

        let root = assemble_scene("1.4.1".to_string(), builders(), &library(), false);
        assert_eq!(root.instances.len(), 1);

        let root = assemble_scene("1.4.1".to_string(), builders(), &library(), true);
        assert_eq!(root.instances.len(), 2);
        assert!(root.mesh("Empty").unwrap().is_empty());
    }
}

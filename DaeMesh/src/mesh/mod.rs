//! Mesh consolidation, triangulation and assembly.

pub mod assemble;
pub mod builder;
pub mod triangulate;
pub mod types;

pub use assemble::assemble_scene;
pub use builder::{BuilderOutput, CompositeVertexKey, MaterialSpan, MeshBuilder};
pub use triangulate::{face_normal, triangulate_polygon};
pub use types::{Instance, Mesh, MeshSummary, Representation, SceneRoot, SceneSummary, SubMesh, SubMeshSummary};

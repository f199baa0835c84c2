//! # DaeMesh
//!
//! A streaming COLLADA (`.dae`) importer that turns images, materials,
//! effects and polygonal geometry into indexed, renderer-ready meshes.
//!
//! ## Pipeline
//!
//! - **Scan** - one forward pass over the XML event stream. Float sources
//!   are collected by id, `<polylist>`/`<triangles>` blocks are consolidated
//!   into per-geometry builders as they arrive (composite-vertex dedup,
//!   ear-cut triangulation, flat normals where the document has none).
//! - **Link** - material -> effect and sampler -> surface -> image -> file
//!   chains are resolved once the whole document is known.
//! - **Assemble** - each geometry becomes a [`Mesh`](mesh::Mesh) with one
//!   sub-mesh per material span, wrapped in a representation and instanced
//!   under the [`SceneRoot`](mesh::SceneRoot).
//!
//! ## Quick Start
//!
//! ```no_run
//! use daemesh::import_file;
//!
//! let scene = import_file("models/house.dae")?;
//! for mesh in scene.meshes() {
//!     println!(
//!         "{}: {} vertices, {} triangles",
//!         mesh.name.as_deref().unwrap_or("<unnamed>"),
//!         mesh.vertex_count(),
//!         mesh.triangle_count()
//!     );
//! }
//! # Ok::<(), daemesh::Error>(())
//! ```
//!
//! ### Using the Prelude
//!
//! ```
//! use daemesh::prelude::*;
//!
//! let xml = r#"<COLLADA version="1.4.1"></COLLADA>"#;
//! let scene = import_document(xml.as_bytes(), "empty.dae")?;
//! assert_eq!(scene.version, "1.4.1");
//! # Ok::<(), daemesh::Error>(())
//! ```

pub mod collada;
pub mod error;
pub mod importer;
pub mod material;
pub mod mesh;

// Re-exports for convenience
pub use error::{Error, Result};
pub use importer::{
    ColladaImporter, ImportOptions, ImportPhase, ImportProgress, ImportProgressCallback,
    import_document, import_file,
};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::importer::{
        ColladaImporter, ImportOptions, ImportPhase, ImportProgress, ImportProgressCallback,
        import_document, import_file,
    };
    pub use crate::material::{Color, ColorChannel, MaterialDefinition, ShadingModel, Texture};
    pub use crate::mesh::{Instance, Mesh, Representation, SceneRoot, SceneSummary, SubMesh};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

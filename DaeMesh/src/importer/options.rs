//! Import options
//!
//! Controls how much of the deferred linking runs and what happens to
//! geometry that ends up empty.

use std::path::PathBuf;

/// Options for importing a COLLADA document.
///
/// # Example
///
/// ```
/// use daemesh::ImportOptions;
///
/// let options = ImportOptions::new()
///     .with_texture_root("assets/textures")
///     .with_check_texture_files(false);
/// assert!(options.resolve_textures);
/// ```
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Follow `sampler -> surface -> image -> file` and attach textures.
    /// Default: true
    pub resolve_textures: bool,

    /// Only attach a texture when its file exists on disk.
    /// Default: true
    pub check_texture_files: bool,

    /// Directory relative image paths are resolved against.
    /// If None, the directory of the document is used.
    pub texture_root: Option<PathBuf>,

    /// Keep meshes that end up with no triangles.
    /// Default: false (empty meshes and their instances are dropped)
    pub keep_empty_meshes: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportOptions {
    /// Create options with texture resolution on and empty meshes dropped.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolve_textures: true,
            check_texture_files: true,
            texture_root: None,
            keep_empty_meshes: false,
        }
    }

    /// Geometry only: no texture chain is followed.
    #[must_use]
    pub fn geometry_only() -> Self {
        Self::new().with_resolve_textures(false)
    }

    #[must_use]
    pub fn with_resolve_textures(mut self, value: bool) -> Self {
        self.resolve_textures = value;
        self
    }

    #[must_use]
    pub fn with_check_texture_files(mut self, value: bool) -> Self {
        self.check_texture_files = value;
        self
    }

    #[must_use]
    pub fn with_texture_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.texture_root = Some(root.into());
        self
    }

    #[must_use]
    pub fn with_keep_empty_meshes(mut self, value: bool) -> Self {
        self.keep_empty_meshes = value;
        self
    }
}

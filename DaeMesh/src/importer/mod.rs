//! COLLADA import driver
//!
//! Runs the two import phases over a streamed document:
//!
//! 1. a single forward scan that registers sources, consolidates geometry
//!    and fills the material tables;
//! 2. deferred linking of materials and textures, then mesh assembly.
//!
//! Any structural error aborts the import and is returned wrapped in
//! [`Error::Document`] with the document name. Nothing partial is kept.

mod options;
mod session;
mod types;

pub use options::ImportOptions;
pub use types::{ImportPhase, ImportProgress, ImportProgressCallback};

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use crate::collada::EventCursor;
use crate::error::{Error, Result};
use crate::material::resolver::LinkSettings;
use crate::mesh::{SceneRoot, assemble_scene};
use session::{ImportSession, LIBRARY_SECTIONS};

const TOTAL_STEPS: usize = 5;

/// Import a COLLADA document from any buffered reader with default options.
///
/// `origin_path` names the document: relative texture paths are resolved
/// against its directory and errors carry its file name.
pub fn import_document<R: BufRead>(reader: R, origin_path: impl AsRef<Path>) -> Result<SceneRoot> {
    ColladaImporter::default().import_document(reader, origin_path)
}

/// Open and import a COLLADA file with default options.
pub fn import_file(path: impl AsRef<Path>) -> Result<SceneRoot> {
    ColladaImporter::default().import_file(path)
}

/// Configured importer.
///
/// # Example
///
/// ```no_run
/// use daemesh::{ColladaImporter, ImportOptions};
///
/// let report = |progress: &daemesh::ImportProgress| {
///     println!("{} ({:.0}%)", progress.phase.as_str(), progress.percentage() * 100.0);
/// };
/// let scene = ColladaImporter::new(ImportOptions::new().with_keep_empty_meshes(true))
///     .with_progress(&report)
///     .import_file("models/house.dae")?;
/// println!("{} meshes", scene.meshes().count());
/// # Ok::<(), daemesh::Error>(())
/// ```
#[derive(Default)]
pub struct ColladaImporter<'a> {
    options: ImportOptions,
    progress: Option<ImportProgressCallback<'a>>,
}

impl<'a> ColladaImporter<'a> {
    #[must_use]
    pub fn new(options: ImportOptions) -> Self {
        Self {
            options,
            progress: None,
        }
    }

    /// Report progress through `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: ImportProgressCallback<'a>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Open and import a COLLADA file.
    ///
    /// # Errors
    /// `FileNotFound` or `FileUnreadable` if the file cannot be opened,
    /// otherwise any parsing error wrapped in [`Error::Document`].
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<SceneRoot> {
        let path = path.as_ref();
        self.report(&ImportProgress::with_item(
            ImportPhase::Opening,
            1,
            TOTAL_STEPS,
            path.display().to_string(),
        ));

        let file = File::open(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                Error::FileUnreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        self.import_reader(BufReader::new(file), path)
    }

    /// Import a document from a buffered reader.
    ///
    /// The reader is streamed; the document is never held in memory whole.
    pub fn import_document<R: BufRead>(&self, reader: R, origin_path: impl AsRef<Path>) -> Result<SceneRoot> {
        let origin_path = origin_path.as_ref();
        self.report(&ImportProgress::with_item(
            ImportPhase::Opening,
            1,
            TOTAL_STEPS,
            origin_path.display().to_string(),
        ));
        self.import_reader(reader, origin_path)
    }

    fn import_reader<R: BufRead>(&self, reader: R, origin_path: &Path) -> Result<SceneRoot> {
        tracing::info!("Importing COLLADA document {}", origin_path.display());

        let root = self.run(reader, origin_path).map_err(|source| Error::Document {
            document: document_name(origin_path),
            source: Box::new(source),
        })?;

        tracing::info!(
            "Imported {}: {} meshes, {} vertices, {} triangles",
            origin_path.display(),
            root.meshes().count(),
            root.total_vertices(),
            root.total_triangles()
        );
        Ok(root)
    }

    fn run<R: BufRead>(&self, reader: R, origin_path: &Path) -> Result<SceneRoot> {
        let mut cursor = EventCursor::new(reader);
        let session = ImportSession::scan(&mut cursor, &|section, ordinal| {
            let total = ordinal.max(LIBRARY_SECTIONS.len());
            self.report(&ImportProgress::with_item(ImportPhase::Scanning, ordinal, total, section));
        })?;

        self.report(&ImportProgress::with_item(
            ImportPhase::LinkingTextures,
            3,
            TOTAL_STEPS,
            format!("{} materials", session.materials.material_effects.len()),
        ));
        let texture_root = self.texture_root(origin_path)?;
        let library = session.materials.link(&LinkSettings {
            resolve_textures: self.options.resolve_textures,
            check_texture_files: self.options.check_texture_files,
            texture_root: &texture_root,
        });

        self.report(&ImportProgress::with_item(
            ImportPhase::AssemblingMeshes,
            4,
            TOTAL_STEPS,
            format!("{} geometries", session.geometry.builders.len()),
        ));
        let root = assemble_scene(
            session.version,
            session.geometry.builders,
            &library,
            self.options.keep_empty_meshes,
        );

        self.report(&ImportProgress::new(ImportPhase::Complete, TOTAL_STEPS, TOTAL_STEPS));
        Ok(root)
    }

    /// Configured texture root, else the document's directory, made absolute
    /// against the working directory.
    fn texture_root(&self, origin_path: &Path) -> Result<PathBuf> {
        let base = match (&self.options.texture_root, origin_path.parent()) {
            (Some(root), _) => root.clone(),
            (None, Some(parent)) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            (None, _) => return Ok(std::env::current_dir()?),
        };
        Ok(std::path::absolute(base)?)
    }

    fn report(&self, progress: &ImportProgress) {
        if let Some(callback) = self.progress {
            callback(progress);
        }
    }
}

fn document_name(origin_path: &Path) -> String {
    origin_path.file_name().map_or_else(
        || origin_path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

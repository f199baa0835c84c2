//! Deferred material and texture linking.
//!
//! The document scan only fills [`MaterialTables`]. Once the whole document
//! has been read, [`MaterialTables::link`] resolves
//! `material -> effect` and `sampler -> surface -> image -> file` with plain
//! lookups, so libraries may appear in any order. Broken links are logged
//! and leave the material untextured (or unbound); they never fail the
//! import.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use super::{MaterialDefinition, Texture, TextureRef};

/// What a `<sampler2D>` points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamplerSource {
    /// COLLADA 1.4: `<source>` naming a surface sid.
    Surface(String),
    /// COLLADA 1.5: `<instance_image url>` naming an image id.
    Image(String),
}

/// `newparam` declarations of one effect, keyed by sid.
#[derive(Debug, Clone, Default)]
pub struct EffectParams {
    /// surface sid -> image id
    pub surfaces: HashMap<String, String>,
    pub samplers: HashMap<String, SamplerSource>,
}

/// Raw tables accumulated during the document scan.
#[derive(Debug, Default)]
pub struct MaterialTables {
    /// image id -> file name as written in `<init_from>`
    pub images: HashMap<String, String>,
    /// material id -> effect id
    pub material_effects: IndexMap<String, String>,
    /// effect id -> definition
    pub effects: IndexMap<String, MaterialDefinition>,
    /// effect id -> sampler/surface params
    pub params: HashMap<String, EffectParams>,
    /// `instance_material` symbol -> material id
    pub symbols: HashMap<String, String>,
}

/// The first broken link of a texture chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingLink {
    Sampler(String),
    Surface(String),
    Image(String),
    File(PathBuf),
}

impl fmt::Display for MissingLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sampler(sid) => write!(f, "sampler '{sid}' not found"),
            Self::Surface(sid) => write!(f, "surface '{sid}' not found"),
            Self::Image(id) => write!(f, "image '{id}' not found"),
            Self::File(path) => write!(f, "texture file {} does not exist", path.display()),
        }
    }
}

/// How the texture chain is run.
#[derive(Debug, Clone, Copy)]
pub struct LinkSettings<'a> {
    pub resolve_textures: bool,
    pub check_texture_files: bool,
    /// Directory relative image paths are joined to.
    pub texture_root: &'a Path,
}

impl MaterialTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an image; an empty file name is not recorded.
    pub fn insert_image(&mut self, id: String, file_name: String) {
        if file_name.is_empty() {
            tracing::debug!("Image '{}' has no file name, ignoring", id);
            return;
        }
        self.images.insert(id, file_name);
    }

    /// Record a symbol binding. The first binding of a symbol wins.
    pub fn insert_symbol(&mut self, symbol: String, material_id: String) {
        match self.symbols.get(&symbol) {
            Some(existing) if existing != &material_id => {
                tracing::debug!(
                    "Symbol '{}' already bound to '{}', ignoring '{}'",
                    symbol,
                    existing,
                    material_id
                );
            }
            Some(_) => {}
            None => {
                self.symbols.insert(symbol, material_id);
            }
        }
    }

    /// Follow `sampler -> surface -> image -> file name` for one effect.
    pub fn texture_file(&self, effect_id: &str, texture_ref: &TextureRef) -> Result<(String, &str), MissingLink> {
        let params = self.params.get(effect_id);
        let image_id = match params.and_then(|params| params.samplers.get(&texture_ref.sampler)) {
            Some(SamplerSource::Image(image_id)) => image_id.as_str(),
            Some(SamplerSource::Surface(surface)) => params
                .and_then(|params| params.surfaces.get(surface))
                .map(String::as_str)
                .ok_or_else(|| MissingLink::Surface(surface.clone()))?,
            // Some exporters point `texture` straight at an image
            None if self.images.contains_key(&texture_ref.sampler) => texture_ref.sampler.as_str(),
            None => return Err(MissingLink::Sampler(texture_ref.sampler.clone())),
        };

        self.images
            .get(image_id)
            .map(|file| (image_id.to_string(), file.as_str()))
            .ok_or_else(|| MissingLink::Image(image_id.to_string()))
    }

    fn resolve_texture(
        &self,
        effect_id: &str,
        texture_ref: &TextureRef,
        settings: &LinkSettings<'_>,
    ) -> Result<Texture, MissingLink> {
        let (image_id, file) = self.texture_file(effect_id, texture_ref)?;
        let path = resolve_image_path(file, settings.texture_root);
        if settings.check_texture_files && !path.is_file() {
            return Err(MissingLink::File(path));
        }
        Ok(Texture {
            image_id,
            path,
            channel: texture_ref.channel,
        })
    }

    /// Phase two: resolve every chain and share the definitions.
    pub fn link(self, settings: &LinkSettings<'_>) -> MaterialLibrary {
        let mut effects: HashMap<String, Arc<MaterialDefinition>> = HashMap::new();

        for (effect_id, definition) in &self.effects {
            let mut definition = definition.clone();
            if settings.resolve_textures {
                if let Some(texture_ref) = &definition.texture_ref {
                    match self.resolve_texture(effect_id, texture_ref, settings) {
                        Ok(texture) => {
                            tracing::debug!("Effect '{}': texture {}", effect_id, texture.path.display());
                            definition.texture = Some(texture);
                        }
                        Err(link) => {
                            tracing::warn!("Effect '{}': texture not attached, {}", effect_id, link);
                        }
                    }
                }
            }
            effects.insert(effect_id.clone(), Arc::new(definition));
        }

        let mut materials = HashMap::new();
        for (material_id, effect_id) in &self.material_effects {
            match effects.get(effect_id) {
                Some(definition) => {
                    materials.insert(material_id.clone(), Arc::clone(definition));
                }
                None => {
                    tracing::warn!("Material '{}': effect '{}' not found", material_id, effect_id);
                }
            }
        }

        MaterialLibrary {
            materials,
            symbols: self.symbols,
        }
    }
}

/// Linked materials, looked up by the local ids primitive blocks use.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: HashMap<String, Arc<MaterialDefinition>>,
    symbols: HashMap<String, String>,
}

impl MaterialLibrary {
    /// Resolve a local material id: as a material id first, then as an
    /// `instance_material` symbol.
    pub fn lookup(&self, local_id: &str) -> Option<Arc<MaterialDefinition>> {
        self.materials
            .get(local_id)
            .or_else(|| {
                self.symbols
                    .get(local_id)
                    .and_then(|target| self.materials.get(target))
            })
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Turn an `<init_from>` file name into a path.
///
/// A `file://` scheme and `%XX` escapes are removed. Absolute paths are
/// kept; relative ones are joined to `root`.
pub fn resolve_image_path(file_name: &str, root: &Path) -> PathBuf {
    let decoded = urlencoding::decode_binary(file_name.trim().as_bytes());
    let mut name = String::from_utf8_lossy(&decoded).into_owned();
    if let Some(stripped) = name.strip_prefix("file://") {
        name = stripped.to_string();
    }
    // `file:///C:/textures/a.png`
    if has_drive_prefix(name.strip_prefix('/').unwrap_or_default()) {
        name.remove(0);
    }

    let path = PathBuf::from(&name);
    if path.is_absolute() || has_drive_prefix(&name) {
        path
    } else {
        root.join(path)
    }
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::ColorChannel;

    fn tables_with_chain() -> MaterialTables {
        let mut tables = MaterialTables::new();
        tables.insert_image("wood-image".to_string(), "wood.png".to_string());
        let mut params = EffectParams::default();
        params.surfaces.insert("wood-surface".to_string(), "wood-image".to_string());
        params
            .samplers
            .insert("wood-sampler".to_string(), SamplerSource::Surface("wood-surface".to_string()));
        tables.params.insert("Wood-effect".to_string(), params);

        let mut definition = MaterialDefinition::new("Wood-effect");
        definition.set_texture_ref(TextureRef {
            sampler: "wood-sampler".to_string(),
            channel: ColorChannel::Diffuse,
            texcoord: Some("UVMap".to_string()),
        });
        tables.effects.insert("Wood-effect".to_string(), definition);
        tables
            .material_effects
            .insert("Wood-material".to_string(), "Wood-effect".to_string());
        tables
    }

    fn settings(root: &Path, check: bool) -> LinkSettings<'_> {
        LinkSettings {
            resolve_textures: true,
            check_texture_files: check,
            texture_root: root,
        }
    }

    #[test]
    fn test_texture_chain() {
        let tables = tables_with_chain();
        let texture_ref = tables.effects["Wood-effect"].texture_ref.clone().unwrap();
        let (image_id, file) = tables.texture_file("Wood-effect", &texture_ref).unwrap();
        assert_eq!(image_id, "wood-image");
        assert_eq!(file, "wood.png");

        let library = tables.link(&settings(Path::new("/scenes"), false));
        let material = library.lookup("Wood-material").unwrap();
        let texture = material.texture.as_ref().unwrap();
        assert_eq!(texture.path, Path::new("/scenes").join("wood.png"));
        assert_eq!(texture.channel, ColorChannel::Diffuse);
    }

    #[test]
    fn test_missing_file_keeps_material() {
        let dir = tempfile::tempdir().unwrap();
        let library = tables_with_chain().link(&settings(dir.path(), true));
        let material = library.lookup("Wood-material").unwrap();
        assert!(material.texture.is_none());
        assert!(material.texture_ref.is_some());
    }

    #[test]
    fn test_broken_links() {
        let mut tables = tables_with_chain();
        tables.images.clear();
        let texture_ref = tables.effects["Wood-effect"].texture_ref.clone().unwrap();
        assert_eq!(
            tables.texture_file("Wood-effect", &texture_ref).unwrap_err(),
            MissingLink::Image("wood-image".to_string())
        );

        let other = TextureRef {
            sampler: "nope".to_string(),
            channel: ColorChannel::Diffuse,
            texcoord: None,
        };
        assert_eq!(
            tables.texture_file("Wood-effect", &other).unwrap_err(),
            MissingLink::Sampler("nope".to_string())
        );
    }

    #[test]
    fn test_lookup_through_symbol() {
        let mut tables = tables_with_chain();
        tables.insert_symbol("WoodSG".to_string(), "Wood-material".to_string());
        tables.insert_symbol("WoodSG".to_string(), "Other-material".to_string());
        tables.material_effects.insert("Broken-material".to_string(), "Missing-effect".to_string());

        let library = tables.link(&settings(Path::new("."), false));
        assert!(library.lookup("WoodSG").is_some());
        assert!(library.lookup("Broken-material").is_none());
        assert!(library.lookup("unknown").is_none());
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_resolve_image_path() {
        let root = Path::new("/scenes/house");
        assert_eq!(resolve_image_path("wood.png", root), root.join("wood.png"));
        assert_eq!(resolve_image_path("./tex/my%20wood.png", root), root.join("./tex/my wood.png"));
        assert_eq!(resolve_image_path("file:///textures/a.png", root), PathBuf::from("/textures/a.png"));
        assert_eq!(resolve_image_path("file:///C:/textures/a.png", root), PathBuf::from("C:/textures/a.png"));
    }

    #[test]
    fn test_resolve_image_path_escapes() {
        let root = Path::new("/scenes");
        assert_eq!(resolve_image_path("caf%C3%A9.png", root), root.join("café.png"));
        assert_eq!(resolve_image_path("file:///tex%2Fstone.png", root), PathBuf::from("/tex/stone.png"));
        // Malformed escapes pass through untouched
        assert_eq!(resolve_image_path("100%.png", root), root.join("100%.png"));
        assert_eq!(resolve_image_path("a%zzb.png", root), root.join("a%zzb.png"));
    }
}

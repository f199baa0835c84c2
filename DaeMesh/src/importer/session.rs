//! The first import phase: one forward scan of the document.

use std::io::BufRead;

use crate::collada::EventCursor;
use crate::collada::effects::{parse_library_effects, parse_library_images, parse_library_materials};
use crate::collada::geometry::{GeometryTables, parse_library_geometries};
use crate::collada::visual_scene::parse_library_visual_scenes;
use crate::error::Result;
use crate::material::MaterialTables;

/// Library sections the scan reads; everything else is skipped.
pub(crate) const LIBRARY_SECTIONS: [&str; 5] = [
    "library_images",
    "library_materials",
    "library_effects",
    "library_geometries",
    "library_visual_scenes",
];

/// Everything accumulated while scanning one document.
///
/// Owned by a single import; dropping it (on success or on error) releases
/// every store and builder.
#[derive(Debug, Default)]
pub(crate) struct ImportSession {
    pub version: String,
    pub geometry: GeometryTables,
    pub materials: MaterialTables,
}

impl ImportSession {
    /// Scan the document from the `<COLLADA>` root to its end.
    ///
    /// `on_section` is called with the name and 1-based ordinal of each
    /// library section read.
    pub fn scan<R: BufRead>(cursor: &mut EventCursor<R>, on_section: &dyn Fn(&str, usize)) -> Result<Self> {
        cursor.go_to_element("COLLADA")?;
        let mut session = Self {
            version: cursor.required_attribute("version")?.to_string(),
            ..Self::default()
        };
        tracing::debug!("COLLADA version {}", session.version);

        let mut sections = 0;
        while let Some(name) = cursor.next_start_within("COLLADA")? {
            if LIBRARY_SECTIONS.contains(&name.as_str()) {
                sections += 1;
                on_section(&name, sections);
            }
            match name.as_str() {
                "library_images" => parse_library_images(cursor, &mut session.materials)?,
                "library_materials" => parse_library_materials(cursor, &mut session.materials)?,
                "library_effects" => parse_library_effects(cursor, &mut session.materials)?,
                "library_geometries" => parse_library_geometries(cursor, &mut session.geometry)?,
                "library_visual_scenes" => parse_library_visual_scenes(cursor, &mut session.materials)?,
                other => {
                    tracing::debug!("Skipping <{}>", other);
                    cursor.skip_element(other)?;
                }
            }
        }

        tracing::debug!(
            "Scanned {} sources, {} geometries, {} effects, {} materials, {} images",
            session.geometry.sources.len(),
            session.geometry.builders.len(),
            session.materials.effects.len(),
            session.materials.material_effects.len(),
            session.materials.images.len()
        );
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;

    fn scan(xml: &str) -> Result<ImportSession> {
        let mut cursor = EventCursor::new(xml.as_bytes());
        ImportSession::scan(&mut cursor, &|_, _| {})
    }

    #[test]
    fn test_sections_in_any_order() {
        let seen = RefCell::new(Vec::new());
        let xml = r##"<?xml version="1.0" encoding="utf-8"?>
            <COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">
                <asset><unit name="meter" meter="1"/><up_axis>Z_UP</up_axis></asset>
                <library_materials><material id="m"><instance_effect url="#e"/></material></library_materials>
                <library_cameras><camera id="c"/></library_cameras>
                <library_effects><effect id="e"><profile_COMMON/></effect></library_effects>
                <scene><instance_visual_scene url="#Scene"/></scene>
            </COLLADA>"##;
        let mut cursor = EventCursor::new(xml.as_bytes());
        let session = ImportSession::scan(&mut cursor, &|section, ordinal| {
            seen.borrow_mut().push((section.to_string(), ordinal));
        })
        .unwrap();
        assert_eq!(session.version, "1.4.1");
        assert_eq!(session.materials.material_effects["m"], "e");
        assert!(session.materials.effects.contains_key("e"));
        assert_eq!(
            *seen.borrow(),
            vec![("library_materials".to_string(), 1), ("library_effects".to_string(), 2)]
        );
    }

    #[test]
    fn test_version_is_mandatory() {
        let err = scan(r#"<COLLADA></COLLADA>"#).unwrap_err();
        assert!(matches!(err, Error::MissingAttribute { ref attribute, .. } if attribute == "version"));
    }

    #[test]
    fn test_missing_root() {
        let err = scan(r#"<scene></scene>"#).unwrap_err();
        assert!(matches!(err, Error::StreamTruncated { ref element } if element == "COLLADA"));
    }

    #[test]
    fn test_truncated_library() {
        let err = scan(r#"<COLLADA version="1.4.1"><library_geometries><geometry id="g"><mesh>"#).unwrap_err();
        assert!(matches!(err, Error::StreamTruncated { .. }));
    }
}

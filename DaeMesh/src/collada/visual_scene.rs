//! `<library_visual_scenes>`: material symbol bindings only.
//!
//! Node hierarchy and transforms are not imported. The section is walked
//! for `<instance_material symbol target>` pairs, which let primitive
//! blocks name their material by a per-instance symbol.

use std::io::BufRead;

use super::cursor::EventCursor;
use super::numbers::strip_sigil;
use crate::error::Result;
use crate::material::MaterialTables;

pub fn parse_library_visual_scenes<R: BufRead>(
    cursor: &mut EventCursor<R>,
    tables: &mut MaterialTables,
) -> Result<()> {
    let mut bindings = 0usize;
    while let Some(name) = cursor.next_start_within("library_visual_scenes")? {
        if name == "instance_material" {
            let symbol = cursor.required_attribute("symbol")?.to_string();
            let target = strip_sigil(cursor.required_attribute("target")?).to_string();
            tables.insert_symbol(symbol, target);
            bindings += 1;
        }
    }
    tracing::debug!("Visual scenes: {} material bindings", bindings);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn parse(xml: &str) -> Result<MaterialTables> {
        let mut cursor = EventCursor::new(xml.as_bytes());
        cursor.go_to_element("library_visual_scenes")?;
        let mut tables = MaterialTables::new();
        parse_library_visual_scenes(&mut cursor, &mut tables)?;
        Ok(tables)
    }

    #[test]
    fn test_instance_material_bindings() {
        let tables = parse(
            r##"<library_visual_scenes>
                <visual_scene id="Scene">
                    <node id="Cube" type="NODE">
                        <matrix sid="transform">1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1</matrix>
                        <instance_geometry url="#Cube-mesh">
                            <bind_material><technique_common>
                                <instance_material symbol="RedSG" target="#Red-material">
                                    <bind_vertex_input semantic="UVMap" input_semantic="TEXCOORD" input_set="0"/>
                                </instance_material>
                            </technique_common></bind_material>
                        </instance_geometry>
                        <node id="Child">
                            <instance_geometry url="#Cone-mesh">
                                <bind_material><technique_common>
                                    <instance_material symbol="BlueSG" target="#Blue-material"/>
                                </technique_common></bind_material>
                            </instance_geometry>
                        </node>
                    </node>
                </visual_scene>
            </library_visual_scenes>"##,
        )
        .unwrap();
        assert_eq!(tables.symbols["RedSG"], "Red-material");
        assert_eq!(tables.symbols["BlueSG"], "Blue-material");
    }

    #[test]
    fn test_binding_requires_target() {
        let err = parse(r#"<library_visual_scenes><instance_material symbol="s"/></library_visual_scenes>"#).unwrap_err();
        assert!(matches!(err, Error::MissingAttribute { ref attribute, .. } if attribute == "target"));
    }
}

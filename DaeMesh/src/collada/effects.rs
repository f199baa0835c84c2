//! `<library_images>`, `<library_materials>` and `<library_effects>`.
//!
//! These only fill [`MaterialTables`]; nothing is linked while scanning.

use std::io::BufRead;

use super::cursor::EventCursor;
use super::numbers::{parse_color, parse_floats, strip_sigil};
use crate::error::{Error, Result};
use crate::material::resolver::{EffectParams, SamplerSource};
use crate::material::{ColorChannel, MaterialDefinition, MaterialTables, ShadingModel, TextureRef};

// ============================================================================
// Images
// ============================================================================

pub fn parse_library_images<R: BufRead>(
    cursor: &mut EventCursor<R>,
    tables: &mut MaterialTables,
) -> Result<()> {
    while let Some(name) = cursor.next_start_within("library_images")? {
        if name == "image" {
            parse_image(cursor, tables)?;
        } else {
            cursor.skip_element(&name)?;
        }
    }
    Ok(())
}

/// Parse an `<image>`; the cursor must be on its start tag.
pub fn parse_image<R: BufRead>(cursor: &mut EventCursor<R>, tables: &mut MaterialTables) -> Result<()> {
    let id = cursor.required_attribute("id")?.to_string();
    let mut file_name = String::new();

    while let Some(name) = cursor.next_start_within("image")? {
        if name == "init_from" {
            file_name = cursor.text_content("init_from")?;
        }
    }

    tracing::debug!("Image '{}' -> '{}'", id, file_name);
    tables.insert_image(id, file_name);
    Ok(())
}

// ============================================================================
// Materials
// ============================================================================

pub fn parse_library_materials<R: BufRead>(
    cursor: &mut EventCursor<R>,
    tables: &mut MaterialTables,
) -> Result<()> {
    while let Some(name) = cursor.next_start_within("library_materials")? {
        if name == "material" {
            parse_material(cursor, tables)?;
        } else {
            cursor.skip_element(&name)?;
        }
    }
    Ok(())
}

/// Parse a `<material>`: only its first `<instance_effect>` is used.
fn parse_material<R: BufRead>(cursor: &mut EventCursor<R>, tables: &mut MaterialTables) -> Result<()> {
    let id = cursor.required_attribute("id")?.to_string();
    let mut effect: Option<String> = None;

    while let Some(name) = cursor.next_start_within("material")? {
        match name.as_str() {
            "instance_effect" if effect.is_none() => {
                effect = Some(strip_sigil(cursor.required_attribute("url")?).to_string());
            }
            "instance_effect" => {
                tracing::debug!("Material '{}': extra <instance_effect> ignored", id);
            }
            "setparam" => {
                tracing::debug!(
                    "Material '{}': <setparam ref=\"{}\"> ignored",
                    id,
                    cursor.attribute("ref").unwrap_or_default()
                );
            }
            _ => {}
        }
    }

    match effect {
        Some(effect) => {
            tracing::debug!("Material '{}' -> effect '{}'", id, effect);
            tables.material_effects.insert(id, effect);
        }
        None => tracing::warn!("Material '{}' has no <instance_effect>", id),
    }
    Ok(())
}

// ============================================================================
// Effects
// ============================================================================

pub fn parse_library_effects<R: BufRead>(
    cursor: &mut EventCursor<R>,
    tables: &mut MaterialTables,
) -> Result<()> {
    while let Some(name) = cursor.next_start_within("library_effects")? {
        if name == "effect" {
            parse_effect(cursor, tables)?;
        } else {
            cursor.skip_element(&name)?;
        }
    }
    Ok(())
}

/// Parse an `<effect>` into a [`MaterialDefinition`] named by its id.
///
/// Only `<profile_COMMON>` is read; `newparam` declarations are accepted
/// both at effect level and inside the profile.
fn parse_effect<R: BufRead>(cursor: &mut EventCursor<R>, tables: &mut MaterialTables) -> Result<()> {
    let id = cursor.required_attribute("id")?.to_string();
    let mut definition = MaterialDefinition::new(id.clone());
    let mut params = EffectParams::default();

    while let Some(name) = cursor.next_start_within("effect")? {
        match name.as_str() {
            "profile_COMMON" => parse_profile_common(cursor, tables, &mut definition, &mut params)?,
            "newparam" => parse_newparam(cursor, &mut params)?,
            "image" => parse_image(cursor, tables)?,
            other => {
                if other.starts_with("profile_") {
                    tracing::debug!("Effect '{}': <{}> skipped", id, other);
                }
                cursor.skip_element(other)?;
            }
        }
    }

    tracing::debug!(
        "Effect '{}': {:?}, texture {:?}",
        id,
        definition.shading,
        definition.texture_ref.as_ref().map(|texture| texture.sampler.as_str())
    );
    tables.params.insert(id.clone(), params);
    tables.effects.insert(id, definition);
    Ok(())
}

fn parse_profile_common<R: BufRead>(
    cursor: &mut EventCursor<R>,
    tables: &mut MaterialTables,
    definition: &mut MaterialDefinition,
    params: &mut EffectParams,
) -> Result<()> {
    while let Some(name) = cursor.next_start_within("profile_COMMON")? {
        match name.as_str() {
            "image" => parse_image(cursor, tables)?,
            "newparam" => parse_newparam(cursor, params)?,
            "technique" => parse_technique(cursor, definition)?,
            other => cursor.skip_element(other)?,
        }
    }
    Ok(())
}

/// `<newparam sid>` holding a `<surface>` or a `<sampler2D>`.
fn parse_newparam<R: BufRead>(cursor: &mut EventCursor<R>, params: &mut EffectParams) -> Result<()> {
    let sid = cursor.required_attribute("sid")?.to_string();

    while let Some(name) = cursor.next_start_within("newparam")? {
        match name.as_str() {
            "surface" => {
                while let Some(child) = cursor.next_start_within("surface")? {
                    if child == "init_from" {
                        let image = cursor.text_content("init_from")?;
                        params.surfaces.insert(sid.clone(), image);
                    } else {
                        cursor.skip_element(&child)?;
                    }
                }
            }
            "sampler2D" => {
                while let Some(child) = cursor.next_start_within("sampler2D")? {
                    match child.as_str() {
                        "source" => {
                            let surface = cursor.text_content("source")?;
                            params.samplers.insert(sid.clone(), SamplerSource::Surface(surface));
                        }
                        "instance_image" => {
                            let image = strip_sigil(cursor.required_attribute("url")?).to_string();
                            params.samplers.insert(sid.clone(), SamplerSource::Image(image));
                        }
                        other => cursor.skip_element(other)?,
                    }
                }
            }
            other => cursor.skip_element(other)?,
        }
    }
    Ok(())
}

/// `<technique>` of a common profile: one shading element.
fn parse_technique<R: BufRead>(cursor: &mut EventCursor<R>, definition: &mut MaterialDefinition) -> Result<()> {
    while let Some(name) = cursor.next_start_within("technique")? {
        match ShadingModel::from_element(&name) {
            Some(shading) => {
                definition.shading = shading;
                parse_shading(cursor, &name, definition)?;
            }
            None => cursor.skip_element(&name)?,
        }
    }
    Ok(())
}

fn parse_shading<R: BufRead>(
    cursor: &mut EventCursor<R>,
    element: &str,
    definition: &mut MaterialDefinition,
) -> Result<()> {
    while let Some(name) = cursor.next_start_within(element)? {
        if let Some(channel) = ColorChannel::from_element(&name) {
            parse_color_or_texture(cursor, channel, definition)?;
            continue;
        }
        match name.as_str() {
            "shininess" => {
                if let Some(value) = parse_float_param(cursor, "shininess")? {
                    definition.shininess = value;
                }
            }
            "transparency" => {
                if let Some(value) = parse_float_param(cursor, "transparency")? {
                    definition.transparency = value;
                }
            }
            other => cursor.skip_element(other)?,
        }
    }
    Ok(())
}

/// A channel holds either `<color>` (exactly 4 floats) or `<texture>`.
fn parse_color_or_texture<R: BufRead>(
    cursor: &mut EventCursor<R>,
    channel: ColorChannel,
    definition: &mut MaterialDefinition,
) -> Result<()> {
    let element = channel.as_str();
    while let Some(name) = cursor.next_start_within(element)? {
        match name.as_str() {
            "color" => {
                let color = parse_color(&cursor.text_content("color")?)?;
                definition.set_color(channel, color);
            }
            "texture" => {
                let sampler = cursor.required_attribute("texture")?.to_string();
                let texcoord = cursor.attribute("texcoord").map(str::to_string);
                definition.set_texture_ref(TextureRef {
                    sampler,
                    channel,
                    texcoord,
                });
                cursor.skip_element("texture")?;
            }
            other => cursor.skip_element(other)?,
        }
    }
    Ok(())
}

/// `<shininess><float>20</float></shininess>`; a `<param>` reference yields `None`.
fn parse_float_param<R: BufRead>(cursor: &mut EventCursor<R>, element: &str) -> Result<Option<f32>> {
    let mut value = None;
    while let Some(name) = cursor.next_start_within(element)? {
        if name == "float" {
            let text = cursor.text_content("float")?;
            let floats = parse_floats(&text, "float")?;
            if floats.len() != 1 {
                return Err(Error::count_mismatch("float", None, 1, floats.len()));
            }
            value = floats.first().copied();
        } else {
            cursor.skip_element(&name)?;
        }
    }
    Ok(value)
}

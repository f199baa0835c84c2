//! SPDX-FileCopyrightText: 2025 CyberDeco
//!
//! SPDX-License-Identifier: MIT
//!
//! Flat material definitions parsed from `<effect>` elements.
//!
//! A definition is filled in during the document scan; its texture, if any,
//! is attached afterwards by the [`resolver`] once every image and sampler
//! of the document is known.

pub mod resolver;

use std::path::PathBuf;

use serde::Serialize;

pub use resolver::{MaterialLibrary, MaterialTables, MissingLink};

/// RGBA color with float components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn gray(level: f32) -> Self {
        Self::new(level, level, level, 1.0)
    }
}

/// The color slots of a common-profile technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColorChannel {
    Emission,
    Ambient,
    Diffuse,
    Specular,
}

impl ColorChannel {
    /// Map a technique child element name to its channel.
    pub fn from_element(name: &str) -> Option<Self> {
        match name {
            "emission" => Some(Self::Emission),
            "ambient" => Some(Self::Ambient),
            "diffuse" => Some(Self::Diffuse),
            "specular" => Some(Self::Specular),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emission => "emission",
            Self::Ambient => "ambient",
            Self::Diffuse => "diffuse",
            Self::Specular => "specular",
        }
    }
}

/// Shading technique of a common profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ShadingModel {
    Constant,
    Lambert,
    #[default]
    Phong,
    Blinn,
}

impl ShadingModel {
    pub fn from_element(name: &str) -> Option<Self> {
        match name {
            "constant" => Some(Self::Constant),
            "lambert" => Some(Self::Lambert),
            "phong" => Some(Self::Phong),
            "blinn" => Some(Self::Blinn),
            _ => None,
        }
    }
}

/// Unresolved `<texture texture="..." texcoord="...">` reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextureRef {
    /// Sampler sid named by the `texture` attribute.
    pub sampler: String,
    /// Channel the reference was found on.
    pub channel: ColorChannel,
    /// Texture coordinate set symbol, if given.
    pub texcoord: Option<String>,
}

/// A texture whose image file was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Texture {
    pub image_id: String,
    pub path: PathBuf,
    pub channel: ColorChannel,
}

/// A flat material: colors, scalars and at most one texture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialDefinition {
    /// The effect id the material was parsed from.
    pub name: String,
    pub shading: ShadingModel,
    pub emission: Color,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f32,
    pub transparency: f32,
    pub texture_ref: Option<TextureRef>,
    pub texture: Option<Texture>,
}

impl MaterialDefinition {
    /// A material with fixed-function lighting defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shading: ShadingModel::default(),
            emission: Color::BLACK,
            ambient: Color::gray(0.2),
            diffuse: Color::gray(0.8),
            specular: Color::BLACK,
            shininess: 0.0,
            transparency: 1.0,
            texture_ref: None,
            texture: None,
        }
    }

    pub fn color(&self, channel: ColorChannel) -> Color {
        match channel {
            ColorChannel::Emission => self.emission,
            ColorChannel::Ambient => self.ambient,
            ColorChannel::Diffuse => self.diffuse,
            ColorChannel::Specular => self.specular,
        }
    }

    pub fn set_color(&mut self, channel: ColorChannel, color: Color) {
        match channel {
            ColorChannel::Emission => self.emission = color,
            ColorChannel::Ambient => self.ambient = color,
            ColorChannel::Diffuse => self.diffuse = color,
            ColorChannel::Specular => self.specular = color,
        }
    }

    /// Record a texture reference. A material keeps one texture: the
    /// diffuse one if there is one, otherwise the first found.
    pub fn set_texture_ref(&mut self, texture_ref: TextureRef) {
        let replace = match &self.texture_ref {
            None => true,
            Some(existing) => {
                existing.channel != ColorChannel::Diffuse && texture_ref.channel == ColorChannel::Diffuse
            }
        };
        if replace {
            self.texture_ref = Some(texture_ref);
        } else {
            tracing::debug!(
                "Material '{}' already textured, ignoring {} texture '{}'",
                self.name,
                texture_ref.channel.as_str(),
                texture_ref.sampler
            );
        }
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }
}

// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! State identifiers and typed state values for the fixed-function cache.
//!
//! Every state value is cached as a 32-bit word: enums as their small
//! integer discriminant, booleans as 0/1, floats bit-cast via
//! [`f32::to_bits`], colors packed as `0xAABBGGRR`. The typed enums below
//! define the abstract encodings; the backend word tables live in
//! [`translate`](super::translate).

use crate::math::LinearRgba;
use crate::renderer::error::StateError;

/// Defines which face of a triangle to cull (not render).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// No culling is performed.
    None,
    /// Cull triangles with clockwise winding.
    Clockwise,
    /// Cull triangles with counter-clockwise winding.
    CounterClockwise,
}

impl CullMode {
    /// Returns the abstract 32-bit encoding of this value.
    #[inline]
    pub const fn to_word(self) -> u32 {
        self as u32
    }

    /// Decodes an abstract 32-bit word, or `None` if out of range.
    pub fn from_word(word: u32) -> Option<Self> {
        match word {
            0 => Some(Self::None),
            1 => Some(Self::Clockwise),
            2 => Some(Self::CounterClockwise),
            _ => None,
        }
    }
}

/// Defines how polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillMode {
    /// Polygon vertices are rendered as points.
    Point,
    /// Polygons are rendered as outlines (wireframe).
    Line,
    /// Polygons are filled. This is the normal rendering mode.
    Solid,
}

impl FillMode {
    /// Returns the abstract 32-bit encoding of this value.
    #[inline]
    pub const fn to_word(self) -> u32 {
        self as u32
    }

    /// Decodes an abstract 32-bit word, or `None` if out of range.
    pub fn from_word(word: u32) -> Option<Self> {
        match word {
            0 => Some(Self::Point),
            1 => Some(Self::Line),
            2 => Some(Self::Solid),
            _ => None,
        }
    }
}

/// The interpolation model used when shading primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadeMode {
    /// One color per primitive.
    Flat,
    /// Colors are interpolated across the primitive (Gouraud).
    Smooth,
    /// Per-pixel lighting. No fixed-function hardware table carries this;
    /// setting it surfaces the table-miss failure path.
    Phong,
}

impl ShadeMode {
    /// Returns the abstract 32-bit encoding of this value.
    #[inline]
    pub const fn to_word(self) -> u32 {
        self as u32
    }

    /// Decodes an abstract 32-bit word, or `None` if out of range.
    pub fn from_word(word: u32) -> Option<Self> {
        match word {
            0 => Some(Self::Flat),
            1 => Some(Self::Smooth),
            2 => Some(Self::Phong),
            _ => None,
        }
    }
}

/// The comparison function used for depth and alpha testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunc {
    /// The test never passes.
    Never,
    /// The test passes if the new value is less than the existing value.
    Less,
    /// The test passes if the new value is equal to the existing value.
    Equal,
    /// The test passes if the new value is less than or equal to the existing value.
    LessEqual,
    /// The test passes if the new value is greater than the existing value.
    Greater,
    /// The test passes if the new value is not equal to the existing value.
    NotEqual,
    /// The test passes if the new value is greater than or equal to the existing value.
    GreaterEqual,
    /// The test always passes.
    Always,
}

impl CompareFunc {
    /// Returns the abstract 32-bit encoding of this value.
    #[inline]
    pub const fn to_word(self) -> u32 {
        self as u32
    }

    /// Decodes an abstract 32-bit word, or `None` if out of range.
    pub fn from_word(word: u32) -> Option<Self> {
        match word {
            0 => Some(Self::Never),
            1 => Some(Self::Less),
            2 => Some(Self::Equal),
            3 => Some(Self::LessEqual),
            4 => Some(Self::Greater),
            5 => Some(Self::NotEqual),
            6 => Some(Self::GreaterEqual),
            7 => Some(Self::Always),
            _ => None,
        }
    }
}

/// A factor in the framebuffer blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFunc {
    /// The factor is `0.0`.
    Zero,
    /// The factor is `1.0`.
    One,
    /// The factor is the source color.
    SrcColor,
    /// The factor is `1.0 - src`.
    InvSrcColor,
    /// The factor is the source alpha component.
    SrcAlpha,
    /// The factor is `1.0 - src.a`.
    InvSrcAlpha,
    /// The factor is the destination color.
    DstColor,
    /// The factor is `1.0 - dst`.
    InvDstColor,
    /// The factor is the destination alpha component.
    DstAlpha,
    /// The factor is `1.0 - dst.a`.
    InvDstAlpha,
}

impl BlendFunc {
    /// Returns the abstract 32-bit encoding of this value.
    #[inline]
    pub const fn to_word(self) -> u32 {
        self as u32
    }

    /// Decodes an abstract 32-bit word, or `None` if out of range.
    pub fn from_word(word: u32) -> Option<Self> {
        match word {
            0 => Some(Self::Zero),
            1 => Some(Self::One),
            2 => Some(Self::SrcColor),
            3 => Some(Self::InvSrcColor),
            4 => Some(Self::SrcAlpha),
            5 => Some(Self::InvSrcAlpha),
            6 => Some(Self::DstColor),
            7 => Some(Self::InvDstColor),
            8 => Some(Self::DstAlpha),
            9 => Some(Self::InvDstAlpha),
            _ => None,
        }
    }
}

/// The fog attenuation curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FogMode {
    /// Exponential falloff.
    Exp,
    /// Squared exponential falloff.
    Exp2,
    /// Linear falloff between fog start and fog end.
    Linear,
}

impl FogMode {
    /// Returns the abstract 32-bit encoding of this value.
    #[inline]
    pub const fn to_word(self) -> u32 {
        self as u32
    }

    /// Decodes an abstract 32-bit word, or `None` if out of range.
    pub fn from_word(word: u32) -> Option<Self> {
        match word {
            0 => Some(Self::Exp),
            1 => Some(Self::Exp2),
            2 => Some(Self::Linear),
            _ => None,
        }
    }
}

/// How a texture stage combines its texture with the incoming color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexEnvMode {
    /// The texture replaces the incoming color.
    Replace,
    /// The texture is multiplied with the incoming color.
    Modulate,
    /// The texture is blended over the incoming color by its alpha.
    Decal,
    /// The texture is added to the incoming color.
    Add,
    /// The texture is subtracted from the incoming color.
    Subtract,
    /// The texture and incoming color are interpolated.
    Interpolate,
}

impl TexEnvMode {
    /// Returns the abstract 32-bit encoding of this value.
    #[inline]
    pub const fn to_word(self) -> u32 {
        self as u32
    }

    /// Decodes an abstract 32-bit word, or `None` if out of range.
    pub fn from_word(word: u32) -> Option<Self> {
        match word {
            0 => Some(Self::Replace),
            1 => Some(Self::Modulate),
            2 => Some(Self::Decal),
            3 => Some(Self::Add),
            4 => Some(Self::Subtract),
            5 => Some(Self::Interpolate),
            _ => None,
        }
    }
}

/// How texture coordinates are generated for a texture stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexCoordGenMode {
    /// Coordinates come from the vertex data, untransformed.
    None,
    /// Coordinates are derived from object-space position.
    ObjectLinear,
    /// Coordinates are derived from eye-space position.
    EyeLinear,
    /// Coordinates follow the eye-space reflection vector.
    ///
    /// Entering or leaving this mode forces a recomputation of the stage's
    /// texture transform: reflection mapping uses the transpose of the view
    /// matrix instead of the raw texture matrix.
    ReflectionMap,
    /// Classic sphere-map coordinates.
    SphereMap,
    /// Coordinates follow the eye-space normal.
    NormalMap,
}

impl TexCoordGenMode {
    /// Returns the abstract 32-bit encoding of this value.
    #[inline]
    pub const fn to_word(self) -> u32 {
        self as u32
    }

    /// Decodes an abstract 32-bit word, or `None` if out of range.
    pub fn from_word(word: u32) -> Option<Self> {
        match word {
            0 => Some(Self::None),
            1 => Some(Self::ObjectLinear),
            2 => Some(Self::EyeLinear),
            3 => Some(Self::ReflectionMap),
            4 => Some(Self::SphereMap),
            5 => Some(Self::NormalMap),
            _ => None,
        }
    }
}

/// Identifies a single cached render state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderStateId {
    /// Face culling mode ([`CullMode`]).
    CullMode,
    /// Polygon rasterization mode ([`FillMode`]).
    FillMode,
    /// Shading interpolation model ([`ShadeMode`]).
    ShadeMode,
    /// Depth test enable (boolean).
    ZEnable,
    /// Depth write enable (boolean).
    ZWriteEnable,
    /// Depth comparison function ([`CompareFunc`]).
    ZFunc,
    /// Framebuffer blending enable (boolean).
    BlendEnable,
    /// Source blend factor ([`BlendFunc`]).
    SrcBlendFunc,
    /// Destination blend factor ([`BlendFunc`]).
    DstBlendFunc,
    /// Alpha test enable (boolean).
    AlphaTestEnable,
    /// Alpha test comparison function ([`CompareFunc`]).
    AlphaTestFunc,
    /// Alpha test reference value (float bits).
    AlphaTestReference,
    /// Scissor test enable (boolean).
    ScissorTestEnable,
    /// Fog enable (boolean).
    FogEnable,
    /// Fog attenuation curve ([`FogMode`]).
    FogMode,
    /// Fog density (float bits).
    FogDensity,
    /// Fog start distance (float bits).
    FogStart,
    /// Fog end distance (float bits).
    FogEnd,
    /// Fog color (packed RGBA8).
    FogColor,
    /// Fixed-function lighting enable (boolean).
    Lighting,
    /// Global ambient color (packed RGBA8).
    Ambient,
    /// Automatic normal renormalization enable (boolean).
    NormalizeNormals,
}

impl RenderStateId {
    /// The number of render states the cache tracks.
    pub const COUNT: usize = 22;

    /// All render state ids, in cache-table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::CullMode,
        Self::FillMode,
        Self::ShadeMode,
        Self::ZEnable,
        Self::ZWriteEnable,
        Self::ZFunc,
        Self::BlendEnable,
        Self::SrcBlendFunc,
        Self::DstBlendFunc,
        Self::AlphaTestEnable,
        Self::AlphaTestFunc,
        Self::AlphaTestReference,
        Self::ScissorTestEnable,
        Self::FogEnable,
        Self::FogMode,
        Self::FogDensity,
        Self::FogStart,
        Self::FogEnd,
        Self::FogColor,
        Self::Lighting,
        Self::Ambient,
        Self::NormalizeNormals,
    ];

    /// Returns the state's name, for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::CullMode => "CullMode",
            Self::FillMode => "FillMode",
            Self::ShadeMode => "ShadeMode",
            Self::ZEnable => "ZEnable",
            Self::ZWriteEnable => "ZWriteEnable",
            Self::ZFunc => "ZFunc",
            Self::BlendEnable => "BlendEnable",
            Self::SrcBlendFunc => "SrcBlendFunc",
            Self::DstBlendFunc => "DstBlendFunc",
            Self::AlphaTestEnable => "AlphaTestEnable",
            Self::AlphaTestFunc => "AlphaTestFunc",
            Self::AlphaTestReference => "AlphaTestReference",
            Self::ScissorTestEnable => "ScissorTestEnable",
            Self::FogEnable => "FogEnable",
            Self::FogMode => "FogMode",
            Self::FogDensity => "FogDensity",
            Self::FogStart => "FogStart",
            Self::FogEnd => "FogEnd",
            Self::FogColor => "FogColor",
            Self::Lighting => "Lighting",
            Self::Ambient => "Ambient",
            Self::NormalizeNormals => "NormalizeNormals",
        }
    }

    /// Validates an abstract encoded value for this state.
    ///
    /// Boolean states accept only `{0, 1}`; enumerated states accept only
    /// words their value enum can decode; float and color states accept any
    /// bit pattern.
    pub fn validate(self, value: u32) -> Result<(), StateError> {
        let ok = match self {
            Self::ZEnable
            | Self::ZWriteEnable
            | Self::BlendEnable
            | Self::AlphaTestEnable
            | Self::ScissorTestEnable
            | Self::FogEnable
            | Self::Lighting
            | Self::NormalizeNormals => value <= 1,
            Self::CullMode => CullMode::from_word(value).is_some(),
            Self::FillMode => FillMode::from_word(value).is_some(),
            Self::ShadeMode => ShadeMode::from_word(value).is_some(),
            Self::ZFunc | Self::AlphaTestFunc => CompareFunc::from_word(value).is_some(),
            Self::SrcBlendFunc | Self::DstBlendFunc => BlendFunc::from_word(value).is_some(),
            Self::FogMode => FogMode::from_word(value).is_some(),
            Self::AlphaTestReference
            | Self::FogDensity
            | Self::FogStart
            | Self::FogEnd
            | Self::FogColor
            | Self::Ambient => true,
        };
        if ok {
            Ok(())
        } else {
            Err(StateError::InvalidValue {
                state: self.name(),
                value,
            })
        }
    }

    /// Returns the documented default value of this state.
    pub fn default_value(self) -> u32 {
        match self {
            Self::CullMode => CullMode::CounterClockwise.to_word(),
            Self::FillMode => FillMode::Solid.to_word(),
            Self::ShadeMode => ShadeMode::Smooth.to_word(),
            Self::ZEnable => 1,
            Self::ZWriteEnable => 1,
            Self::ZFunc => CompareFunc::LessEqual.to_word(),
            Self::BlendEnable => 0,
            Self::SrcBlendFunc => BlendFunc::SrcAlpha.to_word(),
            Self::DstBlendFunc => BlendFunc::InvSrcAlpha.to_word(),
            Self::AlphaTestEnable => 0,
            Self::AlphaTestFunc => CompareFunc::GreaterEqual.to_word(),
            Self::AlphaTestReference => 0.5f32.to_bits(),
            Self::ScissorTestEnable => 0,
            Self::FogEnable => 0,
            Self::FogMode => FogMode::Exp.to_word(),
            Self::FogDensity => 1.0f32.to_bits(),
            Self::FogStart => 0.0f32.to_bits(),
            Self::FogEnd => 1.0f32.to_bits(),
            Self::FogColor => LinearRgba::BLACK.to_rgba8(),
            Self::Lighting => 1,
            Self::Ambient => LinearRgba::rgb(0.2, 0.2, 0.2).to_rgba8(),
            Self::NormalizeNormals => 1,
        }
    }
}

/// Identifies a single cached per-texture-unit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureStageStateId {
    /// RGB combine mode for the stage ([`TexEnvMode`]).
    ColorTexEnv,
    /// Alpha combine mode for the stage ([`TexEnvMode`]).
    AlphaTexEnv,
    /// Texture coordinate generation mode ([`TexCoordGenMode`]).
    TexGen,
}

impl TextureStageStateId {
    /// The number of per-stage states the cache tracks.
    pub const COUNT: usize = 3;

    /// All per-stage state ids, in cache-table order.
    pub const ALL: [Self; Self::COUNT] = [Self::ColorTexEnv, Self::AlphaTexEnv, Self::TexGen];

    /// Returns the state's name, for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ColorTexEnv => "ColorTexEnv",
            Self::AlphaTexEnv => "AlphaTexEnv",
            Self::TexGen => "TexGen",
        }
    }

    /// Validates an abstract encoded value for this state.
    pub fn validate(self, value: u32) -> Result<(), StateError> {
        let ok = match self {
            Self::ColorTexEnv | Self::AlphaTexEnv => TexEnvMode::from_word(value).is_some(),
            Self::TexGen => TexCoordGenMode::from_word(value).is_some(),
        };
        if ok {
            Ok(())
        } else {
            Err(StateError::InvalidValue {
                state: self.name(),
                value,
            })
        }
    }

    /// Returns the documented default value of this state.
    pub fn default_value(self) -> u32 {
        match self {
            Self::ColorTexEnv | Self::AlphaTexEnv => TexEnvMode::Modulate.to_word(),
            Self::TexGen => TexCoordGenMode::None.to_word(),
        }
    }
}

/// Identifies a single cached fixed-function material state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialStateId {
    /// Material ambient reflectance (packed RGBA8).
    Ambient,
    /// Material diffuse reflectance (packed RGBA8).
    Diffuse,
    /// Material specular reflectance (packed RGBA8).
    Specular,
    /// Material emissive color (packed RGBA8).
    Emission,
    /// Specular exponent (float bits).
    Shininess,
}

impl MaterialStateId {
    /// The number of material states the cache tracks.
    pub const COUNT: usize = 5;

    /// All material state ids, in cache-table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Ambient,
        Self::Diffuse,
        Self::Specular,
        Self::Emission,
        Self::Shininess,
    ];

    /// Returns the state's name, for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ambient => "MaterialAmbient",
            Self::Diffuse => "MaterialDiffuse",
            Self::Specular => "MaterialSpecular",
            Self::Emission => "MaterialEmission",
            Self::Shininess => "MaterialShininess",
        }
    }

    /// Returns the documented default value of this state.
    pub fn default_value(self) -> u32 {
        match self {
            Self::Ambient => LinearRgba::rgb(0.2, 0.2, 0.2).to_rgba8(),
            Self::Diffuse => LinearRgba::rgb(0.8, 0.8, 0.8).to_rgba8(),
            Self::Specular => LinearRgba::BLACK.to_rgba8(),
            Self::Emission => LinearRgba::BLACK.to_rgba8(),
            Self::Shininess => 0.0f32.to_bits(),
        }
    }
}

/// Identifies a transform matrix slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformSlot {
    /// The projection matrix.
    Projection,
    /// The view (camera) matrix.
    View,
    /// The world (model) matrix.
    World,
    /// A per-texture-unit texture coordinate transform.
    Texture(u32),
}

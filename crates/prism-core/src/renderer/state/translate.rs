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

//! Abstract-value to driver-word translation tables.
//!
//! The cache stores abstract encodings; immediately before a driver call
//! the value is translated to the word the selected backend expects. A
//! missing table entry fails the whole setter and leaves the cache
//! untouched.

use super::declaration::VertexSemantic;
use super::ids::{
    BlendFunc, CompareFunc, CullMode, FillMode, FogMode, MaterialStateId, RenderStateId,
    ShadeMode, TexCoordGenMode, TexEnvMode, TextureStageStateId,
};
use crate::renderer::error::StateError;

/// The closed set of driver backends the translation tables cover.
///
/// Selected once at state-cache construction; every subsequent driver word
/// is produced by this backend's tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// OpenGL-family drivers (`GLenum` words).
    OpenGl,
    /// Direct3D-family drivers (`D3D*` words).
    Direct3D,
    /// The headless backend; words pass through untranslated.
    Headless,
}

impl BackendKind {
    /// Translates an abstract render state value to the backend word.
    ///
    /// Boolean, float and color states pass through unchanged on every
    /// backend; enumerated states go through the per-backend tables.
    pub fn render_state_word(self, id: RenderStateId, value: u32) -> Result<u32, StateError> {
        let miss = || StateError::Untranslatable {
            state: id.name(),
            value,
            backend: self,
        };
        if self == BackendKind::Headless {
            return Ok(value);
        }
        match id {
            RenderStateId::CullMode => {
                let mode = CullMode::from_word(value).ok_or_else(miss)?;
                Ok(match self {
                    // 0 = culling disabled, otherwise the face to cull.
                    BackendKind::OpenGl => match mode {
                        CullMode::None => 0,
                        CullMode::Clockwise => 0x0404,        // GL_FRONT
                        CullMode::CounterClockwise => 0x0405, // GL_BACK
                    },
                    BackendKind::Direct3D => match mode {
                        CullMode::None => 1,             // D3DCULL_NONE
                        CullMode::Clockwise => 2,        // D3DCULL_CW
                        CullMode::CounterClockwise => 3, // D3DCULL_CCW
                    },
                    BackendKind::Headless => value,
                })
            }
            RenderStateId::FillMode => {
                let mode = FillMode::from_word(value).ok_or_else(miss)?;
                Ok(match self {
                    BackendKind::OpenGl => match mode {
                        FillMode::Point => 0x1B00, // GL_POINT
                        FillMode::Line => 0x1B01,  // GL_LINE
                        FillMode::Solid => 0x1B02, // GL_FILL
                    },
                    BackendKind::Direct3D => match mode {
                        FillMode::Point => 1, // D3DFILL_POINT
                        FillMode::Line => 2,  // D3DFILL_WIREFRAME
                        FillMode::Solid => 3, // D3DFILL_SOLID
                    },
                    BackendKind::Headless => value,
                })
            }
            RenderStateId::ShadeMode => {
                let mode = ShadeMode::from_word(value).ok_or_else(miss)?;
                match (self, mode) {
                    (BackendKind::OpenGl, ShadeMode::Flat) => Ok(0x1D00), // GL_FLAT
                    (BackendKind::OpenGl, ShadeMode::Smooth) => Ok(0x1D01), // GL_SMOOTH
                    (BackendKind::Direct3D, ShadeMode::Flat) => Ok(1),    // D3DSHADE_FLAT
                    (BackendKind::Direct3D, ShadeMode::Smooth) => Ok(2),  // D3DSHADE_GOURAUD
                    // Phong shading never made it into a fixed-function table.
                    _ => Err(miss()),
                }
            }
            RenderStateId::ZFunc | RenderStateId::AlphaTestFunc => {
                let func = CompareFunc::from_word(value).ok_or_else(miss)?;
                Ok(match self {
                    // GL_NEVER..GL_ALWAYS are contiguous from 0x0200.
                    BackendKind::OpenGl => 0x0200 + func.to_word(),
                    // D3DCMP_NEVER..D3DCMP_ALWAYS are contiguous from 1.
                    BackendKind::Direct3D => func.to_word() + 1,
                    BackendKind::Headless => value,
                })
            }
            RenderStateId::SrcBlendFunc | RenderStateId::DstBlendFunc => {
                let func = BlendFunc::from_word(value).ok_or_else(miss)?;
                Ok(match self {
                    BackendKind::OpenGl => match func {
                        BlendFunc::Zero => 0,                 // GL_ZERO
                        BlendFunc::One => 1,                  // GL_ONE
                        BlendFunc::SrcColor => 0x0300,        // GL_SRC_COLOR
                        BlendFunc::InvSrcColor => 0x0301,     // GL_ONE_MINUS_SRC_COLOR
                        BlendFunc::SrcAlpha => 0x0302,        // GL_SRC_ALPHA
                        BlendFunc::InvSrcAlpha => 0x0303,     // GL_ONE_MINUS_SRC_ALPHA
                        BlendFunc::DstAlpha => 0x0304,        // GL_DST_ALPHA
                        BlendFunc::InvDstAlpha => 0x0305,     // GL_ONE_MINUS_DST_ALPHA
                        BlendFunc::DstColor => 0x0306,        // GL_DST_COLOR
                        BlendFunc::InvDstColor => 0x0307,     // GL_ONE_MINUS_DST_COLOR
                    },
                    BackendKind::Direct3D => match func {
                        BlendFunc::Zero => 1,             // D3DBLEND_ZERO
                        BlendFunc::One => 2,              // D3DBLEND_ONE
                        BlendFunc::SrcColor => 3,         // D3DBLEND_SRCCOLOR
                        BlendFunc::InvSrcColor => 4,      // D3DBLEND_INVSRCCOLOR
                        BlendFunc::SrcAlpha => 5,         // D3DBLEND_SRCALPHA
                        BlendFunc::InvSrcAlpha => 6,      // D3DBLEND_INVSRCALPHA
                        BlendFunc::DstAlpha => 7,         // D3DBLEND_DESTALPHA
                        BlendFunc::InvDstAlpha => 8,      // D3DBLEND_INVDESTALPHA
                        BlendFunc::DstColor => 9,         // D3DBLEND_DESTCOLOR
                        BlendFunc::InvDstColor => 10,     // D3DBLEND_INVDESTCOLOR
                    },
                    BackendKind::Headless => value,
                })
            }
            RenderStateId::FogMode => {
                let mode = FogMode::from_word(value).ok_or_else(miss)?;
                Ok(match self {
                    BackendKind::OpenGl => match mode {
                        FogMode::Exp => 0x0800,    // GL_EXP
                        FogMode::Exp2 => 0x0801,   // GL_EXP2
                        FogMode::Linear => 0x2601, // GL_LINEAR
                    },
                    BackendKind::Direct3D => match mode {
                        FogMode::Exp => 1,    // D3DFOG_EXP
                        FogMode::Exp2 => 2,   // D3DFOG_EXP2
                        FogMode::Linear => 3, // D3DFOG_LINEAR
                    },
                    BackendKind::Headless => value,
                })
            }
            // Booleans, floats and packed colors are backend-neutral.
            _ => Ok(value),
        }
    }

    /// Translates an abstract texture stage state value to the backend word.
    pub fn texture_stage_state_word(
        self,
        id: TextureStageStateId,
        value: u32,
    ) -> Result<u32, StateError> {
        let miss = || StateError::Untranslatable {
            state: id.name(),
            value,
            backend: self,
        };
        if self == BackendKind::Headless {
            return Ok(value);
        }
        match id {
            TextureStageStateId::ColorTexEnv | TextureStageStateId::AlphaTexEnv => {
                let mode = TexEnvMode::from_word(value).ok_or_else(miss)?;
                Ok(match self {
                    BackendKind::OpenGl => match mode {
                        TexEnvMode::Replace => 0x1E01,     // GL_REPLACE
                        TexEnvMode::Modulate => 0x2100,    // GL_MODULATE
                        TexEnvMode::Decal => 0x2101,       // GL_DECAL
                        TexEnvMode::Add => 0x0104,         // GL_ADD
                        TexEnvMode::Subtract => 0x84E7,    // GL_SUBTRACT
                        TexEnvMode::Interpolate => 0x8575, // GL_INTERPOLATE
                    },
                    BackendKind::Direct3D => match mode {
                        TexEnvMode::Replace => 2,      // D3DTOP_SELECTARG1
                        TexEnvMode::Modulate => 4,     // D3DTOP_MODULATE
                        TexEnvMode::Decal => 12,       // D3DTOP_BLENDTEXTUREALPHA
                        TexEnvMode::Add => 7,          // D3DTOP_ADD
                        TexEnvMode::Subtract => 10,    // D3DTOP_SUBTRACT
                        TexEnvMode::Interpolate => 26, // D3DTOP_LERP
                    },
                    BackendKind::Headless => value,
                })
            }
            TextureStageStateId::TexGen => {
                let mode = TexCoordGenMode::from_word(value).ok_or_else(miss)?;
                match (self, mode) {
                    (BackendKind::OpenGl, TexCoordGenMode::None) => Ok(0),
                    (BackendKind::OpenGl, TexCoordGenMode::ObjectLinear) => Ok(0x2401), // GL_OBJECT_LINEAR
                    (BackendKind::OpenGl, TexCoordGenMode::EyeLinear) => Ok(0x2400), // GL_EYE_LINEAR
                    (BackendKind::OpenGl, TexCoordGenMode::ReflectionMap) => Ok(0x8512), // GL_REFLECTION_MAP
                    (BackendKind::OpenGl, TexCoordGenMode::SphereMap) => Ok(0x2402), // GL_SPHERE_MAP
                    (BackendKind::OpenGl, TexCoordGenMode::NormalMap) => Ok(0x8511), // GL_NORMAL_MAP
                    (BackendKind::Direct3D, TexCoordGenMode::None) => Ok(0), // D3DTSS_TCI_PASSTHRU
                    (BackendKind::Direct3D, TexCoordGenMode::EyeLinear) => Ok(0x0002_0000), // CAMERASPACEPOSITION
                    (BackendKind::Direct3D, TexCoordGenMode::ReflectionMap) => Ok(0x0003_0000), // CAMERASPACEREFLECTIONVECTOR
                    (BackendKind::Direct3D, TexCoordGenMode::SphereMap) => Ok(0x0004_0000), // SPHEREMAP
                    (BackendKind::Direct3D, TexCoordGenMode::NormalMap) => Ok(0x0001_0000), // CAMERASPACENORMAL
                    // Direct3D has no object-linear generation.
                    _ => Err(miss()),
                }
            }
        }
    }

    /// Translates an abstract material state value to the backend word.
    ///
    /// Material values are packed colors and float bits on every backend.
    pub fn material_state_word(self, _id: MaterialStateId, value: u32) -> Result<u32, StateError> {
        Ok(value)
    }

    /// Maps a vertex attribute semantic to the backend usage word.
    ///
    /// OpenGL words are conventional attribute slots; Direct3D words encode
    /// `D3DDECLUSAGE` in the low half and the usage index in the high half.
    pub fn semantic_usage_word(
        self,
        semantic: VertexSemantic,
        channel: u32,
    ) -> Result<u32, StateError> {
        let miss = || StateError::UnmappedSemantic {
            semantic,
            channel,
            backend: self,
        };
        match self {
            BackendKind::OpenGl => {
                let slot = match semantic {
                    VertexSemantic::Position => 0,
                    VertexSemantic::BlendWeight => 1,
                    VertexSemantic::Normal => 2,
                    VertexSemantic::Color => 3,
                    VertexSemantic::FogCoord => 5,
                    VertexSemantic::PointSize => 6,
                    VertexSemantic::BlendIndices => 7,
                    VertexSemantic::TexCoord => {
                        if channel > 7 {
                            return Err(miss());
                        }
                        8 + channel
                    }
                    VertexSemantic::Tangent => 14,
                    VertexSemantic::Binormal => 15,
                };
                // Only texture coordinates are channelled on OpenGL.
                if !matches!(semantic, VertexSemantic::TexCoord) && channel != 0 {
                    return Err(miss());
                }
                Ok(slot)
            }
            BackendKind::Direct3D => {
                if channel > 15 {
                    return Err(miss());
                }
                let usage = match semantic {
                    VertexSemantic::Position => 0,     // D3DDECLUSAGE_POSITION
                    VertexSemantic::BlendWeight => 1,  // D3DDECLUSAGE_BLENDWEIGHT
                    VertexSemantic::BlendIndices => 2, // D3DDECLUSAGE_BLENDINDICES
                    VertexSemantic::Normal => 3,       // D3DDECLUSAGE_NORMAL
                    VertexSemantic::PointSize => 4,    // D3DDECLUSAGE_PSIZE
                    VertexSemantic::TexCoord => 5,     // D3DDECLUSAGE_TEXCOORD
                    VertexSemantic::Tangent => 6,      // D3DDECLUSAGE_TANGENT
                    VertexSemantic::Binormal => 7,     // D3DDECLUSAGE_BINORMAL
                    VertexSemantic::Color => 10,       // D3DDECLUSAGE_COLOR
                    VertexSemantic::FogCoord => 11,    // D3DDECLUSAGE_FOG
                };
                Ok(usage | (channel << 16))
            }
            BackendKind::Headless => Ok(semantic as u32 | (channel << 16)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fog_mode_words_differ_per_backend() {
        let v = FogMode::Linear.to_word();
        assert_eq!(
            BackendKind::OpenGl
                .render_state_word(RenderStateId::FogMode, v)
                .unwrap(),
            0x2601
        );
        assert_eq!(
            BackendKind::Direct3D
                .render_state_word(RenderStateId::FogMode, v)
                .unwrap(),
            3
        );
        assert_eq!(
            BackendKind::Headless
                .render_state_word(RenderStateId::FogMode, v)
                .unwrap(),
            v
        );
    }

    #[test]
    fn phong_misses_on_both_hardware_tables() {
        let v = ShadeMode::Phong.to_word();
        for backend in [BackendKind::OpenGl, BackendKind::Direct3D] {
            assert!(matches!(
                backend.render_state_word(RenderStateId::ShadeMode, v),
                Err(StateError::Untranslatable { state: "ShadeMode", .. })
            ));
        }
    }

    #[test]
    fn compare_func_tables_are_contiguous() {
        for func in [CompareFunc::Never, CompareFunc::Always] {
            let gl = BackendKind::OpenGl
                .render_state_word(RenderStateId::ZFunc, func.to_word())
                .unwrap();
            assert_eq!(gl, 0x0200 + func.to_word());
            let d3d = BackendKind::Direct3D
                .render_state_word(RenderStateId::ZFunc, func.to_word())
                .unwrap();
            assert_eq!(d3d, func.to_word() + 1);
        }
    }

    #[test]
    fn object_linear_texgen_misses_on_direct3d() {
        let v = TexCoordGenMode::ObjectLinear.to_word();
        assert!(BackendKind::OpenGl
            .texture_stage_state_word(TextureStageStateId::TexGen, v)
            .is_ok());
        assert!(BackendKind::Direct3D
            .texture_stage_state_word(TextureStageStateId::TexGen, v)
            .is_err());
    }

    #[test]
    fn texcoord_channels_are_bounded() {
        assert_eq!(
            BackendKind::OpenGl
                .semantic_usage_word(VertexSemantic::TexCoord, 3)
                .unwrap(),
            11
        );
        assert!(BackendKind::OpenGl
            .semantic_usage_word(VertexSemantic::TexCoord, 8)
            .is_err());
        assert!(BackendKind::Direct3D
            .semantic_usage_word(VertexSemantic::TexCoord, 15)
            .is_ok());
        assert!(BackendKind::Direct3D
            .semantic_usage_word(VertexSemantic::TexCoord, 16)
            .is_err());
    }

    #[test]
    fn non_texcoord_channels_rejected_on_opengl() {
        assert!(BackendKind::OpenGl
            .semantic_usage_word(VertexSemantic::Normal, 1)
            .is_err());
    }
}

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

//! The fixed shader source tables of the depth-of-field pipeline.
//!
//! One table per shading language, selected at program build time. The
//! fullscreen vertex shader is shared by all four fragment programs of the
//! pass.

use crate::renderer::shader::ShadingLanguage;

/// The four fragment stages of the depth-of-field pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DofStage {
    /// Writes the per-pixel blur factor into the alpha channel.
    DepthBlur,
    /// Renders the depth-blurred image into the low-resolution target.
    Downscale,
    /// One-directional Gaussian convolution.
    Blur,
    /// Blends the sharp and the blurred image.
    Composite,
}

/// Returns the shared fullscreen-quad vertex shader source.
pub fn vertex_source(language: ShadingLanguage) -> &'static str {
    match language {
        ShadingLanguage::Glsl => VERTEX_GLSL,
        ShadingLanguage::Cg => VERTEX_CG,
    }
}

/// Returns the fragment shader source of a pipeline stage.
pub fn fragment_source(language: ShadingLanguage, stage: DofStage) -> &'static str {
    match (language, stage) {
        (ShadingLanguage::Glsl, DofStage::DepthBlur) => DEPTH_BLUR_GLSL,
        (ShadingLanguage::Glsl, DofStage::Downscale) => DOWNSCALE_GLSL,
        (ShadingLanguage::Glsl, DofStage::Blur) => BLUR_GLSL,
        (ShadingLanguage::Glsl, DofStage::Composite) => COMPOSITE_GLSL,
        (ShadingLanguage::Cg, DofStage::DepthBlur) => DEPTH_BLUR_CG,
        (ShadingLanguage::Cg, DofStage::Downscale) => DOWNSCALE_CG,
        (ShadingLanguage::Cg, DofStage::Blur) => BLUR_CG,
        (ShadingLanguage::Cg, DofStage::Composite) => COMPOSITE_CG,
    }
}

const VERTEX_GLSL: &str = r"
#version 110

attribute vec2 VertexPosition;
varying vec2 TexCoordVS;

void main()
{
    gl_Position = vec4(VertexPosition, 0.0, 1.0);
    TexCoordVS = VertexPosition * 0.5 + 0.5;
}
";

const DEPTH_BLUR_GLSL: &str = r"
#version 110

varying vec2 TexCoordVS;

uniform vec2      TextureSize;
// x = near blur depth, y = focal plane depth, z = far blur depth, w = blurriness cutoff
uniform vec4      DofParams;
uniform sampler2D ColorTexture;
uniform sampler2D NormalDepthTexture;

void main()
{
    vec4 color = texture2D(ColorTexture, TexCoordVS);
    float depth = texture2D(NormalDepthTexture, TexCoordVS).b;

    float f;
    if (depth < DofParams.y) {
        // Scale depth value between near blur distance and focal distance
        // to [-1, 0] range
        f = (depth - DofParams.y)/(DofParams.y - DofParams.x);
    } else {
        // Scale depth value between focal distance and far blur distance
        // to [0, 1] range, capped by the blurriness cutoff
        f = (depth - DofParams.y)/(DofParams.z - DofParams.y);
        f = min(f, DofParams.w);
    }

    // Scale and bias into [0, 1]; 0.5 marks the focal plane
    gl_FragColor = vec4(color.rgb, clamp(f*0.5 + 0.5, 0.0, 1.0));
}
";

const DOWNSCALE_GLSL: &str = r"
#version 110

varying vec2 TexCoordVS;

uniform vec2      TextureSize;
uniform sampler2D ColorTexture;

void main()
{
    vec2 texelSize = 1.0/TextureSize;
    vec4 color = vec4(0.0);
    for (int y = -1; y <= 2; y++) {
        for (int x = -1; x <= 2; x++) {
            color += texture2D(ColorTexture, TexCoordVS + vec2(float(x), float(y))*texelSize);
        }
    }
    gl_FragColor = color/16.0;
}
";

const BLUR_GLSL: &str = r"
#version 110

varying vec2 TexCoordVS;

uniform vec2      TextureSize;
uniform vec2      UVScale;
uniform sampler2D ColorTexture;

void main()
{
    vec2 texelSize = UVScale/TextureSize;
    vec4 color = texture2D(ColorTexture, TexCoordVS)*0.2270270270;
    color += texture2D(ColorTexture, TexCoordVS + texelSize*1.3846153846)*0.3162162162;
    color += texture2D(ColorTexture, TexCoordVS - texelSize*1.3846153846)*0.3162162162;
    color += texture2D(ColorTexture, TexCoordVS + texelSize*3.2307692308)*0.0702702703;
    color += texture2D(ColorTexture, TexCoordVS - texelSize*3.2307692308)*0.0702702703;
    gl_FragColor = color;
}
";

const COMPOSITE_GLSL: &str = r"
#version 110

varying vec2 TexCoordVS;

uniform float     EffectWeight;
uniform float     BlurDownscale;
uniform sampler2D BlurTexture;
uniform sampler2D ColorTexture;

void main()
{
    vec4 sharp = texture2D(ColorTexture, TexCoordVS);
    vec4 blurred = texture2D(BlurTexture, TexCoordVS/BlurDownscale);

    // The alpha channel carries the biased blur factor; 0.5 is in focus
    float blurriness = abs(sharp.a*2.0 - 1.0);

    // Effect weight 0 must reproduce the sharp image exactly
    gl_FragColor = vec4(mix(sharp.rgb, blurred.rgb, clamp(blurriness*EffectWeight, 0.0, 1.0)), 1.0);
}
";

const VERTEX_CG: &str = r"
struct VS_OUTPUT {
    float4 Position : POSITION;
    float2 TexCoord : TEXCOORD0;
};

VS_OUTPUT main(float2 VertexPosition : POSITION)
{
    VS_OUTPUT Out;
    Out.Position = float4(VertexPosition, 0, 1);
    Out.TexCoord = VertexPosition*0.5f + 0.5f;
    return Out;
}
";

const DEPTH_BLUR_CG: &str = r"
float4 main(float2 TexCoord : TEXCOORD0,
    uniform float2    TextureSize,
    uniform float4    DofParams,
    uniform sampler2D ColorTexture,
    uniform sampler2D NormalDepthTexture) : COLOR
{
    float4 color = tex2D(ColorTexture, TexCoord);
    float depth = tex2D(NormalDepthTexture, TexCoord).b;

    float f;
    if (depth < DofParams.y) {
        f = (depth - DofParams.y)/(DofParams.y - DofParams.x);
    } else {
        f = (depth - DofParams.y)/(DofParams.z - DofParams.y);
        f = min(f, DofParams.w);
    }

    return float4(color.rgb, saturate(f*0.5f + 0.5f));
}
";

const DOWNSCALE_CG: &str = r"
float4 main(float2 TexCoord : TEXCOORD0,
    uniform float2    TextureSize,
    uniform sampler2D ColorTexture) : COLOR
{
    float2 texelSize = 1.0f/TextureSize;
    float4 color = 0;
    for (int y=-1; y<=2; y++) {
        for (int x=-1; x<=2; x++)
            color += tex2D(ColorTexture, TexCoord + float2(x, y)*texelSize);
    }
    return color/16.0f;
}
";

const BLUR_CG: &str = r"
float4 main(float2 TexCoord : TEXCOORD0,
    uniform float2    TextureSize,
    uniform float2    UVScale,
    uniform sampler2D ColorTexture) : COLOR
{
    float2 texelSize = UVScale/TextureSize;
    float4 color = tex2D(ColorTexture, TexCoord)*0.2270270270f;
    color += tex2D(ColorTexture, TexCoord + texelSize*1.3846153846f)*0.3162162162f;
    color += tex2D(ColorTexture, TexCoord - texelSize*1.3846153846f)*0.3162162162f;
    color += tex2D(ColorTexture, TexCoord + texelSize*3.2307692308f)*0.0702702703f;
    color += tex2D(ColorTexture, TexCoord - texelSize*3.2307692308f)*0.0702702703f;
    return color;
}
";

const COMPOSITE_CG: &str = r"
float4 main(float2 TexCoord : TEXCOORD0,
    uniform float     EffectWeight,
    uniform float     BlurDownscale,
    uniform sampler2D BlurTexture,
    uniform sampler2D ColorTexture) : COLOR
{
    float4 sharp = tex2D(ColorTexture, TexCoord);
    float4 blurred = tex2D(BlurTexture, TexCoord/BlurDownscale);
    float blurriness = abs(sharp.a*2.0f - 1.0f);
    return float4(lerp(sharp.rgb, blurred.rgb, saturate(blurriness*EffectWeight)), 1.0f);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_stage_has_a_source_in_both_languages() {
        for language in [ShadingLanguage::Glsl, ShadingLanguage::Cg] {
            assert!(!vertex_source(language).trim().is_empty());
            for stage in [
                DofStage::DepthBlur,
                DofStage::Downscale,
                DofStage::Blur,
                DofStage::Composite,
            ] {
                assert!(!fragment_source(language, stage).trim().is_empty());
            }
        }
    }

    #[test]
    fn glsl_sources_reference_the_resolved_uniform_names() {
        let depth_blur = fragment_source(ShadingLanguage::Glsl, DofStage::DepthBlur);
        assert!(depth_blur.contains("DofParams"));
        assert!(depth_blur.contains("NormalDepthTexture"));
        let composite = fragment_source(ShadingLanguage::Glsl, DofStage::Composite);
        assert!(composite.contains("EffectWeight"));
        assert!(composite.contains("BlurDownscale"));
    }
}

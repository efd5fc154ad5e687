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

//! The deferred depth-of-field compositing pipeline.
//!
//! Four sequential passes per frame, each one "acquire program → bind
//! inputs → set uniforms → draw a fullscreen quad":
//!
//! 1. **Depth blur** reads the front color buffer and the normal/depth
//!    buffer and writes the per-pixel blur factor into the alpha channel.
//! 2. **Downscale** renders the depth-blurred image into a low-resolution
//!    target pair, recreated whenever the size or format would change.
//! 3. **Blur** runs N one-directional gaussian convolutions, alternating
//!    horizontal and vertical by iteration parity and flipping the
//!    ping-pong pair after each one.
//! 4. **Composite** blends the sharp and the blurred image per pixel,
//!    weighted by each pixel's own blurriness and the global effect weight.
//!
//! If the effect is inactive the whole pipeline is skipped for the frame
//! with no side effects: no targets are touched and no programs are built.

use crate::math::EPSILON;
use crate::renderer::common::{
    Extent2D, PrimitiveTopology, ShaderStage, TextureFormat, TextureId, UniformHandle,
};
use crate::renderer::error::{PassError, ProgramError};
use crate::renderer::pass::dof_sources::{fragment_source, vertex_source, DofStage};
use crate::renderer::pass::target::{FrontBackTargets, FullscreenQuad, PingPongTargets};
use crate::renderer::shader::{GpuProgram, ShaderHandle, ShadingLanguage};
use crate::renderer::state::StateCache;
use crate::renderer::traits::GraphicsDevice;
use bytemuck::{Pod, Zeroable};
use std::sync::Arc;

/// Configuration of the depth-of-field effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DofSettings {
    /// Scene depth at which near blur reaches full strength.
    pub near_blur_depth: f32,
    /// Scene depth that is perfectly in focus.
    pub focal_plane_depth: f32,
    /// Scene depth at which far blur reaches full strength.
    pub far_blur_depth: f32,
    /// Upper bound on the far-side blur factor before bias.
    pub blurriness_cutoff: f32,
    /// Resolution divider for the blur targets. Values below 1.0 are
    /// treated as 1.0; the blur image is never upscaled.
    pub blur_downscale: f32,
    /// Number of one-directional gaussian blur iterations.
    pub blur_passes: u32,
    /// Sampling radius of one blur tap, in texels.
    pub blur_bleed_radius: f32,
    /// Global effect weight. At 0 the composite output is the unmodified
    /// sharp image; the whole pipeline is bypassed.
    pub effect_weight: f32,
    /// Skips the effect entirely regardless of the other settings.
    pub disabled: bool,
}

impl Default for DofSettings {
    fn default() -> Self {
        Self {
            near_blur_depth: 0.5,
            focal_plane_depth: 5.0,
            far_blur_depth: 10.0,
            blurriness_cutoff: 0.8,
            blur_downscale: 4.0,
            blur_passes: 2,
            blur_bleed_radius: 1.0,
            effect_weight: 1.0,
            disabled: false,
        }
    }
}

/// The depth-plane parameter block uploaded to the depth-blur pass.
///
/// Matches the `DofParams` vec4 uniform: x = near blur depth, y = focal
/// plane depth, z = far blur depth, w = blurriness cutoff.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DofParams {
    /// Scene depth at which near blur reaches full strength.
    pub near_blur_depth: f32,
    /// Scene depth that is perfectly in focus.
    pub focal_plane_depth: f32,
    /// Scene depth at which far blur reaches full strength.
    pub far_blur_depth: f32,
    /// Upper bound on the far-side blur factor before bias.
    pub blurriness_cutoff: f32,
}

impl DofParams {
    /// Derives the parameter block from settings, with the near and far
    /// planes separated from the focal plane (see [`separate_planes`]).
    pub fn from_settings(settings: &DofSettings) -> Self {
        let (near, far) = separate_planes(
            settings.near_blur_depth,
            settings.focal_plane_depth,
            settings.far_blur_depth,
        );
        Self {
            near_blur_depth: near,
            focal_plane_depth: settings.focal_plane_depth,
            far_blur_depth: far,
            blurriness_cutoff: settings.blurriness_cutoff,
        }
    }

    /// The block as the vec4 the shader expects.
    pub fn to_array(self) -> [f32; 4] {
        [
            self.near_blur_depth,
            self.focal_plane_depth,
            self.far_blur_depth,
            self.blurriness_cutoff,
        ]
    }
}

/// Nudges the near and far planes away from the focal plane.
///
/// The blur formula divides by `focal - near` and `far - focal`; whenever
/// one of those differences is not strictly positive (or underflows) the
/// offending plane is moved a minimal epsilon away from the focal plane, so
/// no division by zero can occur.
pub fn separate_planes(near: f32, focal: f32, far: f32) -> (f32, f32) {
    let near = if focal - near < EPSILON {
        focal - EPSILON
    } else {
        near
    };
    let far = if far - focal < EPSILON {
        focal + EPSILON
    } else {
        far
    };
    (near, far)
}

/// The reference blur-factor formula of the depth-blur pass.
///
/// A fragment nearer than the focal plane scales into `[-1, 0]`, a farther
/// one into `[0, cutoff]`; bias and scale map the result into `[0, 1]` with
/// 0.5 marking the focal plane exactly.
pub fn depth_blur_factor(depth: f32, params: &DofParams) -> f32 {
    let f = if depth < params.focal_plane_depth {
        (depth - params.focal_plane_depth) / (params.focal_plane_depth - params.near_blur_depth)
    } else {
        let f =
            (depth - params.focal_plane_depth) / (params.far_blur_depth - params.focal_plane_depth);
        f.min(params.blurriness_cutoff)
    };
    (f * 0.5 + 0.5).clamp(0.0, 1.0)
}

/// The reference per-pixel blend of the composite pass.
///
/// `sharp` is the full-resolution pixel with the biased blur factor in its
/// alpha channel; `blurred` is the low-resolution blur result. With
/// `effect_weight` 0 the output equals the sharp input bit for bit.
pub fn composite_pixel(sharp: [f32; 4], blurred: [f32; 3], effect_weight: f32) -> [f32; 3] {
    let blurriness = (sharp[3] * 2.0 - 1.0).abs();
    let t = (blurriness * effect_weight).clamp(0.0, 1.0);
    [
        sharp[0] + (blurred[0] - sharp[0]) * t,
        sharp[1] + (blurred[1] - sharp[1]) * t,
        sharp[2] + (blurred[2] - sharp[2]) * t,
    ]
}

/// Whether a frame ran the pipeline or skipped it.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DofOutcome {
    /// All four passes ran; the front target holds the composited image.
    Applied,
    /// The pipeline was skipped with no side effects.
    Bypassed,
}

// Cached uniform handles of one pipeline stage. Each struct remembers the
// relink generation it resolved against and re-resolves exactly once when
// the generation changes; steady-state frames perform no name lookups.

#[derive(Debug, Default)]
struct DepthBlurUniforms {
    resolved_against: Option<u64>,
    texture_size: Option<UniformHandle>,
    dof_params: Option<UniformHandle>,
    color_texture: Option<UniformHandle>,
    normal_depth_texture: Option<UniformHandle>,
}

impl DepthBlurUniforms {
    fn resolve(&mut self, program: &GpuProgram) {
        if self.resolved_against == Some(program.generation()) {
            return;
        }
        self.texture_size = program.uniform("TextureSize");
        self.dof_params = program.uniform("DofParams");
        self.color_texture = program.uniform("ColorTexture");
        self.normal_depth_texture = program.uniform("NormalDepthTexture");
        self.resolved_against = Some(program.generation());
    }
}

#[derive(Debug, Default)]
struct DownscaleUniforms {
    resolved_against: Option<u64>,
    texture_size: Option<UniformHandle>,
    color_texture: Option<UniformHandle>,
}

impl DownscaleUniforms {
    fn resolve(&mut self, program: &GpuProgram) {
        if self.resolved_against == Some(program.generation()) {
            return;
        }
        self.texture_size = program.uniform("TextureSize");
        self.color_texture = program.uniform("ColorTexture");
        self.resolved_against = Some(program.generation());
    }
}

#[derive(Debug, Default)]
struct BlurUniforms {
    resolved_against: Option<u64>,
    texture_size: Option<UniformHandle>,
    uv_scale: Option<UniformHandle>,
    color_texture: Option<UniformHandle>,
}

impl BlurUniforms {
    fn resolve(&mut self, program: &GpuProgram) {
        if self.resolved_against == Some(program.generation()) {
            return;
        }
        self.texture_size = program.uniform("TextureSize");
        self.uv_scale = program.uniform("UVScale");
        self.color_texture = program.uniform("ColorTexture");
        self.resolved_against = Some(program.generation());
    }
}

#[derive(Debug, Default)]
struct CompositeUniforms {
    resolved_against: Option<u64>,
    effect_weight: Option<UniformHandle>,
    blur_downscale: Option<UniformHandle>,
    blur_texture: Option<UniformHandle>,
    color_texture: Option<UniformHandle>,
}

impl CompositeUniforms {
    fn resolve(&mut self, program: &GpuProgram) {
        if self.resolved_against == Some(program.generation()) {
            return;
        }
        self.effect_weight = program.uniform("EffectWeight");
        self.blur_downscale = program.uniform("BlurDownscale");
        self.blur_texture = program.uniform("BlurTexture");
        self.color_texture = program.uniform("ColorTexture");
        self.resolved_against = Some(program.generation());
    }
}

/// The four linked programs of the pipeline for one shading language.
///
/// The fullscreen vertex shader is shared by all four programs and released
/// once, when the last program referencing it is dropped.
#[derive(Debug)]
struct DofPrograms {
    language: ShadingLanguage,
    depth_blur: GpuProgram,
    depth_blur_uniforms: DepthBlurUniforms,
    downscale: GpuProgram,
    downscale_uniforms: DownscaleUniforms,
    blur: GpuProgram,
    blur_uniforms: BlurUniforms,
    composite: GpuProgram,
    composite_uniforms: CompositeUniforms,
}

impl DofPrograms {
    fn build(device: &Arc<dyn GraphicsDevice>, language: ShadingLanguage) -> Result<Self, PassError> {
        log::debug!(
            "DofPrograms: building the four pipeline programs ({})",
            language.name()
        );
        let vertex = Arc::new(ShaderHandle::compile(
            Arc::clone(device),
            ShaderStage::Vertex,
            language,
            vertex_source(language),
        )?);
        let link = |stage: DofStage| -> Result<GpuProgram, ProgramError> {
            let fragment = ShaderHandle::compile(
                Arc::clone(device),
                ShaderStage::Fragment,
                language,
                fragment_source(language, stage),
            )?;
            GpuProgram::link(Arc::clone(device), language, Arc::clone(&vertex), fragment)
        };
        Ok(Self {
            language,
            depth_blur: link(DofStage::DepthBlur)?,
            depth_blur_uniforms: DepthBlurUniforms::default(),
            downscale: link(DofStage::Downscale)?,
            downscale_uniforms: DownscaleUniforms::default(),
            blur: link(DofStage::Blur)?,
            blur_uniforms: BlurUniforms::default(),
            composite: link(DofStage::Composite)?,
            composite_uniforms: CompositeUniforms::default(),
        })
    }
}

/// The deferred depth-of-field effect instance.
///
/// Owns its programs and its ping-pong blur targets exclusively; both are
/// rebuilt lazily, the programs when the device's shading language changes
/// and the targets when the downscaled size or pixel format changes.
#[derive(Debug)]
pub struct DepthOfFieldEffect {
    device: Arc<dyn GraphicsDevice>,
    quad: FullscreenQuad,
    programs: Option<DofPrograms>,
    targets: Option<PingPongTargets>,
}

impl DepthOfFieldEffect {
    /// Creates an effect over the given device and shared fullscreen quad.
    ///
    /// Nothing is allocated until the first non-bypassed frame.
    pub fn new(device: Arc<dyn GraphicsDevice>, quad: FullscreenQuad) -> Self {
        Self {
            device,
            quad,
            programs: None,
            targets: None,
        }
    }

    /// The current ping-pong pair, if one exists.
    pub fn ping_pong_targets(&self) -> Option<&PingPongTargets> {
        self.targets.as_ref()
    }

    /// Runs the pipeline for one frame.
    ///
    /// `targets` provides the sharp front image and the back surface the
    /// passes render into; after an applied frame the front target holds
    /// the composited result. `normal_depth` is the G-buffer texture whose
    /// blue channel carries linear scene depth.
    ///
    /// The frame is bypassed, with no side effects at all, when the effect
    /// is disabled, the effect weight is not positive, or the device
    /// reports an unknown shading language.
    pub fn render(
        &mut self,
        cache: &mut StateCache,
        targets: &mut FrontBackTargets,
        normal_depth: TextureId,
        settings: &DofSettings,
    ) -> Result<DofOutcome, PassError> {
        if settings.disabled || settings.effect_weight <= 0.0 {
            log::trace!("DepthOfFieldEffect: inactive, skipping the frame");
            return Ok(DofOutcome::Bypassed);
        }
        let reported = self.device.default_shader_language();
        let Some(language) = ShadingLanguage::from_name(&reported) else {
            log::debug!(
                "DepthOfFieldEffect: unknown shading language '{reported}', skipping the frame"
            );
            return Ok(DofOutcome::Bypassed);
        };

        let mut programs = self.acquire_programs(language)?;
        let params = DofParams::from_settings(settings);
        let full_size = targets.front().size();
        let format = targets.front().format();

        // Pass 1: depth blur into the back buffer, then swap so the
        // depth-blurred image becomes the front.
        self.depth_blur_pass(cache, &mut programs, targets, normal_depth, params)?;
        targets.swap();

        // Pass 2: downscale into the ping-pong pair, recreated if the low
        // resolution or the format changed.
        let downscale = settings.blur_downscale.max(1.0);
        let low_size = full_size.scaled_down(downscale);
        let mut pong = self.acquire_targets(low_size, format)?;
        self.downscale_pass(cache, &mut programs, targets, full_size, &pong)?;

        // Pass 3: N one-directional gaussian blurs, alternating direction
        // by iteration parity and flipping the pair after each one.
        for iteration in 0..settings.blur_passes {
            self.blur_pass(cache, &mut programs, &pong, iteration, settings.blur_bleed_radius)?;
            pong.flip();
        }

        // Pass 4: composite sharp and blurred into the back buffer, then
        // swap so the result is the new front image.
        self.composite_pass(cache, &mut programs, targets, &pong, downscale, settings)?;
        targets.swap();

        self.programs = Some(programs);
        self.targets = Some(pong);
        Ok(DofOutcome::Applied)
    }

    /// Reuses the existing programs when the shading language still
    /// matches; otherwise destroys them (the shared vertex shader goes with
    /// the last program) and builds the language's source table anew.
    fn acquire_programs(&mut self, language: ShadingLanguage) -> Result<DofPrograms, PassError> {
        if let Some(programs) = self.programs.take() {
            if programs.language == language {
                return Ok(programs);
            }
            log::debug!(
                "DepthOfFieldEffect: shading language changed from {} to {}, rebuilding programs",
                programs.language.name(),
                language.name()
            );
        }
        DofPrograms::build(&self.device, language)
    }

    /// Reuses the ping-pong pair when size and format still match;
    /// otherwise destroys both targets and recreates them before rendering.
    fn acquire_targets(
        &mut self,
        size: Extent2D,
        format: TextureFormat,
    ) -> Result<PingPongTargets, PassError> {
        if let Some(pong) = self.targets.take() {
            if pong.size() == size && pong.format() == format {
                return Ok(pong);
            }
            log::debug!(
                "DepthOfFieldEffect: blur target change to {}x{} {format:?}, recreating the pair",
                size.width,
                size.height
            );
        }
        PingPongTargets::create(&self.device, size, format)
    }

    fn depth_blur_pass(
        &self,
        cache: &mut StateCache,
        programs: &mut DofPrograms,
        targets: &FrontBackTargets,
        normal_depth: TextureId,
        params: DofParams,
    ) -> Result<(), PassError> {
        self.device.bind_render_target(Some(targets.back().id()))?;
        let program = &programs.depth_blur;
        program.bind();
        programs.depth_blur_uniforms.resolve(program);
        let uniforms = &programs.depth_blur_uniforms;
        let size = targets.front().size();
        program.set_uniform_vec2(
            uniforms.texture_size,
            [size.width as f32, size.height as f32],
        );
        program.set_uniform_vec4(uniforms.dof_params, params.to_array());
        program.set_uniform_texture(uniforms.color_texture, 0, targets.front().color_texture());
        program.set_uniform_texture(uniforms.normal_depth_texture, 1, normal_depth);
        self.draw_quad(cache)
    }

    fn downscale_pass(
        &self,
        cache: &mut StateCache,
        programs: &mut DofPrograms,
        targets: &FrontBackTargets,
        source_size: Extent2D,
        pong: &PingPongTargets,
    ) -> Result<(), PassError> {
        self.device
            .bind_render_target(Some(pong.current().id()))?;
        let program = &programs.downscale;
        program.bind();
        programs.downscale_uniforms.resolve(program);
        let uniforms = &programs.downscale_uniforms;
        program.set_uniform_vec2(
            uniforms.texture_size,
            [source_size.width as f32, source_size.height as f32],
        );
        program.set_uniform_texture(uniforms.color_texture, 0, targets.front().color_texture());
        self.draw_quad(cache)
    }

    fn blur_pass(
        &self,
        cache: &mut StateCache,
        programs: &mut DofPrograms,
        pong: &PingPongTargets,
        iteration: u32,
        bleed_radius: f32,
    ) -> Result<(), PassError> {
        self.device.bind_render_target(Some(pong.other().id()))?;
        let program = &programs.blur;
        program.bind();
        programs.blur_uniforms.resolve(program);
        let uniforms = &programs.blur_uniforms;
        let size = pong.size();
        program.set_uniform_vec2(
            uniforms.texture_size,
            [size.width as f32, size.height as f32],
        );
        // Even iterations convolve horizontally, odd ones vertically.
        let uv_scale = if iteration % 2 == 0 {
            [bleed_radius, 0.0]
        } else {
            [0.0, bleed_radius]
        };
        program.set_uniform_vec2(uniforms.uv_scale, uv_scale);
        program.set_uniform_texture(uniforms.color_texture, 0, pong.current().color_texture());
        self.draw_quad(cache)
    }

    fn composite_pass(
        &self,
        cache: &mut StateCache,
        programs: &mut DofPrograms,
        targets: &FrontBackTargets,
        pong: &PingPongTargets,
        downscale: f32,
        settings: &DofSettings,
    ) -> Result<(), PassError> {
        self.device.bind_render_target(Some(targets.back().id()))?;
        let program = &programs.composite;
        program.bind();
        programs.composite_uniforms.resolve(program);
        let uniforms = &programs.composite_uniforms;
        program.set_uniform_f32(uniforms.effect_weight, settings.effect_weight);
        program.set_uniform_f32(uniforms.blur_downscale, downscale);
        program.set_uniform_texture(uniforms.blur_texture, 0, pong.current().color_texture());
        program.set_uniform_texture(uniforms.color_texture, 1, targets.front().color_texture());
        self.draw_quad(cache)
    }

    /// Binds the shared quad at stream 0 and draws it as a triangle strip.
    fn draw_quad(&self, cache: &mut StateCache) -> Result<(), PassError> {
        cache.set_vertex_buffer(Some(Arc::clone(self.quad.buffer())), 0, 0)?;
        if cache.apply_vertex_declaration()?.is_none() {
            return Ok(());
        }
        self.device
            .draw(PrimitiveTopology::TriangleStrip, 0..FullscreenQuad::VERTEX_COUNT)?;
        Ok(())
    }
}

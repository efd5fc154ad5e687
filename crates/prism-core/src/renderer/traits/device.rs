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

use crate::math::Mat4;
use crate::renderer::common::{
    AttributeHandle, Extent2D, PrimitiveTopology, ProgramId, RenderTargetId, ShaderId,
    ShaderStage, TextureFormat, TextureId, UniformHandle,
};
use crate::renderer::error::{DriverCallError, ProgramError};
use crate::renderer::shader::language::ShadingLanguage;
use std::fmt::Debug;
use std::ops::Range;

/// The resource and draw seam between the compositing passes and a
/// concrete device.
///
/// Shared via `Arc` across the program manager and the pass pipeline; all
/// methods take `&self`. Shader and program objects returned from here are
/// owned by RAII handles (`ShaderHandle`, `GpuProgram`,
/// `RenderTargetGuard`) whose destructors call the matching `destroy_*`
/// method.
pub trait GraphicsDevice: Debug + Send + Sync + 'static {
    /// The name of the device's preferred shading language (e.g. `"GLSL"`).
    ///
    /// Program construction compares this against the known language names;
    /// an unknown name makes construction a recoverable no-op.
    fn default_shader_language(&self) -> String;

    /// Compiles shader source for the given stage.
    fn compile_shader(
        &self,
        stage: ShaderStage,
        language: ShadingLanguage,
        source: &str,
    ) -> Result<ShaderId, ProgramError>;

    /// Releases a compiled shader object.
    fn destroy_shader(&self, id: ShaderId);

    /// Links a vertex and a fragment shader into a program.
    fn link_program(&self, vertex: ShaderId, fragment: ShaderId)
        -> Result<ProgramId, ProgramError>;

    /// Releases a linked program object.
    fn destroy_program(&self, id: ProgramId);

    /// Makes a program (or no program) current for subsequent draws.
    fn bind_program(&self, id: Option<ProgramId>);

    /// Looks up a named vertex attribute in a linked program.
    ///
    /// Returns `None` if the program does not expose the attribute; callers
    /// treat that as a soft miss, never an error.
    fn resolve_attribute(&self, program: ProgramId, name: &str) -> Option<AttributeHandle>;

    /// Looks up a named uniform in a linked program.
    ///
    /// Returns `None` if the program does not expose the uniform; callers
    /// treat that as a soft miss, never an error.
    fn resolve_uniform(&self, program: ProgramId, name: &str) -> Option<UniformHandle>;

    /// Uploads a single integer uniform.
    fn set_uniform_i32(&self, program: ProgramId, location: UniformHandle, value: i32);

    /// Uploads a single float uniform.
    fn set_uniform_f32(&self, program: ProgramId, location: UniformHandle, value: f32);

    /// Uploads a two-component float uniform.
    fn set_uniform_vec2(&self, program: ProgramId, location: UniformHandle, value: [f32; 2]);

    /// Uploads a three-component float uniform.
    fn set_uniform_vec3(&self, program: ProgramId, location: UniformHandle, value: [f32; 3]);

    /// Uploads a four-component float uniform.
    fn set_uniform_vec4(&self, program: ProgramId, location: UniformHandle, value: [f32; 4]);

    /// Uploads a 4x4 matrix uniform (column-major).
    fn set_uniform_mat4(&self, program: ProgramId, location: UniformHandle, value: &Mat4);

    /// Binds a texture to a unit and points a sampler uniform at it.
    fn set_uniform_texture(
        &self,
        program: ProgramId,
        location: UniformHandle,
        unit: u32,
        texture: TextureId,
    );

    /// Creates an offscreen render target.
    ///
    /// Returns the target handle and the handle of its color texture.
    fn create_render_target(
        &self,
        size: Extent2D,
        format: TextureFormat,
    ) -> Result<(RenderTargetId, TextureId), DriverCallError>;

    /// Releases an offscreen render target and its color texture.
    fn destroy_render_target(&self, id: RenderTargetId);

    /// Makes a render target (or the primary surface, `None`) current.
    fn bind_render_target(&self, id: Option<RenderTargetId>) -> Result<(), DriverCallError>;

    /// Draws non-indexed geometry with the currently bound program,
    /// declaration and render target.
    fn draw(&self, topology: PrimitiveTopology, vertices: Range<u32>)
        -> Result<(), DriverCallError>;
}

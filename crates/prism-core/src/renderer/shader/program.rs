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

//! Shader and program lifecycle management.
//!
//! GPU shader and program objects are owned by RAII handles whose
//! destructors release the underlying resource through the shared device.
//! A vertex shader reused by several programs of the same pass is shared
//! through an `Arc` and released exactly once, when the last referencing
//! program is dropped.
//!
//! Instead of a dirty-notification callback, a [`GpuProgram`] carries a
//! monotonically increasing *relink generation*. Consumers cache the
//! generation they resolved their uniform/attribute handles against and
//! re-resolve exactly once whenever it changes; steady-state per-frame code
//! never performs name-based lookups.

use crate::math::Mat4;
use crate::renderer::common::{
    AttributeHandle, ProgramId, ShaderId, ShaderStage, TextureId, UniformHandle,
};
use crate::renderer::error::ProgramError;
use crate::renderer::shader::language::ShadingLanguage;
use crate::renderer::traits::GraphicsDevice;
use std::sync::Arc;

/// An owned, compiled shader object.
///
/// Dropping the handle releases the device object.
#[derive(Debug)]
pub struct ShaderHandle {
    id: ShaderId,
    stage: ShaderStage,
    device: Arc<dyn GraphicsDevice>,
}

impl ShaderHandle {
    /// Compiles `source` for `stage` in the given language.
    pub fn compile(
        device: Arc<dyn GraphicsDevice>,
        stage: ShaderStage,
        language: ShadingLanguage,
        source: &str,
    ) -> Result<Self, ProgramError> {
        let id = device.compile_shader(stage, language, source)?;
        log::debug!("ShaderHandle: compiled {stage:?} shader {id:?} ({})", language.name());
        Ok(Self { id, stage, device })
    }

    /// The device handle of the shader.
    pub fn id(&self) -> ShaderId {
        self.id
    }

    /// The stage the shader was compiled for.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl Drop for ShaderHandle {
    fn drop(&mut self) {
        log::debug!("ShaderHandle: destroying {:?} shader {:?}", self.stage, self.id);
        self.device.destroy_shader(self.id);
    }
}

/// An owned, linked GPU program.
///
/// Holds its fragment shader exclusively and shares its vertex shader with
/// sibling programs of the same pass. Dropping the program releases the
/// program object; the shaders are released when their last owner drops.
#[derive(Debug)]
pub struct GpuProgram {
    id: ProgramId,
    language: ShadingLanguage,
    vertex: Arc<ShaderHandle>,
    fragment: ShaderHandle,
    generation: u64,
    device: Arc<dyn GraphicsDevice>,
}

impl GpuProgram {
    /// Links a program from a shared vertex shader and an owned fragment
    /// shader.
    pub fn link(
        device: Arc<dyn GraphicsDevice>,
        language: ShadingLanguage,
        vertex: Arc<ShaderHandle>,
        fragment: ShaderHandle,
    ) -> Result<Self, ProgramError> {
        let id = device.link_program(vertex.id(), fragment.id())?;
        log::debug!("GpuProgram: linked program {id:?} ({})", language.name());
        Ok(Self {
            id,
            language,
            vertex,
            fragment,
            generation: 0,
            device,
        })
    }

    /// The device handle of the program.
    pub fn id(&self) -> ProgramId {
        self.id
    }

    /// The shading language the program was built from.
    pub fn language(&self) -> ShadingLanguage {
        self.language
    }

    /// The shared vertex shader.
    pub fn vertex_shader(&self) -> &Arc<ShaderHandle> {
        &self.vertex
    }

    /// The relink generation.
    ///
    /// Incremented every time the program object is replaced; cached
    /// uniform and attribute handles resolved against an older generation
    /// are stale and must be re-resolved.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Destroys and re-links the program object from its shaders, bumping
    /// the relink generation.
    pub fn relink(&mut self) -> Result<(), ProgramError> {
        let id = self
            .device
            .link_program(self.vertex.id(), self.fragment.id())?;
        self.device.destroy_program(self.id);
        self.id = id;
        self.generation += 1;
        log::debug!(
            "GpuProgram: relinked as {id:?} (generation {})",
            self.generation
        );
        Ok(())
    }

    /// Makes the program current for subsequent draws.
    pub fn bind(&self) {
        self.device.bind_program(Some(self.id));
    }

    /// Looks up a named attribute. `None` is a soft miss.
    pub fn attribute(&self, name: &str) -> Option<AttributeHandle> {
        self.device.resolve_attribute(self.id, name)
    }

    /// Looks up a named uniform. `None` is a soft miss.
    pub fn uniform(&self, name: &str) -> Option<UniformHandle> {
        self.device.resolve_uniform(self.id, name)
    }

    // Every uniform setter checks its cached handle before use: an
    // unresolved handle silently skips that one binding rather than
    // failing the draw.

    /// Uploads an integer uniform if its handle resolved.
    pub fn set_uniform_i32(&self, location: Option<UniformHandle>, value: i32) {
        if let Some(location) = location {
            self.device.set_uniform_i32(self.id, location, value);
        }
    }

    /// Uploads a float uniform if its handle resolved.
    pub fn set_uniform_f32(&self, location: Option<UniformHandle>, value: f32) {
        if let Some(location) = location {
            self.device.set_uniform_f32(self.id, location, value);
        }
    }

    /// Uploads a two-component uniform if its handle resolved.
    pub fn set_uniform_vec2(&self, location: Option<UniformHandle>, value: [f32; 2]) {
        if let Some(location) = location {
            self.device.set_uniform_vec2(self.id, location, value);
        }
    }

    /// Uploads a three-component uniform if its handle resolved.
    pub fn set_uniform_vec3(&self, location: Option<UniformHandle>, value: [f32; 3]) {
        if let Some(location) = location {
            self.device.set_uniform_vec3(self.id, location, value);
        }
    }

    /// Uploads a four-component uniform if its handle resolved.
    pub fn set_uniform_vec4(&self, location: Option<UniformHandle>, value: [f32; 4]) {
        if let Some(location) = location {
            self.device.set_uniform_vec4(self.id, location, value);
        }
    }

    /// Uploads a matrix uniform if its handle resolved.
    pub fn set_uniform_mat4(&self, location: Option<UniformHandle>, value: &Mat4) {
        if let Some(location) = location {
            self.device.set_uniform_mat4(self.id, location, value);
        }
    }

    /// Binds a texture to a unit and points a sampler uniform at it, if the
    /// handle resolved.
    pub fn set_uniform_texture(
        &self,
        location: Option<UniformHandle>,
        unit: u32,
        texture: TextureId,
    ) {
        if let Some(location) = location {
            self.device
                .set_uniform_texture(self.id, location, unit, texture);
        }
    }
}

impl Drop for GpuProgram {
    fn drop(&mut self) {
        log::debug!("GpuProgram: destroying program {:?}", self.id);
        self.device.destroy_program(self.id);
    }
}

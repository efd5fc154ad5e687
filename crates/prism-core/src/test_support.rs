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

//! A counting in-memory graphics device shared by the crate's unit tests.

use crate::math::Mat4;
use crate::renderer::common::{
    AttributeHandle, Extent2D, PrimitiveTopology, ProgramId, RenderTargetId, ShaderId,
    ShaderStage, TextureFormat, TextureId, UniformHandle,
};
use crate::renderer::error::{DriverCallError, ProgramError};
use crate::renderer::shader::language::ShadingLanguage;
use crate::renderer::traits::GraphicsDevice;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A device that allocates real ids and counts every lifecycle call.
#[derive(Debug)]
pub(crate) struct CountingDevice {
    next_id: AtomicUsize,
    shaders_destroyed: AtomicUsize,
    programs_destroyed: AtomicUsize,
    uniform_uploads: AtomicUsize,
    targets_destroyed: AtomicUsize,
}

/// A point-in-time view of a [`CountingDevice`]'s counters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CounterSnapshot {
    shaders_destroyed: usize,
    programs_destroyed: usize,
    uniform_uploads: usize,
    targets_destroyed: usize,
}

impl CounterSnapshot {
    pub(crate) fn shaders_destroyed(&self) -> usize {
        self.shaders_destroyed
    }
    pub(crate) fn programs_destroyed(&self) -> usize {
        self.programs_destroyed
    }
    pub(crate) fn uniform_uploads(&self) -> usize {
        self.uniform_uploads
    }
    pub(crate) fn targets_destroyed(&self) -> usize {
        self.targets_destroyed
    }
}

impl CountingDevice {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(1),
            shaders_destroyed: AtomicUsize::new(0),
            programs_destroyed: AtomicUsize::new(0),
            uniform_uploads: AtomicUsize::new(0),
            targets_destroyed: AtomicUsize::new(0),
        }
    }

    pub(crate) fn counters(&self) -> CounterSnapshot {
        CounterSnapshot {
            shaders_destroyed: self.shaders_destroyed.load(Ordering::Relaxed),
            programs_destroyed: self.programs_destroyed.load(Ordering::Relaxed),
            uniform_uploads: self.uniform_uploads.load(Ordering::Relaxed),
            targets_destroyed: self.targets_destroyed.load(Ordering::Relaxed),
        }
    }

    fn next(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl GraphicsDevice for CountingDevice {
    fn default_shader_language(&self) -> String {
        ShadingLanguage::GLSL_NAME.to_string()
    }

    fn compile_shader(
        &self,
        _stage: ShaderStage,
        _language: ShadingLanguage,
        _source: &str,
    ) -> Result<ShaderId, ProgramError> {
        Ok(ShaderId(self.next()))
    }

    fn destroy_shader(&self, _id: ShaderId) {
        self.shaders_destroyed.fetch_add(1, Ordering::Relaxed);
    }

    fn link_program(
        &self,
        _vertex: ShaderId,
        _fragment: ShaderId,
    ) -> Result<ProgramId, ProgramError> {
        Ok(ProgramId(self.next()))
    }

    fn destroy_program(&self, _id: ProgramId) {
        self.programs_destroyed.fetch_add(1, Ordering::Relaxed);
    }

    fn bind_program(&self, _id: Option<ProgramId>) {}

    fn resolve_attribute(&self, _program: ProgramId, _name: &str) -> Option<AttributeHandle> {
        Some(AttributeHandle(self.next() as u32))
    }

    fn resolve_uniform(&self, _program: ProgramId, _name: &str) -> Option<UniformHandle> {
        Some(UniformHandle(self.next() as u32))
    }

    fn set_uniform_i32(&self, _program: ProgramId, _location: UniformHandle, _value: i32) {
        self.uniform_uploads.fetch_add(1, Ordering::Relaxed);
    }

    fn set_uniform_f32(&self, _program: ProgramId, _location: UniformHandle, _value: f32) {
        self.uniform_uploads.fetch_add(1, Ordering::Relaxed);
    }

    fn set_uniform_vec2(&self, _program: ProgramId, _location: UniformHandle, _value: [f32; 2]) {
        self.uniform_uploads.fetch_add(1, Ordering::Relaxed);
    }

    fn set_uniform_vec3(&self, _program: ProgramId, _location: UniformHandle, _value: [f32; 3]) {
        self.uniform_uploads.fetch_add(1, Ordering::Relaxed);
    }

    fn set_uniform_vec4(&self, _program: ProgramId, _location: UniformHandle, _value: [f32; 4]) {
        self.uniform_uploads.fetch_add(1, Ordering::Relaxed);
    }

    fn set_uniform_mat4(&self, _program: ProgramId, _location: UniformHandle, _value: &Mat4) {
        self.uniform_uploads.fetch_add(1, Ordering::Relaxed);
    }

    fn set_uniform_texture(
        &self,
        _program: ProgramId,
        _location: UniformHandle,
        _unit: u32,
        _texture: TextureId,
    ) {
        self.uniform_uploads.fetch_add(1, Ordering::Relaxed);
    }

    fn create_render_target(
        &self,
        _size: Extent2D,
        _format: TextureFormat,
    ) -> Result<(RenderTargetId, TextureId), DriverCallError> {
        Ok((RenderTargetId(self.next()), TextureId(self.next())))
    }

    fn destroy_render_target(&self, _id: RenderTargetId) {
        self.targets_destroyed.fetch_add(1, Ordering::Relaxed);
    }

    fn bind_render_target(&self, _id: Option<RenderTargetId>) -> Result<(), DriverCallError> {
        Ok(())
    }

    fn draw(
        &self,
        _topology: PrimitiveTopology,
        _vertices: Range<u32>,
    ) -> Result<(), DriverCallError> {
        Ok(())
    }
}

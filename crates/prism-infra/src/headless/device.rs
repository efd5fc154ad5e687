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

//! The headless graphics device.

use prism_core::math::Mat4;
use prism_core::renderer::common::{
    AttributeHandle, Extent2D, PrimitiveTopology, ProgramId, RenderTargetId, ShaderId,
    ShaderStage, TextureFormat, TextureId, UniformHandle,
};
use prism_core::renderer::error::{DriverCallError, ProgramError};
use prism_core::renderer::shader::ShadingLanguage;
use prism_core::renderer::traits::GraphicsDevice;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct ShaderEntry {
    stage: ShaderStage,
    language: ShadingLanguage,
}

#[allow(dead_code)]
#[derive(Debug)]
struct ProgramEntry {
    vertex: ShaderId,
    fragment: ShaderId,
}

#[derive(Debug)]
struct TargetEntry {
    size: Extent2D,
    format: TextureFormat,
    color_texture: TextureId,
}

/// The internal, non-clonable state of the headless device, shared behind
/// an `Arc` by every [`HeadlessDevice`] handle.
#[derive(Debug)]
struct HeadlessDeviceInternal {
    shading_language: Mutex<String>,
    missing_uniforms: Mutex<HashSet<String>>,

    shaders: Mutex<HashMap<ShaderId, ShaderEntry>>,
    programs: Mutex<HashMap<ProgramId, ProgramEntry>>,
    targets: Mutex<HashMap<RenderTargetId, TargetEntry>>,
    uniform_locations: Mutex<HashMap<(ProgramId, String), UniformHandle>>,
    attribute_locations: Mutex<HashMap<(ProgramId, String), AttributeHandle>>,
    bound_program: Mutex<Option<ProgramId>>,
    bound_target: Mutex<Option<RenderTargetId>>,

    next_shader_id: AtomicUsize,
    next_program_id: AtomicUsize,
    next_target_id: AtomicUsize,
    next_texture_id: AtomicUsize,
    next_location: AtomicUsize,

    shaders_compiled: AtomicUsize,
    shaders_destroyed: AtomicUsize,
    programs_linked: AtomicUsize,
    programs_destroyed: AtomicUsize,
    name_lookups: AtomicUsize,
    uniform_uploads: AtomicUsize,
    targets_created: AtomicUsize,
    targets_destroyed: AtomicUsize,
    draws: AtomicUsize,
}

/// A point-in-time snapshot of a headless device's lifetime counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessDeviceStats {
    /// Shaders compiled since creation.
    pub shaders_compiled: usize,
    /// Shaders destroyed since creation.
    pub shaders_destroyed: usize,
    /// Programs linked since creation.
    pub programs_linked: usize,
    /// Programs destroyed since creation.
    pub programs_destroyed: usize,
    /// Name-based uniform and attribute lookups performed.
    pub name_lookups: usize,
    /// Uniform values uploaded (texture bindings included).
    pub uniform_uploads: usize,
    /// Render targets created since creation.
    pub targets_created: usize,
    /// Render targets destroyed since creation.
    pub targets_destroyed: usize,
    /// Draw calls issued.
    pub draws: usize,
    /// Shader objects currently alive.
    pub live_shaders: usize,
    /// Program objects currently alive.
    pub live_programs: usize,
    /// Render targets currently alive.
    pub live_targets: usize,
}

/// A clonable, thread-safe handle to the headless graphics device.
///
/// The device accepts every structurally valid call: resources get real,
/// unique ids, handle lifetimes are enforced (destroying a shader a program
/// still links against is caught the way a hardware backend would), and no
/// pixels are produced anywhere.
#[derive(Clone, Debug)]
pub struct HeadlessDevice {
    internal: Arc<HeadlessDeviceInternal>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    /// Creates a device reporting GLSL as its shading language.
    pub fn new() -> Self {
        Self::with_shading_language(ShadingLanguage::GLSL_NAME)
    }

    /// Creates a device reporting the given shading language name.
    pub fn with_shading_language(name: &str) -> Self {
        Self {
            internal: Arc::new(HeadlessDeviceInternal {
                shading_language: Mutex::new(name.to_string()),
                missing_uniforms: Mutex::new(HashSet::new()),
                shaders: Mutex::new(HashMap::new()),
                programs: Mutex::new(HashMap::new()),
                targets: Mutex::new(HashMap::new()),
                uniform_locations: Mutex::new(HashMap::new()),
                attribute_locations: Mutex::new(HashMap::new()),
                bound_program: Mutex::new(None),
                bound_target: Mutex::new(None),
                next_shader_id: AtomicUsize::new(1),
                next_program_id: AtomicUsize::new(1),
                next_target_id: AtomicUsize::new(1),
                next_texture_id: AtomicUsize::new(1),
                next_location: AtomicUsize::new(0),
                shaders_compiled: AtomicUsize::new(0),
                shaders_destroyed: AtomicUsize::new(0),
                programs_linked: AtomicUsize::new(0),
                programs_destroyed: AtomicUsize::new(0),
                name_lookups: AtomicUsize::new(0),
                uniform_uploads: AtomicUsize::new(0),
                targets_created: AtomicUsize::new(0),
                targets_destroyed: AtomicUsize::new(0),
                draws: AtomicUsize::new(0),
            }),
        }
    }

    /// Changes the reported shading language.
    ///
    /// Program managers pick this up on their next frame and rebuild.
    pub fn set_shading_language(&self, name: &str) {
        *self.internal.shading_language.lock().unwrap() = name.to_string();
    }

    /// Makes uniform resolution miss for the given name, for exercising
    /// the soft-skip path.
    pub fn mark_uniform_missing(&self, name: &str) {
        self.internal
            .missing_uniforms
            .lock()
            .unwrap()
            .insert(name.to_string());
    }

    /// The render target draws currently go to, `None` for the primary
    /// surface.
    pub fn bound_render_target(&self) -> Option<RenderTargetId> {
        *self.internal.bound_target.lock().unwrap()
    }

    /// The program currently bound for draws.
    pub fn bound_program(&self) -> Option<ProgramId> {
        *self.internal.bound_program.lock().unwrap()
    }

    /// Snapshots the lifetime counters.
    pub fn stats(&self) -> HeadlessDeviceStats {
        let i = &self.internal;
        HeadlessDeviceStats {
            shaders_compiled: i.shaders_compiled.load(Ordering::Relaxed),
            shaders_destroyed: i.shaders_destroyed.load(Ordering::Relaxed),
            programs_linked: i.programs_linked.load(Ordering::Relaxed),
            programs_destroyed: i.programs_destroyed.load(Ordering::Relaxed),
            name_lookups: i.name_lookups.load(Ordering::Relaxed),
            uniform_uploads: i.uniform_uploads.load(Ordering::Relaxed),
            targets_created: i.targets_created.load(Ordering::Relaxed),
            targets_destroyed: i.targets_destroyed.load(Ordering::Relaxed),
            draws: i.draws.load(Ordering::Relaxed),
            live_shaders: i.shaders.lock().unwrap().len(),
            live_programs: i.programs.lock().unwrap().len(),
            live_targets: i.targets.lock().unwrap().len(),
        }
    }

    fn count_upload(&self) {
        self.internal.uniform_uploads.fetch_add(1, Ordering::Relaxed);
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn default_shader_language(&self) -> String {
        self.internal.shading_language.lock().unwrap().clone()
    }

    fn compile_shader(
        &self,
        stage: ShaderStage,
        language: ShadingLanguage,
        source: &str,
    ) -> Result<ShaderId, ProgramError> {
        if source.trim().is_empty() {
            return Err(ProgramError::CompilationFailed {
                stage,
                details: "empty shader source".to_string(),
            });
        }
        let id = ShaderId(self.internal.next_shader_id.fetch_add(1, Ordering::Relaxed));
        self.internal
            .shaders
            .lock()
            .unwrap()
            .insert(id, ShaderEntry { stage, language });
        self.internal.shaders_compiled.fetch_add(1, Ordering::Relaxed);
        log::debug!("HeadlessDevice: compiled {stage:?} shader {id:?}");
        Ok(id)
    }

    fn destroy_shader(&self, id: ShaderId) {
        if self.internal.shaders.lock().unwrap().remove(&id).is_some() {
            self.internal.shaders_destroyed.fetch_add(1, Ordering::Relaxed);
        } else {
            log::warn!("HeadlessDevice: destroy_shader on unknown shader {id:?}");
        }
    }

    fn link_program(
        &self,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<ProgramId, ProgramError> {
        {
            let shaders = self.internal.shaders.lock().unwrap();
            let v = shaders
                .get(&vertex)
                .ok_or(ProgramError::InvalidShader { id: vertex })?;
            let f = shaders
                .get(&fragment)
                .ok_or(ProgramError::InvalidShader { id: fragment })?;
            if v.stage != ShaderStage::Vertex || f.stage != ShaderStage::Fragment {
                return Err(ProgramError::LinkFailed {
                    details: "attached shaders do not form a vertex/fragment pair".to_string(),
                });
            }
            if v.language != f.language {
                return Err(ProgramError::LinkFailed {
                    details: "attached shaders were compiled from different languages"
                        .to_string(),
                });
            }
        }
        let id = ProgramId(self.internal.next_program_id.fetch_add(1, Ordering::Relaxed));
        self.internal
            .programs
            .lock()
            .unwrap()
            .insert(id, ProgramEntry { vertex, fragment });
        self.internal.programs_linked.fetch_add(1, Ordering::Relaxed);
        log::debug!("HeadlessDevice: linked program {id:?}");
        Ok(id)
    }

    fn destroy_program(&self, id: ProgramId) {
        if self.internal.programs.lock().unwrap().remove(&id).is_some() {
            self.internal.programs_destroyed.fetch_add(1, Ordering::Relaxed);
            let mut bound = self.internal.bound_program.lock().unwrap();
            if *bound == Some(id) {
                *bound = None;
            }
        } else {
            log::warn!("HeadlessDevice: destroy_program on unknown program {id:?}");
        }
    }

    fn bind_program(&self, id: Option<ProgramId>) {
        *self.internal.bound_program.lock().unwrap() = id;
    }

    fn resolve_attribute(&self, program: ProgramId, name: &str) -> Option<AttributeHandle> {
        self.internal.name_lookups.fetch_add(1, Ordering::Relaxed);
        if !self.internal.programs.lock().unwrap().contains_key(&program) {
            return None;
        }
        let mut locations = self.internal.attribute_locations.lock().unwrap();
        let next = &self.internal.next_location;
        Some(
            *locations
                .entry((program, name.to_string()))
                .or_insert_with(|| AttributeHandle(next.fetch_add(1, Ordering::Relaxed) as u32)),
        )
    }

    fn resolve_uniform(&self, program: ProgramId, name: &str) -> Option<UniformHandle> {
        self.internal.name_lookups.fetch_add(1, Ordering::Relaxed);
        if !self.internal.programs.lock().unwrap().contains_key(&program) {
            return None;
        }
        if self.internal.missing_uniforms.lock().unwrap().contains(name) {
            return None;
        }
        let mut locations = self.internal.uniform_locations.lock().unwrap();
        let next = &self.internal.next_location;
        Some(
            *locations
                .entry((program, name.to_string()))
                .or_insert_with(|| UniformHandle(next.fetch_add(1, Ordering::Relaxed) as u32)),
        )
    }

    fn set_uniform_i32(&self, _program: ProgramId, _location: UniformHandle, _value: i32) {
        self.count_upload();
    }

    fn set_uniform_f32(&self, _program: ProgramId, _location: UniformHandle, _value: f32) {
        self.count_upload();
    }

    fn set_uniform_vec2(&self, _program: ProgramId, _location: UniformHandle, _value: [f32; 2]) {
        self.count_upload();
    }

    fn set_uniform_vec3(&self, _program: ProgramId, _location: UniformHandle, _value: [f32; 3]) {
        self.count_upload();
    }

    fn set_uniform_vec4(&self, _program: ProgramId, _location: UniformHandle, _value: [f32; 4]) {
        self.count_upload();
    }

    fn set_uniform_mat4(&self, _program: ProgramId, _location: UniformHandle, _value: &Mat4) {
        self.count_upload();
    }

    fn set_uniform_texture(
        &self,
        _program: ProgramId,
        _location: UniformHandle,
        _unit: u32,
        _texture: TextureId,
    ) {
        self.count_upload();
    }

    fn create_render_target(
        &self,
        size: Extent2D,
        format: TextureFormat,
    ) -> Result<(RenderTargetId, TextureId), DriverCallError> {
        let id = RenderTargetId(self.internal.next_target_id.fetch_add(1, Ordering::Relaxed));
        let color_texture =
            TextureId(self.internal.next_texture_id.fetch_add(1, Ordering::Relaxed));
        self.internal.targets.lock().unwrap().insert(
            id,
            TargetEntry {
                size,
                format,
                color_texture,
            },
        );
        self.internal.targets_created.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "HeadlessDevice: created {}x{} {format:?} render target {id:?}",
            size.width,
            size.height
        );
        Ok((id, color_texture))
    }

    fn destroy_render_target(&self, id: RenderTargetId) {
        if self.internal.targets.lock().unwrap().remove(&id).is_some() {
            self.internal.targets_destroyed.fetch_add(1, Ordering::Relaxed);
            let mut bound = self.internal.bound_target.lock().unwrap();
            if *bound == Some(id) {
                *bound = None;
            }
        } else {
            log::warn!("HeadlessDevice: destroy_render_target on unknown target {id:?}");
        }
    }

    fn bind_render_target(&self, id: Option<RenderTargetId>) -> Result<(), DriverCallError> {
        if let Some(id) = id {
            if !self.internal.targets.lock().unwrap().contains_key(&id) {
                return Err(DriverCallError {
                    call: "bind_render_target",
                    details: format!("unknown render target {id:?}"),
                });
            }
        }
        *self.internal.bound_target.lock().unwrap() = id;
        Ok(())
    }

    fn draw(
        &self,
        _topology: PrimitiveTopology,
        _vertices: Range<u32>,
    ) -> Result<(), DriverCallError> {
        if self.internal.bound_program.lock().unwrap().is_none() {
            return Err(DriverCallError {
                call: "draw",
                details: "no program bound".to_string(),
            });
        }
        self.internal.draws.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

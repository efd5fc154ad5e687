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

//! The headless fixed-function driver.

use prism_core::math::{LinearRgba, Mat4, Vec4};
use prism_core::renderer::caps::DeviceCapabilities;
use prism_core::renderer::common::VertexBufferId;
use prism_core::renderer::error::DriverCallError;
use prism_core::renderer::state::{
    FixedLight, MaterialStateId, RenderStateId, TextureStageStateId, TransformSlot,
    VertexDeclaration,
};
use prism_core::renderer::traits::FixedFunctionDriver;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct WordTable {
    render: HashMap<RenderStateId, u32>,
    stages: HashMap<(u32, TextureStageStateId), u32>,
    materials: HashMap<MaterialStateId, u32>,
    streams: HashMap<u32, (VertexBufferId, u32)>,
    declaration_attributes: Option<usize>,
}

#[derive(Debug, Default)]
struct RecorderInner {
    render_states: AtomicUsize,
    colors: AtomicUsize,
    texture_stage_states: AtomicUsize,
    material_states: AtomicUsize,
    transforms: AtomicUsize,
    texture_transforms: AtomicUsize,
    lights: AtomicUsize,
    clip_planes: AtomicUsize,
    buffer_binds: AtomicUsize,
    declaration_installs: AtomicUsize,
    words: Mutex<WordTable>,
}

/// A clonable view of everything a [`HeadlessDriver`] has been asked to do.
///
/// The state cache takes exclusive ownership of its driver; tests and tools
/// keep a recorder handle instead and read call counts and last-applied
/// words through it.
#[derive(Debug, Clone, Default)]
pub struct DriverRecorder {
    inner: Arc<RecorderInner>,
}

impl DriverRecorder {
    /// The number of render state calls applied.
    pub fn render_state_calls(&self) -> usize {
        self.inner.render_states.load(Ordering::Relaxed)
    }

    /// The number of vertex color calls applied.
    pub fn color_calls(&self) -> usize {
        self.inner.colors.load(Ordering::Relaxed)
    }

    /// The number of texture stage state calls applied.
    pub fn texture_stage_state_calls(&self) -> usize {
        self.inner.texture_stage_states.load(Ordering::Relaxed)
    }

    /// The number of material state calls applied.
    pub fn material_state_calls(&self) -> usize {
        self.inner.material_states.load(Ordering::Relaxed)
    }

    /// The number of transform calls applied, texture transforms included.
    pub fn transform_calls(&self) -> usize {
        self.inner.transforms.load(Ordering::Relaxed)
    }

    /// The number of texture transform calls applied.
    pub fn texture_transform_calls(&self) -> usize {
        self.inner.texture_transforms.load(Ordering::Relaxed)
    }

    /// The number of light calls applied.
    pub fn light_calls(&self) -> usize {
        self.inner.lights.load(Ordering::Relaxed)
    }

    /// The number of clip plane calls applied.
    pub fn clip_plane_calls(&self) -> usize {
        self.inner.clip_planes.load(Ordering::Relaxed)
    }

    /// The number of vertex buffer bind calls applied.
    pub fn buffer_bind_calls(&self) -> usize {
        self.inner.buffer_binds.load(Ordering::Relaxed)
    }

    /// The number of vertex declaration installs.
    pub fn declaration_installs(&self) -> usize {
        self.inner.declaration_installs.load(Ordering::Relaxed)
    }

    /// Every driver call made so far, across all categories.
    pub fn total_calls(&self) -> usize {
        self.render_state_calls()
            + self.color_calls()
            + self.texture_stage_state_calls()
            + self.material_state_calls()
            + self.transform_calls()
            + self.light_calls()
            + self.clip_plane_calls()
            + self.buffer_bind_calls()
            + self.declaration_installs()
    }

    /// The last translated word applied for a render state.
    pub fn render_word(&self, id: RenderStateId) -> Option<u32> {
        self.inner.words.lock().unwrap().render.get(&id).copied()
    }

    /// The last translated word applied for a texture stage state.
    pub fn texture_stage_word(&self, stage: u32, id: TextureStageStateId) -> Option<u32> {
        self.inner
            .words
            .lock()
            .unwrap()
            .stages
            .get(&(stage, id))
            .copied()
    }

    /// The last word applied for a material state.
    pub fn material_word(&self, id: MaterialStateId) -> Option<u32> {
        self.inner.words.lock().unwrap().materials.get(&id).copied()
    }

    /// The buffer and offset currently bound to a stream.
    pub fn stream_binding(&self, stream: u32) -> Option<(VertexBufferId, u32)> {
        self.inner
            .words
            .lock()
            .unwrap()
            .streams
            .get(&stream)
            .copied()
    }

    /// The attribute count of the most recently installed declaration.
    pub fn installed_declaration_attributes(&self) -> Option<usize> {
        self.inner.words.lock().unwrap().declaration_attributes
    }
}

/// A fixed-function driver that applies nothing and records everything.
///
/// All arguments it receives are already validated and translated by the
/// state cache, so every call succeeds.
#[derive(Debug, Default)]
pub struct HeadlessDriver {
    caps: DeviceCapabilities,
    recorder: DriverRecorder,
}

impl HeadlessDriver {
    /// Creates a driver reporting the given capability limits.
    pub fn new(caps: DeviceCapabilities) -> Self {
        Self {
            caps,
            recorder: DriverRecorder::default(),
        }
    }

    /// A recorder handle that stays readable after the driver has been
    /// moved into a state cache.
    pub fn recorder(&self) -> DriverRecorder {
        self.recorder.clone()
    }
}

impl FixedFunctionDriver for HeadlessDriver {
    fn capabilities(&self) -> DeviceCapabilities {
        self.caps
    }

    fn set_render_state(&mut self, id: RenderStateId, word: u32) -> Result<(), DriverCallError> {
        let inner = &self.recorder.inner;
        inner.render_states.fetch_add(1, Ordering::Relaxed);
        inner.words.lock().unwrap().render.insert(id, word);
        Ok(())
    }

    fn set_color(&mut self, _color: LinearRgba) -> Result<(), DriverCallError> {
        self.recorder.inner.colors.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn set_texture_stage_state(
        &mut self,
        stage: u32,
        id: TextureStageStateId,
        word: u32,
    ) -> Result<(), DriverCallError> {
        let inner = &self.recorder.inner;
        inner.texture_stage_states.fetch_add(1, Ordering::Relaxed);
        inner.words.lock().unwrap().stages.insert((stage, id), word);
        Ok(())
    }

    fn set_material_state(
        &mut self,
        id: MaterialStateId,
        word: u32,
    ) -> Result<(), DriverCallError> {
        let inner = &self.recorder.inner;
        inner.material_states.fetch_add(1, Ordering::Relaxed);
        inner.words.lock().unwrap().materials.insert(id, word);
        Ok(())
    }

    fn set_transform(&mut self, slot: TransformSlot, _matrix: &Mat4) -> Result<(), DriverCallError> {
        let inner = &self.recorder.inner;
        inner.transforms.fetch_add(1, Ordering::Relaxed);
        if matches!(slot, TransformSlot::Texture(_)) {
            inner.texture_transforms.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn set_light(
        &mut self,
        _index: u32,
        _light: Option<&FixedLight>,
    ) -> Result<(), DriverCallError> {
        self.recorder.inner.lights.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn set_clip_plane(&mut self, _index: u32, _plane: Option<Vec4>) -> Result<(), DriverCallError> {
        self.recorder
            .inner
            .clip_planes
            .fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn bind_vertex_buffer(
        &mut self,
        stream: u32,
        binding: Option<(VertexBufferId, u32)>,
    ) -> Result<(), DriverCallError> {
        let inner = &self.recorder.inner;
        inner.buffer_binds.fetch_add(1, Ordering::Relaxed);
        let mut words = inner.words.lock().unwrap();
        match binding {
            Some(binding) => {
                words.streams.insert(stream, binding);
            }
            None => {
                words.streams.remove(&stream);
            }
        }
        Ok(())
    }

    fn install_vertex_declaration(
        &mut self,
        declaration: &VertexDeclaration,
    ) -> Result<(), DriverCallError> {
        let inner = &self.recorder.inner;
        inner.declaration_installs.fetch_add(1, Ordering::Relaxed);
        inner.words.lock().unwrap().declaration_attributes =
            Some(declaration.attribute_count());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_survives_moving_the_driver() {
        let driver = HeadlessDriver::new(DeviceCapabilities::default());
        let recorder = driver.recorder();
        let mut boxed: Box<dyn FixedFunctionDriver> = Box::new(driver);

        boxed.set_render_state(RenderStateId::ZEnable, 1).unwrap();
        boxed.set_render_state(RenderStateId::FogEnable, 0).unwrap();
        assert_eq!(recorder.render_state_calls(), 2);
        assert_eq!(recorder.render_word(RenderStateId::ZEnable), Some(1));
        assert_eq!(recorder.render_word(RenderStateId::FogEnable), Some(0));
    }

    #[test]
    fn texture_transforms_are_counted_separately() {
        let mut driver = HeadlessDriver::new(DeviceCapabilities::default());
        let recorder = driver.recorder();
        driver
            .set_transform(TransformSlot::View, &Mat4::IDENTITY)
            .unwrap();
        driver
            .set_transform(TransformSlot::Texture(3), &Mat4::IDENTITY)
            .unwrap();
        assert_eq!(recorder.transform_calls(), 2);
        assert_eq!(recorder.texture_transform_calls(), 1);
    }

    #[test]
    fn stream_bindings_track_bind_and_clear() {
        let mut driver = HeadlessDriver::new(DeviceCapabilities::default());
        let recorder = driver.recorder();
        driver
            .bind_vertex_buffer(1, Some((VertexBufferId(7), 16)))
            .unwrap();
        assert_eq!(recorder.stream_binding(1), Some((VertexBufferId(7), 16)));
        driver.bind_vertex_buffer(1, None).unwrap();
        assert_eq!(recorder.stream_binding(1), None);
        assert_eq!(recorder.buffer_bind_calls(), 2);
    }
}

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

//! The fixed-function state cache.
//!
//! [`StateCache`] is the single authority over all fixed-function and
//! texture-stage driver state. Every setter follows the same discipline:
//! validate, diff against the cached value, translate to the backend word,
//! issue the driver call, and only then commit the cache. A failed driver
//! call therefore leaves the cache at its previous value, so the next
//! attempt is not skipped as a false no-op.
//!
//! No other component may call the driver directly; bypassing the cache
//! would desynchronize it and cause incorrect no-op skips afterwards.

use super::declaration::{StreamBinding, VertexBuffer, VertexDeclaration};
use super::ids::{
    MaterialStateId, RenderStateId, TexCoordGenMode, TextureStageStateId, TransformSlot,
};
use super::light::FixedLight;
use super::translate::BackendKind;
use crate::math::{LinearRgba, Mat4, Vec4};
use crate::renderer::caps::DeviceCapabilities;
use crate::renderer::error::StateError;
use crate::renderer::traits::FixedFunctionDriver;
use std::sync::Arc;

/// Which declaration the last pre-draw check installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationSource {
    /// A single stream was bound; the buffer's own declaration was used.
    PerBuffer,
    /// Multiple streams were bound; a composite declaration was built.
    Composite,
}

/// A cached slot that distinguishes "never touched" from "explicitly
/// cleared".
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cached<T> {
    Untouched,
    Cleared,
    Value(T),
}

/// The fixed-function state cache. See the module docs for the contract.
#[derive(Debug)]
pub struct StateCache {
    driver: Box<dyn FixedFunctionDriver>,
    backend: BackendKind,
    caps: DeviceCapabilities,

    render_states: [Option<u32>; RenderStateId::COUNT],
    color: Option<LinearRgba>,
    projection: Option<Mat4>,
    view: Option<Mat4>,
    world: Option<Mat4>,
    /// Per-stage texture matrices as set by the application. The matrix the
    /// driver sees may differ: reflection mapping substitutes the transpose
    /// of the view matrix.
    texture_matrices: Vec<Option<Mat4>>,
    texture_stage_states: Vec<[Option<u32>; TextureStageStateId::COUNT]>,
    material_states: [Option<u32>; MaterialStateId::COUNT],
    lights: Vec<Cached<FixedLight>>,
    clip_planes: Vec<Cached<Vec4>>,

    streams: Vec<Option<StreamBinding>>,
    active_streams: u32,
    declaration_dirty: bool,
    composite: Option<VertexDeclaration>,
    last_source: Option<DeclarationSource>,
}

impl StateCache {
    /// Creates a cache over the given driver.
    ///
    /// The driver's capabilities are queried exactly once here; all cached
    /// tables start in the "never set" state, so the first real set of any
    /// state always reaches the driver.
    pub fn new(driver: Box<dyn FixedFunctionDriver>, backend: BackendKind) -> Self {
        let caps = driver.capabilities();
        log::info!(
            "StateCache: created for {backend:?} (lights {}, clip planes {}, texture units {}, vertex streams {})",
            caps.max_active_lights,
            caps.max_clip_planes,
            caps.max_texture_units,
            caps.max_vertex_streams,
        );
        Self {
            driver,
            backend,
            caps,
            render_states: [None; RenderStateId::COUNT],
            color: None,
            projection: None,
            view: None,
            world: None,
            texture_matrices: vec![None; caps.max_texture_units as usize],
            texture_stage_states: vec![
                [None; TextureStageStateId::COUNT];
                caps.max_texture_units as usize
            ],
            material_states: [None; MaterialStateId::COUNT],
            lights: vec![Cached::Untouched; caps.max_active_lights as usize],
            clip_planes: vec![Cached::Untouched; caps.max_clip_planes as usize],
            streams: vec![None; caps.max_vertex_streams as usize],
            active_streams: 0,
            declaration_dirty: false,
            composite: None,
            last_source: None,
        }
    }

    /// The capability limits queried at construction.
    pub fn capabilities(&self) -> DeviceCapabilities {
        self.caps
    }

    /// The backend whose translation tables are in effect.
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    // --- Render states ---

    /// Sets a render state, skipping the driver if the value is unchanged.
    pub fn set_render_state(&mut self, id: RenderStateId, value: u32) -> Result<(), StateError> {
        id.validate(value)?;
        let slot = id as usize;
        if self.render_states[slot] == Some(value) {
            return Ok(());
        }
        let word = self.backend.render_state_word(id, value)?;
        self.driver.set_render_state(id, word)?;
        self.render_states[slot] = Some(value);
        Ok(())
    }

    /// The cached value of a render state, or `None` if never set.
    pub fn render_state(&self, id: RenderStateId) -> Option<u32> {
        self.render_states[id as usize]
    }

    /// The documented default value of a render state.
    pub fn default_render_state(&self, id: RenderStateId) -> u32 {
        id.default_value()
    }

    /// Sets the current vertex color.
    pub fn set_color(&mut self, color: LinearRgba) -> Result<(), StateError> {
        if self.color == Some(color) {
            return Ok(());
        }
        self.driver.set_color(color)?;
        self.color = Some(color);
        Ok(())
    }

    // --- Texture stage states ---

    /// Sets a per-stage texture state, skipping the driver if unchanged.
    ///
    /// Switching the stage's coordinate generation into or out of
    /// reflection mapping forces one recomputation of the stage's texture
    /// transform (the transition edge, not every subsequent call).
    pub fn set_texture_stage_state(
        &mut self,
        stage: u32,
        id: TextureStageStateId,
        value: u32,
    ) -> Result<(), StateError> {
        if stage >= self.caps.max_texture_units {
            return Err(StateError::StageOutOfRange {
                stage,
                limit: self.caps.max_texture_units,
            });
        }
        id.validate(value)?;
        let slot = id as usize;
        let cached = self.texture_stage_states[stage as usize][slot];
        if cached == Some(value) {
            return Ok(());
        }
        let word = self.backend.texture_stage_state_word(id, value)?;
        self.driver.set_texture_stage_state(stage, id, word)?;
        self.texture_stage_states[stage as usize][slot] = Some(value);

        if id == TextureStageStateId::TexGen {
            let reflection = TexCoordGenMode::ReflectionMap.to_word();
            let was = cached == Some(reflection);
            let is = value == reflection;
            if was != is {
                self.apply_texture_matrix(stage)?;
            }
        }
        Ok(())
    }

    /// The cached value of a per-stage texture state.
    ///
    /// Returns `None` for an out-of-range stage or a never-set state.
    pub fn texture_stage_state(&self, stage: u32, id: TextureStageStateId) -> Option<u32> {
        self.texture_stage_states
            .get(stage as usize)
            .and_then(|states| states[id as usize])
    }

    /// The documented default value of a per-stage texture state.
    pub fn default_texture_stage_state(&self, id: TextureStageStateId) -> u32 {
        id.default_value()
    }

    // --- Material states ---

    /// Sets a material state, skipping the driver if unchanged.
    pub fn set_material_state(
        &mut self,
        id: MaterialStateId,
        value: u32,
    ) -> Result<(), StateError> {
        let slot = id as usize;
        if self.material_states[slot] == Some(value) {
            return Ok(());
        }
        let word = self.backend.material_state_word(id, value)?;
        self.driver.set_material_state(id, word)?;
        self.material_states[slot] = Some(value);
        Ok(())
    }

    /// The cached value of a material state, or `None` if never set.
    pub fn material_state(&self, id: MaterialStateId) -> Option<u32> {
        self.material_states[id as usize]
    }

    /// The documented default value of a material state.
    pub fn default_material_state(&self, id: MaterialStateId) -> u32 {
        id.default_value()
    }

    // --- Transforms ---

    /// Sets a transform matrix, skipping the driver if unchanged.
    ///
    /// Setting the view matrix recomputes the texture transform of every
    /// stage currently in reflection mode, since those stages derive their
    /// matrix from the view. Setting a texture transform on a stage in
    /// reflection mode caches the matrix but keeps the reflection-derived
    /// transform installed.
    pub fn set_transform(&mut self, slot: TransformSlot, matrix: &Mat4) -> Result<(), StateError> {
        match slot {
            TransformSlot::Projection => {
                if self.projection.as_ref() == Some(matrix) {
                    return Ok(());
                }
                self.driver.set_transform(slot, matrix)?;
                self.projection = Some(*matrix);
            }
            TransformSlot::World => {
                if self.world.as_ref() == Some(matrix) {
                    return Ok(());
                }
                self.driver.set_transform(slot, matrix)?;
                self.world = Some(*matrix);
            }
            TransformSlot::View => {
                if self.view.as_ref() == Some(matrix) {
                    return Ok(());
                }
                self.driver.set_transform(slot, matrix)?;
                self.view = Some(*matrix);
                let reflecting: Vec<u32> = (0..self.caps.max_texture_units)
                    .filter(|&stage| self.texgen_mode(stage) == TexCoordGenMode::ReflectionMap)
                    .collect();
                for stage in reflecting {
                    self.apply_texture_matrix(stage)?;
                }
            }
            TransformSlot::Texture(stage) => {
                if stage >= self.caps.max_texture_units {
                    return Err(StateError::StageOutOfRange {
                        stage,
                        limit: self.caps.max_texture_units,
                    });
                }
                if self.texture_matrices[stage as usize].as_ref() == Some(matrix) {
                    return Ok(());
                }
                if self.texgen_mode(stage) == TexCoordGenMode::ReflectionMap {
                    self.apply_texture_matrix(stage)?;
                } else {
                    self.driver.set_transform(slot, matrix)?;
                }
                self.texture_matrices[stage as usize] = Some(*matrix);
            }
        }
        Ok(())
    }

    /// The cached view matrix, or `None` if never set.
    pub fn view_matrix(&self) -> Option<Mat4> {
        self.view
    }

    fn texgen_mode(&self, stage: u32) -> TexCoordGenMode {
        self.texture_stage_states[stage as usize][TextureStageStateId::TexGen as usize]
            .and_then(TexCoordGenMode::from_word)
            .unwrap_or(TexCoordGenMode::None)
    }

    /// Installs the effective texture transform for a stage.
    ///
    /// Reflection mapping requires the transpose of the view matrix rather
    /// than the raw texture matrix.
    fn apply_texture_matrix(&mut self, stage: u32) -> Result<(), StateError> {
        let effective = if self.texgen_mode(stage) == TexCoordGenMode::ReflectionMap {
            self.view.unwrap_or(Mat4::IDENTITY).transpose()
        } else {
            self.texture_matrices[stage as usize].unwrap_or(Mat4::IDENTITY)
        };
        log::trace!("StateCache: recomputing texture matrix for stage {stage}");
        self.driver
            .set_transform(TransformSlot::Texture(stage), &effective)?;
        Ok(())
    }

    // --- Lights and clip planes ---

    /// Enables (`Some`) or disables (`None`) a hardware light slot.
    pub fn set_light(&mut self, index: u32, light: Option<&FixedLight>) -> Result<(), StateError> {
        if index >= self.caps.max_active_lights {
            return Err(StateError::LightOutOfRange {
                index,
                limit: self.caps.max_active_lights,
            });
        }
        let slot = index as usize;
        let unchanged = match (&self.lights[slot], light) {
            (Cached::Value(cached), Some(new)) => cached == new,
            (Cached::Cleared, None) => true,
            _ => false,
        };
        if unchanged {
            return Ok(());
        }
        self.driver.set_light(index, light)?;
        self.lights[slot] = match light {
            Some(l) => Cached::Value(*l),
            None => Cached::Cleared,
        };
        Ok(())
    }

    /// The cached light in a slot, if one is set.
    pub fn light(&self, index: u32) -> Option<FixedLight> {
        match self.lights.get(index as usize) {
            Some(Cached::Value(light)) => Some(*light),
            _ => None,
        }
    }

    /// Enables (`Some`) or disables (`None`) a user clip plane.
    pub fn set_clip_plane(&mut self, index: u32, plane: Option<Vec4>) -> Result<(), StateError> {
        if index >= self.caps.max_clip_planes {
            return Err(StateError::ClipPlaneOutOfRange {
                index,
                limit: self.caps.max_clip_planes,
            });
        }
        let slot = index as usize;
        let unchanged = match (&self.clip_planes[slot], plane) {
            (Cached::Value(cached), Some(new)) => *cached == new,
            (Cached::Cleared, None) => true,
            _ => false,
        };
        if unchanged {
            return Ok(());
        }
        self.driver.set_clip_plane(index, plane)?;
        self.clip_planes[slot] = match plane {
            Some(p) => Cached::Value(p),
            None => Cached::Cleared,
        };
        Ok(())
    }

    // --- Vertex streams ---

    /// Binds a vertex buffer to a stream, or clears the stream with `None`.
    ///
    /// Binding an identical buffer and offset at a non-zero stream is a
    /// no-op. Binding a null buffer, or binding anything at stream 0,
    /// clears all higher streams: multi-stream binding is an explicit,
    /// all-or-nothing operation tied to stream 0. Every other call marks
    /// the vertex declaration dirty.
    pub fn set_vertex_buffer(
        &mut self,
        buffer: Option<Arc<VertexBuffer>>,
        offset: u32,
        stream: u32,
    ) -> Result<(), StateError> {
        if stream >= self.caps.max_vertex_streams {
            return Err(StateError::StreamOutOfRange {
                stream,
                limit: self.caps.max_vertex_streams,
            });
        }
        let slot = stream as usize;
        if stream != 0 {
            if let (Some(existing), Some(new)) = (&self.streams[slot], &buffer) {
                if Arc::ptr_eq(&existing.buffer, new) && existing.offset == offset {
                    return Ok(());
                }
            }
        }

        let same = match (&self.streams[slot], &buffer) {
            (Some(existing), Some(new)) => {
                Arc::ptr_eq(&existing.buffer, new) && existing.offset == offset
            }
            (None, None) => true,
            _ => false,
        };
        if !same {
            self.driver
                .bind_vertex_buffer(stream, buffer.as_ref().map(|b| (b.id(), offset)))?;
            let was_bound = self.streams[slot].is_some();
            self.streams[slot] = buffer.clone().map(|b| StreamBinding { buffer: b, offset });
            match (was_bound, self.streams[slot].is_some()) {
                (false, true) => self.active_streams += 1,
                (true, false) => self.active_streams -= 1,
                _ => {}
            }
        }

        if buffer.is_none() || stream == 0 {
            for higher in (slot + 1)..self.streams.len() {
                if self.streams[higher].is_some() {
                    self.driver.bind_vertex_buffer(higher as u32, None)?;
                    self.streams[higher] = None;
                    self.active_streams -= 1;
                }
            }
        }

        self.declaration_dirty = true;
        Ok(())
    }

    /// The number of streams currently bound.
    pub fn active_stream_count(&self) -> u32 {
        self.active_streams
    }

    /// Whether a composite declaration is currently constructed.
    pub fn has_composite_declaration(&self) -> bool {
        self.composite.is_some()
    }

    /// Ensures the driver has the right vertex declaration before a draw.
    ///
    /// If nothing changed since the last check this is free and reports the
    /// previous outcome (`None` when no stream is bound, so the caller
    /// skips the draw). With exactly one bound stream the buffer's own
    /// prebuilt declaration is installed; with multiple streams a composite
    /// declaration is constructed by walking every bound buffer's
    /// attributes in stream order, replacing any prior composite.
    pub fn apply_vertex_declaration(&mut self) -> Result<Option<DeclarationSource>, StateError> {
        if !self.declaration_dirty {
            return Ok(if self.active_streams == 0 {
                None
            } else {
                self.last_source
            });
        }

        if self.active_streams == 0 {
            self.declaration_dirty = false;
            self.last_source = None;
            self.composite = None;
            return Ok(None);
        }

        if self.active_streams == 1 {
            let binding = self
                .streams
                .iter()
                .flatten()
                .next()
                .expect("active_streams is 1 but no stream is bound");
            self.driver
                .install_vertex_declaration(binding.buffer.declaration())?;
            self.declaration_dirty = false;
            self.composite = None;
            self.last_source = Some(DeclarationSource::PerBuffer);
            return Ok(self.last_source);
        }

        let mut builder = VertexDeclaration::builder(self.backend);
        for (stream, binding) in self.streams.iter().enumerate() {
            let Some(binding) = binding else { continue };
            for attribute in binding.buffer.attributes() {
                builder.push(stream as u32, attribute)?;
            }
        }
        let declaration = builder.finish();
        log::debug!(
            "StateCache: rebuilt composite vertex declaration ({} attributes over {} streams)",
            declaration.attribute_count(),
            self.active_streams,
        );
        self.driver.install_vertex_declaration(&declaration)?;
        self.composite = Some(declaration);
        self.declaration_dirty = false;
        self.last_source = Some(DeclarationSource::Composite);
        Ok(self.last_source)
    }

    // --- Reset ---

    /// Reapplies every documented default, category by category.
    ///
    /// The order is fixed because later categories depend on earlier ones
    /// being valid already: render states, color, transforms, texture-stage
    /// states, material states, lights, clip planes, vertex buffers.
    pub fn reset(&mut self) -> Result<(), StateError> {
        log::debug!("StateCache: resetting all state to defaults");
        for id in RenderStateId::ALL {
            self.set_render_state(id, id.default_value())?;
        }
        self.set_color(LinearRgba::WHITE)?;
        self.set_transform(TransformSlot::Projection, &Mat4::IDENTITY)?;
        self.set_transform(TransformSlot::View, &Mat4::IDENTITY)?;
        self.set_transform(TransformSlot::World, &Mat4::IDENTITY)?;
        for stage in 0..self.caps.max_texture_units {
            self.set_transform(TransformSlot::Texture(stage), &Mat4::IDENTITY)?;
        }
        for stage in 0..self.caps.max_texture_units {
            for id in TextureStageStateId::ALL {
                self.set_texture_stage_state(stage, id, id.default_value())?;
            }
        }
        for id in MaterialStateId::ALL {
            self.set_material_state(id, id.default_value())?;
        }
        for index in 0..self.caps.max_active_lights {
            self.set_light(index, None)?;
        }
        for index in 0..self.caps.max_clip_planes {
            self.set_clip_plane(index, None)?;
        }
        self.set_vertex_buffer(None, 0, 0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::error::DriverCallError;
    use crate::renderer::state::declaration::{
        VertexAttribute, VertexElementType, VertexSemantic,
    };
    use crate::renderer::state::ids::ShadeMode;
    use crate::renderer::common::VertexBufferId;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Recorder {
        render_state_calls: usize,
        color_calls: usize,
        stage_state_calls: usize,
        material_calls: usize,
        transform_calls: usize,
        texture_transform_calls: usize,
        light_calls: usize,
        clip_plane_calls: usize,
        bind_calls: usize,
        declaration_installs: usize,
        fail_next: bool,
        last_render_word: Option<(RenderStateId, u32)>,
    }

    #[derive(Debug)]
    struct TestDriver {
        caps: DeviceCapabilities,
        rec: Arc<Mutex<Recorder>>,
    }

    impl TestDriver {
        fn boxed(caps: DeviceCapabilities) -> (Box<dyn FixedFunctionDriver>, Arc<Mutex<Recorder>>) {
            let rec = Arc::new(Mutex::new(Recorder::default()));
            (
                Box::new(TestDriver {
                    caps,
                    rec: Arc::clone(&rec),
                }),
                rec,
            )
        }

        fn check_failure(&self, call: &'static str) -> Result<(), DriverCallError> {
            let mut rec = self.rec.lock().unwrap();
            if rec.fail_next {
                rec.fail_next = false;
                return Err(DriverCallError {
                    call,
                    details: "injected failure".to_string(),
                });
            }
            Ok(())
        }
    }

    impl FixedFunctionDriver for TestDriver {
        fn capabilities(&self) -> DeviceCapabilities {
            self.caps
        }

        fn set_render_state(&mut self, id: RenderStateId, word: u32) -> Result<(), DriverCallError> {
            self.check_failure("set_render_state")?;
            let mut rec = self.rec.lock().unwrap();
            rec.render_state_calls += 1;
            rec.last_render_word = Some((id, word));
            Ok(())
        }

        fn set_color(&mut self, _color: LinearRgba) -> Result<(), DriverCallError> {
            self.check_failure("set_color")?;
            self.rec.lock().unwrap().color_calls += 1;
            Ok(())
        }

        fn set_texture_stage_state(
            &mut self,
            _stage: u32,
            _id: TextureStageStateId,
            _word: u32,
        ) -> Result<(), DriverCallError> {
            self.check_failure("set_texture_stage_state")?;
            self.rec.lock().unwrap().stage_state_calls += 1;
            Ok(())
        }

        fn set_material_state(
            &mut self,
            _id: MaterialStateId,
            _word: u32,
        ) -> Result<(), DriverCallError> {
            self.check_failure("set_material_state")?;
            self.rec.lock().unwrap().material_calls += 1;
            Ok(())
        }

        fn set_transform(
            &mut self,
            slot: TransformSlot,
            _matrix: &Mat4,
        ) -> Result<(), DriverCallError> {
            self.check_failure("set_transform")?;
            let mut rec = self.rec.lock().unwrap();
            rec.transform_calls += 1;
            if matches!(slot, TransformSlot::Texture(_)) {
                rec.texture_transform_calls += 1;
            }
            Ok(())
        }

        fn set_light(
            &mut self,
            _index: u32,
            _light: Option<&FixedLight>,
        ) -> Result<(), DriverCallError> {
            self.check_failure("set_light")?;
            self.rec.lock().unwrap().light_calls += 1;
            Ok(())
        }

        fn set_clip_plane(
            &mut self,
            _index: u32,
            _plane: Option<Vec4>,
        ) -> Result<(), DriverCallError> {
            self.check_failure("set_clip_plane")?;
            self.rec.lock().unwrap().clip_plane_calls += 1;
            Ok(())
        }

        fn bind_vertex_buffer(
            &mut self,
            _stream: u32,
            _binding: Option<(VertexBufferId, u32)>,
        ) -> Result<(), DriverCallError> {
            self.check_failure("bind_vertex_buffer")?;
            self.rec.lock().unwrap().bind_calls += 1;
            Ok(())
        }

        fn install_vertex_declaration(
            &mut self,
            _declaration: &VertexDeclaration,
        ) -> Result<(), DriverCallError> {
            self.check_failure("install_vertex_declaration")?;
            self.rec.lock().unwrap().declaration_installs += 1;
            Ok(())
        }
    }

    fn cache_with(caps: DeviceCapabilities) -> (StateCache, Arc<Mutex<Recorder>>) {
        let (driver, rec) = TestDriver::boxed(caps);
        (StateCache::new(driver, BackendKind::Headless), rec)
    }

    fn position_buffer(id: usize) -> Arc<VertexBuffer> {
        Arc::new(
            VertexBuffer::new(
                VertexBufferId(id),
                12,
                vec![VertexAttribute {
                    semantic: VertexSemantic::Position,
                    channel: 0,
                    offset: 0,
                    ty: VertexElementType::Float3,
                }],
                BackendKind::Headless,
            )
            .unwrap(),
        )
    }

    #[test]
    fn repeated_set_issues_one_driver_call() {
        let (mut cache, rec) = cache_with(DeviceCapabilities::default());
        cache
            .set_render_state(RenderStateId::ZEnable, 1)
            .unwrap();
        cache
            .set_render_state(RenderStateId::ZEnable, 1)
            .unwrap();
        assert_eq!(rec.lock().unwrap().render_state_calls, 1);
    }

    #[test]
    fn stage_out_of_range_fails_without_driver_traffic() {
        let caps = DeviceCapabilities {
            max_texture_units: 4,
            ..Default::default()
        };
        let (mut cache, rec) = cache_with(caps);
        let err = cache
            .set_texture_stage_state(5, TextureStageStateId::ColorTexEnv, 1)
            .unwrap_err();
        assert_eq!(err, StateError::StageOutOfRange { stage: 5, limit: 4 });
        assert_eq!(rec.lock().unwrap().stage_state_calls, 0);
        assert_eq!(cache.texture_stage_state(5, TextureStageStateId::ColorTexEnv), None);
    }

    #[test]
    fn invalid_boolean_value_is_rejected() {
        let (mut cache, rec) = cache_with(DeviceCapabilities::default());
        let err = cache
            .set_render_state(RenderStateId::FogEnable, 2)
            .unwrap_err();
        assert!(matches!(err, StateError::InvalidValue { state: "FogEnable", value: 2 }));
        assert_eq!(rec.lock().unwrap().render_state_calls, 0);
        assert_eq!(cache.render_state(RenderStateId::FogEnable), None);
    }

    #[test]
    fn untranslatable_value_leaves_cache_unchanged() {
        let (driver, rec) = TestDriver::boxed(DeviceCapabilities::default());
        let mut cache = StateCache::new(driver, BackendKind::OpenGl);
        let err = cache
            .set_render_state(RenderStateId::ShadeMode, ShadeMode::Phong.to_word())
            .unwrap_err();
        assert!(matches!(err, StateError::Untranslatable { .. }));
        assert_eq!(rec.lock().unwrap().render_state_calls, 0);
        assert_eq!(cache.render_state(RenderStateId::ShadeMode), None);
    }

    #[test]
    fn translation_reaches_driver_as_backend_word() {
        let (driver, rec) = TestDriver::boxed(DeviceCapabilities::default());
        let mut cache = StateCache::new(driver, BackendKind::OpenGl);
        cache
            .set_render_state(RenderStateId::FogMode, super::super::ids::FogMode::Linear.to_word())
            .unwrap();
        assert_eq!(
            rec.lock().unwrap().last_render_word,
            Some((RenderStateId::FogMode, 0x2601))
        );
    }

    #[test]
    fn driver_failure_keeps_previous_cache_value() {
        let (mut cache, rec) = cache_with(DeviceCapabilities::default());
        rec.lock().unwrap().fail_next = true;
        let err = cache.set_render_state(RenderStateId::ZEnable, 1).unwrap_err();
        assert!(matches!(err, StateError::Driver(_)));
        assert_eq!(cache.render_state(RenderStateId::ZEnable), None);

        // The next attempt is not skipped as a false no-op.
        cache.set_render_state(RenderStateId::ZEnable, 1).unwrap();
        assert_eq!(cache.render_state(RenderStateId::ZEnable), Some(1));
        assert_eq!(rec.lock().unwrap().render_state_calls, 1);
    }

    #[test]
    fn single_stream_uses_per_buffer_declaration() {
        let (mut cache, rec) = cache_with(DeviceCapabilities::default());
        cache
            .set_vertex_buffer(Some(position_buffer(1)), 0, 0)
            .unwrap();
        let source = cache.apply_vertex_declaration().unwrap();
        assert_eq!(source, Some(DeclarationSource::PerBuffer));
        assert!(!cache.has_composite_declaration());
        assert_eq!(rec.lock().unwrap().declaration_installs, 1);
    }

    #[test]
    fn multi_stream_rebuilds_composite_exactly_once() {
        let (mut cache, rec) = cache_with(DeviceCapabilities::default());
        cache
            .set_vertex_buffer(Some(position_buffer(1)), 0, 0)
            .unwrap();
        cache
            .set_vertex_buffer(Some(position_buffer(2)), 0, 1)
            .unwrap();
        let source = cache.apply_vertex_declaration().unwrap();
        assert_eq!(source, Some(DeclarationSource::Composite));
        assert!(cache.has_composite_declaration());
        assert_eq!(rec.lock().unwrap().declaration_installs, 1);

        // Further checks without binding changes are free.
        for _ in 0..3 {
            assert_eq!(
                cache.apply_vertex_declaration().unwrap(),
                Some(DeclarationSource::Composite)
            );
        }
        assert_eq!(rec.lock().unwrap().declaration_installs, 1);
    }

    #[test]
    fn identical_rebind_at_nonzero_stream_is_a_no_op() {
        let (mut cache, rec) = cache_with(DeviceCapabilities::default());
        let buffer = position_buffer(7);
        cache.set_vertex_buffer(Some(position_buffer(1)), 0, 0).unwrap();
        cache.set_vertex_buffer(Some(Arc::clone(&buffer)), 16, 1).unwrap();
        cache.apply_vertex_declaration().unwrap();

        cache.set_vertex_buffer(Some(buffer), 16, 1).unwrap();
        assert_eq!(
            cache.apply_vertex_declaration().unwrap(),
            Some(DeclarationSource::Composite)
        );
        assert_eq!(rec.lock().unwrap().declaration_installs, 1);
    }

    #[test]
    fn stream_zero_bind_clears_higher_streams() {
        let (mut cache, _rec) = cache_with(DeviceCapabilities::default());
        cache.set_vertex_buffer(Some(position_buffer(1)), 0, 0).unwrap();
        cache.set_vertex_buffer(Some(position_buffer(2)), 0, 1).unwrap();
        assert_eq!(cache.active_stream_count(), 2);

        cache.set_vertex_buffer(Some(position_buffer(3)), 0, 0).unwrap();
        assert_eq!(cache.active_stream_count(), 1);
    }

    #[test]
    fn null_bind_clears_everything_from_stream_zero() {
        let (mut cache, _rec) = cache_with(DeviceCapabilities::default());
        cache.set_vertex_buffer(Some(position_buffer(1)), 0, 0).unwrap();
        cache.set_vertex_buffer(Some(position_buffer(2)), 0, 1).unwrap();
        cache.set_vertex_buffer(None, 0, 0).unwrap();
        assert_eq!(cache.active_stream_count(), 0);
        assert_eq!(cache.apply_vertex_declaration().unwrap(), None);
    }

    #[test]
    fn stream_out_of_range_is_rejected() {
        let caps = DeviceCapabilities {
            max_vertex_streams: 2,
            ..Default::default()
        };
        let (mut cache, rec) = cache_with(caps);
        let err = cache
            .set_vertex_buffer(Some(position_buffer(1)), 0, 2)
            .unwrap_err();
        assert_eq!(err, StateError::StreamOutOfRange { stream: 2, limit: 2 });
        assert_eq!(rec.lock().unwrap().bind_calls, 0);
    }

    #[test]
    fn reflection_transition_recomputes_texture_matrix_once() {
        let (mut cache, rec) = cache_with(DeviceCapabilities::default());
        let reflection = TexCoordGenMode::ReflectionMap.to_word();
        cache
            .set_texture_stage_state(2, TextureStageStateId::TexGen, reflection)
            .unwrap();
        assert_eq!(rec.lock().unwrap().texture_transform_calls, 1);

        // Unrelated stage state changes must not retrigger it.
        cache
            .set_texture_stage_state(2, TextureStageStateId::ColorTexEnv, 0)
            .unwrap();
        cache
            .set_texture_stage_state(2, TextureStageStateId::AlphaTexEnv, 0)
            .unwrap();
        assert_eq!(rec.lock().unwrap().texture_transform_calls, 1);

        // Leaving reflection mode is the other transition edge.
        cache
            .set_texture_stage_state(2, TextureStageStateId::TexGen, 0)
            .unwrap();
        assert_eq!(rec.lock().unwrap().texture_transform_calls, 2);
    }

    #[test]
    fn view_change_refreshes_reflecting_stages() {
        let (mut cache, rec) = cache_with(DeviceCapabilities::default());
        let reflection = TexCoordGenMode::ReflectionMap.to_word();
        cache
            .set_texture_stage_state(1, TextureStageStateId::TexGen, reflection)
            .unwrap();
        let baseline = rec.lock().unwrap().texture_transform_calls;

        let view = Mat4::from_translation(crate::math::Vec3::new(0.0, 1.0, 0.0));
        cache.set_transform(TransformSlot::View, &view).unwrap();
        assert_eq!(rec.lock().unwrap().texture_transform_calls, baseline + 1);
    }

    #[test]
    fn light_out_of_range_is_rejected() {
        let caps = DeviceCapabilities {
            max_active_lights: 2,
            ..Default::default()
        };
        let (mut cache, rec) = cache_with(caps);
        let light = FixedLight::default();
        assert!(cache.set_light(2, Some(&light)).is_err());
        assert_eq!(rec.lock().unwrap().light_calls, 0);

        cache.set_light(1, Some(&light)).unwrap();
        cache.set_light(1, Some(&light)).unwrap();
        assert_eq!(rec.lock().unwrap().light_calls, 1);
        assert_eq!(cache.light(1), Some(light));
    }

    #[test]
    fn reset_applies_every_default_category() {
        let (mut cache, rec) = cache_with(DeviceCapabilities::default());
        cache.reset().unwrap();

        for id in RenderStateId::ALL {
            assert_eq!(cache.render_state(id), Some(id.default_value()));
        }
        for id in MaterialStateId::ALL {
            assert_eq!(cache.material_state(id), Some(id.default_value()));
        }
        let rec = rec.lock().unwrap();
        assert_eq!(rec.render_state_calls, RenderStateId::COUNT);
        assert_eq!(rec.material_calls, MaterialStateId::COUNT);
        assert!(rec.light_calls > 0);
        assert!(rec.clip_plane_calls > 0);
        assert_eq!(rec.color_calls, 1);
    }
}

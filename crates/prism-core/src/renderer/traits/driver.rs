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

use crate::math::{LinearRgba, Mat4, Vec4};
use crate::renderer::caps::DeviceCapabilities;
use crate::renderer::common::VertexBufferId;
use crate::renderer::error::DriverCallError;
use crate::renderer::state::declaration::VertexDeclaration;
use crate::renderer::state::ids::{
    MaterialStateId, RenderStateId, TextureStageStateId, TransformSlot,
};
use crate::renderer::state::light::FixedLight;
use std::fmt::Debug;

/// The narrow seam between the state cache and a concrete driver.
///
/// Every method receives *translated* words and fully validated arguments;
/// the cache is the sole owner and sole caller of this trait. Implementors
/// apply the change to the underlying API and report failure through
/// [`DriverCallError`] without touching any caller-visible state.
pub trait FixedFunctionDriver: Debug + Send {
    /// Reports the device's hardware limits.
    ///
    /// Queried once at state-cache construction and treated as immutable
    /// afterwards.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Applies a translated render state word.
    fn set_render_state(&mut self, id: RenderStateId, word: u32) -> Result<(), DriverCallError>;

    /// Applies the current vertex color.
    fn set_color(&mut self, color: LinearRgba) -> Result<(), DriverCallError>;

    /// Applies a translated texture stage state word.
    ///
    /// `stage` is already bounds checked against
    /// [`DeviceCapabilities::max_texture_units`].
    fn set_texture_stage_state(
        &mut self,
        stage: u32,
        id: TextureStageStateId,
        word: u32,
    ) -> Result<(), DriverCallError>;

    /// Applies a translated material state word.
    fn set_material_state(&mut self, id: MaterialStateId, word: u32)
        -> Result<(), DriverCallError>;

    /// Applies a transform matrix to the given slot.
    fn set_transform(&mut self, slot: TransformSlot, matrix: &Mat4) -> Result<(), DriverCallError>;

    /// Enables (`Some`) or disables (`None`) a hardware light slot.
    fn set_light(&mut self, index: u32, light: Option<&FixedLight>)
        -> Result<(), DriverCallError>;

    /// Enables (`Some`) or disables (`None`) a user clip plane.
    fn set_clip_plane(&mut self, index: u32, plane: Option<Vec4>) -> Result<(), DriverCallError>;

    /// Binds (`Some`) or clears (`None`) a vertex buffer stream.
    ///
    /// The binding is `(buffer, byte offset)`.
    fn bind_vertex_buffer(
        &mut self,
        stream: u32,
        binding: Option<(VertexBufferId, u32)>,
    ) -> Result<(), DriverCallError>;

    /// Installs the declaration geometry will be drawn with.
    fn install_vertex_declaration(
        &mut self,
        declaration: &VertexDeclaration,
    ) -> Result<(), DriverCallError>;
}

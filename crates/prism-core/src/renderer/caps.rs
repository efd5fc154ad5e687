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

//! Hardware capability limits for the fixed-function pipeline.

/// Immutable hardware limits reported by the driver.
///
/// Queried exactly once when the state cache is constructed and fixed for
/// the lifetime of the device. Every index-based setter of the cache bounds
/// checks against these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// The number of simultaneously active fixed-function lights.
    pub max_active_lights: u32,
    /// The number of user clip planes.
    pub max_clip_planes: u32,
    /// The number of fixed-function texture units.
    pub max_texture_units: u32,
    /// The number of vertex buffer input streams.
    pub max_vertex_streams: u32,
}

impl Default for DeviceCapabilities {
    /// The limits a baseline fixed-function device guarantees.
    fn default() -> Self {
        Self {
            max_active_lights: 8,
            max_clip_planes: 6,
            max_texture_units: 8,
            max_vertex_streams: 16,
        }
    }
}

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

//! Provides the public, backend-agnostic rendering contracts of the core.
//!
//! This module defines the "common language" of the rendering layer: the
//! state cache that owns all fixed-function driver state, the extension
//! resolver, the shader/program lifecycle types, the compositing passes,
//! and the abstract traits ([`FixedFunctionDriver`], [`GraphicsDevice`])
//! a concrete backend in `prism-infra` implements.
//!
//! The core defines the *what* of rendering; the *how* is a backend's
//! business. Nothing in here talks to a graphics API directly.

pub mod caps;
pub mod common;
pub mod error;
pub mod extensions;
pub mod pass;
pub mod shader;
pub mod state;
pub mod traits;

// Re-export the most important types for easier use.
pub use self::caps::DeviceCapabilities;
pub use self::common::{
    AttributeHandle, Extent2D, PrimitiveTopology, ProgramId, RenderTargetId, ShaderId,
    ShaderStage, TextureFormat, TextureId, UniformHandle, VertexBufferId,
};
pub use self::error::{DriverCallError, PassError, ProgramError, RenderError, StateError};
pub use self::extensions::{EntryPoint, ExtensionDescriptor, ExtensionProbe, ExtensionSet};
pub use self::pass::{DepthOfFieldEffect, DofOutcome, DofSettings, FrontBackTargets, FullscreenQuad};
pub use self::shader::{GpuProgram, ShaderHandle, ShadingLanguage};
pub use self::state::{BackendKind, StateCache};
pub use self::traits::{FixedFunctionDriver, GraphicsDevice};

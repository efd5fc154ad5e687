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

//! Defines the hierarchy of error types for the rendering core.

use crate::renderer::common::{Extent2D, ProgramId, ShaderId, ShaderStage, TextureFormat};
use crate::renderer::state::declaration::VertexSemantic;
use crate::renderer::state::translate::BackendKind;
use std::fmt;

/// A failure reported by the underlying driver for a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverCallError {
    /// The name of the driver entry point that failed.
    pub call: &'static str,
    /// Driver-specific detail text.
    pub details: String,
}

impl fmt::Display for DriverCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Driver call '{}' failed: {}", self.call, self.details)
    }
}

impl std::error::Error for DriverCallError {}

/// An error raised by the state cache.
///
/// Every variant leaves the cache untouched: a failed setter never performs
/// a partial write.
#[derive(Debug, Clone, PartialEq)]
pub enum StateError {
    /// A texture stage index was at or beyond the device's texture unit count.
    StageOutOfRange {
        /// The requested stage.
        stage: u32,
        /// The number of texture units reported by the device.
        limit: u32,
    },
    /// A vertex stream number was at or beyond the device's stream count.
    StreamOutOfRange {
        /// The requested stream.
        stream: u32,
        /// The number of vertex streams reported by the device.
        limit: u32,
    },
    /// A light index was at or beyond the device's active light count.
    LightOutOfRange {
        /// The requested light index.
        index: u32,
        /// The number of active lights reported by the device.
        limit: u32,
    },
    /// A clip plane index was at or beyond the device's clip plane count.
    ClipPlaneOutOfRange {
        /// The requested clip plane index.
        index: u32,
        /// The number of clip planes reported by the device.
        limit: u32,
    },
    /// The encoded value is not valid for the given state.
    InvalidValue {
        /// The name of the state being set.
        state: &'static str,
        /// The rejected 32-bit encoded value.
        value: u32,
    },
    /// The abstract value has no encoding in the selected backend's table.
    Untranslatable {
        /// The name of the state being set.
        state: &'static str,
        /// The abstract 32-bit encoded value.
        value: u32,
        /// The backend whose table missed.
        backend: BackendKind,
    },
    /// A vertex attribute semantic has no mapping on the selected backend.
    UnmappedSemantic {
        /// The semantic that could not be mapped.
        semantic: VertexSemantic,
        /// The semantic's channel index.
        channel: u32,
        /// The backend whose table missed.
        backend: BackendKind,
    },
    /// The driver rejected the translated state change.
    Driver(DriverCallError),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::StageOutOfRange { stage, limit } => {
                write!(f, "Texture stage {stage} out of range (device has {limit} units)")
            }
            StateError::StreamOutOfRange { stream, limit } => {
                write!(f, "Vertex stream {stream} out of range (device has {limit} streams)")
            }
            StateError::LightOutOfRange { index, limit } => {
                write!(f, "Light {index} out of range (device has {limit} active lights)")
            }
            StateError::ClipPlaneOutOfRange { index, limit } => {
                write!(f, "Clip plane {index} out of range (device has {limit} planes)")
            }
            StateError::InvalidValue { state, value } => {
                write!(f, "Value {value:#x} is not valid for state '{state}'")
            }
            StateError::Untranslatable { state, value, backend } => {
                write!(
                    f,
                    "Value {value:#x} of state '{state}' has no {backend:?} encoding"
                )
            }
            StateError::UnmappedSemantic {
                semantic,
                channel,
                backend,
            } => {
                write!(
                    f,
                    "Vertex semantic {semantic:?} (channel {channel}) has no {backend:?} mapping"
                )
            }
            StateError::Driver(err) => write!(f, "State change rejected: {err}"),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Driver(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DriverCallError> for StateError {
    fn from(err: DriverCallError) -> Self {
        StateError::Driver(err)
    }
}

/// An error related to shader compilation or program linking.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgramError {
    /// The shader source failed to compile.
    CompilationFailed {
        /// The stage the shader was compiled for.
        stage: ShaderStage,
        /// Detailed error messages from the shader compiler.
        details: String,
    },
    /// The program failed to link from its compiled shaders.
    LinkFailed {
        /// Detailed error messages from the linker.
        details: String,
    },
    /// A shader handle passed to the device was not valid.
    InvalidShader {
        /// The offending shader id.
        id: ShaderId,
    },
    /// A program handle passed to the device was not valid.
    InvalidProgram {
        /// The offending program id.
        id: ProgramId,
    },
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramError::CompilationFailed { stage, details } => {
                write!(f, "{stage:?} shader compilation failed: {details}")
            }
            ProgramError::LinkFailed { details } => {
                write!(f, "Program linking failed: {details}")
            }
            ProgramError::InvalidShader { id } => {
                write!(f, "Invalid shader id: {id:?}")
            }
            ProgramError::InvalidProgram { id } => {
                write!(f, "Invalid program id: {id:?}")
            }
        }
    }
}

impl std::error::Error for ProgramError {}

/// An error raised while executing a compositing render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum PassError {
    /// An offscreen render target could not be created.
    TargetCreationFailed {
        /// The requested surface size.
        size: Extent2D,
        /// The requested pixel format.
        format: TextureFormat,
        /// Backend detail text.
        details: String,
    },
    /// A program-related failure occurred.
    Program(ProgramError),
    /// A state-cache failure occurred.
    State(StateError),
    /// The driver rejected a pass-level call (target bind, draw).
    Driver(DriverCallError),
}

impl fmt::Display for PassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassError::TargetCreationFailed {
                size,
                format,
                details,
            } => {
                write!(
                    f,
                    "Failed to create {}x{} {format:?} render target: {details}",
                    size.width, size.height
                )
            }
            PassError::Program(err) => write!(f, "Pass program error: {err}"),
            PassError::State(err) => write!(f, "Pass state error: {err}"),
            PassError::Driver(err) => write!(f, "Pass driver error: {err}"),
        }
    }
}

impl std::error::Error for PassError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PassError::Program(err) => Some(err),
            PassError::State(err) => Some(err),
            PassError::Driver(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProgramError> for PassError {
    fn from(err: ProgramError) -> Self {
        PassError::Program(err)
    }
}

impl From<StateError> for PassError {
    fn from(err: StateError) -> Self {
        PassError::State(err)
    }
}

impl From<DriverCallError> for PassError {
    fn from(err: DriverCallError) -> Self {
        PassError::Driver(err)
    }
}

/// A high-level error that can occur within the rendering core.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A state-cache operation failed.
    State(StateError),
    /// A shader or program operation failed.
    Program(ProgramError),
    /// A compositing pass failed.
    Pass(PassError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::State(err) => write!(f, "State operation failed: {err}"),
            RenderError::Program(err) => write!(f, "Program operation failed: {err}"),
            RenderError::Pass(err) => write!(f, "Render pass failed: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::State(err) => Some(err),
            RenderError::Program(err) => Some(err),
            RenderError::Pass(err) => Some(err),
        }
    }
}

impl From<StateError> for RenderError {
    fn from(err: StateError) -> Self {
        RenderError::State(err)
    }
}

impl From<ProgramError> for RenderError {
    fn from(err: ProgramError) -> Self {
        RenderError::Program(err)
    }
}

impl From<PassError> for RenderError {
    fn from(err: PassError) -> Self {
        RenderError::Pass(err)
    }
}

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

//! Shading language identification.

/// The shading languages the source tables cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadingLanguage {
    /// The OpenGL Shading Language.
    Glsl,
    /// NVIDIA Cg.
    Cg,
}

impl ShadingLanguage {
    /// The name reported by GLSL-speaking devices.
    pub const GLSL_NAME: &'static str = "GLSL";
    /// The name reported by Cg-speaking devices.
    pub const CG_NAME: &'static str = "Cg";

    /// Parses a device-reported language name by exact comparison.
    ///
    /// Unknown names yield `None`; callers treat that as "no programs can
    /// be built", a recoverable no-op rather than an error.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            Self::GLSL_NAME => Some(Self::Glsl),
            Self::CG_NAME => Some(Self::Cg),
            _ => None,
        }
    }

    /// The canonical name of the language.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Glsl => Self::GLSL_NAME,
            Self::Cg => Self::CG_NAME,
        }
    }
}

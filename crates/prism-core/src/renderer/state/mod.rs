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

//! The fixed-function state cache and its vocabulary.
//!
//! [`StateCache`](cache::StateCache) mirrors every render, texture-stage,
//! material, transform, light and clip-plane value the application sets and
//! guarantees the minimum number of driver state-change calls.

pub mod cache;
pub mod declaration;
pub mod ids;
pub mod light;
pub mod translate;

pub use self::cache::{DeclarationSource, StateCache};
pub use self::declaration::{
    StreamBinding, VertexAttribute, VertexBuffer, VertexDeclaration, VertexElementType,
    VertexSemantic,
};
pub use self::ids::{
    BlendFunc, CompareFunc, CullMode, FillMode, FogMode, MaterialStateId, RenderStateId,
    ShadeMode, TexCoordGenMode, TexEnvMode, TextureStageStateId, TransformSlot,
};
pub use self::light::{FixedLight, FixedLightKind};
pub use self::translate::BackendKind;

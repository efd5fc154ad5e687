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

//! Deferred compositing render passes.
//!
//! [`target`] carries the offscreen surface vocabulary (RAII guards, the
//! ping-pong pair, the front/back pair, the shared fullscreen quad);
//! [`dof`] is the depth-of-field pipeline built on top of it.

pub mod dof;
pub mod dof_sources;
pub mod target;

pub use self::dof::{
    composite_pixel, depth_blur_factor, separate_planes, DepthOfFieldEffect, DofOutcome,
    DofParams, DofSettings,
};
pub use self::dof_sources::DofStage;
pub use self::target::{FrontBackTargets, FullscreenQuad, PingPongTargets, RenderTargetGuard};

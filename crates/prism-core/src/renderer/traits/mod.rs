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

//! The trait seams between the renderer core and concrete backends.
//!
//! [`FixedFunctionDriver`] is the state-application side, exclusively owned
//! by the state cache. [`GraphicsDevice`] is the resource and draw side,
//! shared across the program manager and the pass pipeline.

pub mod device;
pub mod driver;

pub use self::device::GraphicsDevice;
pub use self::driver::FixedFunctionDriver;

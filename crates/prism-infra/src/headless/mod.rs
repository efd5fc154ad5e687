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

//! The headless (null) backend.
//!
//! [`HeadlessDriver`] implements the fixed-function seam: it applies no
//! real state but remembers every translated word and counts every call,
//! which makes it both a production null renderer and the substrate the
//! integration tests assert against. [`HeadlessDevice`] is the resource
//! and draw side; it allocates real ids and validates handle lifetimes the
//! way a hardware backend would. [`HeadlessProbe`] feeds the extension
//! resolver a configurable driver extension string.

pub mod device;
pub mod driver;
pub mod probe;

pub use self::device::{HeadlessDevice, HeadlessDeviceStats};
pub use self::driver::{DriverRecorder, HeadlessDriver};
pub use self::probe::{well_known_extensions, HeadlessProbe};

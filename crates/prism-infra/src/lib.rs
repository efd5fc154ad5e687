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

//! # Prism Infra
//!
//! Concrete backend implementations for the prism rendering core.
//!
//! Ships the headless backend: a fully functional driver/device pair that
//! accepts every call, allocates real ids, tracks bound state and records
//! call counts. It backs CI runs, server-side tools and the integration
//! test suite.

#![warn(missing_docs)]

pub mod headless;

pub use headless::{HeadlessDevice, HeadlessDriver, HeadlessProbe};

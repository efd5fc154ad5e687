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

//! The headless extension probe and its well-known extension table.

use prism_core::renderer::extensions::{EntryPoint, ExtensionDescriptor, ExtensionProbe};
use std::collections::HashSet;
use std::num::NonZeroUsize;

/// GL-style extensions the headless backend knows how to advertise.
///
/// Entry-point lists follow the real extensions; the ones with an empty
/// list are query-only, their presence alone enables a feature.
const WELL_KNOWN: &[ExtensionDescriptor] = &[
    ExtensionDescriptor {
        name: "GL_ARB_multitexture",
        entry_points: &["glActiveTextureARB", "glClientActiveTextureARB"],
    },
    ExtensionDescriptor {
        name: "GL_ARB_vertex_buffer_object",
        entry_points: &[
            "glGenBuffersARB",
            "glDeleteBuffersARB",
            "glBindBufferARB",
            "glBufferDataARB",
            "glBufferSubDataARB",
            "glMapBufferARB",
            "glUnmapBufferARB",
        ],
    },
    ExtensionDescriptor {
        name: "GL_ARB_occlusion_query",
        entry_points: &[
            "glGenQueriesARB",
            "glDeleteQueriesARB",
            "glBeginQueryARB",
            "glEndQueryARB",
            "glGetQueryObjectuivARB",
        ],
    },
    ExtensionDescriptor {
        name: "GL_EXT_texture_filter_anisotropic",
        entry_points: &[],
    },
    ExtensionDescriptor {
        name: "GL_ARB_texture_non_power_of_two",
        entry_points: &[],
    },
    ExtensionDescriptor {
        name: "GL_EXT_texture_compression_s3tc",
        entry_points: &[],
    },
    ExtensionDescriptor {
        name: "GL_ARB_texture_env_dot3",
        entry_points: &[],
    },
];

/// The extension descriptors the headless backend resolves at init.
pub fn well_known_extensions() -> &'static [ExtensionDescriptor] {
    WELL_KNOWN
}

/// A probe over a configurable extension string.
///
/// Every entry point resolves to a synthetic, deterministic address unless
/// explicitly marked missing, which makes the all-or-nothing resolution
/// paths reachable without a real driver.
#[derive(Debug, Clone, Default)]
pub struct HeadlessProbe {
    extensions: String,
    missing_entry_points: HashSet<String>,
}

impl HeadlessProbe {
    /// Creates a probe advertising the given space-separated extensions.
    pub fn new(extensions: impl Into<String>) -> Self {
        Self {
            extensions: extensions.into(),
            missing_entry_points: HashSet::new(),
        }
    }

    /// A probe advertising every well-known extension.
    pub fn advertising_well_known() -> Self {
        let names: Vec<&str> = WELL_KNOWN.iter().map(|d| d.name).collect();
        Self::new(names.join(" "))
    }

    /// Makes one entry point fail to resolve.
    pub fn without_entry_point(mut self, name: &str) -> Self {
        self.missing_entry_points.insert(name.to_string());
        self
    }
}

impl ExtensionProbe for HeadlessProbe {
    fn extension_string(&self) -> String {
        self.extensions.clone()
    }

    fn resolve_entry_point(&self, name: &str) -> Option<EntryPoint> {
        if self.missing_entry_points.contains(name) {
            return None;
        }
        // A stable fake address derived from the name.
        let address = 0x1000 + name.bytes().map(usize::from).sum::<usize>();
        NonZeroUsize::new(address).map(EntryPoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_names_are_unique() {
        let mut seen = HashSet::new();
        for descriptor in well_known_extensions() {
            assert!(seen.insert(descriptor.name), "{} duplicated", descriptor.name);
        }
    }

    #[test]
    fn entry_points_resolve_deterministically() {
        let probe = HeadlessProbe::advertising_well_known();
        let a = probe.resolve_entry_point("glActiveTextureARB").unwrap();
        let b = probe.resolve_entry_point("glActiveTextureARB").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn marked_entry_points_do_not_resolve() {
        let probe = HeadlessProbe::advertising_well_known().without_entry_point("glMapBufferARB");
        assert!(probe.resolve_entry_point("glMapBufferARB").is_none());
        assert!(probe.resolve_entry_point("glUnmapBufferARB").is_some());
    }
}

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

//! Driver extension probing and entry-point resolution.
//!
//! At backend initialization the resolver obtains the driver's extension
//! string, tokenizes it, and attempts to resolve the entry points of every
//! extension the backend knows about. Resolution is all-or-nothing per
//! extension: if any required entry point is missing the whole extension is
//! marked unavailable even though the driver advertised it, which protects
//! callers from partially initialized function tables. Missing extensions
//! are never fatal; they only narrow the feature set.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;

/// An opaque driver-provided entry-point address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryPoint(pub NonZeroUsize);

/// Describes one extension the backend can make use of.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionDescriptor {
    /// The extension's name as it appears in the driver's extension string.
    pub name: &'static str,
    /// The entry points the extension defines. An empty list marks a
    /// query-only extension whose presence alone enables a feature.
    pub entry_points: &'static [&'static str],
}

/// The probing seam a concrete backend implements.
pub trait ExtensionProbe {
    /// The driver's full space-separated extension string.
    fn extension_string(&self) -> String;

    /// Resolves a named entry point, or `None` if the driver does not
    /// export it.
    fn resolve_entry_point(&self, name: &str) -> Option<EntryPoint>;
}

#[derive(Debug)]
struct ExtensionRecord {
    available: bool,
    entry_points: HashMap<&'static str, EntryPoint>,
}

/// The outcome of extension resolution.
///
/// Built once at backend initialization; callers consult
/// [`is_available`](Self::is_available) before touching any entry point.
#[derive(Debug)]
pub struct ExtensionSet {
    advertised: HashSet<String>,
    records: HashMap<&'static str, ExtensionRecord>,
}

impl ExtensionSet {
    /// Probes the driver for every descriptor and records the outcome.
    pub fn resolve(probe: &dyn ExtensionProbe, descriptors: &[ExtensionDescriptor]) -> Self {
        let raw = probe.extension_string();
        let advertised: HashSet<String> = raw.split_whitespace().map(str::to_owned).collect();
        log::debug!(
            "ExtensionSet: driver advertises {} extensions",
            advertised.len()
        );
        log::trace!("ExtensionSet: extension string: {raw}");

        let mut records = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let record = if !advertised.contains(descriptor.name) {
                ExtensionRecord {
                    available: false,
                    entry_points: HashMap::new(),
                }
            } else if descriptor.entry_points.is_empty() {
                // Query-only: the string membership is the whole feature.
                ExtensionRecord {
                    available: true,
                    entry_points: HashMap::new(),
                }
            } else {
                let mut entry_points = HashMap::with_capacity(descriptor.entry_points.len());
                let mut complete = true;
                for &name in descriptor.entry_points {
                    match probe.resolve_entry_point(name) {
                        Some(entry) => {
                            entry_points.insert(name, entry);
                        }
                        None => {
                            log::warn!(
                                "ExtensionSet: '{}' advertised but entry point '{name}' did not resolve; disabling the extension",
                                descriptor.name
                            );
                            complete = false;
                            break;
                        }
                    }
                }
                if complete {
                    ExtensionRecord {
                        available: true,
                        entry_points,
                    }
                } else {
                    ExtensionRecord {
                        available: false,
                        entry_points: HashMap::new(),
                    }
                }
            };
            records.insert(descriptor.name, record);
        }
        Self {
            advertised,
            records,
        }
    }

    /// Whether the raw extension string contains the name.
    ///
    /// This reports the driver's claim only; use
    /// [`is_available`](Self::is_available) before relying on entry points.
    pub fn is_advertised(&self, name: &str) -> bool {
        self.advertised.contains(name)
    }

    /// Whether the extension's feature may be used: advertised and, for
    /// extensions with entry points, fully resolved.
    pub fn is_available(&self, name: &str) -> bool {
        self.records.get(name).is_some_and(|r| r.available)
    }

    /// Looks up a resolved entry point of an available extension.
    pub fn entry_point(&self, extension: &str, name: &str) -> Option<EntryPoint> {
        self.records
            .get(extension)
            .filter(|r| r.available)
            .and_then(|r| r.entry_points.get(name).copied())
    }
}

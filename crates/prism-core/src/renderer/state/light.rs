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

//! Fixed-function light sources.

use crate::math::{LinearRgba, Vec3};

/// The kind of a fixed-function light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixedLightKind {
    /// An omni-directional light with distance falloff.
    #[default]
    Point,
    /// A cone-shaped light with distance and angular falloff.
    Spot,
    /// An infinitely distant light with no falloff.
    Directional,
}

/// A complete fixed-function light description.
///
/// This is the value cached per hardware light slot; the cache compares
/// whole lights for equality before re-submitting one to the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLight {
    /// The kind of the light.
    pub kind: FixedLightKind,
    /// Ambient contribution of the light.
    pub ambient: LinearRgba,
    /// Diffuse contribution of the light.
    pub diffuse: LinearRgba,
    /// Specular contribution of the light.
    pub specular: LinearRgba,
    /// World-space position (ignored for directional lights).
    pub position: Vec3,
    /// World-space direction (ignored for point lights).
    pub direction: Vec3,
    /// Constant attenuation term.
    pub constant_attenuation: f32,
    /// Linear attenuation term.
    pub linear_attenuation: f32,
    /// Quadratic attenuation term.
    pub quadratic_attenuation: f32,
    /// The angle in radians at which spot falloff begins.
    pub inner_cone_angle: f32,
    /// The angle in radians at which a spot light is fully attenuated.
    pub outer_cone_angle: f32,
}

impl Default for FixedLight {
    fn default() -> Self {
        Self {
            kind: FixedLightKind::Point,
            ambient: LinearRgba::BLACK,
            diffuse: LinearRgba::WHITE,
            specular: LinearRgba::WHITE,
            position: Vec3::ZERO,
            direction: Vec3::new(0.0, 0.0, 1.0),
            constant_attenuation: 1.0,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
            inner_cone_angle: 20.0_f32.to_radians(),
            outer_cone_angle: 45.0_f32.to_radians(),
        }
    }
}

impl FixedLight {
    /// Creates a directional light shining along `direction`.
    pub fn directional(direction: Vec3, diffuse: LinearRgba) -> Self {
        Self {
            kind: FixedLightKind::Directional,
            diffuse,
            direction: direction.normalize(),
            ..Default::default()
        }
    }

    /// Creates a point light at `position`.
    pub fn point(position: Vec3, diffuse: LinearRgba) -> Self {
        Self {
            kind: FixedLightKind::Point,
            diffuse,
            position,
            ..Default::default()
        }
    }
}

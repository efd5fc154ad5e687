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

//! Offscreen render targets and the ping-pong pair.

use crate::renderer::common::{Extent2D, RenderTargetId, TextureFormat, TextureId};
use crate::renderer::error::PassError;
use crate::renderer::state::VertexBuffer;
use crate::renderer::traits::GraphicsDevice;
use std::sync::Arc;

/// An exclusively owned offscreen render target.
///
/// Dropping the guard releases the device surface.
#[derive(Debug)]
pub struct RenderTargetGuard {
    id: RenderTargetId,
    color_texture: TextureId,
    size: Extent2D,
    format: TextureFormat,
    device: Arc<dyn GraphicsDevice>,
}

impl RenderTargetGuard {
    /// Creates a target of the given size and format.
    pub fn create(
        device: Arc<dyn GraphicsDevice>,
        size: Extent2D,
        format: TextureFormat,
    ) -> Result<Self, PassError> {
        let (id, color_texture) =
            device
                .create_render_target(size, format)
                .map_err(|err| PassError::TargetCreationFailed {
                    size,
                    format,
                    details: err.to_string(),
                })?;
        log::debug!(
            "RenderTargetGuard: created {}x{} {format:?} target {id:?}",
            size.width,
            size.height
        );
        Ok(Self {
            id,
            color_texture,
            size,
            format,
            device,
        })
    }

    /// The device handle of the target.
    pub fn id(&self) -> RenderTargetId {
        self.id
    }

    /// The target's color texture, for sampling in a later pass.
    pub fn color_texture(&self) -> TextureId {
        self.color_texture
    }

    /// The surface size in pixels.
    pub fn size(&self) -> Extent2D {
        self.size
    }

    /// The surface pixel format.
    pub fn format(&self) -> TextureFormat {
        self.format
    }
}

impl Drop for RenderTargetGuard {
    fn drop(&mut self) {
        log::debug!("RenderTargetGuard: destroying target {:?}", self.id);
        self.device.destroy_render_target(self.id);
    }
}

/// Two interchangeable offscreen targets of identical size and format.
///
/// Exactly one of the two is the "current" source at any time; consumers
/// must go through [`current`](Self::current) / [`other`](Self::other) and
/// never hold a direct alias across a [`flip`](Self::flip). The flip is
/// logical, no surface memory moves.
#[derive(Debug)]
pub struct PingPongTargets {
    targets: [RenderTargetGuard; 2],
    current: usize,
}

impl PingPongTargets {
    /// Creates both targets. The current index starts at 0.
    pub fn create(
        device: &Arc<dyn GraphicsDevice>,
        size: Extent2D,
        format: TextureFormat,
    ) -> Result<Self, PassError> {
        Ok(Self {
            targets: [
                RenderTargetGuard::create(Arc::clone(device), size, format)?,
                RenderTargetGuard::create(Arc::clone(device), size, format)?,
            ],
            current: 0,
        })
    }

    /// The target holding the latest result.
    pub fn current(&self) -> &RenderTargetGuard {
        &self.targets[self.current]
    }

    /// The target to render into next.
    pub fn other(&self) -> &RenderTargetGuard {
        &self.targets[self.current ^ 1]
    }

    /// Swaps the roles of the two targets.
    pub fn flip(&mut self) {
        self.current ^= 1;
    }

    /// The index of the current target (0 or 1).
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The size both targets share.
    pub fn size(&self) -> Extent2D {
        self.targets[0].size()
    }

    /// The format both targets share.
    pub fn format(&self) -> TextureFormat {
        self.targets[0].format()
    }
}

/// The compositing layer's front/back color surfaces with an explicit swap.
///
/// The front target holds the image subsequent passes read; the back target
/// is where the next pass writes before swapping.
#[derive(Debug)]
pub struct FrontBackTargets {
    targets: [RenderTargetGuard; 2],
    front: usize,
}

impl FrontBackTargets {
    /// Wraps two equally sized targets; the first starts as the front.
    pub fn new(targets: [RenderTargetGuard; 2]) -> Self {
        Self { targets, front: 0 }
    }

    /// The surface holding the current image.
    pub fn front(&self) -> &RenderTargetGuard {
        &self.targets[self.front]
    }

    /// The surface the next pass renders into.
    pub fn back(&self) -> &RenderTargetGuard {
        &self.targets[self.front ^ 1]
    }

    /// Makes the back surface the new front.
    pub fn swap(&mut self) {
        self.front ^= 1;
    }
}

/// The shared fullscreen quad geometry a compositing pass draws with.
///
/// Four vertices, rendered as a triangle strip. The buffer is provided by
/// the compositing layer and shared across passes.
#[derive(Debug, Clone)]
pub struct FullscreenQuad {
    buffer: Arc<VertexBuffer>,
}

impl FullscreenQuad {
    /// The vertex count of the quad primitive.
    pub const VERTEX_COUNT: u32 = 4;

    /// Wraps the compositing layer's quad vertex buffer.
    pub fn new(buffer: Arc<VertexBuffer>) -> Self {
        Self { buffer }
    }

    /// The quad's vertex buffer.
    pub fn buffer(&self) -> &Arc<VertexBuffer> {
        &self.buffer
    }
}

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

//! Vertex buffer layouts and constructed vertex declarations.
//!
//! A [`VertexBuffer`] carries its own single-stream declaration, built once
//! at creation. When more than one stream is bound the cache constructs a
//! *composite* declaration by walking every bound buffer's attribute list
//! in stream order; that path lives in
//! [`StateCache`](super::cache::StateCache).

use super::translate::BackendKind;
use crate::renderer::common::VertexBufferId;
use crate::renderer::error::StateError;
use std::sync::Arc;

/// The meaning of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexSemantic {
    /// Object-space position.
    Position,
    /// Skinning blend weights.
    BlendWeight,
    /// Surface normal.
    Normal,
    /// Vertex color.
    Color,
    /// Fog coordinate.
    FogCoord,
    /// Point sprite size.
    PointSize,
    /// Skinning blend matrix indices.
    BlendIndices,
    /// Texture coordinates; the channel index selects the set.
    TexCoord,
    /// Tangent vector.
    Tangent,
    /// Binormal (bitangent) vector.
    Binormal,
}

/// The memory format of a single vertex attribute's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexElementType {
    /// One 32-bit float component.
    Float1,
    /// Two 32-bit float components.
    Float2,
    /// Three 32-bit float components.
    Float3,
    /// Four 32-bit float components.
    Float4,
    /// Four 8-bit unsigned components normalized to `[0.0, 1.0]`.
    Color,
    /// Four 8-bit unsigned integer components.
    UByte4,
    /// Two 16-bit signed integer components.
    Short2,
    /// Four 16-bit signed integer components.
    Short4,
}

impl VertexElementType {
    /// The size of one attribute of this type, in bytes.
    pub const fn byte_size(self) -> u32 {
        match self {
            Self::Float1 => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
            Self::Color | Self::UByte4 => 4,
            Self::Short2 => 4,
            Self::Short4 => 8,
        }
    }
}

/// One attribute within a vertex buffer's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// What the attribute means.
    pub semantic: VertexSemantic,
    /// The semantic channel (texture coordinate set, color set).
    pub channel: u32,
    /// Byte offset from the start of a vertex.
    pub offset: u32,
    /// The attribute's memory format.
    pub ty: VertexElementType,
}

/// A fully resolved attribute descriptor inside a built declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexElement {
    /// The stream the attribute is sourced from.
    pub stream: u32,
    /// Byte offset from the start of a vertex in that stream.
    pub offset: u32,
    /// The attribute's memory format.
    pub ty: VertexElementType,
    /// What the attribute means.
    pub semantic: VertexSemantic,
    /// The semantic channel.
    pub channel: u32,
    /// The backend usage word the semantic mapped to.
    pub usage_word: u32,
}

/// One entry of a built vertex declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationEntry {
    /// An attribute descriptor.
    Attribute(VertexElement),
    /// The terminating end-of-declaration marker.
    End,
}

/// An ordered, terminated sequence of attribute descriptors.
///
/// The final entry is always [`DeclarationEntry::End`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexDeclaration {
    entries: Vec<DeclarationEntry>,
}

impl VertexDeclaration {
    /// Starts building a declaration for the given backend.
    pub fn builder(backend: BackendKind) -> VertexDeclarationBuilder {
        VertexDeclarationBuilder {
            backend,
            entries: Vec::new(),
        }
    }

    /// All entries, including the terminating end marker.
    pub fn entries(&self) -> &[DeclarationEntry] {
        &self.entries
    }

    /// Iterates the attribute descriptors, skipping the end marker.
    pub fn attributes(&self) -> impl Iterator<Item = &VertexElement> {
        self.entries.iter().filter_map(|e| match e {
            DeclarationEntry::Attribute(el) => Some(el),
            DeclarationEntry::End => None,
        })
    }

    /// The number of attribute descriptors (end marker excluded).
    pub fn attribute_count(&self) -> usize {
        self.entries.len() - 1
    }
}

/// Incrementally constructs a [`VertexDeclaration`].
///
/// Each pushed attribute has its semantic mapped to the backend usage word;
/// a mapping miss aborts the build.
#[derive(Debug)]
pub struct VertexDeclarationBuilder {
    backend: BackendKind,
    entries: Vec<DeclarationEntry>,
}

impl VertexDeclarationBuilder {
    /// Appends one attribute sourced from the given stream.
    pub fn push(&mut self, stream: u32, attribute: &VertexAttribute) -> Result<(), StateError> {
        let usage_word = self
            .backend
            .semantic_usage_word(attribute.semantic, attribute.channel)?;
        self.entries.push(DeclarationEntry::Attribute(VertexElement {
            stream,
            offset: attribute.offset,
            ty: attribute.ty,
            semantic: attribute.semantic,
            channel: attribute.channel,
            usage_word,
        }));
        Ok(())
    }

    /// Appends the end marker and produces the finished declaration.
    pub fn finish(mut self) -> VertexDeclaration {
        self.entries.push(DeclarationEntry::End);
        VertexDeclaration {
            entries: self.entries,
        }
    }
}

/// A vertex buffer handle together with its attribute layout.
///
/// The buffer memory itself is owned by the graphics device; this type
/// carries what the state cache needs to bind the buffer and to construct
/// declarations: the stride, the attribute list, and a prebuilt
/// single-stream declaration used on the single-stream fast path.
#[derive(Debug)]
pub struct VertexBuffer {
    id: VertexBufferId,
    stride: u32,
    attributes: Vec<VertexAttribute>,
    declaration: VertexDeclaration,
}

impl VertexBuffer {
    /// Describes a buffer's layout and prebuilds its stream-0 declaration.
    ///
    /// Fails if any attribute's semantic has no mapping on the backend.
    pub fn new(
        id: VertexBufferId,
        stride: u32,
        attributes: Vec<VertexAttribute>,
        backend: BackendKind,
    ) -> Result<Self, StateError> {
        let mut builder = VertexDeclaration::builder(backend);
        for attribute in &attributes {
            builder.push(0, attribute)?;
        }
        Ok(Self {
            id,
            stride,
            attributes,
            declaration: builder.finish(),
        })
    }

    /// The device handle of the buffer.
    pub fn id(&self) -> VertexBufferId {
        self.id
    }

    /// The byte distance between consecutive vertices.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// The buffer's attribute layout.
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// The prebuilt single-stream declaration.
    pub fn declaration(&self) -> &VertexDeclaration {
        &self.declaration
    }
}

/// A vertex buffer bound to a specific input stream.
///
/// Two bindings are the same when they reference the same buffer object
/// (pointer identity, not layout equality) at the same byte offset.
#[derive(Debug, Clone)]
pub struct StreamBinding {
    /// The bound buffer.
    pub buffer: Arc<VertexBuffer>,
    /// The byte offset into the buffer.
    pub offset: u32,
}

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

//! Resource views: the concrete resources a caller binds to a pipeline layout.

use super::{BindFlags, BufferId, SamplerId, TextureViewId};
use crate::renderer::api::util::ResourceType;
use std::num::NonZeroU64;

/// A bindable resource, one of a closed set of variants.
///
/// Each variant exposes the same capability set (resource type, bind flags and
/// a native view descriptor), which is everything the binding subsystem needs
/// to match it against a layout slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindableResource {
    /// A GPU buffer.
    Buffer {
        /// The buffer handle.
        buffer: BufferId,
        /// The usages the buffer was created with.
        bind_flags: BindFlags,
        /// The total size of the buffer in bytes.
        size: u64,
    },
    /// A texture, through one of its views.
    Texture {
        /// The texture view handle.
        view: TextureViewId,
        /// The usages the texture was created with.
        bind_flags: BindFlags,
        /// The number of mip levels of the texture.
        mip_levels: u32,
        /// The number of array layers of the texture.
        array_layers: u32,
    },
    /// A texture sampler.
    Sampler {
        /// The sampler handle.
        sampler: SamplerId,
    },
}

impl BindableResource {
    /// Convenience constructor for a buffer resource.
    pub fn buffer(buffer: BufferId, bind_flags: BindFlags, size: u64) -> Self {
        Self::Buffer {
            buffer,
            bind_flags,
            size,
        }
    }

    /// Convenience constructor for a single-mip, single-layer texture resource.
    pub fn texture(view: TextureViewId, bind_flags: BindFlags) -> Self {
        Self::Texture {
            view,
            bind_flags,
            mip_levels: 1,
            array_layers: 1,
        }
    }

    /// Convenience constructor for a sampler resource.
    pub fn sampler(sampler: SamplerId) -> Self {
        Self::Sampler { sampler }
    }

    /// Returns the native category of this resource.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            BindableResource::Buffer { .. } => ResourceType::Buffer,
            BindableResource::Texture { .. } => ResourceType::Texture,
            BindableResource::Sampler { .. } => ResourceType::Sampler,
        }
    }

    /// Returns the declared usage capabilities of this resource.
    ///
    /// Samplers carry no bind flags; they only ever match sampler slots.
    pub fn bind_flags(&self) -> BindFlags {
        match self {
            BindableResource::Buffer { bind_flags, .. }
            | BindableResource::Texture { bind_flags, .. } => *bind_flags,
            BindableResource::Sampler { .. } => BindFlags::empty(),
        }
    }

    /// Builds the native view descriptor for this resource, restricted to `range`.
    ///
    /// A range of the wrong shape for the resource (a texture subresource on a
    /// buffer, for example) is ignored and the whole resource is viewed.
    pub fn native_view(&self, range: Option<&ViewRange>) -> ViewDescriptor {
        match (self, range) {
            (BindableResource::Buffer { buffer, .. }, Some(ViewRange::Buffer(range))) => {
                ViewDescriptor::Buffer {
                    buffer: *buffer,
                    offset: range.offset,
                    size: range.size,
                }
            }
            (BindableResource::Buffer { buffer, size, .. }, other) => {
                warn_on_mismatched_range(other, ResourceType::Buffer);
                ViewDescriptor::Buffer {
                    buffer: *buffer,
                    offset: 0,
                    size: NonZeroU64::new(*size),
                }
            }
            (BindableResource::Texture { view, .. }, Some(ViewRange::Texture(subresource))) => {
                ViewDescriptor::Texture {
                    view: *view,
                    subresource: *subresource,
                }
            }
            (
                BindableResource::Texture {
                    view,
                    mip_levels,
                    array_layers,
                    ..
                },
                other,
            ) => {
                warn_on_mismatched_range(other, ResourceType::Texture);
                ViewDescriptor::Texture {
                    view: *view,
                    subresource: TextureSubresource {
                        base_mip_level: 0,
                        mip_level_count: *mip_levels,
                        base_array_layer: 0,
                        array_layer_count: *array_layers,
                    },
                }
            }
            (BindableResource::Sampler { sampler }, other) => {
                warn_on_mismatched_range(other, ResourceType::Sampler);
                ViewDescriptor::Sampler { sampler: *sampler }
            }
        }
    }
}

fn warn_on_mismatched_range(range: Option<&ViewRange>, resource_type: ResourceType) {
    if let Some(range) = range {
        log::warn!("Ignoring view range {range:?} on a {resource_type:?} resource");
    }
}

/// A byte range inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRange {
    /// Offset into the buffer in bytes.
    pub offset: u64,
    /// Size of the range, or `None` to view from `offset` to the end of the buffer.
    pub size: Option<NonZeroU64>,
}

/// A mip/array-layer range inside a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSubresource {
    /// The first mip level visible through the view.
    pub base_mip_level: u32,
    /// The number of mip levels visible through the view.
    pub mip_level_count: u32,
    /// The first array layer visible through the view.
    pub base_array_layer: u32,
    /// The number of array layers visible through the view.
    pub array_layer_count: u32,
}

/// The optional sub-range of a [`ResourceView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRange {
    /// A byte range of a buffer.
    Buffer(BufferRange),
    /// A subresource range of a texture.
    Texture(TextureSubresource),
}

/// The backend-agnostic description of one native view, handed to the device
/// when a descriptor is written into a heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewDescriptor {
    /// A view of a buffer range.
    Buffer {
        /// The viewed buffer.
        buffer: BufferId,
        /// Offset into the buffer in bytes.
        offset: u64,
        /// Size of the view, or `None` for the rest of the buffer.
        size: Option<NonZeroU64>,
    },
    /// A view of a texture subresource.
    Texture {
        /// The viewed texture.
        view: TextureViewId,
        /// The visible mip levels and array layers.
        subresource: TextureSubresource,
    },
    /// A sampler.
    Sampler {
        /// The sampler.
        sampler: SamplerId,
    },
}

/// One entry of the ordered resource-view list supplied to a resource heap.
///
/// `resource` is `None` for a null entry, which the binding subsystem rejects
/// before any heap is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceView {
    /// The bound resource, or `None` for a null reference.
    pub resource: Option<BindableResource>,
    /// An optional sub-range of the resource.
    pub range: Option<ViewRange>,
}

impl ResourceView {
    /// A view of the whole resource.
    pub fn new(resource: BindableResource) -> Self {
        Self {
            resource: Some(resource),
            range: None,
        }
    }

    /// A view restricted to `range`.
    pub fn with_range(resource: BindableResource, range: ViewRange) -> Self {
        Self {
            resource: Some(resource),
            range: Some(range),
        }
    }

    /// An entry with no backing resource.
    pub fn null() -> Self {
        Self {
            resource: None,
            range: None,
        }
    }
}

impl From<BindableResource> for ResourceView {
    fn from(resource: BindableResource) -> Self {
        Self::new(resource)
    }
}

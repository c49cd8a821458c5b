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

use crate::renderer::api::{
    heap::DescriptorHeapKind,
    resource::{BindFlags, BindableResource},
    util::ResourceType,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of descriptor a layout slot expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DescriptorKind {
    /// A constant (uniform) buffer, written as a constant-buffer view.
    ConstantBuffer,
    /// A read-only buffer, written as a shader-resource view.
    SampledBuffer,
    /// A read-only texture, written as a shader-resource view.
    SampledTexture,
    /// A read-write buffer, written as an unordered-access view.
    StorageBuffer,
    /// A read-write texture, written as an unordered-access view.
    StorageTexture,
    /// A sampler, written into the sampler heap.
    Sampler,
}

impl DescriptorKind {
    /// Every descriptor kind, in declaration order.
    pub const ALL: [DescriptorKind; 6] = [
        DescriptorKind::ConstantBuffer,
        DescriptorKind::SampledBuffer,
        DescriptorKind::SampledTexture,
        DescriptorKind::StorageBuffer,
        DescriptorKind::StorageTexture,
        DescriptorKind::Sampler,
    ];

    /// The resource type a view must have to fill a slot of this kind.
    pub const fn resource_type(self) -> ResourceType {
        match self {
            DescriptorKind::ConstantBuffer
            | DescriptorKind::SampledBuffer
            | DescriptorKind::StorageBuffer => ResourceType::Buffer,
            DescriptorKind::SampledTexture | DescriptorKind::StorageTexture => {
                ResourceType::Texture
            }
            DescriptorKind::Sampler => ResourceType::Sampler,
        }
    }

    /// The bind flag a resource must carry to fill a slot of this kind.
    ///
    /// Samplers require no flag.
    pub const fn required_bind_flags(self) -> BindFlags {
        match self {
            DescriptorKind::ConstantBuffer => BindFlags::CONSTANT_BUFFER,
            DescriptorKind::SampledBuffer | DescriptorKind::SampledTexture => BindFlags::SAMPLED,
            DescriptorKind::StorageBuffer | DescriptorKind::StorageTexture => BindFlags::STORAGE,
            DescriptorKind::Sampler => BindFlags::empty(),
        }
    }

    /// The physical heap descriptors of this kind are written into.
    pub const fn heap_kind(self) -> DescriptorHeapKind {
        match self {
            DescriptorKind::Sampler => DescriptorHeapKind::Sampler,
            _ => DescriptorHeapKind::CombinedView,
        }
    }

    /// Returns `true` if `resource` can fill a slot of this kind.
    pub fn accepts(self, resource: &BindableResource) -> bool {
        resource.resource_type() == self.resource_type()
            && resource.bind_flags().contains(self.required_bind_flags())
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DescriptorKind::ConstantBuffer => "constant buffer",
            DescriptorKind::SampledBuffer => "sampled buffer",
            DescriptorKind::SampledTexture => "sampled texture",
            DescriptorKind::StorageBuffer => "storage buffer",
            DescriptorKind::StorageTexture => "storage texture",
            DescriptorKind::Sampler => "sampler",
        };
        f.write_str(name)
    }
}

/// The versioned order in which descriptor kinds are laid out.
///
/// Layout realization on a backend and heap filling must agree on this order,
/// otherwise native binding indices drift from the declared layout. Both sides
/// carry a `BindingOrder` and the binding subsystem refuses to build a heap when
/// they differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BindingOrder {
    /// Constant buffers, sampled buffers, sampled textures, storage buffers,
    /// storage textures, then samplers.
    V1,
}

impl BindingOrder {
    /// The order used by default by layouts and devices.
    pub const CURRENT: BindingOrder = BindingOrder::V1;

    /// The descriptor-kind passes of one set, in order.
    pub const fn passes(self) -> &'static [DescriptorKind; 6] {
        match self {
            BindingOrder::V1 => &[
                DescriptorKind::ConstantBuffer,
                DescriptorKind::SampledBuffer,
                DescriptorKind::SampledTexture,
                DescriptorKind::StorageBuffer,
                DescriptorKind::StorageTexture,
                DescriptorKind::Sampler,
            ],
        }
    }

    /// Position of `kind` in [`BindingOrder::passes`].
    pub fn pass_index(self, kind: DescriptorKind) -> usize {
        self.passes()
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(self.passes().len())
    }
}

impl Default for BindingOrder {
    fn default() -> Self {
        BindingOrder::CURRENT
    }
}

impl fmt::Display for BindingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingOrder::V1 => f.write_str("v1"),
        }
    }
}

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

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// The native descriptor-heap interface of a graphics backend.
///
/// Backends serialize their own state; whether two threads may create heaps or
/// write views concurrently is up to the implementation.
pub trait DescriptorDevice: Send + Sync + Debug + 'static {
    /// Returns the backend this device belongs to.
    fn backend_type(&self) -> GraphicsBackendType;

    /// Returns the descriptor-kind/stage combinations this device can realize.
    fn binding_capabilities(&self) -> BindingCapabilities {
        BindingCapabilities::all()
    }

    /// Returns the pass order this device realizes native layouts with.
    fn binding_order(&self) -> BindingOrder {
        BindingOrder::CURRENT
    }

    /// Returns the distance between two consecutive descriptors of a heap kind,
    /// in the units [`DescriptorCursor::offset`] is expressed in.
    fn descriptor_increment_size(&self, heap: DescriptorHeapKind) -> u64;

    /// Creates a shader-visible heap for constant-buffer, shader-resource and
    /// unordered-access views.
    /// ## Arguments
    /// * `count` - The number of descriptors the heap must hold.
    /// ## Returns
    /// The ID of the new heap.
    /// ## Errors
    /// * `ResourceError` - If the heap cannot be created.
    fn create_combined_view_heap(&self, count: u32) -> Result<DescriptorHeapId, ResourceError>;

    /// Creates a shader-visible sampler heap.
    /// ## Arguments
    /// * `count` - The number of samplers the heap must hold.
    /// ## Errors
    /// * `ResourceError` - If the heap cannot be created.
    fn create_sampler_heap(&self, count: u32) -> Result<DescriptorHeapId, ResourceError>;

    /// Releases a heap created by this device.
    /// ## Errors
    /// * `ResourceError::NotFound` - If `id` does not name a live heap.
    fn destroy_descriptor_heap(&self, id: DescriptorHeapId) -> Result<(), ResourceError>;

    /// Returns a cursor pointing at the first descriptor of a heap.
    fn heap_start(&self, id: DescriptorHeapId) -> Result<DescriptorCursor, ResourceError>;

    /// Writes a constant-buffer view at `cursor`.
    fn write_constant_buffer_view(
        &self,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError>;

    /// Writes a shader-resource (read-only) view at `cursor`.
    fn write_shader_resource_view(
        &self,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError>;

    /// Writes an unordered-access (read-write) view at `cursor`.
    fn write_unordered_access_view(
        &self,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError>;

    /// Writes a sampler at `cursor`.
    fn write_sampler_view(
        &self,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError>;

    /// Writes the native view matching `kind` at `cursor`.
    fn write_view(
        &self,
        kind: DescriptorKind,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError> {
        match kind {
            DescriptorKind::ConstantBuffer => self.write_constant_buffer_view(view, cursor),
            DescriptorKind::SampledBuffer | DescriptorKind::SampledTexture => {
                self.write_shader_resource_view(view, cursor)
            }
            DescriptorKind::StorageBuffer | DescriptorKind::StorageTexture => {
                self.write_unordered_access_view(view, cursor)
            }
            DescriptorKind::Sampler => self.write_sampler_view(view, cursor),
        }
    }

    /// Attaches a debug name to a heap.
    ///
    /// Devices without debug-name support return `ResourceError::Unsupported`.
    fn set_descriptor_heap_name(
        &self,
        id: DescriptorHeapId,
        name: &str,
    ) -> Result<(), ResourceError> {
        let _ = (id, name);
        Err(ResourceError::Unsupported(
            "descriptor heap debug names".to_string(),
        ))
    }
}

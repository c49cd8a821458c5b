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
    DescriptorCursor, DescriptorHeapId, DescriptorHeapKind, PipelineLayout, ResourceType,
    ResourceView,
};
use crate::renderer::error::BindingError;
use crate::renderer::traits::DescriptorDevice;

/// Number of descriptors each native heap must hold for a given view list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapRequirements {
    /// Buffer and texture views, destined for the combined heap.
    pub combined_views: u32,
    /// Sampler views, destined for the sampler heap.
    pub samplers: u32,
}

impl HeapRequirements {
    /// Counts `views` per heap kind.
    ///
    /// ## Errors
    ///
    /// Returns [`BindingError::NullResourceReference`] for the first view with no
    /// backing resource.
    pub fn count(views: &[ResourceView]) -> Result<Self, BindingError> {
        let mut requirements = Self::default();
        for (index, view) in views.iter().enumerate() {
            let resource = view
                .resource
                .as_ref()
                .ok_or(BindingError::NullResourceReference { index })?;
            match resource.resource_type() {
                ResourceType::Buffer | ResourceType::Texture => requirements.combined_views += 1,
                ResourceType::Sampler => requirements.samplers += 1,
            }
        }
        Ok(requirements)
    }

    /// The descriptor count for `kind`.
    pub fn get(&self, kind: DescriptorHeapKind) -> u32 {
        match kind {
            DescriptorHeapKind::CombinedView => self.combined_views,
            DescriptorHeapKind::Sampler => self.samplers,
        }
    }
}

/// One allocated native heap and the geometry of its descriptor sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapRegion {
    /// Which heap this is.
    pub kind: DescriptorHeapKind,
    /// The native heap.
    pub heap: DescriptorHeapId,
    /// Cursor at the first descriptor of the heap.
    pub start: DescriptorCursor,
    /// Distance between two consecutive descriptors.
    pub increment: u64,
    /// Distance between the first descriptors of two consecutive sets.
    pub set_stride: u64,
    /// Number of descriptors the heap was created with.
    pub capacity: u32,
}

impl HeapRegion {
    /// Cursor at the first descriptor of set `set`.
    pub fn set_cursor(&self, set: u32) -> DescriptorCursor {
        self.start.advanced(self.set_stride * u64::from(set))
    }
}

/// Sizes and creates the native heaps of a resource heap.
#[derive(Debug)]
pub struct HeapAllocator<'a> {
    device: &'a dyn DescriptorDevice,
    layout: &'a PipelineLayout,
}

impl<'a> HeapAllocator<'a> {
    /// Creates an allocator for heaps laid out after `layout`.
    pub fn new(device: &'a dyn DescriptorDevice, layout: &'a PipelineLayout) -> Self {
        Self { device, layout }
    }

    /// Counts `views` per heap kind. See [`HeapRequirements::count`].
    pub fn requirements(&self, views: &[ResourceView]) -> Result<HeapRequirements, BindingError> {
        HeapRequirements::count(views)
    }

    /// Creates the heap of `kind`, if one is needed.
    ///
    /// No heap is created when the views hold no descriptor for it or the layout
    /// declares none per set. The stride between sets is the device increment
    /// times the layout's per-set count, whatever the view list contains.
    ///
    /// ## Errors
    ///
    /// Returns [`BindingError::NativeHeapCreationFailed`] if the device refuses
    /// the heap. A heap created before the failure is released here.
    pub fn allocate(
        &self,
        kind: DescriptorHeapKind,
        requirements: &HeapRequirements,
    ) -> Result<Option<HeapRegion>, BindingError> {
        let capacity = requirements.get(kind);
        let per_set = self.layout.descriptors_per_set(kind);
        if capacity == 0 || per_set == 0 {
            return Ok(None);
        }

        let fail = |source| BindingError::NativeHeapCreationFailed {
            heap: kind,
            source: Box::new(source),
        };

        let heap = match kind {
            DescriptorHeapKind::CombinedView => self.device.create_combined_view_heap(capacity),
            DescriptorHeapKind::Sampler => self.device.create_sampler_heap(capacity),
        }
        .map_err(fail)?;

        let start = match self.device.heap_start(heap) {
            Ok(start) => start,
            Err(err) => {
                if let Err(release_err) = self.device.destroy_descriptor_heap(heap) {
                    log::warn!("Failed to release descriptor heap {heap:?}: {release_err}");
                }
                return Err(fail(err));
            }
        };

        let increment = self.device.descriptor_increment_size(kind);
        log::debug!(
            "Allocated {kind:?} heap {heap:?}: {capacity} descriptors, {per_set} per set, increment {increment}"
        );

        Ok(Some(HeapRegion {
            kind,
            heap,
            start,
            increment,
            set_stride: increment * u64::from(per_set),
            capacity,
        }))
    }
}

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

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use strata_core::renderer::{
    BindingCapabilities, DescriptorCursor, DescriptorDevice, DescriptorHeapId,
    DescriptorHeapKind, GraphicsBackendType, ResourceError, ViewDescriptor,
};

/// Configuration of a [`SoftwareDevice`].
#[derive(Debug, Clone)]
pub struct SoftwareDeviceConfig {
    /// Size in bytes of one descriptor in a combined view heap.
    pub combined_view_increment: u64,
    /// Size in bytes of one descriptor in a sampler heap.
    pub sampler_increment: u64,
    /// Largest heap the device accepts. Bigger requests fail.
    pub max_descriptors_per_heap: u32,
    /// The kind/stage pairs the device reports as supported.
    pub capabilities: BindingCapabilities,
}

impl Default for SoftwareDeviceConfig {
    fn default() -> Self {
        Self {
            combined_view_increment: 32,
            sampler_increment: 16,
            max_descriptors_per_heap: 1_000_000,
            capabilities: BindingCapabilities::all(),
        }
    }
}

/// A descriptor recorded by a [`SoftwareDevice`], tagged with its native view class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftwareDescriptor {
    /// Written by `write_constant_buffer_view`.
    ConstantBuffer(ViewDescriptor),
    /// Written by `write_shader_resource_view`.
    ShaderResource(ViewDescriptor),
    /// Written by `write_unordered_access_view`.
    UnorderedAccess(ViewDescriptor),
    /// Written by `write_sampler_view`.
    Sampler(ViewDescriptor),
}

impl SoftwareDescriptor {
    /// The recorded view.
    pub fn view(&self) -> &ViewDescriptor {
        match self {
            SoftwareDescriptor::ConstantBuffer(view)
            | SoftwareDescriptor::ShaderResource(view)
            | SoftwareDescriptor::UnorderedAccess(view)
            | SoftwareDescriptor::Sampler(view) => view,
        }
    }

    fn heap_kind(&self) -> DescriptorHeapKind {
        match self {
            SoftwareDescriptor::Sampler(_) => DescriptorHeapKind::Sampler,
            _ => DescriptorHeapKind::CombinedView,
        }
    }

    fn has_valid_view(&self) -> bool {
        matches!(
            self,
            SoftwareDescriptor::ConstantBuffer(ViewDescriptor::Buffer { .. })
                | SoftwareDescriptor::ShaderResource(
                    ViewDescriptor::Buffer { .. } | ViewDescriptor::Texture { .. }
                )
                | SoftwareDescriptor::UnorderedAccess(
                    ViewDescriptor::Buffer { .. } | ViewDescriptor::Texture { .. }
                )
                | SoftwareDescriptor::Sampler(ViewDescriptor::Sampler { .. })
        )
    }
}

#[derive(Debug)]
struct SoftwareHeap {
    kind: DescriptorHeapKind,
    name: Option<String>,
    descriptors: Vec<Option<SoftwareDescriptor>>,
}

/// The internal, non-clonable state of the [`SoftwareDevice`].
#[derive(Debug)]
struct SoftwareDeviceInternal {
    config: SoftwareDeviceConfig,
    heaps: Mutex<HashMap<DescriptorHeapId, SoftwareHeap>>,
    next_heap_id: AtomicUsize,
}

/// A clonable handle to a CPU descriptor device.
///
/// Heaps are plain descriptor arrays addressed in bytes, one increment per
/// descriptor, the way a D3D12 CPU descriptor handle is.
#[derive(Clone, Debug)]
pub struct SoftwareDevice {
    internal: Arc<SoftwareDeviceInternal>,
}

impl Default for SoftwareDevice {
    fn default() -> Self {
        Self::new(SoftwareDeviceConfig::default())
    }
}

impl SoftwareDevice {
    /// Creates a device with the given configuration.
    pub fn new(config: SoftwareDeviceConfig) -> Self {
        log::info!(
            "SoftwareDevice: created (increments {}/{} bytes, max {} descriptors per heap)",
            config.combined_view_increment,
            config.sampler_increment,
            config.max_descriptors_per_heap
        );
        Self {
            internal: Arc::new(SoftwareDeviceInternal {
                config,
                heaps: Mutex::new(HashMap::new()),
                next_heap_id: AtomicUsize::new(0),
            }),
        }
    }

    /// The configuration the device was created with.
    pub fn config(&self) -> &SoftwareDeviceConfig {
        &self.internal.config
    }

    /// Number of heaps currently alive.
    pub fn live_heaps(&self) -> usize {
        self.heaps().map(|heaps| heaps.len()).unwrap_or(0)
    }

    /// A snapshot of the descriptors of a heap, one entry per slot.
    pub fn descriptors(
        &self,
        id: DescriptorHeapId,
    ) -> Result<Vec<Option<SoftwareDescriptor>>, ResourceError> {
        let heaps = self.heaps()?;
        let heap = heaps.get(&id).ok_or(ResourceError::NotFound)?;
        Ok(heap.descriptors.clone())
    }

    /// The kind a heap was created as.
    pub fn heap_kind(&self, id: DescriptorHeapId) -> Result<DescriptorHeapKind, ResourceError> {
        let heaps = self.heaps()?;
        heaps
            .get(&id)
            .map(|heap| heap.kind)
            .ok_or(ResourceError::NotFound)
    }

    /// The debug name of a heap, if one was set.
    pub fn heap_name(&self, id: DescriptorHeapId) -> Option<String> {
        self.heaps()
            .ok()
            .and_then(|heaps| heaps.get(&id).and_then(|heap| heap.name.clone()))
    }

    fn heaps(&self) -> Result<MutexGuard<'_, HashMap<DescriptorHeapId, SoftwareHeap>>, ResourceError> {
        self.internal
            .heaps
            .lock()
            .map_err(|_| ResourceError::BackendError("descriptor heap table poisoned".to_string()))
    }

    fn create_heap(
        &self,
        kind: DescriptorHeapKind,
        count: u32,
    ) -> Result<DescriptorHeapId, ResourceError> {
        if self.descriptor_increment_size(kind) == 0 {
            return Err(ResourceError::BackendError(format!(
                "{kind:?} heaps need a nonzero descriptor increment"
            )));
        }
        let max = self.internal.config.max_descriptors_per_heap;
        if count > max {
            return Err(ResourceError::BackendError(format!(
                "{kind:?} heap of {count} descriptors exceeds the limit of {max}"
            )));
        }
        let id = DescriptorHeapId(self.internal.next_heap_id.fetch_add(1, Ordering::Relaxed));
        self.heaps()?.insert(
            id,
            SoftwareHeap {
                kind,
                name: None,
                descriptors: vec![None; count as usize],
            },
        );
        log::debug!("SoftwareDevice: Created {kind:?} heap {id:?} with {count} descriptors");
        Ok(id)
    }

    fn write(
        &self,
        descriptor: SoftwareDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError> {
        if !descriptor.has_valid_view() {
            return Err(ResourceError::InvalidHandle);
        }
        let mut heaps = self.heaps()?;
        let heap = heaps.get_mut(&cursor.heap).ok_or(ResourceError::NotFound)?;
        if heap.kind != descriptor.heap_kind() {
            return Err(ResourceError::InvalidHandle);
        }
        let increment = self.descriptor_increment_size(heap.kind);
        if cursor.offset % increment != 0 {
            return Err(ResourceError::OutOfBounds);
        }
        let slot = heap
            .descriptors
            .get_mut((cursor.offset / increment) as usize)
            .ok_or(ResourceError::OutOfBounds)?;
        *slot = Some(descriptor);
        log::trace!(
            "SoftwareDevice: Wrote {descriptor:?} to heap {:?} at offset {}",
            cursor.heap,
            cursor.offset
        );
        Ok(())
    }
}

impl DescriptorDevice for SoftwareDevice {
    fn backend_type(&self) -> GraphicsBackendType {
        GraphicsBackendType::Software
    }

    fn binding_capabilities(&self) -> BindingCapabilities {
        self.internal.config.capabilities
    }

    fn descriptor_increment_size(&self, heap: DescriptorHeapKind) -> u64 {
        match heap {
            DescriptorHeapKind::CombinedView => self.internal.config.combined_view_increment,
            DescriptorHeapKind::Sampler => self.internal.config.sampler_increment,
        }
    }

    fn create_combined_view_heap(&self, count: u32) -> Result<DescriptorHeapId, ResourceError> {
        self.create_heap(DescriptorHeapKind::CombinedView, count)
    }

    fn create_sampler_heap(&self, count: u32) -> Result<DescriptorHeapId, ResourceError> {
        self.create_heap(DescriptorHeapKind::Sampler, count)
    }

    fn destroy_descriptor_heap(&self, id: DescriptorHeapId) -> Result<(), ResourceError> {
        if self.heaps()?.remove(&id).is_some() {
            log::debug!("SoftwareDevice: Destroyed heap {id:?}");
            Ok(())
        } else {
            Err(ResourceError::NotFound)
        }
    }

    fn heap_start(&self, id: DescriptorHeapId) -> Result<DescriptorCursor, ResourceError> {
        if self.heaps()?.contains_key(&id) {
            Ok(DescriptorCursor::new(id, 0))
        } else {
            Err(ResourceError::NotFound)
        }
    }

    fn write_constant_buffer_view(
        &self,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError> {
        self.write(SoftwareDescriptor::ConstantBuffer(*view), cursor)
    }

    fn write_shader_resource_view(
        &self,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError> {
        self.write(SoftwareDescriptor::ShaderResource(*view), cursor)
    }

    fn write_unordered_access_view(
        &self,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError> {
        self.write(SoftwareDescriptor::UnorderedAccess(*view), cursor)
    }

    fn write_sampler_view(
        &self,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError> {
        self.write(SoftwareDescriptor::Sampler(*view), cursor)
    }

    fn set_descriptor_heap_name(
        &self,
        id: DescriptorHeapId,
        name: &str,
    ) -> Result<(), ResourceError> {
        let mut heaps = self.heaps()?;
        let heap = heaps.get_mut(&id).ok_or(ResourceError::NotFound)?;
        heap.name = Some(name.to_string());
        Ok(())
    }
}

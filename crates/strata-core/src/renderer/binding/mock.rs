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

//! An in-memory [`DescriptorDevice`] used by the binding tests.

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use crate::renderer::traits::DescriptorDevice;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A view recorded by the mock, tagged with the write call that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WrittenView {
    ConstantBuffer(ViewDescriptor),
    ShaderResource(ViewDescriptor),
    UnorderedAccess(ViewDescriptor),
    Sampler(ViewDescriptor),
}

#[derive(Debug)]
struct MockHeap {
    kind: DescriptorHeapKind,
    slots: Vec<Option<WrittenView>>,
    name: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct MockDescriptorDevice {
    next_id: AtomicUsize,
    heaps: Mutex<HashMap<DescriptorHeapId, MockHeap>>,
    created: AtomicUsize,
    fail_sampler_heaps: bool,
    fail_writes: bool,
    no_debug_names: bool,
    binding_order: BindingOrder,
}

impl MockDescriptorDevice {
    pub const COMBINED_INCREMENT: u64 = 32;
    pub const SAMPLER_INCREMENT: u64 = 16;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_sampler_heaps(mut self) -> Self {
        self.fail_sampler_heaps = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn without_debug_names(mut self) -> Self {
        self.no_debug_names = true;
        self
    }

    pub fn live_heaps(&self) -> usize {
        self.heaps.lock().unwrap().len()
    }

    pub fn created_heaps(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn written(&self, heap: DescriptorHeapId) -> Vec<Option<WrittenView>> {
        self.heaps.lock().unwrap()[&heap].slots.clone()
    }

    pub fn heap_kind(&self, heap: DescriptorHeapId) -> DescriptorHeapKind {
        self.heaps.lock().unwrap()[&heap].kind
    }

    pub fn heap_name(&self, heap: DescriptorHeapId) -> Option<String> {
        self.heaps.lock().unwrap()[&heap].name.clone()
    }

    fn create_heap(&self, kind: DescriptorHeapKind, count: u32) -> DescriptorHeapId {
        let id = DescriptorHeapId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.created.fetch_add(1, Ordering::Relaxed);
        self.heaps.lock().unwrap().insert(
            id,
            MockHeap {
                kind,
                slots: vec![None; count as usize],
                name: None,
            },
        );
        id
    }

    fn write(&self, view: WrittenView, cursor: DescriptorCursor) -> Result<(), ResourceError> {
        if self.fail_writes {
            return Err(ResourceError::BackendError("write refused".to_string()));
        }
        let mut heaps = self.heaps.lock().unwrap();
        let heap = heaps.get_mut(&cursor.heap).ok_or(ResourceError::NotFound)?;
        let slot = (cursor.offset / self.descriptor_increment_size(heap.kind)) as usize;
        let entry = heap.slots.get_mut(slot).ok_or(ResourceError::OutOfBounds)?;
        *entry = Some(view);
        Ok(())
    }
}

impl DescriptorDevice for MockDescriptorDevice {
    fn backend_type(&self) -> GraphicsBackendType {
        GraphicsBackendType::Unknown
    }

    fn binding_order(&self) -> BindingOrder {
        self.binding_order
    }

    fn descriptor_increment_size(&self, heap: DescriptorHeapKind) -> u64 {
        match heap {
            DescriptorHeapKind::CombinedView => Self::COMBINED_INCREMENT,
            DescriptorHeapKind::Sampler => Self::SAMPLER_INCREMENT,
        }
    }

    fn create_combined_view_heap(&self, count: u32) -> Result<DescriptorHeapId, ResourceError> {
        Ok(self.create_heap(DescriptorHeapKind::CombinedView, count))
    }

    fn create_sampler_heap(&self, count: u32) -> Result<DescriptorHeapId, ResourceError> {
        if self.fail_sampler_heaps {
            return Err(ResourceError::BackendError("out of sampler heaps".to_string()));
        }
        Ok(self.create_heap(DescriptorHeapKind::Sampler, count))
    }

    fn destroy_descriptor_heap(&self, id: DescriptorHeapId) -> Result<(), ResourceError> {
        self.heaps
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn heap_start(&self, id: DescriptorHeapId) -> Result<DescriptorCursor, ResourceError> {
        if self.heaps.lock().unwrap().contains_key(&id) {
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
        self.write(WrittenView::ConstantBuffer(*view), cursor)
    }

    fn write_shader_resource_view(
        &self,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError> {
        self.write(WrittenView::ShaderResource(*view), cursor)
    }

    fn write_unordered_access_view(
        &self,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError> {
        self.write(WrittenView::UnorderedAccess(*view), cursor)
    }

    fn write_sampler_view(
        &self,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError> {
        self.write(WrittenView::Sampler(*view), cursor)
    }

    fn set_descriptor_heap_name(
        &self,
        id: DescriptorHeapId,
        name: &str,
    ) -> Result<(), ResourceError> {
        if self.no_debug_names {
            return Err(ResourceError::Unsupported("debug names".to_string()));
        }
        let mut heaps = self.heaps.lock().unwrap();
        let heap = heaps.get_mut(&id).ok_or(ResourceError::NotFound)?;
        heap.name = Some(name.to_string());
        Ok(())
    }
}

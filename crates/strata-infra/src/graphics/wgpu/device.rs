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

use anyhow::anyhow;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use strata_core::renderer::{
    BindableResource, BindingCapabilities, BindingError, BufferId, DescriptorCursor,
    DescriptorDevice, DescriptorHeapId, DescriptorHeapKind, DescriptorKind, GraphicsBackendType,
    PipelineLayout, ResourceError, ResourceHeap, ResourceType, SamplerId, ShaderStageFlags,
    TextureSubresource, TextureViewId, ViewDescriptor,
};

use super::conversions::{from_wgpu_backend, from_wgpu_buffer_usages, from_wgpu_texture_usages, IntoWgpu};

/// The stages a wgpu pipeline can bind resources to.
const WGPU_STAGES: ShaderStageFlags = ShaderStageFlags::VERTEX
    .union(ShaderStageFlags::FRAGMENT)
    .union(ShaderStageFlags::COMPUTE);

/// Read-write resources are not visible to vertex shaders on wgpu.
const WGPU_STORAGE_STAGES: ShaderStageFlags =
    ShaderStageFlags::FRAGMENT.union(ShaderStageFlags::COMPUTE);

/// Binding types wgpu needs that a [`PipelineLayout`] does not carry.
#[derive(Debug, Clone, Copy)]
pub struct WgpuLayoutOptions {
    /// Sample type of every sampled-texture binding.
    pub texture_sample_type: wgpu::TextureSampleType,
    /// View dimension of every texture binding.
    pub texture_view_dimension: wgpu::TextureViewDimension,
    /// Format of every storage-texture binding.
    pub storage_texture_format: wgpu::TextureFormat,
    /// Access mode of every storage-texture binding.
    pub storage_texture_access: wgpu::StorageTextureAccess,
    /// Type of every sampler binding.
    pub sampler_binding_type: wgpu::SamplerBindingType,
}

impl Default for WgpuLayoutOptions {
    fn default() -> Self {
        Self {
            texture_sample_type: wgpu::TextureSampleType::Float { filterable: true },
            texture_view_dimension: wgpu::TextureViewDimension::D2,
            storage_texture_format: wgpu::TextureFormat::Rgba8Unorm,
            storage_texture_access: wgpu::StorageTextureAccess::WriteOnly,
            sampler_binding_type: wgpu::SamplerBindingType::Filtering,
        }
    }
}

#[derive(Debug)]
struct WgpuBufferEntry {
    wgpu_buffer: Arc<wgpu::Buffer>,
}

#[derive(Debug)]
struct WgpuTextureViewEntry {
    wgpu_texture: Arc<wgpu::Texture>,
    wgpu_view: Arc<wgpu::TextureView>,
    full_range: TextureSubresource,
}

#[derive(Debug)]
struct WgpuSamplerEntry {
    wgpu_sampler: Arc<wgpu::Sampler>,
}

/// The native view class a slot was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotClass {
    ConstantBuffer,
    ShaderResource,
    UnorderedAccess,
    Sampler,
}

impl SlotClass {
    fn of(kind: DescriptorKind) -> Self {
        match kind {
            DescriptorKind::ConstantBuffer => SlotClass::ConstantBuffer,
            DescriptorKind::SampledBuffer | DescriptorKind::SampledTexture => {
                SlotClass::ShaderResource
            }
            DescriptorKind::StorageBuffer | DescriptorKind::StorageTexture => {
                SlotClass::UnorderedAccess
            }
            DescriptorKind::Sampler => SlotClass::Sampler,
        }
    }
}

/// A descriptor heap realized as a table of slots, one per descriptor.
#[derive(Debug)]
struct WgpuHeapEntry {
    kind: DescriptorHeapKind,
    label: Option<String>,
    slots: Vec<Option<(SlotClass, ViewDescriptor)>>,
}

/// The wgpu objects behind one binding of a bind group.
enum ResolvedBinding {
    Buffers(Vec<(Arc<wgpu::Buffer>, u64, Option<wgpu::BufferSize>)>),
    TextureViews(Vec<Arc<wgpu::TextureView>>),
    Samplers(Vec<Arc<wgpu::Sampler>>),
}

enum BindingRefs<'a> {
    Buffers(Vec<wgpu::BufferBinding<'a>>),
    TextureViews(Vec<&'a wgpu::TextureView>),
    Samplers(Vec<&'a wgpu::Sampler>),
}

impl ResolvedBinding {
    fn as_refs(&self) -> BindingRefs<'_> {
        match self {
            ResolvedBinding::Buffers(buffers) => BindingRefs::Buffers(
                buffers
                    .iter()
                    .map(|(buffer, offset, size)| wgpu::BufferBinding {
                        buffer: buffer.as_ref(),
                        offset: *offset,
                        size: *size,
                    })
                    .collect(),
            ),
            ResolvedBinding::TextureViews(views) => {
                BindingRefs::TextureViews(views.iter().map(|view| view.as_ref()).collect())
            }
            ResolvedBinding::Samplers(samplers) => {
                BindingRefs::Samplers(samplers.iter().map(|sampler| sampler.as_ref()).collect())
            }
        }
    }
}

impl<'a> BindingRefs<'a> {
    fn binding_resource(&self, array: bool) -> wgpu::BindingResource<'_> {
        match self {
            BindingRefs::Buffers(buffers) => match buffers.as_slice() {
                [single] if !array => wgpu::BindingResource::Buffer(single.clone()),
                many => wgpu::BindingResource::BufferArray(many),
            },
            BindingRefs::TextureViews(views) => match views.as_slice() {
                [single] if !array => wgpu::BindingResource::TextureView(single),
                many => wgpu::BindingResource::TextureViewArray(many),
            },
            BindingRefs::Samplers(samplers) => match samplers.as_slice() {
                [single] if !array => wgpu::BindingResource::Sampler(single),
                many => wgpu::BindingResource::SamplerArray(many),
            },
        }
    }
}

/// The internal, non-clonable state of the [`WgpuDescriptorDevice`].
#[derive(Debug)]
struct WgpuDescriptorDeviceInternal {
    device: wgpu::Device,
    backend: wgpu::Backend,
    buffers: Mutex<HashMap<BufferId, WgpuBufferEntry>>,
    texture_views: Mutex<HashMap<TextureViewId, WgpuTextureViewEntry>>,
    samplers: Mutex<HashMap<SamplerId, WgpuSamplerEntry>>,
    heaps: Mutex<HashMap<DescriptorHeapId, WgpuHeapEntry>>,

    next_buffer_id: AtomicUsize,
    next_texture_view_id: AtomicUsize,
    next_sampler_id: AtomicUsize,
    next_heap_id: AtomicUsize,
}

/// A clonable, thread-safe descriptor device on top of a `wgpu::Device`.
///
/// wgpu has no descriptor heaps. Heaps are kept as slot tables (increment size
/// one) and each descriptor set is turned into a `wgpu::BindGroup` on request
/// with [`WgpuDescriptorDevice::create_bind_group`]. Native binding indices
/// follow the layout's binding order, see [`WgpuDescriptorDevice::create_bind_group_layout`].
#[derive(Clone, Debug)]
pub struct WgpuDescriptorDevice {
    internal: Arc<WgpuDescriptorDeviceInternal>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ResourceError> {
    mutex
        .lock()
        .map_err(|_| ResourceError::BackendError("wgpu resource table poisoned".to_string()))
}

impl WgpuDescriptorDevice {
    /// Wraps an existing wgpu device.
    pub fn new(device: wgpu::Device, backend: wgpu::Backend) -> Self {
        log::info!("WgpuDescriptorDevice: created on backend {backend:?}");
        Self {
            internal: Arc::new(WgpuDescriptorDeviceInternal {
                device,
                backend,
                buffers: Mutex::new(HashMap::new()),
                texture_views: Mutex::new(HashMap::new()),
                samplers: Mutex::new(HashMap::new()),
                heaps: Mutex::new(HashMap::new()),
                next_buffer_id: AtomicUsize::new(0),
                next_texture_view_id: AtomicUsize::new(0),
                next_sampler_id: AtomicUsize::new(0),
                next_heap_id: AtomicUsize::new(0),
            }),
        }
    }

    /// Asynchronously requests a logical device from `adapter`.
    ///
    /// ## Returns
    /// * `Result<Self>` - The device, or an error if the adapter refused.
    pub async fn from_adapter(adapter: &wgpu::Adapter) -> anyhow::Result<Self> {
        let info = adapter.get_info();
        log::info!(
            "Requesting descriptor device from adapter \"{}\" (Backend: {:?})",
            info.name,
            info.backend
        );
        let (device, _queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Strata Descriptor Device"),
                ..Default::default()
            })
            .await
            .map_err(|e| anyhow!("Failed to create logical device: {}", e))?;
        Ok(Self::new(device, info.backend))
    }

    /// Picks the default adapter and blocks until a device is created.
    pub fn request_blocking() -> anyhow::Result<Self> {
        pollster::block_on(async {
            let instance = wgpu::Instance::default();
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions::default())
                .await
                .map_err(|e| anyhow!("No suitable graphics adapter: {}", e))?;
            Self::from_adapter(&adapter).await
        })
    }

    /// The underlying wgpu device.
    pub fn device(&self) -> &wgpu::Device {
        &self.internal.device
    }

    /// Registers a wgpu buffer and returns it as a bindable resource.
    ///
    /// Bind flags are derived from the buffer's usages.
    pub fn register_buffer(&self, buffer: wgpu::Buffer) -> Result<BindableResource, ResourceError> {
        let id = BufferId(self.internal.next_buffer_id.fetch_add(1, Ordering::Relaxed));
        let resource = BindableResource::buffer(id, from_wgpu_buffer_usages(buffer.usage()), buffer.size());
        lock(&self.internal.buffers)?.insert(
            id,
            WgpuBufferEntry {
                wgpu_buffer: Arc::new(buffer),
            },
        );
        log::debug!("WgpuDescriptorDevice: Registered buffer {id:?}");
        Ok(resource)
    }

    /// Creates and registers a buffer.
    pub fn create_buffer(
        &self,
        descriptor: &wgpu::BufferDescriptor<'_>,
    ) -> Result<BindableResource, ResourceError> {
        let buffer = self.internal.device.create_buffer(descriptor);
        self.register_buffer(buffer)
    }

    /// Registers a view covering the whole of `texture`.
    pub fn register_texture_view(
        &self,
        texture: Arc<wgpu::Texture>,
        view: wgpu::TextureView,
    ) -> Result<BindableResource, ResourceError> {
        let id = TextureViewId(self.internal.next_texture_view_id.fetch_add(1, Ordering::Relaxed));
        let bind_flags = from_wgpu_texture_usages(
            texture.usage(),
            texture.format().is_depth_stencil_format(),
        );
        let mip_levels = texture.mip_level_count();
        let array_layers = match texture.dimension() {
            wgpu::TextureDimension::D3 => 1,
            _ => texture.depth_or_array_layers(),
        };
        lock(&self.internal.texture_views)?.insert(
            id,
            WgpuTextureViewEntry {
                wgpu_texture: texture,
                wgpu_view: Arc::new(view),
                full_range: TextureSubresource {
                    base_mip_level: 0,
                    mip_level_count: mip_levels,
                    base_array_layer: 0,
                    array_layer_count: array_layers,
                },
            },
        );
        log::debug!("WgpuDescriptorDevice: Registered texture view {id:?}");
        Ok(BindableResource::Texture {
            view: id,
            bind_flags,
            mip_levels,
            array_layers,
        })
    }

    /// Registers a wgpu sampler.
    pub fn register_sampler(&self, sampler: wgpu::Sampler) -> Result<BindableResource, ResourceError> {
        let id = SamplerId(self.internal.next_sampler_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.internal.samplers)?.insert(
            id,
            WgpuSamplerEntry {
                wgpu_sampler: Arc::new(sampler),
            },
        );
        log::debug!("WgpuDescriptorDevice: Registered sampler {id:?}");
        Ok(BindableResource::sampler(id))
    }

    /// Creates and registers a sampler.
    pub fn create_sampler(
        &self,
        descriptor: &wgpu::SamplerDescriptor<'_>,
    ) -> Result<BindableResource, ResourceError> {
        let sampler = self.internal.device.create_sampler(descriptor);
        self.register_sampler(sampler)
    }

    /// Forgets a registered resource. Bind groups already created keep it alive.
    pub fn unregister(&self, resource: &BindableResource) -> Result<(), ResourceError> {
        let removed = match resource {
            BindableResource::Buffer { buffer, .. } => {
                lock(&self.internal.buffers)?.remove(buffer).is_some()
            }
            BindableResource::Texture { view, .. } => {
                lock(&self.internal.texture_views)?.remove(view).is_some()
            }
            BindableResource::Sampler { sampler } => {
                lock(&self.internal.samplers)?.remove(sampler).is_some()
            }
        };
        if removed {
            log::debug!("WgpuDescriptorDevice: Unregistered {resource:?}");
            Ok(())
        } else {
            Err(ResourceError::NotFound)
        }
    }

    /// Realizes `layout` as a wgpu bind group layout.
    ///
    /// Each binding's native index is its position in the layout's binding order.
    /// ## Errors
    /// * `ResourceError::Binding` - If the layout was realized with another binding
    ///   order, or uses a kind/stage pair wgpu cannot express.
    pub fn create_bind_group_layout(
        &self,
        layout: &PipelineLayout,
        options: &WgpuLayoutOptions,
    ) -> Result<wgpu::BindGroupLayout, ResourceError> {
        if layout.binding_order() != self.binding_order() {
            return Err(BindingError::BindingOrderMismatch {
                layout: layout.binding_order(),
                device: self.binding_order(),
            }
            .into());
        }

        let capabilities = self.binding_capabilities();
        let mut entries = Vec::with_capacity(layout.native_bindings().len());
        for binding in layout.native_bindings() {
            if !capabilities.supports(binding.kind, binding.stages) {
                return Err(BindingError::InvalidLayout(format!(
                    "{} binding {} is not visible to {:?} on wgpu",
                    binding.kind, binding.native_index, binding.stages
                ))
                .into());
            }
            let buffer_type: Option<wgpu::BufferBindingType> = binding.kind.into_wgpu();
            let ty = match (buffer_type, binding.kind) {
                (Some(ty), _) => wgpu::BindingType::Buffer {
                    ty,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                (None, DescriptorKind::SampledTexture) => wgpu::BindingType::Texture {
                    sample_type: options.texture_sample_type,
                    view_dimension: options.texture_view_dimension,
                    multisampled: false,
                },
                (None, DescriptorKind::StorageTexture) => wgpu::BindingType::StorageTexture {
                    access: options.storage_texture_access,
                    format: options.storage_texture_format,
                    view_dimension: options.texture_view_dimension,
                },
                (None, _) => wgpu::BindingType::Sampler(options.sampler_binding_type),
            };
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: binding.native_index,
                visibility: binding.stages.into_wgpu(),
                ty,
                count: if binding.array_size > 1 {
                    NonZeroU32::new(binding.array_size)
                } else {
                    None
                },
            });
        }

        let bind_group_layout =
            self.internal
                .device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: layout.label(),
                    entries: &entries,
                });
        log::info!(
            "WgpuDescriptorDevice: Created bind group layout '{}' with {} entries",
            layout.label().unwrap_or_default(),
            entries.len()
        );
        Ok(bind_group_layout)
    }

    /// Materializes descriptor set `set` of `heap` as a wgpu bind group.
    ///
    /// ## Arguments
    /// * `heap` - A resource heap built on this device.
    /// * `bind_group_layout` - The layout returned by [`Self::create_bind_group_layout`]
    ///   for `heap.layout()`.
    /// * `set` - The descriptor set, below `heap.descriptor_set_count()`.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If `set` does not exist.
    /// * `ResourceError::NotFound` - If a heap or resource is no longer registered.
    pub fn create_bind_group(
        &self,
        heap: &ResourceHeap,
        bind_group_layout: &wgpu::BindGroupLayout,
        set: u32,
    ) -> Result<wgpu::BindGroup, ResourceError> {
        let layout = heap.layout();
        let mut label = None;
        let mut resolved = Vec::with_capacity(layout.native_bindings().len());
        {
            let heaps = lock(&self.internal.heaps)?;
            let mut heap_offsets = [0u64; 2];
            for binding in layout.native_bindings() {
                let heap_kind = binding.kind.heap_kind();
                let cursor = heap
                    .set_cursor(heap_kind, set)
                    .ok_or(ResourceError::OutOfBounds)?;
                let entry = heaps.get(&cursor.heap).ok_or(ResourceError::NotFound)?;
                if label.is_none() {
                    label = entry.label.clone();
                }

                let first = (cursor.offset + heap_offsets[heap_kind.index()]) as usize;
                heap_offsets[heap_kind.index()] += u64::from(binding.array_size);
                let slots = entry
                    .slots
                    .get(first..first + binding.array_size as usize)
                    .ok_or(ResourceError::OutOfBounds)?;
                resolved.push((
                    binding.native_index,
                    binding.array_size > 1,
                    self.resolve_slots(binding.kind, slots)?,
                ));
            }
        }

        let refs: Vec<(u32, bool, BindingRefs<'_>)> = resolved
            .iter()
            .map(|(binding, array, resolved)| (*binding, *array, resolved.as_refs()))
            .collect();
        let entries: Vec<wgpu::BindGroupEntry<'_>> = refs
            .iter()
            .map(|(binding, array, refs)| wgpu::BindGroupEntry {
                binding: *binding,
                resource: refs.binding_resource(*array),
            })
            .collect();

        let bind_group = self
            .internal
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: label.as_deref(),
                layout: bind_group_layout,
                entries: &entries,
            });
        log::debug!(
            "WgpuDescriptorDevice: Created bind group for set {set} ({} entries)",
            entries.len()
        );
        Ok(bind_group)
    }

    fn resolve_slots(
        &self,
        kind: DescriptorKind,
        slots: &[Option<(SlotClass, ViewDescriptor)>],
    ) -> Result<ResolvedBinding, ResourceError> {
        let expected = SlotClass::of(kind);
        let mut views = Vec::with_capacity(slots.len());
        for slot in slots {
            match slot {
                Some((class, view)) if *class == expected => views.push(*view),
                Some(_) => return Err(ResourceError::InvalidHandle),
                None => {
                    return Err(ResourceError::BackendError(format!(
                        "{kind} slot was never written"
                    )))
                }
            }
        }

        match kind.resource_type() {
            ResourceType::Buffer => {
                let buffers = lock(&self.internal.buffers)?;
                views
                    .iter()
                    .map(|view| match view {
                        ViewDescriptor::Buffer {
                            buffer,
                            offset,
                            size,
                        } => buffers
                            .get(buffer)
                            .map(|entry| (Arc::clone(&entry.wgpu_buffer), *offset, *size))
                            .ok_or(ResourceError::NotFound),
                        _ => Err(ResourceError::InvalidHandle),
                    })
                    .collect::<Result<_, _>>()
                    .map(ResolvedBinding::Buffers)
            }
            ResourceType::Texture => {
                let texture_views = lock(&self.internal.texture_views)?;
                views
                    .iter()
                    .map(|view| match view {
                        ViewDescriptor::Texture { view, subresource } => texture_views
                            .get(view)
                            .map(|entry| Self::texture_view_for(entry, subresource))
                            .ok_or(ResourceError::NotFound),
                        _ => Err(ResourceError::InvalidHandle),
                    })
                    .collect::<Result<_, _>>()
                    .map(ResolvedBinding::TextureViews)
            }
            ResourceType::Sampler => {
                let samplers = lock(&self.internal.samplers)?;
                views
                    .iter()
                    .map(|view| match view {
                        ViewDescriptor::Sampler { sampler } => samplers
                            .get(sampler)
                            .map(|entry| Arc::clone(&entry.wgpu_sampler))
                            .ok_or(ResourceError::NotFound),
                        _ => Err(ResourceError::InvalidHandle),
                    })
                    .collect::<Result<_, _>>()
                    .map(ResolvedBinding::Samplers)
            }
        }
    }

    /// The registered view, or a narrower view of the same texture.
    fn texture_view_for(
        entry: &WgpuTextureViewEntry,
        subresource: &TextureSubresource,
    ) -> Arc<wgpu::TextureView> {
        if *subresource == entry.full_range {
            return Arc::clone(&entry.wgpu_view);
        }
        Arc::new(entry.wgpu_texture.create_view(&wgpu::TextureViewDescriptor {
            base_mip_level: subresource.base_mip_level,
            mip_level_count: Some(subresource.mip_level_count),
            base_array_layer: subresource.base_array_layer,
            array_layer_count: Some(subresource.array_layer_count),
            ..Default::default()
        }))
    }

    fn create_heap(
        &self,
        kind: DescriptorHeapKind,
        count: u32,
    ) -> Result<DescriptorHeapId, ResourceError> {
        let id = DescriptorHeapId(self.internal.next_heap_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.internal.heaps)?.insert(
            id,
            WgpuHeapEntry {
                kind,
                label: None,
                slots: vec![None; count as usize],
            },
        );
        log::debug!("WgpuDescriptorDevice: Created {kind:?} slot table {id:?} ({count} slots)");
        Ok(id)
    }

    fn write(
        &self,
        class: SlotClass,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError> {
        let registered = match view {
            ViewDescriptor::Buffer { buffer, .. } => {
                lock(&self.internal.buffers)?.contains_key(buffer)
            }
            ViewDescriptor::Texture { view, .. } => {
                lock(&self.internal.texture_views)?.contains_key(view)
            }
            ViewDescriptor::Sampler { sampler } => {
                lock(&self.internal.samplers)?.contains_key(sampler)
            }
        };
        if !registered {
            return Err(ResourceError::NotFound);
        }

        let mut heaps = lock(&self.internal.heaps)?;
        let heap = heaps.get_mut(&cursor.heap).ok_or(ResourceError::NotFound)?;
        let expected_heap = if class == SlotClass::Sampler {
            DescriptorHeapKind::Sampler
        } else {
            DescriptorHeapKind::CombinedView
        };
        if heap.kind != expected_heap {
            return Err(ResourceError::InvalidHandle);
        }
        let slot = heap
            .slots
            .get_mut(cursor.offset as usize)
            .ok_or(ResourceError::OutOfBounds)?;
        *slot = Some((class, *view));
        Ok(())
    }
}

impl DescriptorDevice for WgpuDescriptorDevice {
    fn backend_type(&self) -> GraphicsBackendType {
        from_wgpu_backend(self.internal.backend)
    }

    fn binding_capabilities(&self) -> BindingCapabilities {
        BindingCapabilities::none()
            .with_kind(DescriptorKind::ConstantBuffer, WGPU_STAGES)
            .with_kind(DescriptorKind::SampledBuffer, WGPU_STAGES)
            .with_kind(DescriptorKind::SampledTexture, WGPU_STAGES)
            .with_kind(DescriptorKind::StorageBuffer, WGPU_STORAGE_STAGES)
            .with_kind(DescriptorKind::StorageTexture, WGPU_STORAGE_STAGES)
            .with_kind(DescriptorKind::Sampler, WGPU_STAGES)
    }

    fn descriptor_increment_size(&self, _heap: DescriptorHeapKind) -> u64 {
        1
    }

    fn create_combined_view_heap(&self, count: u32) -> Result<DescriptorHeapId, ResourceError> {
        self.create_heap(DescriptorHeapKind::CombinedView, count)
    }

    fn create_sampler_heap(&self, count: u32) -> Result<DescriptorHeapId, ResourceError> {
        self.create_heap(DescriptorHeapKind::Sampler, count)
    }

    fn destroy_descriptor_heap(&self, id: DescriptorHeapId) -> Result<(), ResourceError> {
        if lock(&self.internal.heaps)?.remove(&id).is_some() {
            log::debug!("WgpuDescriptorDevice: Destroyed slot table {id:?}");
            Ok(())
        } else {
            Err(ResourceError::NotFound)
        }
    }

    fn heap_start(&self, id: DescriptorHeapId) -> Result<DescriptorCursor, ResourceError> {
        if lock(&self.internal.heaps)?.contains_key(&id) {
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
        self.write(SlotClass::ConstantBuffer, view, cursor)
    }

    fn write_shader_resource_view(
        &self,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError> {
        self.write(SlotClass::ShaderResource, view, cursor)
    }

    fn write_unordered_access_view(
        &self,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError> {
        self.write(SlotClass::UnorderedAccess, view, cursor)
    }

    fn write_sampler_view(
        &self,
        view: &ViewDescriptor,
        cursor: DescriptorCursor,
    ) -> Result<(), ResourceError> {
        self.write(SlotClass::Sampler, view, cursor)
    }

    fn set_descriptor_heap_name(
        &self,
        id: DescriptorHeapId,
        name: &str,
    ) -> Result<(), ResourceError> {
        let mut heaps = lock(&self.internal.heaps)?;
        let heap = heaps.get_mut(&id).ok_or(ResourceError::NotFound)?;
        heap.label = Some(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_kinds_are_hidden_from_vertex_shaders() {
        let capabilities = BindingCapabilities::none()
            .with_kind(DescriptorKind::StorageBuffer, WGPU_STORAGE_STAGES);
        assert!(!capabilities.supports(DescriptorKind::StorageBuffer, ShaderStageFlags::VERTEX));
        assert!(capabilities.supports(DescriptorKind::StorageBuffer, ShaderStageFlags::COMPUTE));
        assert!(WGPU_STAGES.contains_all(ShaderStageFlags::VERTEX_FRAGMENT));
        assert!(!WGPU_STAGES.intersects(ShaderStageFlags::GEOMETRY));
    }

    #[test]
    fn slot_classes_follow_descriptor_kinds() {
        assert_eq!(SlotClass::of(DescriptorKind::ConstantBuffer), SlotClass::ConstantBuffer);
        assert_eq!(SlotClass::of(DescriptorKind::SampledTexture), SlotClass::ShaderResource);
        assert_eq!(SlotClass::of(DescriptorKind::StorageBuffer), SlotClass::UnorderedAccess);
        assert_eq!(SlotClass::of(DescriptorKind::Sampler), SlotClass::Sampler);
    }

    #[test]
    fn default_layout_options_use_filtering_2d_textures() {
        let options = WgpuLayoutOptions::default();
        assert_eq!(
            options.texture_view_dimension,
            wgpu::TextureViewDimension::D2
        );
        assert_eq!(
            options.sampler_binding_type,
            wgpu::SamplerBindingType::Filtering
        );
    }
}

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

use super::allocator::{HeapAllocator, HeapRegion};
use super::resolver::{BindingResolver, SetOutcome};
use crate::renderer::api::{
    BindingSettings, DescriptorCursor, DescriptorHeapId, DescriptorHeapKind, PipelineLayout,
    ResourceView,
};
use crate::renderer::error::{BindingError, ResourceError};
use crate::renderer::traits::DescriptorDevice;
use std::sync::Arc;

/// A descriptor for a [`ResourceHeap`].
#[derive(Debug, Clone)]
pub struct ResourceHeapDescriptor<'a> {
    /// An optional debug label, applied to every native heap with a kind suffix.
    pub label: Option<&'a str>,
    /// The layout the heap is built against.
    pub layout: Arc<PipelineLayout>,
    /// The resources to bind, in layout declaration order per kind.
    pub views: &'a [ResourceView],
}

/// One or more descriptor sets of a pipeline layout, realized in native heaps.
///
/// A resource heap owns at most one combined view heap and one sampler heap and
/// releases them through its device when dropped. It is never modified after
/// construction.
#[derive(Debug)]
pub struct ResourceHeap {
    device: Arc<dyn DescriptorDevice>,
    layout: Arc<PipelineLayout>,
    regions: [Option<HeapRegion>; 2],
    descriptor_set_count: u32,
    supports_graphics: bool,
    supports_compute: bool,
    name_suffixes: [String; 2],
}

impl ResourceHeap {
    /// Builds a resource heap with the default [`BindingSettings`].
    pub fn new(
        device: Arc<dyn DescriptorDevice>,
        descriptor: &ResourceHeapDescriptor<'_>,
    ) -> Result<Self, BindingError> {
        Self::with_settings(device, descriptor, &BindingSettings::default())
    }

    /// Builds a resource heap.
    ///
    /// Sets are filled one after another from the view list until it runs out or
    /// a set matches nothing. Either every requested heap is created and filled,
    /// or nothing survives the call.
    ///
    /// ## Errors
    ///
    /// * [`BindingError::BindingOrderMismatch`] if the layout and device disagree on the pass order.
    /// * [`BindingError::NullResourceReference`] if a view has no resource. No heap is created.
    /// * [`BindingError::IncompleteResourceBinding`] if the first set cannot be filled.
    /// * [`BindingError::TrailingUnmatchedResources`] if a later set is only partly filled,
    ///   or views are left over and `settings.reject_unmatched_resources` is set.
    /// * [`BindingError::NativeHeapCreationFailed`] / [`BindingError::NativeViewCreationFailed`]
    ///   if the device fails.
    pub fn with_settings(
        device: Arc<dyn DescriptorDevice>,
        descriptor: &ResourceHeapDescriptor<'_>,
        settings: &BindingSettings,
    ) -> Result<Self, BindingError> {
        let layout = Arc::clone(&descriptor.layout);
        let device_order = device.binding_order();
        if layout.binding_order() != device_order {
            return Err(BindingError::BindingOrderMismatch {
                layout: layout.binding_order(),
                device: device_order,
            });
        }

        let allocator = HeapAllocator::new(device.as_ref(), &layout);
        let requirements = allocator.requirements(descriptor.views)?;

        // Heaps are stored as soon as they exist so an early return releases them.
        let mut heap = ResourceHeap {
            device: Arc::clone(&device),
            layout: Arc::clone(&layout),
            regions: [None, None],
            descriptor_set_count: 0,
            supports_graphics: layout.has_graphics_stages(),
            supports_compute: layout.has_compute_stage(),
            name_suffixes: settings.heap_name_suffixes.clone(),
        };
        for kind in DescriptorHeapKind::ALL {
            heap.regions[kind.index()] = allocator.allocate(kind, &requirements)?;
        }

        let mut resolver = BindingResolver::new(device.as_ref(), &layout, descriptor.views);
        loop {
            let set = heap.descriptor_set_count;
            let remaining = resolver.remaining();
            match resolver.resolve_set(set, &heap.regions)? {
                SetOutcome::Complete => heap.descriptor_set_count += 1,
                SetOutcome::Empty { kind, required } if set == 0 => {
                    return Err(BindingError::IncompleteResourceBinding {
                        kind,
                        matched: 0,
                        required,
                    });
                }
                SetOutcome::Partial {
                    kind,
                    matched,
                    required,
                } if set == 0 => {
                    return Err(BindingError::IncompleteResourceBinding {
                        kind,
                        matched,
                        required,
                    });
                }
                SetOutcome::Empty { .. } => break,
                SetOutcome::Partial { .. } => {
                    return Err(BindingError::TrailingUnmatchedResources { set, remaining });
                }
            }
            if resolver.remaining() == 0 {
                break;
            }
        }

        if resolver.remaining() > 0 {
            if settings.reject_unmatched_resources {
                return Err(BindingError::TrailingUnmatchedResources {
                    set: heap.descriptor_set_count,
                    remaining: resolver.remaining(),
                });
            }
            log::debug!(
                "Ignoring {} resource views that match no slot (first at index {:?})",
                resolver.remaining(),
                resolver.first_unconsumed()
            );
        }

        if let Some(label) = descriptor.label {
            heap.set_debug_name(label);
        }

        log::info!(
            "Created resource heap {:?}: {} descriptor sets, heaps {:?}",
            descriptor.label,
            heap.descriptor_set_count,
            heap.heaps().collect::<Vec<_>>()
        );
        Ok(heap)
    }

    /// Number of descriptor sets laid out in the heaps.
    pub fn descriptor_set_count(&self) -> u32 {
        self.descriptor_set_count
    }

    /// Returns `true` if a bound resource is visible to a graphics stage.
    pub fn supports_graphics_stage(&self) -> bool {
        self.supports_graphics
    }

    /// Returns `true` if a bound resource is visible to the compute stage.
    pub fn supports_compute_stage(&self) -> bool {
        self.supports_compute
    }

    /// The layout the heap was built against.
    pub fn layout(&self) -> &Arc<PipelineLayout> {
        &self.layout
    }

    /// The native heaps, combined view heap first.
    pub fn heaps(&self) -> impl Iterator<Item = DescriptorHeapId> + '_ {
        self.regions.iter().flatten().map(|region| region.heap)
    }

    /// The native heap of `kind`, if one was created.
    pub fn heap(&self, kind: DescriptorHeapKind) -> Option<DescriptorHeapId> {
        self.regions[kind.index()].map(|region| region.heap)
    }

    /// Distance between two consecutive sets in the heap of `kind`, or `0` if
    /// there is no such heap.
    pub fn set_stride(&self, kind: DescriptorHeapKind) -> u64 {
        self.regions[kind.index()].map_or(0, |region| region.set_stride)
    }

    /// Cursor at the first descriptor of set `set` in the heap of `kind`.
    pub fn set_cursor(&self, kind: DescriptorHeapKind, set: u32) -> Option<DescriptorCursor> {
        if set >= self.descriptor_set_count {
            return None;
        }
        self.regions[kind.index()].map(|region| region.set_cursor(set))
    }

    /// Names every native heap `name` plus its kind suffix.
    ///
    /// Devices without debug-name support are skipped silently.
    pub fn set_debug_name(&self, name: &str) {
        for region in self.regions.iter().flatten() {
            let heap_name = format!("{name}{}", self.name_suffixes[region.kind.index()]);
            match self.device.set_descriptor_heap_name(region.heap, &heap_name) {
                Ok(()) => {}
                Err(ResourceError::Unsupported(_)) => {
                    log::debug!("Debug names unsupported, heap {:?} left unnamed", region.heap);
                }
                Err(err) => log::warn!("Failed to name heap {:?} '{heap_name}': {err}", region.heap),
            }
        }
    }
}

impl Drop for ResourceHeap {
    fn drop(&mut self) {
        for region in self.regions.iter().flatten() {
            match self.device.destroy_descriptor_heap(region.heap) {
                Ok(()) => log::debug!("Released {:?} heap {:?}", region.kind, region.heap),
                Err(err) => log::warn!("Failed to release heap {:?}: {err}", region.heap),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::*;
    use crate::renderer::binding::mock::{MockDescriptorDevice, WrittenView};

    fn layout(bindings: &[BindingDescriptor]) -> Arc<PipelineLayout> {
        Arc::new(
            PipelineLayout::new(
                &PipelineLayoutDescriptor::new(Some("test"), bindings),
                &BindingCapabilities::all(),
            )
            .unwrap(),
        )
    }

    /// Two constant buffers for vertex and fragment plus one fragment sampler.
    fn cbv_cbv_sampler() -> Arc<PipelineLayout> {
        layout(&[
            BindingDescriptor::new(DescriptorKind::ConstantBuffer, ShaderStageFlags::VERTEX),
            BindingDescriptor::new(DescriptorKind::ConstantBuffer, ShaderStageFlags::FRAGMENT),
            BindingDescriptor::new(DescriptorKind::Sampler, ShaderStageFlags::FRAGMENT),
        ])
    }

    fn cbv(id: usize) -> ResourceView {
        ResourceView::new(BindableResource::buffer(
            BufferId(id),
            BindFlags::CONSTANT_BUFFER,
            256,
        ))
    }

    fn srv_texture(id: usize) -> ResourceView {
        ResourceView::new(BindableResource::texture(TextureViewId(id), BindFlags::SAMPLED))
    }

    fn sampler(id: usize) -> ResourceView {
        ResourceView::new(BindableResource::sampler(SamplerId(id)))
    }

    fn build(
        device: &Arc<MockDescriptorDevice>,
        layout: &Arc<PipelineLayout>,
        views: &[ResourceView],
    ) -> Result<ResourceHeap, BindingError> {
        ResourceHeap::new(
            device.clone(),
            &ResourceHeapDescriptor {
                label: None,
                layout: layout.clone(),
                views,
            },
        )
    }

    fn buffer_at(written: &[Option<WrittenView>], slot: usize) -> Option<BufferId> {
        match written[slot] {
            Some(WrittenView::ConstantBuffer(ViewDescriptor::Buffer { buffer, .. })) => {
                Some(buffer)
            }
            _ => None,
        }
    }

    #[test]
    fn exact_counts_build_one_set() {
        let device = Arc::new(MockDescriptorDevice::new());
        let layout = cbv_cbv_sampler();
        let heap = build(&device, &layout, &[cbv(0), cbv(1), sampler(0)]).unwrap();

        assert_eq!(heap.descriptor_set_count(), 1);
        assert!(heap.supports_graphics_stage());
        assert!(!heap.supports_compute_stage());
        assert_eq!(heap.heaps().count(), 2);
        assert_eq!(
            heap.set_stride(DescriptorHeapKind::CombinedView),
            2 * MockDescriptorDevice::COMBINED_INCREMENT
        );
        assert_eq!(
            heap.set_stride(DescriptorHeapKind::Sampler),
            MockDescriptorDevice::SAMPLER_INCREMENT
        );
    }

    #[test]
    fn exact_multiples_build_that_many_sets() {
        let device = Arc::new(MockDescriptorDevice::new());
        let layout = cbv_cbv_sampler();
        let views = [
            cbv(0),
            cbv(1),
            sampler(0),
            cbv(2),
            cbv(3),
            sampler(1),
            cbv(4),
            cbv(5),
            sampler(2),
        ];
        let heap = build(&device, &layout, &views).unwrap();
        assert_eq!(heap.descriptor_set_count(), 3);

        let combined = heap.heap(DescriptorHeapKind::CombinedView).unwrap();
        let written = device.written(combined);
        let ids: Vec<_> = (0..6).map(|slot| buffer_at(&written, slot)).collect();
        assert_eq!(
            ids,
            (0..6).map(|id| Some(BufferId(id))).collect::<Vec<_>>()
        );

        let second = heap.set_cursor(DescriptorHeapKind::Sampler, 1).unwrap();
        assert_eq!(second.offset, MockDescriptorDevice::SAMPLER_INCREMENT);
        assert!(heap.set_cursor(DescriptorHeapKind::Sampler, 3).is_none());
    }

    #[test]
    fn null_views_fail_before_any_heap_exists() {
        let device = Arc::new(MockDescriptorDevice::new());
        let layout = cbv_cbv_sampler();
        let err = build(&device, &layout, &[cbv(0), ResourceView::null(), sampler(0)])
            .unwrap_err();
        assert_eq!(err, BindingError::NullResourceReference { index: 1 });
        assert_eq!(device.created_heaps(), 0);

        let heap = build(&device, &layout, &[cbv(0), cbv(1), sampler(0)]).unwrap();
        assert_eq!(heap.descriptor_set_count(), 1);
    }

    #[test]
    fn missing_constant_buffers_are_reported() {
        let device = Arc::new(MockDescriptorDevice::new());
        let layout = cbv_cbv_sampler();
        let err = build(&device, &layout, &[cbv(0), sampler(0)]).unwrap_err();
        assert_eq!(
            err,
            BindingError::IncompleteResourceBinding {
                kind: DescriptorKind::ConstantBuffer,
                matched: 1,
                required: 2,
            }
        );
        assert_eq!(device.live_heaps(), 0);
    }

    #[test]
    fn empty_view_list_is_incomplete() {
        let device = Arc::new(MockDescriptorDevice::new());
        let layout = layout(&[BindingDescriptor::new(
            DescriptorKind::ConstantBuffer,
            ShaderStageFlags::VERTEX,
        )]);
        let err = build(&device, &layout, &[]).unwrap_err();
        assert_eq!(
            err,
            BindingError::IncompleteResourceBinding {
                kind: DescriptorKind::ConstantBuffer,
                matched: 0,
                required: 1,
            }
        );
        assert_eq!(device.created_heaps(), 0);
    }

    #[test]
    fn list_order_within_a_kind_is_slot_order() {
        let device = Arc::new(MockDescriptorDevice::new());
        let layout = cbv_cbv_sampler();
        let heap = build(&device, &layout, &[sampler(0), cbv(7), cbv(3)]).unwrap();
        let written = device.written(heap.heap(DescriptorHeapKind::CombinedView).unwrap());
        assert_eq!(buffer_at(&written, 0), Some(BufferId(7)));
        assert_eq!(buffer_at(&written, 1), Some(BufferId(3)));

        let heap = build(&device, &layout, &[cbv(3), sampler(0), cbv(7)]).unwrap();
        let written = device.written(heap.heap(DescriptorHeapKind::CombinedView).unwrap());
        assert_eq!(buffer_at(&written, 0), Some(BufferId(3)));
        assert_eq!(buffer_at(&written, 1), Some(BufferId(7)));
    }

    #[test]
    fn interleaved_kinds_skip_unmatched_views() {
        let device = Arc::new(MockDescriptorDevice::new());
        let layout = cbv_cbv_sampler();
        let views = [cbv(0), srv_texture(1), cbv(2), sampler(3)];
        let heap = build(&device, &layout, &views).unwrap();
        assert_eq!(heap.descriptor_set_count(), 1);

        let combined = heap.heap(DescriptorHeapKind::CombinedView).unwrap();
        let written = device.written(combined);
        assert_eq!(buffer_at(&written, 0), Some(BufferId(0)));
        assert_eq!(buffer_at(&written, 1), Some(BufferId(2)));
        assert!(written.iter().all(|slot| !matches!(
            slot,
            Some(WrittenView::ShaderResource(_))
        )));

        let samplers = device.written(heap.heap(DescriptorHeapKind::Sampler).unwrap());
        assert_eq!(
            samplers[0],
            Some(WrittenView::Sampler(ViewDescriptor::Sampler {
                sampler: SamplerId(3)
            }))
        );
        assert_eq!(device.heap_kind(combined), DescriptorHeapKind::CombinedView);
    }

    #[test]
    fn leftovers_can_be_rejected() {
        let device = Arc::new(MockDescriptorDevice::new());
        let layout = cbv_cbv_sampler();
        let views = [cbv(0), srv_texture(1), cbv(2), sampler(3)];
        let settings = BindingSettings {
            reject_unmatched_resources: true,
            ..BindingSettings::default()
        };
        let err = ResourceHeap::with_settings(
            device.clone(),
            &ResourceHeapDescriptor {
                label: None,
                layout,
                views: &views,
            },
            &settings,
        )
        .unwrap_err();
        assert_eq!(
            err,
            BindingError::TrailingUnmatchedResources {
                set: 1,
                remaining: 1,
            }
        );
        assert_eq!(device.live_heaps(), 0);
    }

    #[test]
    fn partial_trailing_set_fails() {
        let device = Arc::new(MockDescriptorDevice::new());
        let layout = cbv_cbv_sampler();
        let views = [cbv(0), cbv(1), sampler(0), cbv(2)];
        let err = build(&device, &layout, &views).unwrap_err();
        assert_eq!(
            err,
            BindingError::TrailingUnmatchedResources {
                set: 1,
                remaining: 1,
            }
        );
        assert_eq!(device.live_heaps(), 0);
    }

    #[test]
    fn trailing_samplers_without_constant_buffers_fail() {
        let device = Arc::new(MockDescriptorDevice::new());
        let layout = layout(&[
            BindingDescriptor::new(DescriptorKind::ConstantBuffer, ShaderStageFlags::VERTEX),
            BindingDescriptor::new(DescriptorKind::Sampler, ShaderStageFlags::FRAGMENT),
        ]);
        let err = build(&device, &layout, &[cbv(0), sampler(0), sampler(1)]).unwrap_err();
        assert_eq!(
            err,
            BindingError::TrailingUnmatchedResources {
                set: 1,
                remaining: 1,
            }
        );
        assert_eq!(device.live_heaps(), 0);
    }

    #[test]
    fn heap_creation_failure_releases_earlier_heaps() {
        let device = Arc::new(MockDescriptorDevice::new().failing_sampler_heaps());
        let layout = cbv_cbv_sampler();
        let err = build(&device, &layout, &[cbv(0), cbv(1), sampler(0)]).unwrap_err();
        assert!(matches!(
            err,
            BindingError::NativeHeapCreationFailed {
                heap: DescriptorHeapKind::Sampler,
                ..
            }
        ));
        assert_eq!(device.created_heaps(), 1);
        assert_eq!(device.live_heaps(), 0);
    }

    #[test]
    fn dropping_the_heap_releases_native_heaps() {
        let device = Arc::new(MockDescriptorDevice::new());
        let layout = cbv_cbv_sampler();
        let heap = build(&device, &layout, &[cbv(0), cbv(1), sampler(0)]).unwrap();
        assert_eq!(device.live_heaps(), 2);
        drop(heap);
        assert_eq!(device.live_heaps(), 0);
    }

    #[test]
    fn only_needed_heaps_are_created() {
        let device = Arc::new(MockDescriptorDevice::new());
        let layout = layout(&[BindingDescriptor::new(
            DescriptorKind::StorageTexture,
            ShaderStageFlags::COMPUTE,
        )]);
        let storage = ResourceView::new(BindableResource::texture(
            TextureViewId(0),
            BindFlags::STORAGE,
        ));
        let heap = build(&device, &layout, &[storage]).unwrap();
        assert!(heap.supports_compute_stage());
        assert!(!heap.supports_graphics_stage());
        assert!(heap.heap(DescriptorHeapKind::Sampler).is_none());
        assert_eq!(heap.set_stride(DescriptorHeapKind::Sampler), 0);
        assert_eq!(device.live_heaps(), 1);
    }

    #[test]
    fn debug_names_carry_heap_suffixes() {
        let _ = env_logger::builder().is_test(true).try_init();
        let device = Arc::new(MockDescriptorDevice::new());
        let views = [cbv(0), cbv(1), sampler(0)];
        let heap = ResourceHeap::new(
            device.clone(),
            &ResourceHeapDescriptor {
                label: Some("Material"),
                layout: cbv_cbv_sampler(),
                views: &views,
            },
        )
        .unwrap();
        let combined = heap.heap(DescriptorHeapKind::CombinedView).unwrap();
        let samplers = heap.heap(DescriptorHeapKind::Sampler).unwrap();
        assert_eq!(device.heap_name(combined).as_deref(), Some("Material.CbvSrvUav"));
        assert_eq!(device.heap_name(samplers).as_deref(), Some("Material.Sampler"));

        heap.set_debug_name("Renamed");
        assert_eq!(device.heap_name(samplers).as_deref(), Some("Renamed.Sampler"));
    }

    #[test]
    fn unsupported_debug_names_are_not_fatal() {
        let device = Arc::new(MockDescriptorDevice::new().without_debug_names());
        let views = [cbv(0), cbv(1), sampler(0)];
        let heap = ResourceHeap::new(
            device.clone(),
            &ResourceHeapDescriptor {
                label: Some("Material"),
                layout: cbv_cbv_sampler(),
                views: &views,
            },
        )
        .unwrap();
        let combined = heap.heap(DescriptorHeapKind::CombinedView).unwrap();
        assert_eq!(device.heap_name(combined), None);
    }
}

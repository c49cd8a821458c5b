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

//! End-to-end resource-heap construction on the software backend.

use std::num::NonZeroU64;
use std::sync::Arc;

use strata_core::renderer::*;
use strata_infra::graphics::{SoftwareDescriptor, SoftwareDevice, SoftwareDeviceConfig};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn build_layout(device: &SoftwareDevice, bindings: &[BindingDescriptor]) -> Arc<PipelineLayout> {
    Arc::new(
        PipelineLayout::new(
            &PipelineLayoutDescriptor::new(Some("Layout"), bindings),
            &device.binding_capabilities(),
        )
        .unwrap(),
    )
}

fn constant_buffer(id: usize) -> ResourceView {
    ResourceView::new(BindableResource::buffer(
        BufferId(id),
        BindFlags::CONSTANT_BUFFER,
        256,
    ))
}

fn sampled_texture(id: usize) -> ResourceView {
    ResourceView::new(BindableResource::texture(TextureViewId(id), BindFlags::SAMPLED))
}

fn sampler(id: usize) -> ResourceView {
    ResourceView::new(BindableResource::sampler(SamplerId(id)))
}

#[test]
fn material_heap_partitions_views_by_heap_kind() {
    init_logging();
    let device = SoftwareDevice::default();
    let layout = build_layout(
        &device,
        &[
            BindingDescriptor::new(DescriptorKind::ConstantBuffer, ShaderStageFlags::VERTEX_FRAGMENT),
            BindingDescriptor::new(DescriptorKind::ConstantBuffer, ShaderStageFlags::VERTEX_FRAGMENT),
            BindingDescriptor::new(DescriptorKind::Sampler, ShaderStageFlags::FRAGMENT),
        ],
    );
    let views = [constant_buffer(0), sampled_texture(1), constant_buffer(2), sampler(3)];

    let heap = ResourceHeap::new(
        Arc::new(device.clone()),
        &ResourceHeapDescriptor {
            label: Some("Material"),
            layout,
            views: &views,
        },
    )
    .unwrap();

    assert_eq!(heap.descriptor_set_count(), 1);
    assert!(heap.supports_graphics_stage());
    assert!(!heap.supports_compute_stage());

    let heaps: Vec<_> = heap.heaps().collect();
    assert_eq!(heaps.len(), 2);
    assert_eq!(device.heap_kind(heaps[0]), Ok(DescriptorHeapKind::CombinedView));
    assert_eq!(device.heap_kind(heaps[1]), Ok(DescriptorHeapKind::Sampler));
    assert_eq!(device.heap_name(heaps[0]).as_deref(), Some("Material.CbvSrvUav"));
    assert_eq!(device.heap_name(heaps[1]).as_deref(), Some("Material.Sampler"));

    // Two buffer views and one texture view were counted, the texture is never written.
    let combined = device.descriptors(heaps[0]).unwrap();
    assert_eq!(combined.len(), 3);
    let buffers: Vec<_> = combined
        .iter()
        .flatten()
        .map(|descriptor| match descriptor {
            SoftwareDescriptor::ConstantBuffer(ViewDescriptor::Buffer { buffer, .. }) => *buffer,
            other => panic!("unexpected descriptor {other:?}"),
        })
        .collect();
    assert_eq!(buffers, vec![BufferId(0), BufferId(2)]);

    let samplers = device.descriptors(heaps[1]).unwrap();
    assert_eq!(
        samplers,
        vec![Some(SoftwareDescriptor::Sampler(ViewDescriptor::Sampler {
            sampler: SamplerId(3)
        }))]
    );

    drop(heap);
    assert_eq!(device.live_heaps(), 0);
}

#[test]
fn per_instance_sets_are_laid_out_contiguously() {
    init_logging();
    let device = SoftwareDevice::default();
    let layout = build_layout(
        &device,
        &[
            BindingDescriptor::new(DescriptorKind::ConstantBuffer, ShaderStageFlags::VERTEX),
            BindingDescriptor::new(DescriptorKind::SampledTexture, ShaderStageFlags::FRAGMENT),
            BindingDescriptor::new(DescriptorKind::Sampler, ShaderStageFlags::FRAGMENT),
        ],
    );
    let mut views = Vec::new();
    for instance in 0..4 {
        views.push(sampler(instance));
        views.push(sampled_texture(instance));
        views.push(constant_buffer(instance));
    }

    let heap = ResourceHeap::new(
        Arc::new(device.clone()),
        &ResourceHeapDescriptor {
            label: None,
            layout,
            views: &views,
        },
    )
    .unwrap();
    assert_eq!(heap.descriptor_set_count(), 4);

    let increment = device.config().combined_view_increment;
    assert_eq!(heap.set_stride(DescriptorHeapKind::CombinedView), 2 * increment);
    let third = heap.set_cursor(DescriptorHeapKind::CombinedView, 2).unwrap();
    assert_eq!(third.offset, 4 * increment);

    let combined = device
        .descriptors(heap.heap(DescriptorHeapKind::CombinedView).unwrap())
        .unwrap();
    for set in 0..4 {
        assert!(matches!(
            combined[set * 2],
            Some(SoftwareDescriptor::ConstantBuffer(ViewDescriptor::Buffer { buffer, .. }))
                if buffer == BufferId(set)
        ));
        assert!(matches!(
            combined[set * 2 + 1],
            Some(SoftwareDescriptor::ShaderResource(ViewDescriptor::Texture { view, .. }))
                if view == TextureViewId(set)
        ));
    }
}

#[test]
fn compute_heap_writes_unordered_access_views_with_ranges() {
    let device = SoftwareDevice::default();
    let layout = build_layout(
        &device,
        &[
            BindingDescriptor::new(DescriptorKind::StorageBuffer, ShaderStageFlags::COMPUTE),
            BindingDescriptor::new(DescriptorKind::SampledBuffer, ShaderStageFlags::COMPUTE),
        ],
    );
    let particles = BindableResource::buffer(BufferId(0), BindFlags::STORAGE, 4096);
    let params = BindableResource::buffer(BufferId(1), BindFlags::SAMPLED, 1024);
    let views = [
        ResourceView::with_range(
            particles,
            ViewRange::Buffer(BufferRange {
                offset: 1024,
                size: NonZeroU64::new(2048),
            }),
        ),
        ResourceView::new(params),
    ];

    let heap = ResourceHeap::new(
        Arc::new(device.clone()),
        &ResourceHeapDescriptor {
            label: None,
            layout,
            views: &views,
        },
    )
    .unwrap();
    assert!(heap.supports_compute_stage());
    assert!(!heap.supports_graphics_stage());
    assert!(heap.heap(DescriptorHeapKind::Sampler).is_none());

    let combined = device
        .descriptors(heap.heap(DescriptorHeapKind::CombinedView).unwrap())
        .unwrap();
    assert_eq!(
        combined[0],
        Some(SoftwareDescriptor::ShaderResource(ViewDescriptor::Buffer {
            buffer: BufferId(1),
            offset: 0,
            size: NonZeroU64::new(1024),
        }))
    );
    assert_eq!(
        combined[1],
        Some(SoftwareDescriptor::UnorderedAccess(ViewDescriptor::Buffer {
            buffer: BufferId(0),
            offset: 1024,
            size: NonZeroU64::new(2048),
        }))
    );
}

#[test]
fn failures_leave_no_heap_behind() {
    let device = SoftwareDevice::new(SoftwareDeviceConfig {
        max_descriptors_per_heap: 2,
        ..SoftwareDeviceConfig::default()
    });
    let layout = build_layout(
        &device,
        &[
            BindingDescriptor::new(DescriptorKind::SampledTexture, ShaderStageFlags::FRAGMENT),
            BindingDescriptor::new(DescriptorKind::Sampler, ShaderStageFlags::FRAGMENT),
        ],
    );
    let shared: Arc<dyn DescriptorDevice> = Arc::new(device.clone());

    // Three samplers overflow the sampler heap after the texture heap exists.
    let views = [
        sampled_texture(0),
        sampler(0),
        sampled_texture(1),
        sampler(1),
        sampler(2),
    ];
    let err = ResourceHeap::new(
        shared.clone(),
        &ResourceHeapDescriptor {
            label: None,
            layout: layout.clone(),
            views: &views,
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        BindingError::NativeHeapCreationFailed {
            heap: DescriptorHeapKind::Sampler,
            ..
        }
    ));
    assert_eq!(device.live_heaps(), 0);

    let views = [sampled_texture(0), ResourceView::null()];
    let err = ResourceHeap::new(
        shared.clone(),
        &ResourceHeapDescriptor {
            label: None,
            layout: layout.clone(),
            views: &views,
        },
    )
    .unwrap_err();
    assert_eq!(err, BindingError::NullResourceReference { index: 1 });
    assert_eq!(device.live_heaps(), 0);

    let views = [sampled_texture(0), sampler(0)];
    let heap = ResourceHeap::new(
        shared,
        &ResourceHeapDescriptor {
            label: None,
            layout,
            views: &views,
        },
    )
    .unwrap();
    assert_eq!(heap.descriptor_set_count(), 1);
    assert_eq!(device.live_heaps(), 2);
}

#[test]
fn unsupported_stages_are_rejected_by_the_layout() {
    let device = SoftwareDevice::new(SoftwareDeviceConfig {
        capabilities: BindingCapabilities::all()
            .with_kind(DescriptorKind::StorageTexture, ShaderStageFlags::COMPUTE),
        ..SoftwareDeviceConfig::default()
    });
    let bindings = [BindingDescriptor::new(
        DescriptorKind::StorageTexture,
        ShaderStageFlags::FRAGMENT,
    )];
    let result = PipelineLayout::new(
        &PipelineLayoutDescriptor::new(None, &bindings),
        &device.binding_capabilities(),
    );
    assert!(matches!(result, Err(BindingError::InvalidLayout(_))));
}

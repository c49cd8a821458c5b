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

//! The API-agnostic pipeline layout: the canonical index space resource heaps
//! are built against.

use super::binding_order::{BindingOrder, DescriptorKind};
use crate::renderer::api::{heap::DescriptorHeapKind, util::ShaderStageFlags};
use crate::renderer::error::BindingError;
use std::borrow::Cow;

/// Declares one binding slot (or array of slots) of a pipeline layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingDescriptor {
    /// The kind of descriptor expected at this binding.
    pub kind: DescriptorKind,
    /// The shader stages that can access this binding. Must not be empty.
    pub stages: ShaderStageFlags,
    /// The number of descriptors in the binding. `1` for a non-array binding.
    pub array_size: u32,
}

impl BindingDescriptor {
    /// A single-descriptor binding.
    pub const fn new(kind: DescriptorKind, stages: ShaderStageFlags) -> Self {
        Self {
            kind,
            stages,
            array_size: 1,
        }
    }

    /// An array binding of `array_size` descriptors.
    pub const fn array(kind: DescriptorKind, stages: ShaderStageFlags, array_size: u32) -> Self {
        Self {
            kind,
            stages,
            array_size,
        }
    }
}

/// A descriptor for a [`PipelineLayout`].
#[derive(Debug, Clone)]
pub struct PipelineLayoutDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The bindings, in declaration order.
    pub bindings: &'a [BindingDescriptor],
    /// The pass order the layout is realized with.
    pub binding_order: BindingOrder,
}

impl<'a> PipelineLayoutDescriptor<'a> {
    /// A descriptor using [`BindingOrder::CURRENT`].
    pub fn new(label: Option<&'a str>, bindings: &'a [BindingDescriptor]) -> Self {
        Self {
            label: label.map(Cow::Borrowed),
            bindings,
            binding_order: BindingOrder::CURRENT,
        }
    }

    /// Returns this descriptor realized with `binding_order` instead.
    pub fn with_binding_order(mut self, binding_order: BindingOrder) -> Self {
        self.binding_order = binding_order;
        self
    }
}

/// The descriptor-kind/stage combinations a backend can realize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingCapabilities {
    stages: [ShaderStageFlags; 6],
}

impl BindingCapabilities {
    /// Every kind is visible to every stage.
    pub const fn all() -> Self {
        Self {
            stages: [ShaderStageFlags::ALL; 6],
        }
    }

    /// No kind is visible to any stage.
    pub const fn none() -> Self {
        Self {
            stages: [ShaderStageFlags::NONE; 6],
        }
    }

    /// Returns these capabilities with `kind` restricted to `stages`.
    pub fn with_kind(mut self, kind: DescriptorKind, stages: ShaderStageFlags) -> Self {
        self.stages[kind_index(kind)] = stages;
        self
    }

    /// The stages a descriptor of `kind` may be visible to.
    pub fn supported_stages(&self, kind: DescriptorKind) -> ShaderStageFlags {
        self.stages[kind_index(kind)]
    }

    /// Returns `true` if a binding of `kind` can be visible to every stage in `stages`.
    pub fn supports(&self, kind: DescriptorKind, stages: ShaderStageFlags) -> bool {
        self.supported_stages(kind).contains_all(stages)
    }
}

impl Default for BindingCapabilities {
    fn default() -> Self {
        Self::all()
    }
}

/// Number of descriptors of each kind in one descriptor set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DescriptorCounts {
    /// Constant-buffer views.
    pub constant_buffers: u32,
    /// Shader-resource views of buffers.
    pub sampled_buffers: u32,
    /// Shader-resource views of textures.
    pub sampled_textures: u32,
    /// Unordered-access views of buffers.
    pub storage_buffers: u32,
    /// Unordered-access views of textures.
    pub storage_textures: u32,
    /// Samplers.
    pub samplers: u32,
}

impl DescriptorCounts {
    /// The count for `kind`.
    pub fn get(&self, kind: DescriptorKind) -> u32 {
        match kind {
            DescriptorKind::ConstantBuffer => self.constant_buffers,
            DescriptorKind::SampledBuffer => self.sampled_buffers,
            DescriptorKind::SampledTexture => self.sampled_textures,
            DescriptorKind::StorageBuffer => self.storage_buffers,
            DescriptorKind::StorageTexture => self.storage_textures,
            DescriptorKind::Sampler => self.samplers,
        }
    }

    fn get_mut(&mut self, kind: DescriptorKind) -> &mut u32 {
        match kind {
            DescriptorKind::ConstantBuffer => &mut self.constant_buffers,
            DescriptorKind::SampledBuffer => &mut self.sampled_buffers,
            DescriptorKind::SampledTexture => &mut self.sampled_textures,
            DescriptorKind::StorageBuffer => &mut self.storage_buffers,
            DescriptorKind::StorageTexture => &mut self.storage_textures,
            DescriptorKind::Sampler => &mut self.samplers,
        }
    }

    /// The number of descriptors that land in `heap`.
    pub fn for_heap(&self, heap: DescriptorHeapKind) -> u32 {
        DescriptorKind::ALL
            .iter()
            .filter(|kind| kind.heap_kind() == heap)
            .map(|kind| self.get(*kind))
            .sum()
    }

    /// Total descriptors across every kind.
    pub fn total(&self) -> u32 {
        DescriptorKind::ALL.iter().map(|kind| self.get(*kind)).sum()
    }
}

/// A binding of a [`PipelineLayout`] after realization in native order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutBinding {
    /// The binding index the shader sees.
    pub native_index: u32,
    /// Position of the binding in the declared list.
    pub declared_index: usize,
    /// The first descriptor slot of this binding within a set.
    pub first_slot: u32,
    /// The kind of descriptor expected.
    pub kind: DescriptorKind,
    /// Stage visibility.
    pub stages: ShaderStageFlags,
    /// Descriptors in the binding.
    pub array_size: u32,
}

/// Upper bound on the descriptors one set may hold across every kind.
pub const MAX_DESCRIPTORS_PER_SET: u32 = 1_000_000;

/// An immutable, validated pipeline layout.
///
/// Bindings are stably sorted by the [`BindingOrder`] pass sequence; the
/// position of a binding in that order is its native binding index, and each
/// descriptor of each binding gets one slot of the per-set slot space.
#[derive(Debug, Clone)]
pub struct PipelineLayout {
    label: Option<String>,
    binding_order: BindingOrder,
    bindings: Vec<BindingDescriptor>,
    native_bindings: Vec<LayoutBinding>,
    slot_kinds: Vec<DescriptorKind>,
    counts: DescriptorCounts,
    combined_stages: ShaderStageFlags,
}

impl PipelineLayout {
    /// Validates `descriptor` against `capabilities` and computes the native layout.
    ///
    /// ## Errors
    ///
    /// Returns [`BindingError::InvalidLayout`] if no bindings are declared, a
    /// binding has an empty stage mask or a zero array size, `capabilities`
    /// do not allow a binding's kind in one of its stages, or a set would hold
    /// more than [`MAX_DESCRIPTORS_PER_SET`] descriptors.
    pub fn new(
        descriptor: &PipelineLayoutDescriptor<'_>,
        capabilities: &BindingCapabilities,
    ) -> Result<Self, BindingError> {
        if descriptor.bindings.is_empty() {
            return Err(BindingError::InvalidLayout(
                "a pipeline layout needs at least one binding".to_string(),
            ));
        }

        let mut counts = DescriptorCounts::default();
        let mut total: u32 = 0;
        let mut combined_stages = ShaderStageFlags::NONE;
        for (index, binding) in descriptor.bindings.iter().enumerate() {
            if binding.stages.is_empty() {
                return Err(BindingError::InvalidLayout(format!(
                    "binding {index} ({}) is visible to no shader stage",
                    binding.kind
                )));
            }
            if binding.array_size == 0 {
                return Err(BindingError::InvalidLayout(format!(
                    "binding {index} ({}) has an array size of zero",
                    binding.kind
                )));
            }
            if !capabilities.supports(binding.kind, binding.stages) {
                return Err(BindingError::InvalidLayout(format!(
                    "binding {index} ({}) is not supported in stages {:?}",
                    binding.kind,
                    binding.stages.difference(capabilities.supported_stages(binding.kind))
                )));
            }
            total = total
                .checked_add(binding.array_size)
                .filter(|total| *total <= MAX_DESCRIPTORS_PER_SET)
                .ok_or_else(|| {
                    BindingError::InvalidLayout(format!(
                        "binding {index} ({}) with {} descriptors exceeds the limit of {} per set",
                        binding.kind, binding.array_size, MAX_DESCRIPTORS_PER_SET
                    ))
                })?;
            // Bounded by `total`, so this cannot overflow.
            *counts.get_mut(binding.kind) += binding.array_size;
            combined_stages |= binding.stages;
        }

        let order = descriptor.binding_order;
        let mut sorted: Vec<(usize, &BindingDescriptor)> =
            descriptor.bindings.iter().enumerate().collect();
        sorted.sort_by_key(|(_, binding)| order.pass_index(binding.kind));

        let mut native_bindings = Vec::with_capacity(sorted.len());
        let mut slot_kinds = Vec::with_capacity(counts.total() as usize);
        for (native_index, (declared_index, binding)) in sorted.into_iter().enumerate() {
            native_bindings.push(LayoutBinding {
                native_index: native_index as u32,
                declared_index,
                first_slot: slot_kinds.len() as u32,
                kind: binding.kind,
                stages: binding.stages,
                array_size: binding.array_size,
            });
            slot_kinds.extend(std::iter::repeat(binding.kind).take(binding.array_size as usize));
        }

        log::debug!(
            "Created pipeline layout {:?}: {} bindings, {} descriptors per set, stages {:?}",
            descriptor.label,
            native_bindings.len(),
            slot_kinds.len(),
            combined_stages
        );

        Ok(Self {
            label: descriptor.label.as_ref().map(|label| label.to_string()),
            binding_order: order,
            bindings: descriptor.bindings.to_vec(),
            native_bindings,
            slot_kinds,
            counts,
            combined_stages,
        })
    }

    /// The debug label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The pass order this layout was realized with.
    pub fn binding_order(&self) -> BindingOrder {
        self.binding_order
    }

    /// The bindings in declaration order.
    pub fn bindings(&self) -> &[BindingDescriptor] {
        &self.bindings
    }

    /// The bindings in native order.
    pub fn native_bindings(&self) -> &[LayoutBinding] {
        &self.native_bindings
    }

    /// Per-kind descriptor counts of one set.
    pub fn counts(&self) -> &DescriptorCounts {
        &self.counts
    }

    /// Descriptors of one set that land in `heap`.
    pub fn descriptors_per_set(&self, heap: DescriptorHeapKind) -> u32 {
        self.counts.for_heap(heap)
    }

    /// The union of every binding's stage mask.
    pub fn combined_stages(&self) -> ShaderStageFlags {
        self.combined_stages
    }

    /// The kind of the descriptor slot at `slot` in a set's slot space.
    pub fn slot_kind(&self, slot: u32) -> Option<DescriptorKind> {
        self.slot_kinds.get(slot as usize).copied()
    }

    /// The kind of the binding with native binding index `native_index`.
    pub fn bind_kind_at(&self, native_index: u32) -> Option<DescriptorKind> {
        self.native_bindings
            .get(native_index as usize)
            .map(|binding| binding.kind)
    }

    /// Returns `true` if any binding is visible to a graphics stage.
    pub fn has_graphics_stages(&self) -> bool {
        self.combined_stages.intersects(ShaderStageFlags::ALL_GRAPHICS)
    }

    /// Returns `true` if any binding is visible to the compute stage.
    pub fn has_compute_stage(&self) -> bool {
        self.combined_stages.intersects(ShaderStageFlags::COMPUTE)
    }
}

fn kind_index(kind: DescriptorKind) -> usize {
    match kind {
        DescriptorKind::ConstantBuffer => 0,
        DescriptorKind::SampledBuffer => 1,
        DescriptorKind::SampledTexture => 2,
        DescriptorKind::StorageBuffer => 3,
        DescriptorKind::StorageTexture => 4,
        DescriptorKind::Sampler => 5,
    }
}

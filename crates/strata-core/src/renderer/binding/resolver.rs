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

use super::allocator::HeapRegion;
use crate::renderer::api::{DescriptorCursor, DescriptorKind, PipelineLayout, ResourceView};
use crate::renderer::error::{BindingError, ResourceError};
use crate::renderer::traits::DescriptorDevice;

/// Progress through one descriptor set.
///
/// `binding_index` walks the layout's slot space; the per-kind indices count
/// how many slots of each kind have been filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindingCursor {
    /// The next slot of the layout to fill.
    pub binding_index: u32,
    /// Constant buffers bound so far.
    pub constant_buffer_index: u32,
    /// Sampled buffers bound so far.
    pub sampled_buffer_index: u32,
    /// Sampled textures bound so far.
    pub sampled_texture_index: u32,
    /// Storage buffers bound so far.
    pub storage_buffer_index: u32,
    /// Storage textures bound so far.
    pub storage_texture_index: u32,
    /// Samplers bound so far.
    pub sampler_index: u32,
}

impl BindingCursor {
    /// Slots of `kind` bound so far.
    pub fn bound(&self, kind: DescriptorKind) -> u32 {
        match kind {
            DescriptorKind::ConstantBuffer => self.constant_buffer_index,
            DescriptorKind::SampledBuffer => self.sampled_buffer_index,
            DescriptorKind::SampledTexture => self.sampled_texture_index,
            DescriptorKind::StorageBuffer => self.storage_buffer_index,
            DescriptorKind::StorageTexture => self.storage_texture_index,
            DescriptorKind::Sampler => self.sampler_index,
        }
    }

    fn record(&mut self, kind: DescriptorKind) {
        self.binding_index += 1;
        let index = match kind {
            DescriptorKind::ConstantBuffer => &mut self.constant_buffer_index,
            DescriptorKind::SampledBuffer => &mut self.sampled_buffer_index,
            DescriptorKind::SampledTexture => &mut self.sampled_texture_index,
            DescriptorKind::StorageBuffer => &mut self.storage_buffer_index,
            DescriptorKind::StorageTexture => &mut self.storage_texture_index,
            DescriptorKind::Sampler => &mut self.sampler_index,
        };
        *index += 1;
    }
}

/// The result of one attempt at filling a descriptor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// Every slot of the set was filled.
    Complete,
    /// Nothing was written and no pending kind has a view left to match.
    Empty {
        /// The first kind that matched nothing.
        kind: DescriptorKind,
        /// Slots of that kind per set.
        required: u32,
    },
    /// `kind` ran out of views while some slot of the set was filled or
    /// a later kind still had a matching view.
    Partial {
        /// The first kind that came up short.
        kind: DescriptorKind,
        /// Views of that kind matched.
        matched: u32,
        /// Slots of that kind per set.
        required: u32,
    },
}

/// Matches resource views against the slots of a layout and writes the native
/// views into the heaps.
///
/// Each view is consumed at most once. Views that fit no pending slot are
/// skipped and stay available to later sets.
#[derive(Debug)]
pub struct BindingResolver<'a> {
    device: &'a dyn DescriptorDevice,
    layout: &'a PipelineLayout,
    views: &'a [ResourceView],
    consumed: Vec<bool>,
    remaining: usize,
}

impl<'a> BindingResolver<'a> {
    /// Creates a resolver over `views`. Null views must have been rejected already.
    pub fn new(
        device: &'a dyn DescriptorDevice,
        layout: &'a PipelineLayout,
        views: &'a [ResourceView],
    ) -> Self {
        Self {
            device,
            layout,
            views,
            consumed: vec![false; views.len()],
            remaining: views.len(),
        }
    }

    /// Views not consumed by any set yet.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Index of the first view not consumed yet.
    pub fn first_unconsumed(&self) -> Option<usize> {
        self.consumed.iter().position(|consumed| !consumed)
    }

    /// Fills descriptor set `set` in the layout's pass order.
    ///
    /// `regions` holds the allocated heaps indexed by [`DescriptorHeapKind::index`](crate::renderer::DescriptorHeapKind::index).
    /// The first kind that comes up short ends the set. Later kinds are only
    /// checked for a view they would accept, which makes the set partial.
    ///
    /// ## Errors
    ///
    /// Returns [`BindingError::NativeViewCreationFailed`] if the device refuses a write.
    pub fn resolve_set(
        &mut self,
        set: u32,
        regions: &[Option<HeapRegion>; 2],
    ) -> Result<SetOutcome, BindingError> {
        let start = self.first_unconsumed().unwrap_or(self.views.len());
        let mut write_cursors = regions.map(|region| region.map(|r| r.set_cursor(set)));
        let mut cursor = BindingCursor::default();
        let mut matched_any = false;

        for &kind in self.layout.binding_order().passes() {
            let required = self.layout.counts().get(kind);
            if required == 0 {
                continue;
            }
            let heap = kind.heap_kind();
            let increment = regions[heap.index()].map_or(0, |r| r.increment);
            let matched = self.resolve_kind(
                kind,
                required,
                start,
                &mut cursor,
                &mut write_cursors[heap.index()],
                increment,
            )?;
            matched_any |= matched > 0;

            if matched < required {
                matched_any = matched_any || self.later_kind_matches(kind, start);
                log::debug!("Set {set}: matched {matched} of {required} {kind} views");
                return Ok(if matched_any {
                    SetOutcome::Partial {
                        kind,
                        matched,
                        required,
                    }
                } else {
                    SetOutcome::Empty { kind, required }
                });
            }
        }

        log::debug!(
            "Set {set} complete: {} descriptors written, {} views left",
            cursor.binding_index,
            self.remaining
        );
        Ok(SetOutcome::Complete)
    }

    fn later_kind_matches(&self, short: DescriptorKind, start: usize) -> bool {
        let passes = self.layout.binding_order().passes();
        let Some(position) = passes.iter().position(|&kind| kind == short) else {
            return false;
        };
        passes[position + 1..]
            .iter()
            .filter(|&&kind| self.layout.counts().get(kind) > 0)
            .any(|&kind| {
                (start..self.views.len()).any(|index| {
                    !self.consumed[index]
                        && self.views[index]
                            .resource
                            .as_ref()
                            .is_some_and(|resource| kind.accepts(resource))
                })
            })
    }

    fn resolve_kind(
        &mut self,
        kind: DescriptorKind,
        required: u32,
        start: usize,
        cursor: &mut BindingCursor,
        write_cursor: &mut Option<DescriptorCursor>,
        increment: u64,
    ) -> Result<u32, BindingError> {
        let mut matched = 0;
        for index in start..self.views.len() {
            if matched == required {
                break;
            }
            if self.consumed[index] {
                continue;
            }
            let view = &self.views[index];
            let Some(resource) = view.resource.as_ref() else {
                continue;
            };
            if !kind.accepts(resource) {
                continue;
            }
            if self.layout.slot_kind(cursor.binding_index) != Some(kind) {
                break;
            }
            let Some(target) = write_cursor.as_mut() else {
                return Err(BindingError::NativeViewCreationFailed {
                    kind,
                    source: Box::new(ResourceError::NotFound),
                });
            };

            let native = resource.native_view(view.range.as_ref());
            self.device
                .write_view(kind, &native, *target)
                .map_err(|source| BindingError::NativeViewCreationFailed {
                    kind,
                    source: Box::new(source),
                })?;
            log::trace!(
                "Wrote {kind} view {index} at slot {} ({:?})",
                cursor.binding_index,
                target
            );

            target.advance(increment);
            cursor.record(kind);
            self.consumed[index] = true;
            self.remaining -= 1;
            matched += 1;
        }
        Ok(matched)
    }
}

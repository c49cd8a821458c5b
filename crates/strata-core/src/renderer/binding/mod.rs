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

//! The unified resource-binding subsystem.
//!
//! A [`ResourceHeap`] is built from a [`PipelineLayout`](crate::renderer::PipelineLayout)
//! and an ordered list of [`ResourceView`](crate::renderer::ResourceView)s:
//!
//! 1. the [`HeapAllocator`] counts the views per heap kind, rejects null views and
//!    creates at most one combined view heap and one sampler heap;
//! 2. the [`BindingResolver`] walks the views in the layout's [`BindingOrder`](crate::renderer::BindingOrder)
//!    and writes one native view per matched slot, producing as many contiguous
//!    descriptor sets as the views allow;
//! 3. the finished heap owns the native heaps and releases them on drop.

mod allocator;
mod resolver;
mod resource_heap;

#[cfg(test)]
pub(crate) mod mock;

pub use self::allocator::{HeapAllocator, HeapRegion, HeapRequirements};
pub use self::resolver::{BindingCursor, BindingResolver, SetOutcome};
pub use self::resource_heap::{ResourceHeap, ResourceHeapDescriptor};

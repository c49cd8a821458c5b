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

//! Native descriptor heap handles and write cursors.

use serde::{Deserialize, Serialize};

/// An opaque handle to a native descriptor heap owned by a [`DescriptorDevice`](crate::renderer::DescriptorDevice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorHeapId(pub usize);

/// The physical heap a descriptor lives in.
///
/// Constant-buffer, shader-resource and unordered-access views share the
/// combined heap; samplers always live in their own heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DescriptorHeapKind {
    /// The combined constant-buffer / shader-resource / unordered-access view heap.
    CombinedView,
    /// The sampler heap.
    Sampler,
}

impl DescriptorHeapKind {
    /// Every heap kind, in the order heaps are allocated and exposed.
    pub const ALL: [DescriptorHeapKind; 2] =
        [DescriptorHeapKind::CombinedView, DescriptorHeapKind::Sampler];

    /// Position of this heap kind in [`DescriptorHeapKind::ALL`].
    pub const fn index(self) -> usize {
        match self {
            DescriptorHeapKind::CombinedView => 0,
            DescriptorHeapKind::Sampler => 1,
        }
    }
}

/// A position inside a descriptor heap where the next descriptor is written.
///
/// Offsets are expressed in the device's own units: bytes for byte-addressed
/// heaps, slots for table-based backends. Either way the cursor only moves by
/// multiples of [`DescriptorDevice::descriptor_increment_size`](crate::renderer::DescriptorDevice::descriptor_increment_size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorCursor {
    /// The heap this cursor points into.
    pub heap: DescriptorHeapId,
    /// Offset from the start of the heap.
    pub offset: u64,
}

impl DescriptorCursor {
    /// Creates a cursor at `offset` in `heap`.
    pub const fn new(heap: DescriptorHeapId, offset: u64) -> Self {
        Self { heap, offset }
    }

    /// Returns this cursor moved forward by `amount`.
    pub const fn advanced(self, amount: u64) -> Self {
        Self {
            heap: self.heap,
            offset: self.offset + amount,
        }
    }

    /// Moves this cursor forward by `amount` in place.
    pub fn advance(&mut self, amount: u64) {
        self.offset += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_advances_in_device_units() {
        let mut cursor = DescriptorCursor::new(DescriptorHeapId(7), 32);
        cursor.advance(32);
        assert_eq!(cursor.offset, 64);
        assert_eq!(cursor.advanced(96).offset, 160);
        assert_eq!(cursor.heap, DescriptorHeapId(7));
    }

    #[test]
    fn heap_kinds_index_their_position() {
        for (i, kind) in DescriptorHeapKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}

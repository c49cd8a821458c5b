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

//! Flags representing which shader stages can access a resource binding.

use super::enums::ShaderStage;
use serde::{Deserialize, Serialize};

/// Flags representing which shader stages can access a resource binding.
///
/// This is used in pipeline layouts to specify visibility of resources.
/// Multiple stages can be combined using bitwise operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ShaderStageFlags {
    bits: u32,
}

impl ShaderStageFlags {
    /// No shader stages.
    pub const NONE: Self = Self { bits: 0 };
    /// Vertex shader stage.
    pub const VERTEX: Self = Self { bits: 1 << 0 };
    /// Tessellation control shader stage.
    pub const TESSELLATION_CONTROL: Self = Self { bits: 1 << 1 };
    /// Tessellation evaluation shader stage.
    pub const TESSELLATION_EVALUATION: Self = Self { bits: 1 << 2 };
    /// Geometry shader stage.
    pub const GEOMETRY: Self = Self { bits: 1 << 3 };
    /// Fragment shader stage.
    pub const FRAGMENT: Self = Self { bits: 1 << 4 };
    /// Compute shader stage.
    pub const COMPUTE: Self = Self { bits: 1 << 5 };
    /// Vertex + fragment, the common rasterization pair.
    pub const VERTEX_FRAGMENT: Self = Self {
        bits: Self::VERTEX.bits | Self::FRAGMENT.bits,
    };
    /// All graphics stages.
    pub const ALL_GRAPHICS: Self = Self {
        bits: Self::VERTEX.bits
            | Self::TESSELLATION_CONTROL.bits
            | Self::TESSELLATION_EVALUATION.bits
            | Self::GEOMETRY.bits
            | Self::FRAGMENT.bits,
    };
    /// All stages.
    pub const ALL: Self = Self {
        bits: Self::ALL_GRAPHICS.bits | Self::COMPUTE.bits,
    };

    /// Creates a new set of shader stage flags from raw bits.
    ///
    /// Bits that do not name a stage are dropped.
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            bits: bits & Self::ALL.bits,
        }
    }

    /// Creates flags from a single shader stage.
    pub const fn from_stage(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => Self::VERTEX,
            ShaderStage::TessellationControl => Self::TESSELLATION_CONTROL,
            ShaderStage::TessellationEvaluation => Self::TESSELLATION_EVALUATION,
            ShaderStage::Geometry => Self::GEOMETRY,
            ShaderStage::Fragment => Self::FRAGMENT,
            ShaderStage::Compute => Self::COMPUTE,
        }
    }

    /// Returns the raw bits.
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Combines two sets of flags.
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Returns the stages present in both sets.
    pub const fn intersection(self, other: Self) -> Self {
        Self {
            bits: self.bits & other.bits,
        }
    }

    /// Returns the stages of `self` that are not in `other`.
    pub const fn difference(self, other: Self) -> Self {
        Self {
            bits: self.bits & !other.bits,
        }
    }

    /// Checks if these flags contain a specific stage.
    pub const fn contains(&self, stage: ShaderStage) -> bool {
        let stage_bits = Self::from_stage(stage).bits;
        (self.bits & stage_bits) == stage_bits
    }

    /// Checks if every stage of `other` is also in `self`.
    pub const fn contains_all(&self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }

    /// Checks if the two sets share at least one stage.
    pub const fn intersects(&self, other: Self) -> bool {
        (self.bits & other.bits) != 0
    }

    /// Checks if these flags are empty (no stages).
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Iterates over the individual stages contained in these flags.
    pub fn stages(self) -> impl Iterator<Item = ShaderStage> {
        ShaderStage::ALL
            .into_iter()
            .filter(move |stage| self.contains(*stage))
    }
}

impl std::ops::BitOr for ShaderStageFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for ShaderStageFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl std::ops::BitAnd for ShaderStageFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(rhs)
    }
}

impl From<ShaderStage> for ShaderStageFlags {
    fn from(stage: ShaderStage) -> Self {
        Self::from_stage(stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_masks_split_graphics_and_compute() {
        let mask = ShaderStageFlags::VERTEX | ShaderStageFlags::COMPUTE;
        assert!(mask.intersects(ShaderStageFlags::ALL_GRAPHICS));
        assert!(mask.intersects(ShaderStageFlags::COMPUTE));
        assert!(!ShaderStageFlags::FRAGMENT.intersects(ShaderStageFlags::COMPUTE));
    }

    #[test]
    fn from_bits_drops_unknown_bits() {
        let flags = ShaderStageFlags::from_bits(0xFFFF_FFFF);
        assert_eq!(flags, ShaderStageFlags::ALL);
    }

    #[test]
    fn stages_iterates_in_pipeline_order() {
        let mask = ShaderStageFlags::COMPUTE | ShaderStageFlags::GEOMETRY | ShaderStageFlags::VERTEX;
        let stages: Vec<_> = mask.stages().collect();
        assert_eq!(
            stages,
            vec![ShaderStage::Vertex, ShaderStage::Geometry, ShaderStage::Compute]
        );
    }

    #[test]
    fn difference_reports_unsupported_stages() {
        let requested = ShaderStageFlags::VERTEX | ShaderStageFlags::GEOMETRY;
        let supported = ShaderStageFlags::VERTEX_FRAGMENT;
        assert_eq!(requested.difference(supported), ShaderStageFlags::GEOMETRY);
        assert!(!supported.contains_all(requested));
    }
}

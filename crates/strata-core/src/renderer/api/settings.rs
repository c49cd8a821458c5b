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

//! Settings for the resource-binding subsystem.

use crate::renderer::api::{heap::DescriptorHeapKind, pipeline::BindingOrder};
use serde::{Deserialize, Serialize};

/// Settings that affect how resource heaps are built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingSettings {
    /// The pass order layouts are realized with and heaps are filled in.
    pub binding_order: BindingOrder,
    /// If `true`, views left over after the last complete descriptor set are an
    /// error instead of being ignored.
    pub reject_unmatched_resources: bool,
    /// Suffixes appended to a heap's debug name, indexed by [`DescriptorHeapKind::index`].
    pub heap_name_suffixes: [String; 2],
}

impl BindingSettings {
    /// The debug-name suffix for heaps of `kind`.
    pub fn heap_name_suffix(&self, kind: DescriptorHeapKind) -> &str {
        &self.heap_name_suffixes[kind.index()]
    }
}

impl Default for BindingSettings {
    fn default() -> Self {
        Self {
            binding_order: BindingOrder::CURRENT,
            reject_unmatched_resources: false,
            heap_name_suffixes: [".CbvSrvUav".to_string(), ".Sampler".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = BindingSettings::default();
        assert_eq!(settings.binding_order, BindingOrder::V1);
        assert!(!settings.reject_unmatched_resources);
        assert_eq!(
            settings.heap_name_suffix(DescriptorHeapKind::CombinedView),
            ".CbvSrvUav"
        );
        assert_eq!(settings.heap_name_suffix(DescriptorHeapKind::Sampler), ".Sampler");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: BindingSettings =
            serde_json::from_str(r#"{ "reject_unmatched_resources": true }"#).unwrap();
        assert!(settings.reject_unmatched_resources);
        assert_eq!(settings.binding_order, BindingOrder::CURRENT);
        assert_eq!(settings.heap_name_suffixes[1], ".Sampler");

        let json = serde_json::to_string(&settings).unwrap();
        let back: BindingSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}

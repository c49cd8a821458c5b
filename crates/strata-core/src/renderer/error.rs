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

//! Defines the error types of the resource-binding subsystem.

use crate::renderer::api::{
    heap::DescriptorHeapKind,
    pipeline::{BindingOrder, DescriptorKind},
};
use std::fmt;

/// An error raised while building a pipeline layout or a resource heap.
///
/// Every variant is fatal for the call that produced it; nothing built by that
/// call survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// The pipeline layout description is malformed or unsupported by the backend.
    InvalidLayout(String),
    /// A resource view at `index` has no backing resource.
    NullResourceReference {
        /// Position of the offending view in the list.
        index: usize,
    },
    /// The views ran out before every slot of `kind` in a set was filled.
    IncompleteResourceBinding {
        /// The first kind that came up short.
        kind: DescriptorKind,
        /// How many views of that kind were matched.
        matched: u32,
        /// How many the layout declares per set.
        required: u32,
    },
    /// Views were left over that do not form a complete descriptor set.
    TrailingUnmatchedResources {
        /// Index of the set that could not be completed.
        set: u32,
        /// Number of views that were never consumed.
        remaining: usize,
    },
    /// The device failed to create a native descriptor heap.
    NativeHeapCreationFailed {
        /// The heap that could not be created.
        heap: DescriptorHeapKind,
        /// The device error.
        source: Box<ResourceError>,
    },
    /// The device failed to write a native view into a heap.
    NativeViewCreationFailed {
        /// The kind of descriptor being written.
        kind: DescriptorKind,
        /// The device error.
        source: Box<ResourceError>,
    },
    /// The layout and the device disagree on the descriptor pass order.
    BindingOrderMismatch {
        /// The order the layout was realized with.
        layout: BindingOrder,
        /// The order the device realizes layouts with.
        device: BindingOrder,
    },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::InvalidLayout(reason) => write!(f, "Invalid pipeline layout: {reason}"),
            BindingError::NullResourceReference { index } => {
                write!(f, "Resource view {index} references no resource")
            }
            BindingError::IncompleteResourceBinding {
                kind,
                matched,
                required,
            } => write!(
                f,
                "Incomplete resource binding: matched {matched} of {required} {kind} views"
            ),
            BindingError::TrailingUnmatchedResources { set, remaining } => write!(
                f,
                "{remaining} resource views do not form a complete descriptor set (set {set})"
            ),
            BindingError::NativeHeapCreationFailed { heap, source } => {
                write!(f, "Failed to create {heap:?} descriptor heap: {source}")
            }
            BindingError::NativeViewCreationFailed { kind, source } => {
                write!(f, "Failed to write {kind} view: {source}")
            }
            BindingError::BindingOrderMismatch { layout, device } => write!(
                f,
                "Binding order mismatch: layout uses {layout}, device uses {device}"
            ),
        }
    }
}

impl std::error::Error for BindingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindingError::NativeHeapCreationFailed { source, .. }
            | BindingError::NativeViewCreationFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// An error raised by a [`DescriptorDevice`](crate::renderer::DescriptorDevice).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// A binding-subsystem error surfaced through a device call.
    Binding(BindingError),
    /// The requested resource could not be found.
    NotFound,
    /// The handle is of the wrong kind or no longer valid.
    InvalidHandle,
    /// A backend-specific error.
    BackendError(String),
    /// An offset or count falls outside the resource.
    OutOfBounds,
    /// The device does not support the requested operation.
    Unsupported(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Binding(err) => write!(f, "Binding error: {err}"),
            ResourceError::NotFound => write!(f, "Resource not found"),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle"),
            ResourceError::BackendError(msg) => write!(f, "Backend error: {msg}"),
            ResourceError::OutOfBounds => write!(f, "Access out of bounds"),
            ResourceError::Unsupported(what) => write!(f, "Unsupported operation: {what}"),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Binding(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BindingError> for ResourceError {
    fn from(err: BindingError) -> Self {
        ResourceError::Binding(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn binding_error_display() {
        let err = BindingError::IncompleteResourceBinding {
            kind: DescriptorKind::ConstantBuffer,
            matched: 0,
            required: 1,
        };
        assert_eq!(
            format!("{err}"),
            "Incomplete resource binding: matched 0 of 1 constant buffer views"
        );

        let err = BindingError::NullResourceReference { index: 3 };
        assert_eq!(format!("{err}"), "Resource view 3 references no resource");

        let err = BindingError::BindingOrderMismatch {
            layout: BindingOrder::V1,
            device: BindingOrder::V1,
        };
        assert_eq!(
            format!("{err}"),
            "Binding order mismatch: layout uses v1, device uses v1"
        );
    }

    #[test]
    fn heap_creation_failure_chains_the_device_error() {
        let err = BindingError::NativeHeapCreationFailed {
            heap: DescriptorHeapKind::Sampler,
            source: Box::new(ResourceError::OutOfBounds),
        };
        assert_eq!(
            format!("{err}"),
            "Failed to create Sampler descriptor heap: Access out of bounds"
        );
        let source = err.source().unwrap();
        assert_eq!(format!("{source}"), "Access out of bounds");
    }

    #[test]
    fn resource_error_wraps_binding_error() {
        let res_err: ResourceError = BindingError::NullResourceReference { index: 0 }.into();
        assert_eq!(
            format!("{res_err}"),
            "Binding error: Resource view 0 references no resource"
        );
        assert!(res_err.source().is_some());
        assert!(ResourceError::NotFound.source().is_none());
    }
}

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

//! Provides the public, backend-agnostic binding contracts for Strata.
//!
//! This module defines the "common language" shared by every backend. It contains
//! the abstract `traits` (like [`DescriptorDevice`]), data structures (like
//! [`PipelineLayoutDescriptor`]) and error types that form the stable API.
//!
//! The 'what' of resource binding lives here, together with the
//! [`binding`] subsystem that drives any device through the traits. The 'how'
//! (native heaps, bind groups, descriptor writes) is handled by a concrete
//! backend in the `strata-infra` crate.

pub mod api;
pub mod binding;
pub mod error;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::binding::{BindingCursor, ResourceHeap, ResourceHeapDescriptor};
pub use self::error::{BindingError, ResourceError};
pub use self::traits::DescriptorDevice;

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

//! # Strata Core
//!
//! Backend-agnostic contracts for describing GPU resource bindings once and
//! realizing them on structurally different native backends.
//!
//! The heart of the crate is the unified resource-binding subsystem in
//! [`renderer::binding`]: a [`renderer::PipelineLayout`] plus an ordered list of
//! [`renderer::ResourceView`]s becomes a [`renderer::ResourceHeap`], the native
//! descriptor heaps a command encoder binds at draw or dispatch time.

#![warn(missing_docs)]

pub mod renderer;

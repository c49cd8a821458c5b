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

//! # Strata Infra
//!
//! Concrete [`DescriptorDevice`](strata_core::renderer::DescriptorDevice) backends:
//!
//! - [`graphics::wgpu`]: realizes heaps as slot tables and materializes each
//!   descriptor set as a `wgpu::BindGroup`;
//! - [`graphics::software`]: byte-addressed CPU heaps that record every written
//!   view, used for inspection and tests.

pub mod graphics;

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

//! Generic binding enums.

use serde::{Deserialize, Serialize};

/// A backend-agnostic representation of a graphics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GraphicsBackendType {
    /// Vulkan API.
    Vulkan,
    /// Apple's Metal API.
    Metal,
    /// Microsoft's DirectX 12 API.
    Dx12,
    /// Microsoft's DirectX 11 API.
    Dx11,
    /// OpenGL API.
    OpenGL,
    /// WebGPU API (for web builds).
    WebGpu,
    /// A CPU-side reference implementation with no GPU behind it.
    Software,
    /// An unknown or unsupported backend.
    #[default]
    Unknown,
}

/// Defines the programmable stage in the graphics pipeline a binding is visible to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    /// The vertex shader stage.
    Vertex,
    /// The tessellation control (hull) shader stage.
    TessellationControl,
    /// The tessellation evaluation (domain) shader stage.
    TessellationEvaluation,
    /// The geometry shader stage.
    Geometry,
    /// The fragment (or pixel) shader stage.
    Fragment,
    /// The compute shader stage.
    Compute,
}

impl ShaderStage {
    /// Every stage, in pipeline order.
    pub const ALL: [ShaderStage; 6] = [
        ShaderStage::Vertex,
        ShaderStage::TessellationControl,
        ShaderStage::TessellationEvaluation,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
        ShaderStage::Compute,
    ];

    /// Returns `true` for every stage of the graphics pipeline (everything but compute).
    pub const fn is_graphics(&self) -> bool {
        !matches!(self, ShaderStage::Compute)
    }
}

/// The native category of a bindable resource.
///
/// Every resource handed to the binding subsystem is exactly one of these.
/// Matching against a pipeline layout is done by resource type and bind flags
/// only, never by backend-specific type identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    /// A GPU buffer.
    Buffer,
    /// A texture, bound through one of its views.
    Texture,
    /// A texture sampler.
    Sampler,
}

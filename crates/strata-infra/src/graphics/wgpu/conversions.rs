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

use strata_core::renderer::{BindFlags, DescriptorKind, GraphicsBackendType, ShaderStageFlags};

/// A local extension trait to convert Strata types into wgpu types.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_wgpu()` syntax.
pub trait IntoWgpu<T> {
    /// Consumes self and converts it into a wgpu type.
    fn into_wgpu(self) -> T;
}

impl IntoWgpu<wgpu::ShaderStages> for ShaderStageFlags {
    fn into_wgpu(self) -> wgpu::ShaderStages {
        let mut stages = wgpu::ShaderStages::NONE;
        if self.intersects(ShaderStageFlags::VERTEX) {
            stages |= wgpu::ShaderStages::VERTEX;
        }
        if self.intersects(ShaderStageFlags::FRAGMENT) {
            stages |= wgpu::ShaderStages::FRAGMENT;
        }
        if self.intersects(ShaderStageFlags::COMPUTE) {
            stages |= wgpu::ShaderStages::COMPUTE;
        }
        stages
    }
}

/// Converts the buffer binding kinds into wgpu buffer binding types.
///
/// Returns `None` for kinds that do not bind a buffer.
impl IntoWgpu<Option<wgpu::BufferBindingType>> for DescriptorKind {
    fn into_wgpu(self) -> Option<wgpu::BufferBindingType> {
        match self {
            DescriptorKind::ConstantBuffer => Some(wgpu::BufferBindingType::Uniform),
            DescriptorKind::SampledBuffer => {
                Some(wgpu::BufferBindingType::Storage { read_only: true })
            }
            DescriptorKind::StorageBuffer => {
                Some(wgpu::BufferBindingType::Storage { read_only: false })
            }
            _ => None,
        }
    }
}

/// Maps the usages a wgpu buffer was created with onto bind flags.
///
/// A wgpu storage buffer can be bound both read-only and read-write, so it
/// carries both `SAMPLED` and `STORAGE`.
pub fn from_wgpu_buffer_usages(usages: wgpu::BufferUsages) -> BindFlags {
    let mut flags = BindFlags::empty();
    if usages.contains(wgpu::BufferUsages::VERTEX) {
        flags |= BindFlags::VERTEX_BUFFER;
    }
    if usages.contains(wgpu::BufferUsages::INDEX) {
        flags |= BindFlags::INDEX_BUFFER;
    }
    if usages.contains(wgpu::BufferUsages::UNIFORM) {
        flags |= BindFlags::CONSTANT_BUFFER;
    }
    if usages.contains(wgpu::BufferUsages::STORAGE) {
        flags |= BindFlags::SAMPLED | BindFlags::STORAGE;
    }
    if usages.contains(wgpu::BufferUsages::INDIRECT) {
        flags |= BindFlags::INDIRECT;
    }
    if usages.contains(wgpu::BufferUsages::COPY_SRC) {
        flags |= BindFlags::COPY_SRC;
    }
    if usages.contains(wgpu::BufferUsages::COPY_DST) {
        flags |= BindFlags::COPY_DST;
    }
    flags
}

/// Maps the usages a wgpu texture was created with onto bind flags.
///
/// `depth` selects which attachment flag a render-attachment texture gets.
pub fn from_wgpu_texture_usages(usages: wgpu::TextureUsages, depth: bool) -> BindFlags {
    let mut flags = BindFlags::empty();
    if usages.contains(wgpu::TextureUsages::TEXTURE_BINDING) {
        flags |= BindFlags::SAMPLED;
    }
    if usages.contains(wgpu::TextureUsages::STORAGE_BINDING) {
        flags |= BindFlags::STORAGE;
    }
    if usages.contains(wgpu::TextureUsages::RENDER_ATTACHMENT) {
        flags |= if depth {
            BindFlags::DEPTH_STENCIL_ATTACHMENT
        } else {
            BindFlags::COLOR_ATTACHMENT
        };
    }
    if usages.contains(wgpu::TextureUsages::COPY_SRC) {
        flags |= BindFlags::COPY_SRC;
    }
    if usages.contains(wgpu::TextureUsages::COPY_DST) {
        flags |= BindFlags::COPY_DST;
    }
    flags
}

/// Maps a wgpu backend onto a backend type.
pub fn from_wgpu_backend(backend: wgpu::Backend) -> GraphicsBackendType {
    match backend {
        wgpu::Backend::Vulkan => GraphicsBackendType::Vulkan,
        wgpu::Backend::Metal => GraphicsBackendType::Metal,
        wgpu::Backend::Dx12 => GraphicsBackendType::Dx12,
        wgpu::Backend::Gl => GraphicsBackendType::OpenGL,
        wgpu::Backend::BrowserWebGpu => GraphicsBackendType::WebGpu,
        _ => GraphicsBackendType::Unknown,
    }
}

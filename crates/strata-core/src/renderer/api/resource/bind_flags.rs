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

use bitflags::bitflags;

bitflags! {
    /// The declared usage capabilities of a buffer or texture.
    ///
    /// The binding subsystem matches a resource against a layout slot by testing
    /// these flags against the flag each descriptor kind requires
    /// (see [`DescriptorKind::required_bind_flags`](crate::renderer::DescriptorKind::required_bind_flags)).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BindFlags: u32 {
        /// The buffer can be bound as a vertex buffer.
        const VERTEX_BUFFER = 1 << 0;
        /// The buffer can be bound as an index buffer.
        const INDEX_BUFFER = 1 << 1;
        /// The buffer can be bound as a constant (uniform) buffer.
        const CONSTANT_BUFFER = 1 << 2;
        /// The resource can be read by shaders through a shader-resource view.
        const SAMPLED = 1 << 3;
        /// The resource can be read and written by shaders through an unordered-access view.
        const STORAGE = 1 << 4;
        /// The texture can be used as a color attachment.
        const COLOR_ATTACHMENT = 1 << 5;
        /// The texture can be used as a depth-stencil attachment.
        const DEPTH_STENCIL_ATTACHMENT = 1 << 6;
        /// The resource can be the source of a copy.
        const COPY_SRC = 1 << 7;
        /// The resource can be the destination of a copy.
        const COPY_DST = 1 << 8;
        /// The buffer can hold indirect draw or dispatch arguments.
        const INDIRECT = 1 << 9;
    }
}

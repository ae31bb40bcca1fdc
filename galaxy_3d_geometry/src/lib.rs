/*!
# Galaxy 3D Geometry

Indexed geometry core for the Galaxy 3D engine.

An [`IndexedGeometry`](galaxy3d::resource::IndexedGeometry) holds vertex
positions, optional normals, texture coordinates and colors, and an index
array. Each attribute is mirrored into a device buffer through the
[`GraphicsDevice`](galaxy3d::device::GraphicsDevice) trait, with an optional
CPU-side copy exposed as a cursor buffer.

## Architecture

- **GraphicsDevice**: allocate / update / release device buffers
- **MockGraphicsDevice**: in-memory device for tests and headless tools
- **TypedBuffer**: float or integer CPU array with cursor semantics
- **BufferDescriptor**: per-attribute metadata and device residency
- **IndexedGeometry**: the five attribute streams and their lifecycle
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod resource;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Graphics device sub-module
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }
}

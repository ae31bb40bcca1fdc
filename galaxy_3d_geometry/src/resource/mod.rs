//! Geometry resources
//!
//! CPU-side typed buffers, per-attribute descriptors and the indexed
//! geometry that mirrors them into device buffers.

pub mod typed_buffer;
pub mod buffer_descriptor;
pub mod indexed_geometry;

pub use typed_buffer::{CursorBuffer, FloatBuffer, IntBuffer, TypedBuffer};
pub use buffer_descriptor::{
    Attribute, BufferDescriptor, BufferState, Residency,
    UpdateStrategy, choose_update_strategy,
};
pub use indexed_geometry::{
    IndexedGeometry, GeometryData, GeometryConfig, UsageHints,
};

//! Per-attribute buffer metadata.
//!
//! A `BufferDescriptor` tracks one attribute of an `IndexedGeometry`:
//! element type, usage hint, element count, the device residency of the
//! attribute and the optional CPU copy.
//!
//! # States
//!
//! ```text
//!            set_data / set_xxx              invalidate
//! Empty ──────────────────────────► Uploaded ──────────► Stale
//!   │                                   ▲                 │
//!   │ (CPU data, not uploaded)          │ reload / set_xxx│
//!   └──────────► CpuOnly ───────────────┴─────────────────┘
//! ```
//!
//! The state is derived from `Residency` and the presence of the CPU copy,
//! so it can never disagree with the handle: a handle exists exactly when the
//! residency is `Resident`.

use std::fmt;
use crate::graphics_device::{BufferHandle, BufferTarget, BufferUsage, ElementType};
use crate::resource::TypedBuffer;

// ============================================================================
// ATTRIBUTE
// ============================================================================

/// The five attribute streams of an indexed geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Vertices,
    Normals,
    TextureCoords,
    Colors,
    Indices,
}

impl Attribute {
    /// All attributes, in storage order
    pub const ALL: [Attribute; 5] = [
        Attribute::Vertices,
        Attribute::Normals,
        Attribute::TextureCoords,
        Attribute::Colors,
        Attribute::Indices,
    ];

    /// Storage slot of the attribute
    pub(crate) fn index(&self) -> usize {
        match self {
            Attribute::Vertices => 0,
            Attribute::Normals => 1,
            Attribute::TextureCoords => 2,
            Attribute::Colors => 3,
            Attribute::Indices => 4,
        }
    }

    /// Components per vertex (None for indices, which are not per-vertex)
    pub fn components_per_vertex(&self) -> Option<usize> {
        match self {
            Attribute::Vertices | Attribute::Normals => Some(3),
            Attribute::TextureCoords => Some(2),
            Attribute::Colors => Some(4),
            Attribute::Indices => None,
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Attribute::Indices => ElementType::Int,
            _ => ElementType::Float,
        }
    }

    pub fn target(&self) -> BufferTarget {
        match self {
            Attribute::Indices => BufferTarget::Index,
            _ => BufferTarget::Vertex,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Vertices => "vertices",
            Attribute::Normals => "normals",
            Attribute::TextureCoords => "texture coords",
            Attribute::Colors => "colors",
            Attribute::Indices => "indices",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// RESIDENCY & STATE
// ============================================================================

/// Device-side status of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Residency {
    /// Never uploaded, or released
    None,
    /// Live device buffer able to hold `capacity` elements
    Resident { handle: BufferHandle, capacity: usize },
    /// The handle was dropped by `invalidate` (device context lost)
    Invalidated,
}

/// Observable lifecycle state of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// No data, no handle
    Empty,
    /// CPU data present, not on the device
    CpuOnly,
    /// Device buffer present (CPU copy may have been discarded)
    Uploaded,
    /// Handle invalidated; CPU copy may or may not be present
    Stale,
}

// ============================================================================
// UPDATE STRATEGY
// ============================================================================

/// How a replacement reaches the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// Release the device buffer (if any) and allocate a new one
    Reallocate,
    /// Overwrite the whole existing device buffer
    PartialUpdate,
}

/// Decide how to push `new_len` elements to an attribute's device buffer
///
/// An in-place update needs a live buffer whose allocation holds exactly
/// `new_len` elements; a shorter write would leave the old tail on the device.
pub fn choose_update_strategy(device_capacity: usize, new_len: usize, has_handle: bool) -> UpdateStrategy {
    if has_handle && new_len > 0 && new_len == device_capacity {
        UpdateStrategy::PartialUpdate
    } else {
        UpdateStrategy::Reallocate
    }
}

// ============================================================================
// BUFFER DESCRIPTOR
// ============================================================================

/// Metadata, device handle and CPU copy of one attribute
#[derive(Debug, Clone)]
pub struct BufferDescriptor {
    attribute: Attribute,
    usage: BufferUsage,
    element_count: usize,
    residency: Residency,
    buffer: Option<TypedBuffer>,
}

impl BufferDescriptor {
    /// Create an empty descriptor
    pub(crate) fn new(attribute: Attribute, usage: BufferUsage) -> Self {
        Self {
            attribute,
            usage,
            element_count: 0,
            residency: Residency::None,
            buffer: None,
        }
    }

    // ===== ACCESSORS =====

    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    /// Element type (FLOAT for per-vertex data, INT for indices)
    pub fn element_type(&self) -> ElementType {
        self.attribute.element_type()
    }

    /// Usage hint given at the last upload
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Number of elements currently stored
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Device handle, present only while the buffer is resident
    pub fn handle(&self) -> Option<BufferHandle> {
        match self.residency {
            Residency::Resident { handle, .. } => Some(handle),
            _ => None,
        }
    }

    /// Elements the device allocation can hold (0 when not resident)
    pub fn device_capacity(&self) -> usize {
        match self.residency {
            Residency::Resident { capacity, .. } => capacity,
            _ => 0,
        }
    }

    pub fn residency(&self) -> Residency {
        self.residency
    }

    pub fn state(&self) -> BufferState {
        match self.residency {
            Residency::Resident { .. } => BufferState::Uploaded,
            Residency::Invalidated => BufferState::Stale,
            Residency::None if self.buffer.is_some() => BufferState::CpuOnly,
            Residency::None => BufferState::Empty,
        }
    }

    /// CPU copy, if retained or restored
    pub fn buffer(&self) -> Option<&TypedBuffer> {
        self.buffer.as_ref()
    }

    pub fn has_cpu_copy(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn is_uploaded(&self) -> bool {
        matches!(self.residency, Residency::Resident { .. })
    }

    // ===== TRANSITIONS (crate-internal) =====

    pub(crate) fn buffer_mut(&mut self) -> Option<&mut TypedBuffer> {
        self.buffer.as_mut()
    }

    pub(crate) fn set_usage(&mut self, usage: BufferUsage) {
        self.usage = usage;
    }

    /// Install a new CPU copy; the element count follows it
    pub(crate) fn attach_buffer(&mut self, buffer: TypedBuffer) {
        debug_assert_eq!(buffer.element_type(), self.element_type());
        self.element_count = buffer.len();
        self.buffer = Some(buffer);
    }

    pub(crate) fn set_element_count(&mut self, count: usize) {
        self.element_count = count;
    }

    /// Drop the CPU copy, keeping the device buffer and counts
    pub(crate) fn discard_cpu_copy(&mut self) {
        self.buffer = None;
    }

    /// Allocate a zero-filled CPU copy sized to the element count
    ///
    /// Returns false when there is nothing to restore (copy present, or no
    /// data at all).
    pub(crate) fn restore_cpu_copy(&mut self) -> bool {
        if self.buffer.is_some() || self.element_count == 0 {
            return false;
        }
        self.buffer = Some(TypedBuffer::zeroed(self.element_type(), self.element_count));
        true
    }

    pub(crate) fn mark_resident(&mut self, handle: BufferHandle, capacity: usize) {
        self.residency = Residency::Resident { handle, capacity };
    }

    /// Forget the device buffer and return its handle for release
    pub(crate) fn take_handle(&mut self) -> Option<BufferHandle> {
        let handle = self.handle();
        self.residency = Residency::None;
        handle
    }

    /// Drop the handle without releasing it; returns true if one was held
    pub(crate) fn invalidate(&mut self) -> bool {
        if self.is_uploaded() {
            self.residency = Residency::Invalidated;
            true
        } else {
            false
        }
    }

    /// Back to Empty. The device buffer must already be released.
    pub(crate) fn reset(&mut self) {
        debug_assert!(!self.is_uploaded(), "reset of a resident {} buffer", self.attribute);
        self.element_count = 0;
        self.residency = Residency::None;
        self.buffer = None;
    }
}

impl fmt::Display for BufferDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<15} {:?}/{:?} elements={} state={:?} cpu_copy={}",
            self.attribute.name(),
            self.element_type(),
            self.usage,
            self.element_count,
            self.state(),
            if self.has_cpu_copy() { "yes" } else { "no" },
        )?;
        if let Residency::Resident { handle, capacity } = self.residency {
            write!(f, " handle={:?} capacity={}", handle, capacity)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "buffer_descriptor_tests.rs"]
mod tests;

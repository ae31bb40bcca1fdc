/// Device buffer handle, element types, usage hints and buffer descriptor

use slotmap::new_key_type;

// ===== HANDLE =====

new_key_type! {
    /// Opaque identifier of a device-resident buffer.
    ///
    /// Returned by `GraphicsDevice::allocate_buffer` and owned by the
    /// `BufferDescriptor` that requested it. A handle becomes meaningless
    /// once released or once its device context is lost.
    pub struct BufferHandle;
}

// ===== ELEMENT TYPE =====

/// Element type of an attribute buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// 32-bit float (positions, normals, texture coordinates, colors)
    Float,
    /// 32-bit unsigned integer (indices)
    Int,
}

impl ElementType {
    /// Size of one element in bytes
    pub fn size_bytes(&self) -> u64 {
        match self {
            ElementType::Float => std::mem::size_of::<f32>() as u64,
            ElementType::Int => std::mem::size_of::<u32>() as u64,
        }
    }
}

// ===== USAGE HINT =====

/// Advisory hint telling the device how often a buffer's contents change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Uploaded once, drawn many times
    #[default]
    Static,
    /// Modified repeatedly, drawn many times
    Dynamic,
    /// Modified once, drawn a few times
    Stream,
}

// ===== TARGET =====

/// Binding target of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data
    Vertex,
    /// Element indices
    Index,
}

// ===== DESCRIPTOR =====

/// Parameters of a device buffer allocation.
///
/// The allocation size is the byte length of the data handed to
/// `allocate_buffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    /// Element type (drives the device format)
    pub element_type: ElementType,
    /// Usage hint
    pub usage: BufferUsage,
    /// Binding target
    pub target: BufferTarget,
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;

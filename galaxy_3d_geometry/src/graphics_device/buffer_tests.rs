//! Unit tests for graphics_device buffer types
//!
//! Tests element sizes, default usage hint and handle semantics.

#[cfg(test)]
use crate::graphics_device::{BufferDesc, BufferHandle, BufferTarget, BufferUsage, ElementType};

// ============================================================================
// ELEMENT TYPE
// ============================================================================

#[test]
fn test_element_type_size_bytes() {
    assert_eq!(ElementType::Float.size_bytes(), 4);
    assert_eq!(ElementType::Int.size_bytes(), 4);
}

// ============================================================================
// USAGE HINT
// ============================================================================

#[test]
fn test_buffer_usage_default_is_static() {
    assert_eq!(BufferUsage::default(), BufferUsage::Static);
    assert_ne!(BufferUsage::Dynamic, BufferUsage::Stream);
}

// ============================================================================
// HANDLE & DESCRIPTOR
// ============================================================================

#[test]
fn test_buffer_handle_is_copy_and_comparable() {
    let handle: BufferHandle = slotmap::KeyData::from_ffi(1).into();
    let copy = handle;
    assert_eq!(handle, copy);
    assert_ne!(handle, BufferHandle::default());
}

#[test]
fn test_buffer_desc_equality() {
    let a = BufferDesc {
        element_type: ElementType::Float,
        usage: BufferUsage::Dynamic,
        target: BufferTarget::Vertex,
    };
    let mut b = a;
    assert_eq!(a, b);
    b.target = BufferTarget::Index;
    assert_ne!(a, b);
}

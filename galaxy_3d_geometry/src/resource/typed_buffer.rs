/// CPU-side typed arrays with cursor semantics.
///
/// A `CursorBuffer<T>` is a fixed-capacity array with a `limit` (number of
/// logically valid elements) and a `position` used for sequential reads and
/// writes:
///
/// ```text
/// 0 <= position <= limit <= capacity
/// ```
///
/// Reading or writing past the limit is a programming error and panics.
///
/// `TypedBuffer` closes the set of element types an attribute can hold:
/// float arrays for per-vertex data, integer arrays for indices.

use bytemuck::Pod;
use crate::graphics_device::ElementType;

// ============================================================================
// CURSOR BUFFER
// ============================================================================

/// Fixed-capacity array with position/limit cursor
#[derive(Debug, Clone, PartialEq)]
pub struct CursorBuffer<T> {
    data: Vec<T>,
    position: usize,
    limit: usize,
}

/// Float cursor buffer (positions, normals, texture coordinates, colors)
pub type FloatBuffer = CursorBuffer<f32>;

/// Integer cursor buffer (indices)
pub type IntBuffer = CursorBuffer<u32>;

impl<T: Pod> CursorBuffer<T> {
    /// Wrap a vector; capacity and limit equal its length
    pub fn from_vec(data: Vec<T>) -> Self {
        let limit = data.len();
        Self { data, position: 0, limit }
    }

    /// Copy a slice into a new buffer
    pub fn from_slice(values: &[T]) -> Self {
        Self::from_vec(values.to_vec())
    }

    /// Zero-filled buffer of `len` elements
    pub fn zeroed(len: usize) -> Self {
        Self::from_vec(vec![T::zeroed(); len])
    }

    // ===== CURSOR STATE =====

    /// Allocated number of elements
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of logically valid elements
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Same as `limit()`
    pub fn len(&self) -> usize {
        self.limit
    }

    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }

    /// Current cursor position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor
    ///
    /// # Panics
    ///
    /// If `position > limit`
    pub fn set_position(&mut self, position: usize) {
        assert!(
            position <= self.limit,
            "cursor position {} past limit {}", position, self.limit
        );
        self.position = position;
    }

    /// Elements between the cursor and the limit
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    pub fn has_remaining(&self) -> bool {
        self.position < self.limit
    }

    /// Cursor back to 0, limit unchanged
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Cursor to 0, limit to capacity (prepare for a full write)
    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.data.len();
    }

    /// Limit to the cursor, cursor to 0 (prepare for reading what was written)
    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    // ===== SEQUENTIAL ACCESS =====

    /// Read the element at the cursor and advance
    ///
    /// # Panics
    ///
    /// If no element remains
    pub fn get(&mut self) -> T {
        assert!(self.has_remaining(), "read past limit {}", self.limit);
        let value = self.data[self.position];
        self.position += 1;
        value
    }

    /// Write an element at the cursor and advance
    ///
    /// # Panics
    ///
    /// If no element remains
    pub fn put(&mut self, value: T) {
        assert!(self.has_remaining(), "write past limit {}", self.limit);
        self.data[self.position] = value;
        self.position += 1;
    }

    /// Write a run of elements at the cursor and advance past them
    ///
    /// # Panics
    ///
    /// If fewer than `values.len()` elements remain
    pub fn put_slice(&mut self, values: &[T]) {
        assert!(
            values.len() <= self.remaining(),
            "write of {} elements with {} remaining", values.len(), self.remaining()
        );
        let end = self.position + values.len();
        self.data[self.position..end].copy_from_slice(values);
        self.position = end;
    }

    // ===== ABSOLUTE ACCESS =====

    /// Read the element at `index` without moving the cursor
    ///
    /// # Panics
    ///
    /// If `index >= limit`
    pub fn get_at(&self, index: usize) -> T {
        assert!(index < self.limit, "index {} past limit {}", index, self.limit);
        self.data[index]
    }

    /// Write the element at `index` without moving the cursor
    ///
    /// # Panics
    ///
    /// If `index >= limit`
    pub fn put_at(&mut self, index: usize, value: T) {
        assert!(index < self.limit, "index {} past limit {}", index, self.limit);
        self.data[index] = value;
    }

    /// Replace the whole contents in place, reusing the allocation
    ///
    /// Leaves `limit == values.len()` and the cursor at 0.
    ///
    /// # Panics
    ///
    /// If `values.len() > capacity`
    pub fn overwrite(&mut self, values: &[T]) {
        self.clear();
        self.put_slice(values);
        self.flip();
    }

    // ===== VIEWS =====

    /// Valid elements (`0..limit`)
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.limit]
    }

    /// Valid elements as raw bytes, ready for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }
}

// ============================================================================
// TYPED BUFFER
// ============================================================================

/// CPU copy of one attribute: float or integer elements
#[derive(Debug, Clone, PartialEq)]
pub enum TypedBuffer {
    Float(FloatBuffer),
    Int(IntBuffer),
}

impl TypedBuffer {
    /// Zero-filled buffer of the given element type
    pub fn zeroed(element_type: ElementType, len: usize) -> Self {
        match element_type {
            ElementType::Float => TypedBuffer::Float(FloatBuffer::zeroed(len)),
            ElementType::Int => TypedBuffer::Int(IntBuffer::zeroed(len)),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            TypedBuffer::Float(_) => ElementType::Float,
            TypedBuffer::Int(_) => ElementType::Int,
        }
    }

    /// Number of valid elements
    pub fn len(&self) -> usize {
        match self {
            TypedBuffer::Float(buffer) => buffer.len(),
            TypedBuffer::Int(buffer) => buffer.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        match self {
            TypedBuffer::Float(buffer) => buffer.capacity(),
            TypedBuffer::Int(buffer) => buffer.capacity(),
        }
    }

    /// Valid elements as raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            TypedBuffer::Float(buffer) => buffer.as_bytes(),
            TypedBuffer::Int(buffer) => buffer.as_bytes(),
        }
    }

    pub fn as_float(&self) -> Option<&FloatBuffer> {
        match self {
            TypedBuffer::Float(buffer) => Some(buffer),
            TypedBuffer::Int(_) => None,
        }
    }

    pub fn as_float_mut(&mut self) -> Option<&mut FloatBuffer> {
        match self {
            TypedBuffer::Float(buffer) => Some(buffer),
            TypedBuffer::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<&IntBuffer> {
        match self {
            TypedBuffer::Int(buffer) => Some(buffer),
            TypedBuffer::Float(_) => None,
        }
    }

    pub fn as_int_mut(&mut self) -> Option<&mut IntBuffer> {
        match self {
            TypedBuffer::Int(buffer) => Some(buffer),
            TypedBuffer::Float(_) => None,
        }
    }
}

impl From<Vec<f32>> for TypedBuffer {
    fn from(values: Vec<f32>) -> Self {
        TypedBuffer::Float(FloatBuffer::from_vec(values))
    }
}

impl From<Vec<u32>> for TypedBuffer {
    fn from(values: Vec<u32>) -> Self {
        TypedBuffer::Int(IntBuffer::from_vec(values))
    }
}

#[cfg(test)]
#[path = "typed_buffer_tests.rs"]
mod tests;

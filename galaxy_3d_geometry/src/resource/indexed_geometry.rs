//! Indexed geometry: CPU attribute arrays mirrored into device buffers.
//!
//! An `IndexedGeometry` owns five attribute streams:
//!
//! ```text
//! IndexedGeometry "cube"
//! ├── vertices        FLOAT  3 per vertex   (required)
//! ├── normals         FLOAT  3 per vertex   (optional)
//! ├── texture coords  FLOAT  2 per vertex   (optional)
//! ├── colors          FLOAT  4 per vertex   (optional)
//! └── indices         INT    any length     (required)
//! ```
//!
//! Each stream is described by a [`BufferDescriptor`] holding the device
//! handle and, when retained, the CPU copy. Every device call is made while
//! holding the graphics device lock and has completed when the method
//! returns, so descriptor state is always consistent with the device.
//!
//! An instance is meant to be driven by one owning thread; mutation takes
//! `&mut self`.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use crate::error::{Error, Result};
use crate::{engine_bail, engine_debug, engine_err, engine_info, engine_trace, engine_warn};
use crate::graphics_device::{BufferDesc, BufferUsage, ElementType, GraphicsDevice};
use crate::resource::{
    Attribute, BufferDescriptor, FloatBuffer, IntBuffer, TypedBuffer,
    UpdateStrategy, choose_update_strategy,
};

const SOURCE: &str = "galaxy3d::IndexedGeometry";

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Geometry configuration
#[derive(Debug, Clone)]
pub struct GeometryConfig {
    /// Name used in logs and diagnostics
    pub name: String,
    /// Usage hint applied when `GeometryData::usage` is None and to
    /// attributes first supplied through a setter
    pub default_usage: BufferUsage,
    /// Allow setters to overwrite a device buffer in place when the new data
    /// has the allocation's exact size; when false every setter reallocates
    pub partial_updates: bool,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            name: "IndexedGeometry".to_string(),
            default_usage: BufferUsage::Static,
            partial_updates: true,
        }
    }
}

// ============================================================================
// USAGE HINTS
// ============================================================================

/// Per-attribute usage hints for `set_data`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageHints {
    pub vertices: BufferUsage,
    pub normals: BufferUsage,
    pub texture_coords: BufferUsage,
    pub colors: BufferUsage,
    pub indices: BufferUsage,
}

impl UsageHints {
    /// Same hint for every attribute
    pub fn all(usage: BufferUsage) -> Self {
        Self {
            vertices: usage,
            normals: usage,
            texture_coords: usage,
            colors: usage,
            indices: usage,
        }
    }

    /// Hint of one attribute
    pub fn get(&self, attribute: Attribute) -> BufferUsage {
        match attribute {
            Attribute::Vertices => self.vertices,
            Attribute::Normals => self.normals,
            Attribute::TextureCoords => self.texture_coords,
            Attribute::Colors => self.colors,
            Attribute::Indices => self.indices,
        }
    }
}

impl Default for UsageHints {
    fn default() -> Self {
        Self::all(BufferUsage::Static)
    }
}

// ============================================================================
// GEOMETRY DATA
// ============================================================================

/// Input of `IndexedGeometry::set_data`
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// Positions, 3 floats per vertex (required, non-empty)
    pub vertices: Vec<f32>,
    /// Normals, 3 floats per vertex
    pub normals: Option<Vec<f32>>,
    /// Texture coordinates, 2 floats per vertex
    pub texture_coords: Option<Vec<f32>>,
    /// Colors, 4 floats per vertex
    pub colors: Option<Vec<f32>>,
    /// Element indices (required, non-empty)
    pub indices: Vec<u32>,
    /// Keep the CPU arrays after upload
    pub retain_cpu_copy: bool,
    /// Per-attribute usage hints (None = config default for all)
    pub usage: Option<UsageHints>,
}

impl GeometryData {
    /// Positions and indices only, CPU copy retained
    pub fn new(vertices: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            normals: None,
            texture_coords: None,
            colors: None,
            indices,
            retain_cpu_copy: true,
            usage: None,
        }
    }

    fn per_vertex_lengths(&self) -> [(Attribute, Option<usize>); 3] {
        [
            (Attribute::Normals, self.normals.as_ref().map(Vec::len)),
            (Attribute::TextureCoords, self.texture_coords.as_ref().map(Vec::len)),
            (Attribute::Colors, self.colors.as_ref().map(Vec::len)),
        ]
    }
}

// ============================================================================
// ATTRIBUTE VALUES
// ============================================================================

/// Borrowed replacement data for one attribute
#[derive(Debug, Clone, Copy)]
enum AttributeValues<'a> {
    Float(&'a [f32]),
    Int(&'a [u32]),
}

impl AttributeValues<'_> {
    fn len(&self) -> usize {
        match self {
            AttributeValues::Float(values) => values.len(),
            AttributeValues::Int(values) => values.len(),
        }
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            AttributeValues::Float(values) => bytemuck::cast_slice(values),
            AttributeValues::Int(values) => bytemuck::cast_slice(values),
        }
    }

    fn to_typed_buffer(self) -> TypedBuffer {
        match self {
            AttributeValues::Float(values) => TypedBuffer::Float(FloatBuffer::from_slice(values)),
            AttributeValues::Int(values) => TypedBuffer::Int(IntBuffer::from_slice(values)),
        }
    }

    /// Replace the buffer contents in place; false if the buffer is too
    /// small or of the other element type
    fn overwrite(self, buffer: &mut TypedBuffer) -> bool {
        match (self, buffer) {
            (AttributeValues::Float(values), TypedBuffer::Float(buffer)) if values.len() <= buffer.capacity() => {
                buffer.overwrite(values);
                true
            }
            (AttributeValues::Int(values), TypedBuffer::Int(buffer)) if values.len() <= buffer.capacity() => {
                buffer.overwrite(values);
                true
            }
            _ => false,
        }
    }

    /// Cursor write of the values starting at `offset`
    fn write_at(self, buffer: &mut TypedBuffer, offset: usize) {
        match (self, buffer) {
            (AttributeValues::Float(values), TypedBuffer::Float(buffer)) => {
                buffer.set_position(offset);
                buffer.put_slice(values);
                buffer.rewind();
            }
            (AttributeValues::Int(values), TypedBuffer::Int(buffer)) => {
                buffer.set_position(offset);
                buffer.put_slice(values);
                buffer.rewind();
            }
            _ => unreachable!("element type checked before the write"),
        }
    }
}

// ============================================================================
// DEVICE HELPERS
// ============================================================================

fn lock_device(
    device: &Mutex<dyn GraphicsDevice>,
) -> Result<MutexGuard<'_, dyn GraphicsDevice + 'static>> {
    device.lock()
        .map_err(|_| engine_err!(SOURCE, BackendError, "Graphics device lock poisoned"))
}

/// Allocate a device buffer from the descriptor's CPU copy
fn allocate_device_buffer(device: &mut dyn GraphicsDevice, descriptor: &mut BufferDescriptor) -> Result<()> {
    let handle = {
        let buffer = descriptor.buffer()
            .ok_or_else(|| engine_err!(SOURCE, NotAvailable,
                "no CPU copy of {} to upload", descriptor.attribute()))?;
        let desc = BufferDesc {
            element_type: descriptor.element_type(),
            usage: descriptor.usage(),
            target: descriptor.attribute().target(),
        };
        device.allocate_buffer(&desc, buffer.as_bytes())?
    };
    let capacity = descriptor.element_count();
    descriptor.mark_resident(handle, capacity);
    engine_debug!(SOURCE, "Uploaded {} ({} elements, {:?})",
        descriptor.attribute(), capacity, descriptor.usage());
    Ok(())
}

/// Release every live device buffer; descriptors keep their CPU copies
///
/// Every handle is detached even when its release fails; failures are
/// logged and the first one is returned.
fn release_device_buffers(device: &mut dyn GraphicsDevice, descriptors: &mut [BufferDescriptor]) -> Result<()> {
    let mut first_error = None;
    for descriptor in descriptors.iter_mut() {
        if let Some(handle) = descriptor.take_handle() {
            if let Err(err) = device.release_buffer(handle) {
                engine_warn!(SOURCE, "Release of {} buffer {:?} failed: {}",
                    descriptor.attribute(), handle, err);
                first_error.get_or_insert(err);
            }
        }
    }
    first_error.map_or(Ok(()), Err)
}

// ============================================================================
// INDEXED GEOMETRY
// ============================================================================

/// Geometry made of per-vertex attribute streams and an index stream,
/// mirrored into device buffers
pub struct IndexedGeometry {
    config: GeometryConfig,
    graphics_device: Arc<Mutex<dyn GraphicsDevice>>,
    /// One descriptor per attribute, in `Attribute::ALL` order
    descriptors: [BufferDescriptor; 5],
    num_vertices: usize,
    num_indices: usize,
}

impl IndexedGeometry {
    /// Create an empty geometry with the default configuration
    pub fn new(graphics_device: Arc<Mutex<dyn GraphicsDevice>>) -> Self {
        Self::with_config(graphics_device, GeometryConfig::default())
    }

    /// Create an empty geometry
    pub fn with_config(graphics_device: Arc<Mutex<dyn GraphicsDevice>>, config: GeometryConfig) -> Self {
        let usage = config.default_usage;
        Self {
            config,
            graphics_device,
            descriptors: Attribute::ALL.map(|attribute| BufferDescriptor::new(attribute, usage)),
            num_vertices: 0,
            num_indices: 0,
        }
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    pub fn graphics_device(&self) -> &Arc<Mutex<dyn GraphicsDevice>> {
        &self.graphics_device
    }

    /// Vertex count (vertex elements / 3)
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Index count
    pub fn num_indices(&self) -> usize {
        self.num_indices
    }

    pub fn has_normals(&self) -> bool {
        self.descriptor(Attribute::Normals).element_count() > 0
    }

    pub fn has_texture_coords(&self) -> bool {
        self.descriptor(Attribute::TextureCoords).element_count() > 0
    }

    pub fn has_colors(&self) -> bool {
        self.descriptor(Attribute::Colors).element_count() > 0
    }

    /// True when the geometry holds data and every attribute with data has
    /// a live device buffer
    pub fn is_uploaded(&self) -> bool {
        let mut populated = self.descriptors.iter()
            .filter(|descriptor| descriptor.element_count() > 0)
            .peekable();
        populated.peek().is_some() && populated.all(BufferDescriptor::is_uploaded)
    }

    /// Descriptor of one attribute
    pub fn buffer_info(&self, attribute: Attribute) -> &BufferDescriptor {
        self.descriptor(attribute)
    }

    /// All descriptors, in `Attribute::ALL` order
    pub fn buffer_infos(&self) -> impl Iterator<Item = &BufferDescriptor> {
        self.descriptors.iter()
    }

    pub fn vertex_buffer_info(&self) -> &BufferDescriptor {
        self.descriptor(Attribute::Vertices)
    }

    pub fn normal_buffer_info(&self) -> &BufferDescriptor {
        self.descriptor(Attribute::Normals)
    }

    pub fn texture_coord_buffer_info(&self) -> &BufferDescriptor {
        self.descriptor(Attribute::TextureCoords)
    }

    pub fn color_buffer_info(&self) -> &BufferDescriptor {
        self.descriptor(Attribute::Colors)
    }

    pub fn index_buffer_info(&self) -> &BufferDescriptor {
        self.descriptor(Attribute::Indices)
    }

    // ===== CPU DATA =====

    /// CPU copy of the positions
    ///
    /// # Errors
    ///
    /// `NotAvailable` if the copy was discarded (see `validate_buffers`)
    pub fn vertices(&self) -> Result<&FloatBuffer> {
        self.float_buffer(Attribute::Vertices)
    }

    /// CPU copy of the normals
    pub fn normals(&self) -> Result<&FloatBuffer> {
        self.float_buffer(Attribute::Normals)
    }

    /// CPU copy of the texture coordinates
    pub fn texture_coords(&self) -> Result<&FloatBuffer> {
        self.float_buffer(Attribute::TextureCoords)
    }

    /// CPU copy of the colors
    pub fn colors(&self) -> Result<&FloatBuffer> {
        self.float_buffer(Attribute::Colors)
    }

    /// CPU copy of the indices
    pub fn indices(&self) -> Result<&IntBuffer> {
        self.descriptor(Attribute::Indices)
            .buffer()
            .and_then(TypedBuffer::as_int)
            .ok_or_else(|| self.not_available(Attribute::Indices))
    }

    // ===== BULK CONFIGURATION =====

    /// Replace every attribute and upload them to fresh device buffers
    ///
    /// All shapes are checked before any device call. Buffers held from a
    /// previous call are released first. When `retain_cpu_copy` is false the
    /// CPU arrays are dropped once uploaded.
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if an array does not fit (nothing is modified)
    /// - `DeviceAllocationFailure` if the device refuses a buffer; the
    ///   buffers allocated by this call are released and the geometry is
    ///   left empty
    pub fn set_data(&mut self, data: GeometryData) -> Result<()> {
        // ========== VALIDATION ==========
        let num_vertices = Self::validate_vertex_count(data.vertices.len())?;
        if data.indices.is_empty() {
            engine_bail!(SOURCE, ShapeMismatch, "index array of '{}' is empty", self.config.name);
        }
        for (attribute, len) in data.per_vertex_lengths() {
            if let Some(len) = len {
                Self::validate_per_vertex(attribute, len, num_vertices)?;
            }
        }

        let usage = data.usage.unwrap_or_else(|| UsageHints::all(self.config.default_usage));
        let GeometryData { vertices, normals, texture_coords, colors, indices, retain_cpu_copy, .. } = data;

        let device_arc = Arc::clone(&self.graphics_device);
        let mut device = lock_device(&device_arc)?;

        // ========== RELEASE PREVIOUS BUFFERS ==========
        release_device_buffers(&mut *device, &mut self.descriptors)?;
        for descriptor in self.descriptors.iter_mut() {
            descriptor.reset();
        }
        self.num_vertices = 0;
        self.num_indices = 0;

        // ========== WRAP ARRAYS ==========
        let arrays = [
            (Attribute::Vertices, Some(TypedBuffer::from(vertices))),
            (Attribute::Normals, normals.map(TypedBuffer::from)),
            (Attribute::TextureCoords, texture_coords.map(TypedBuffer::from)),
            (Attribute::Colors, colors.map(TypedBuffer::from)),
            (Attribute::Indices, Some(TypedBuffer::from(indices))),
        ];
        for (attribute, buffer) in arrays {
            let descriptor = &mut self.descriptors[attribute.index()];
            descriptor.set_usage(usage.get(attribute));
            if let Some(buffer) = buffer {
                descriptor.attach_buffer(buffer);
            }
        }

        // ========== UPLOAD ==========
        for index in 0..self.descriptors.len() {
            if !self.descriptors[index].has_cpu_copy() {
                continue;
            }
            if let Err(err) = allocate_device_buffer(&mut *device, &mut self.descriptors[index]) {
                for descriptor in self.descriptors.iter_mut() {
                    if let Some(handle) = descriptor.take_handle() {
                        if let Err(release_err) = device.release_buffer(handle) {
                            engine_warn!(SOURCE, "Rollback release of {} failed: {}",
                                descriptor.attribute(), release_err);
                        }
                    }
                    descriptor.reset();
                }
                return Err(err);
            }
        }
        drop(device);

        if !retain_cpu_copy {
            for descriptor in self.descriptors.iter_mut() {
                descriptor.discard_cpu_copy();
            }
        }

        self.num_vertices = num_vertices;
        self.num_indices = self.descriptor(Attribute::Indices).element_count();

        engine_debug!(SOURCE, "'{}' set: {} vertices, {} indices, cpu copy {}",
            self.config.name, self.num_vertices, self.num_indices,
            if retain_cpu_copy { "retained" } else { "discarded" });
        Ok(())
    }

    // ===== PER-ATTRIBUTE REPLACEMENT =====

    /// Replace the positions
    ///
    /// The vertex count may only change while no other per-vertex attribute
    /// is present.
    pub fn set_vertices(&mut self, vertices: &[f32]) -> Result<()> {
        self.replace_attribute(Attribute::Vertices, AttributeValues::Float(vertices))
    }

    /// Replace the normals (3 × vertex count)
    pub fn set_normals(&mut self, normals: &[f32]) -> Result<()> {
        self.replace_attribute(Attribute::Normals, AttributeValues::Float(normals))
    }

    /// Replace the texture coordinates (2 × vertex count)
    pub fn set_texture_coords(&mut self, texture_coords: &[f32]) -> Result<()> {
        self.replace_attribute(Attribute::TextureCoords, AttributeValues::Float(texture_coords))
    }

    /// Replace the colors (4 × vertex count)
    pub fn set_colors(&mut self, colors: &[f32]) -> Result<()> {
        self.replace_attribute(Attribute::Colors, AttributeValues::Float(colors))
    }

    /// Replace the indices
    pub fn set_indices(&mut self, indices: &[u32]) -> Result<()> {
        self.replace_attribute(Attribute::Indices, AttributeValues::Int(indices))
    }

    /// Overwrite `values.len()` float elements of an attribute starting at
    /// element `offset`, without reallocating
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if the attribute holds indices or the range exceeds
    ///   its element count
    /// - `NotAvailable` if the CPU copy is absent
    pub fn update_float_range(&mut self, attribute: Attribute, offset: usize, values: &[f32]) -> Result<()> {
        if attribute.element_type() != ElementType::Float {
            engine_bail!(SOURCE, ShapeMismatch, "{} do not hold float elements", attribute);
        }
        self.update_range(attribute, offset, AttributeValues::Float(values))
    }

    /// Overwrite `values.len()` indices starting at index `offset`
    pub fn update_index_range(&mut self, offset: usize, values: &[u32]) -> Result<()> {
        self.update_range(Attribute::Indices, offset, AttributeValues::Int(values))
    }

    // ===== CPU MIRROR & DEVICE LIFECYCLE =====

    /// Re-establish a CPU copy for every attribute that has data but whose
    /// copy was discarded
    ///
    /// Restored copies are zero-filled and sized to the element count; the
    /// device contents are not read back and not modified. Calling it again
    /// is a no-op.
    ///
    /// # Returns
    ///
    /// The number of attributes restored
    pub fn validate_buffers(&mut self) -> usize {
        let restored = self.descriptors.iter_mut()
            .map(BufferDescriptor::restore_cpu_copy)
            .filter(|restored| *restored)
            .count();
        if restored > 0 {
            engine_debug!(SOURCE, "'{}': restored {} CPU buffer(s)", self.config.name, restored);
        }
        restored
    }

    /// Forget every device handle without releasing it (device context lost)
    ///
    /// # Returns
    ///
    /// The number of handles dropped
    pub fn invalidate_buffers(&mut self) -> usize {
        let invalidated = self.descriptors.iter_mut()
            .map(BufferDescriptor::invalidate)
            .filter(|invalidated| *invalidated)
            .count();
        engine_info!(SOURCE, "'{}': {} device buffer(s) invalidated", self.config.name, invalidated);
        invalidated
    }

    /// Upload every attribute that has a CPU copy but no device buffer
    ///
    /// # Errors
    ///
    /// `NotAvailable` (before any upload) if an attribute holding data has
    /// neither a device buffer nor a CPU copy to upload from
    pub fn reload(&mut self) -> Result<()> {
        if let Some(descriptor) = self.descriptors.iter()
            .find(|d| d.element_count() > 0 && !d.is_uploaded() && !d.has_cpu_copy())
        {
            engine_bail!(SOURCE, NotAvailable,
                "cannot reload {} of '{}': CPU copy was discarded",
                descriptor.attribute(), self.config.name);
        }

        let device_arc = Arc::clone(&self.graphics_device);
        let mut device = lock_device(&device_arc)?;
        for descriptor in self.descriptors.iter_mut() {
            if !descriptor.is_uploaded() && descriptor.has_cpu_copy() {
                allocate_device_buffer(&mut *device, descriptor)?;
            }
        }
        Ok(())
    }

    /// Release every device buffer
    ///
    /// CPU copies and counts are kept; `reload` or a setter uploads again.
    ///
    /// # Errors
    ///
    /// `NotAvailable` (nothing released) if a device buffer is the only copy
    /// of its attribute; call `validate_buffers` or a setter first
    pub fn destroy(&mut self) -> Result<()> {
        if let Some(descriptor) = self.descriptors.iter()
            .find(|d| d.is_uploaded() && !d.has_cpu_copy())
        {
            engine_bail!(SOURCE, NotAvailable,
                "cannot destroy {} of '{}': the device buffer is its only copy",
                descriptor.attribute(), self.config.name);
        }

        let device_arc = Arc::clone(&self.graphics_device);
        let mut device = lock_device(&device_arc)?;
        release_device_buffers(&mut *device, &mut self.descriptors)?;
        engine_debug!(SOURCE, "'{}': device buffers released", self.config.name);
        Ok(())
    }

    // ===== INTERNAL HELPERS =====

    fn descriptor(&self, attribute: Attribute) -> &BufferDescriptor {
        &self.descriptors[attribute.index()]
    }

    fn float_buffer(&self, attribute: Attribute) -> Result<&FloatBuffer> {
        self.descriptor(attribute)
            .buffer()
            .and_then(TypedBuffer::as_float)
            .ok_or_else(|| self.not_available(attribute))
    }

    fn not_available(&self, attribute: Attribute) -> Error {
        let reason = if self.descriptor(attribute).element_count() == 0 {
            "were never supplied"
        } else {
            "have no CPU copy (call validate_buffers first)"
        };
        engine_err!(SOURCE, NotAvailable, "{} of '{}' {}", attribute, self.config.name, reason)
    }

    /// Vertex count of a position array
    fn validate_vertex_count(len: usize) -> Result<usize> {
        if len == 0 {
            engine_bail!(SOURCE, ShapeMismatch, "vertex array is empty");
        }
        if len % 3 != 0 {
            engine_bail!(SOURCE, ShapeMismatch, "vertex array length {} is not a multiple of 3", len);
        }
        Ok(len / 3)
    }

    fn validate_per_vertex(attribute: Attribute, len: usize, num_vertices: usize) -> Result<()> {
        let components = attribute.components_per_vertex().unwrap_or(1);
        let expected = components * num_vertices;
        if len != expected {
            engine_bail!(SOURCE, ShapeMismatch,
                "{} length {} does not match {} vertices x {} components = {}",
                attribute, len, num_vertices, components, expected);
        }
        Ok(())
    }

    fn validate_replacement(&self, attribute: Attribute, len: usize) -> Result<()> {
        match attribute {
            Attribute::Indices => {
                if len == 0 {
                    engine_bail!(SOURCE, ShapeMismatch, "index array of '{}' is empty", self.config.name);
                }
            }
            Attribute::Vertices => {
                let num_vertices = Self::validate_vertex_count(len)?;
                let has_per_vertex_data = self.has_normals() || self.has_texture_coords() || self.has_colors();
                if has_per_vertex_data && num_vertices != self.num_vertices {
                    engine_bail!(SOURCE, ShapeMismatch,
                        "'{}' has per-vertex attributes for {} vertices, got {} vertices",
                        self.config.name, self.num_vertices, num_vertices);
                }
            }
            _ => {
                if self.num_vertices == 0 {
                    engine_bail!(SOURCE, ShapeMismatch,
                        "cannot set {} of '{}' before vertices", attribute, self.config.name);
                }
                Self::validate_per_vertex(attribute, len, self.num_vertices)?;
            }
        }
        Ok(())
    }

    fn replace_attribute(&mut self, attribute: Attribute, values: AttributeValues<'_>) -> Result<()> {
        self.validate_replacement(attribute, values.len())?;

        let partial_updates = self.config.partial_updates;
        let device_arc = Arc::clone(&self.graphics_device);
        let descriptor = &mut self.descriptors[attribute.index()];

        if descriptor.restore_cpu_copy() {
            engine_debug!(SOURCE, "Restored CPU copy of {} before replacement", attribute);
        }

        let strategy = if partial_updates {
            choose_update_strategy(descriptor.device_capacity(), values.len(), descriptor.handle().is_some())
        } else {
            UpdateStrategy::Reallocate
        };

        let mut device = lock_device(&device_arc)?;
        match (strategy, descriptor.handle()) {
            (UpdateStrategy::PartialUpdate, Some(handle)) => {
                device.update_buffer(handle, 0, values.as_bytes())?;
                let overwritten = descriptor.buffer_mut()
                    .map_or(false, |buffer| values.overwrite(buffer));
                if overwritten {
                    descriptor.set_element_count(values.len());
                } else {
                    descriptor.attach_buffer(values.to_typed_buffer());
                }
                engine_trace!(SOURCE, "In-place update of {} ({} elements)", attribute, values.len());
            }
            _ => {
                let previous = descriptor.handle();
                let buffer = values.to_typed_buffer();
                let desc = BufferDesc {
                    element_type: attribute.element_type(),
                    usage: descriptor.usage(),
                    target: attribute.target(),
                };
                let handle = device.allocate_buffer(&desc, buffer.as_bytes())?;
                descriptor.attach_buffer(buffer);
                descriptor.mark_resident(handle, values.len());
                engine_debug!(SOURCE, "Reallocated {} ({} elements)", attribute, values.len());

                if let Some(previous) = previous {
                    if let Err(err) = device.release_buffer(previous) {
                        engine_warn!(SOURCE, "Release of previous {} buffer {:?} failed: {}",
                            attribute, previous, err);
                    }
                }
            }
        }
        drop(device);

        match attribute {
            Attribute::Vertices => self.num_vertices = values.len() / 3,
            Attribute::Indices => self.num_indices = values.len(),
            _ => {}
        }
        Ok(())
    }

    fn update_range(&mut self, attribute: Attribute, offset: usize, values: AttributeValues<'_>) -> Result<()> {
        let descriptor = self.descriptor(attribute);
        if !descriptor.has_cpu_copy() {
            return Err(self.not_available(attribute));
        }
        let end = offset.saturating_add(values.len());
        if end > descriptor.element_count() {
            engine_bail!(SOURCE, ShapeMismatch,
                "range {}..{} exceeds the {} elements of {}",
                offset, end, descriptor.element_count(), attribute);
        }
        if values.is_empty() {
            return Ok(());
        }

        if let Some(handle) = descriptor.handle() {
            let offset_bytes = offset as u64 * attribute.element_type().size_bytes();
            let mut device = lock_device(&self.graphics_device)?;
            device.update_buffer(handle, offset_bytes, values.as_bytes())?;
        }

        if let Some(buffer) = self.descriptors[attribute.index()].buffer_mut() {
            values.write_at(buffer, offset);
        }
        engine_trace!(SOURCE, "Updated {} range {}..{}", attribute, offset, end);
        Ok(())
    }
}

impl Drop for IndexedGeometry {
    fn drop(&mut self) {
        if !self.descriptors.iter().any(BufferDescriptor::is_uploaded) {
            return;
        }
        match self.graphics_device.lock() {
            Ok(mut device) => {
                if let Err(err) = release_device_buffers(&mut *device, &mut self.descriptors) {
                    engine_warn!(SOURCE, "'{}' dropped, device buffer release failed: {}",
                        self.config.name, err);
                }
            }
            Err(_) => {
                engine_warn!(SOURCE, "'{}' dropped with a poisoned device lock, device buffers leaked",
                    self.config.name);
            }
        }
    }
}

impl fmt::Display for IndexedGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "IndexedGeometry '{}': {} vertices, {} indices",
            self.config.name, self.num_vertices, self.num_indices
        )?;
        for descriptor in &self.descriptors {
            writeln!(f, "  {}", descriptor)?;
        }
        Ok(())
    }
}

impl fmt::Debug for IndexedGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedGeometry")
            .field("config", &self.config)
            .field("descriptors", &self.descriptors)
            .field("num_vertices", &self.num_vertices)
            .field("num_indices", &self.num_indices)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "indexed_geometry_tests.rs"]
mod tests;

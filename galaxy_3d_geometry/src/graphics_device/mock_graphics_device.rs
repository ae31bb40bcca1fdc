/// In-memory graphics device (no GPU required)
///
/// Keeps every allocated buffer as a byte vector so tests and headless tools
/// can read device contents back, count device calls, and inject allocation
/// failures.

use slotmap::SlotMap;
use crate::error::Result;
use crate::{engine_bail, engine_err};
use crate::graphics_device::{
    BufferDesc, BufferHandle, GraphicsDevice, GraphicsDeviceStats,
};

const SOURCE: &str = "galaxy3d::MockGraphicsDevice";

// ============================================================================
// Mock Buffer
// ============================================================================

/// Device-side storage of one mock buffer
#[derive(Debug, Clone)]
pub struct MockBuffer {
    pub desc: BufferDesc,
    pub data: Vec<u8>,
}

impl MockBuffer {
    /// Contents reinterpreted as f32 values
    pub fn as_f32(&self) -> Vec<f32> {
        bytemuck::pod_collect_to_vec::<u8, f32>(&self.data)
    }

    /// Contents reinterpreted as u32 values
    pub fn as_u32(&self) -> Vec<u32> {
        bytemuck::pod_collect_to_vec::<u8, u32>(&self.data)
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Mock graphics device that stores buffers in host memory
#[derive(Debug, Default)]
pub struct MockGraphicsDevice {
    buffers: SlotMap<BufferHandle, MockBuffer>,
    /// Maximum bytes held by live buffers (None = unlimited)
    memory_limit: Option<u64>,
    /// Number of upcoming allocations to refuse
    failing_allocations: u32,
    /// Number of upcoming releases to refuse
    failing_releases: u32,
    allocation_count: u32,
    update_count: u32,
    release_count: u32,
}

impl MockGraphicsDevice {
    /// Create a new mock device without memory limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock device refusing allocations past `bytes` of live memory
    pub fn with_memory_limit(bytes: u64) -> Self {
        Self {
            memory_limit: Some(bytes),
            ..Self::default()
        }
    }

    /// Refuse the next `count` allocations
    pub fn fail_next_allocations(&mut self, count: u32) {
        self.failing_allocations = count;
    }

    /// Refuse the next `count` releases; refused buffers stay live
    pub fn fail_next_releases(&mut self, count: u32) {
        self.failing_releases = count;
    }

    /// Get a live buffer
    pub fn buffer(&self, handle: BufferHandle) -> Option<&MockBuffer> {
        self.buffers.get(handle)
    }

    /// Check whether a handle refers to a live buffer
    pub fn contains(&self, handle: BufferHandle) -> bool {
        self.buffers.contains_key(handle)
    }

    /// Number of live buffers
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Total successful allocations since creation
    pub fn allocation_count(&self) -> u32 {
        self.allocation_count
    }

    /// Total successful updates since creation
    pub fn update_count(&self) -> u32 {
        self.update_count
    }

    /// Total successful releases since creation
    pub fn release_count(&self) -> u32 {
        self.release_count
    }

    fn memory_used(&self) -> u64 {
        self.buffers.values().map(|b| b.data.len() as u64).sum()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn allocate_buffer(&mut self, desc: &BufferDesc, data: &[u8]) -> Result<BufferHandle> {
        if self.failing_allocations > 0 {
            self.failing_allocations -= 1;
            engine_bail!(SOURCE, DeviceAllocationFailure,
                "allocation of {} bytes refused", data.len());
        }
        if let Some(limit) = self.memory_limit {
            let requested = self.memory_used() + data.len() as u64;
            if requested > limit {
                engine_bail!(SOURCE, DeviceAllocationFailure,
                    "out of device memory ({} bytes requested, limit {})", requested, limit);
            }
        }

        self.allocation_count += 1;
        Ok(self.buffers.insert(MockBuffer {
            desc: *desc,
            data: data.to_vec(),
        }))
    }

    fn update_buffer(&mut self, handle: BufferHandle, offset: u64, data: &[u8]) -> Result<()> {
        let buffer = self.buffers.get_mut(handle)
            .ok_or_else(|| engine_err!(SOURCE, InvalidResource,
                "update of unknown buffer {:?}", handle))?;

        let start = offset as usize;
        let end = start + data.len();
        if end > buffer.data.len() {
            engine_bail!(SOURCE, DeviceAllocationFailure,
                "write of {} bytes at offset {} exceeds buffer size {}",
                data.len(), offset, buffer.data.len());
        }

        buffer.data[start..end].copy_from_slice(data);
        self.update_count += 1;
        Ok(())
    }

    fn release_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        if self.failing_releases > 0 {
            self.failing_releases -= 1;
            engine_bail!(SOURCE, BackendError, "release of buffer {:?} refused", handle);
        }
        if self.buffers.remove(handle).is_none() {
            engine_bail!(SOURCE, InvalidResource, "release of unknown buffer {:?}", handle);
        }
        self.release_count += 1;
        Ok(())
    }

    fn stats(&self) -> GraphicsDeviceStats {
        GraphicsDeviceStats {
            buffer_count: self.buffers.len() as u32,
            memory_used: self.memory_used(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;

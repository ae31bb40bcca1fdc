/// GraphicsDevice trait - device binding collaborator of the geometry core

use crate::error::Result;
use crate::graphics_device::{BufferDesc, BufferHandle};

/// Device statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphicsDeviceStats {
    /// Number of live device buffers
    pub buffer_count: u32,
    /// Device memory held by live buffers (bytes)
    pub memory_used: u64,
}

/// Device binding trait
///
/// Implemented by the rendering context owner (GL context, Vulkan device,
/// in-memory mock). The geometry core only ever reaches a device through
/// `Arc<Mutex<dyn GraphicsDevice>>`: holding the lock is what schedules a call
/// onto the device context, and every call completes before it returns.
/// Implementations must not be driven from several threads against the same
/// context without that lock.
pub trait GraphicsDevice: Send + Sync {
    /// Allocate a device buffer and upload `data` into it
    ///
    /// # Arguments
    ///
    /// * `desc` - Element type, usage hint and target of the buffer
    /// * `data` - Initial contents; its length is the allocation size
    ///
    /// # Returns
    ///
    /// The handle of the new buffer
    fn allocate_buffer(&mut self, desc: &BufferDesc, data: &[u8]) -> Result<BufferHandle>;

    /// Overwrite a byte range of an existing buffer
    ///
    /// # Arguments
    ///
    /// * `handle` - Buffer to update
    /// * `offset` - Offset into the buffer in bytes
    /// * `data` - Data to write, must fit inside the allocation
    fn update_buffer(&mut self, handle: BufferHandle, offset: u64, data: &[u8]) -> Result<()>;

    /// Release a device buffer; the handle is invalid afterwards
    fn release_buffer(&mut self, handle: BufferHandle) -> Result<()>;

    /// Get statistics about the device
    fn stats(&self) -> GraphicsDeviceStats;
}

/// Graphics device module - the device binding boundary of the geometry core

// Module declarations
pub mod graphics_device;
pub mod buffer;
pub mod mock_graphics_device;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use buffer::*;
pub use mock_graphics_device::{MockBuffer, MockGraphicsDevice};

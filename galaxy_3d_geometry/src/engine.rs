/// Galaxy3D Engine - Global registry and logger access
///
/// Holds the named graphics devices shared by geometries and the global
/// logger used by the `engine_*` macros. Storage is thread-safe static state
/// behind RwLocks.

use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::SystemTime;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::graphics_device::GraphicsDevice;
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};

const SOURCE: &str = "galaxy3d::Engine";

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

struct EngineState {
    /// Graphics devices by name
    graphics_devices: RwLock<FxHashMap<String, Arc<Mutex<dyn GraphicsDevice>>>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            graphics_devices: RwLock::new(FxHashMap::default()),
        }
    }
}

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())))
}

// ===== PUBLIC API =====

/// Engine singleton manager
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_geometry::galaxy3d::Engine;
/// use galaxy_3d_geometry::galaxy3d::device::MockGraphicsDevice;
/// use galaxy_3d_geometry::galaxy3d::resource::IndexedGeometry;
///
/// Engine::initialize()?;
/// let device = Engine::create_graphics_device("main", MockGraphicsDevice::new())?;
/// let geometry = IndexedGeometry::new(device);
///
/// Engine::shutdown();
/// # Ok::<(), galaxy_3d_geometry::galaxy3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Log errors before returning them
    fn log_and_return_error(error: Error) -> Error {
        crate::engine_error!(SOURCE, "{}", error);
        error
    }

    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))
    }

    /// Initialize the engine (idempotent)
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Drop every registered graphics device
    ///
    /// Geometries still holding a device keep it alive until they are dropped.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut devices) = state.graphics_devices.write() {
                devices.clear();
            }
        }
    }

    // ===== GRAPHICS DEVICE API =====

    /// Register a graphics device under `name`
    ///
    /// # Returns
    ///
    /// The shared device, ready to hand to `IndexedGeometry::new`
    ///
    /// # Errors
    ///
    /// - `InitializationFailed` if the engine is not initialized or the name
    ///   is already taken
    /// - `BackendError` if the registry lock is poisoned
    pub fn create_graphics_device<D: GraphicsDevice + 'static>(
        name: &str,
        device: D,
    ) -> Result<Arc<Mutex<dyn GraphicsDevice>>> {
        let state = Self::state()?;
        let mut devices = state.graphics_devices.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("GraphicsDevice registry lock poisoned".to_string())
            ))?;

        if devices.contains_key(name) {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed(format!(
                    "GraphicsDevice '{}' already exists. Call Engine::destroy_graphics_device() first.", name
                ))
            ));
        }

        let device: Arc<Mutex<dyn GraphicsDevice>> = Arc::new(Mutex::new(device));
        devices.insert(name.to_string(), Arc::clone(&device));

        crate::engine_info!(SOURCE, "GraphicsDevice '{}' created", name);
        Ok(device)
    }

    /// Get a registered graphics device
    ///
    /// # Errors
    ///
    /// `InitializationFailed` if the engine is not initialized or no device
    /// has this name
    pub fn graphics_device(name: &str) -> Result<Arc<Mutex<dyn GraphicsDevice>>> {
        let state = Self::state()?;
        let devices = state.graphics_devices.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("GraphicsDevice registry lock poisoned".to_string())
            ))?;

        devices.get(name)
            .cloned()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed(format!(
                    "GraphicsDevice '{}' not found. Call Engine::create_graphics_device() first.", name
                ))
            ))
    }

    /// Unregister a graphics device (no-op if absent)
    pub fn destroy_graphics_device(name: &str) -> Result<()> {
        let state = Self::state()?;
        let mut devices = state.graphics_devices.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("GraphicsDevice registry lock poisoned".to_string())
            ))?;

        if devices.remove(name).is_some() {
            crate::engine_info!(SOURCE, "GraphicsDevice '{}' destroyed", name);
        }
        Ok(())
    }

    /// Number of registered graphics devices (0 if not initialized)
    pub fn graphics_device_count() -> usize {
        ENGINE_STATE.get()
            .and_then(|state| state.graphics_devices.read().ok())
            .map_or(0, |devices| devices.len())
    }

    /// Names of the registered graphics devices
    pub fn graphics_device_names() -> Vec<String> {
        ENGINE_STATE.get()
            .and_then(|state| state.graphics_devices.read().ok())
            .map(|devices| devices.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Clear every registry (test builds only)
    #[cfg(test)]
    pub fn reset_for_testing() {
        Self::shutdown();
    }

    // ===== LOGGING API =====

    /// Replace the global logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use galaxy_3d_geometry::galaxy3d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger_impl: L) {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(logger_impl);
        }
    }

    /// Back to `DefaultLogger`
    pub fn reset_logger() {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(DefaultLogger::default());
        }
    }

    /// Log without file:line (used by engine_trace! .. engine_warn!)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Log with file:line (used by engine_error!)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

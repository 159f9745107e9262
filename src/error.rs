//! Error types for constellation.
//!
//! Only the native host can fail: acquiring a GPU, opening a window, or
//! reading a configuration file. The animation core itself is infallible.

use std::fmt;

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found"),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when loading a network configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the file from disk.
    Io(std::io::Error),
    /// The file is not valid configuration JSON.
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Json(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Errors that can occur when running a backdrop window.
#[derive(Debug)]
pub enum AppError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Configuration could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            AppError::Window(e) => write!(f, "Failed to create window: {}", e),
            AppError::Gpu(e) => write!(f, "GPU error: {}", e),
            AppError::Config(e) => write!(f, "Config error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Gpu(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<GpuError> for AppError {
    fn from(e: GpuError) -> Self {
        AppError::Gpu(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

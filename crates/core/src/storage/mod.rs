pub mod encryption;
pub mod format;
pub mod memory;
pub mod traits;

// Durable backend
#[cfg(not(target_arch = "wasm32"))]
pub mod file;

//! Platform abstraction layer
//!
//! Browser glue for the wasm32 build:
//! - Storage (`localStorage` behind `KeyValueStore`)
//! - Logging and panic hook setup
//! - A JS-facing session wrapper
//!
//! Native builds use `MemoryStore` and `env_logger` directly.

#[cfg(target_arch = "wasm32")]
pub mod storage;
#[cfg(target_arch = "wasm32")]
pub mod web;

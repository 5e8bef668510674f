//! Pixel Shader Rust - Shaders de fragment générés par code
//!
//! Cette bibliothèque assemble des shaders WGSL par appels chaînés et les
//! exécute dans une boucle de rendu wgpu cadencée.

pub mod config;
pub mod diagnostics;
pub mod gpu;
pub mod shader;

pub use config::*;
pub use diagnostics::*;
pub use gpu::*;
pub use shader::*;

/// Version de la bibliothèque
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Plafond de frames par seconde par défaut
pub const DEFAULT_TARGET_FPS: u32 = 24;

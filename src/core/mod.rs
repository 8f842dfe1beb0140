//! # Core Infrastructure Module
//!
//! The pixel buffer every operation consumes and the engine context that holds
//! backend capability and correction totals.

pub mod context;
pub mod pixel_buffer;

pub use context::{BackendKind, EngineContext, ProcessingTotals};
pub use pixel_buffer::PixelBuffer;

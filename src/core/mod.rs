//! Core domain models for spanlog.
//!
//! This module contains the fundamental types shared by the identifier
//! generator, the sampler, and the logging handoff: the span record,
//! the millisecond clock seam, configuration, and errors.

#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ConfigBuilder, GeneratorConfig, SamplingConfig};
pub use error::{Result, SpanlogError};
pub use types::{Span, SpanBuilder};

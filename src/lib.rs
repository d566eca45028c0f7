//! Spanlog - lock-free trace identifiers and rate-bounded span logging.
//!
//! Spanlog is the tracing core of an RPC framework: it hands out
//! globally-comparable 64-bit identifiers without coordination between
//! nodes, decides under load which spans may reach the logging sink,
//! and formats accepted spans into line-oriented records.
//!
//! # Features
//!
//! - **Snowflake Identifiers**: timestamp/group/machine/sequence packed
//!   into one `u64`, strictly increasing per generator instance
//! - **Rate-Bounded Sampling**: per-millisecond span budget with a
//!   force-include override for spans already selected upstream
//! - **Lock-Free Hot Path**: a clock read plus a few atomic operations,
//!   no mutex, no allocation until a span is accepted
//! - **Pluggable Sinks**: emitted records go to `tracing`, any
//!   `io::Write`, or an in-memory buffer
//!
//! # Architecture
//!
//! Spanlog is built with a modular architecture:
//! - `id`: Snowflake identifier generator
//! - `sampling`: per-millisecond span sampler
//! - `logging`: record formatting, sinks, and log-task handoff
//! - `core`: domain models, configuration, clock, and errors
//!
//! # Example
//!
//! ```
//! use spanlog::core::Span;
//! use spanlog::logging::{MemorySink, SamplingSpanLogger, SpanLogger};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::default());
//! let logger = SamplingSpanLogger::new(100, sink.clone());
//!
//! let span = Span::builder()
//!     .trace_id(0x1234)
//!     .span_id(7)
//!     .service_name("echo")
//!     .method_name("Echo.ping")
//!     .start_time(1_700_000_000_000)
//!     .build();
//!
//! logger.create_log_task(span).run();
//! assert_eq!(sink.records().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod core;
pub mod id;
pub mod logging;
pub mod sampling;

// Re-export core types for convenience
pub use crate::core::{Config, Result, Span, SpanlogError};
pub use crate::id::SnowflakeGenerator;
pub use crate::sampling::SpanSampler;

//! # Pinpoint agent SDK
//!
//! The working half of the Pinpoint tracing agent for Rust: configuration
//! loading, sampling, the span/event model, metadata interning, runtime
//! statistics and the gRPC transport to the collector.
//!
//! Instrumented applications create the process-wide agent once and hand
//! spans around via the traits defined in the [`pinpoint`] API crate:
//!
//! ```no_run
//! use pinpoint::trace::{Span, SpanEvent};
//!
//! pinpoint_sdk::set_config_string("ApplicationName: \"demo\"\n");
//! let agent = pinpoint_sdk::create_agent();
//!
//! let span = agent.new_span("handle.request", "/users");
//! let event = span.new_span_event("repository.find");
//! event.set_destination("users-db");
//! span.end_span_event();
//! span.end_span();
//!
//! agent.shutdown();
//! ```
//!
//! The agent is fire-and-forget: no call on this surface blocks on I/O,
//! returns an error into user code, or panics. Data that cannot be
//! buffered within the configured queue bounds is dropped.

mod agent;
pub mod cache;
pub mod config;
mod grpc;
mod http;
mod logging;
pub mod sampler;
pub mod sql;
pub mod stats;
#[cfg(test)]
mod testing;
pub mod trace;
pub mod url_stat;
pub mod util;

pub use agent::{create_agent, create_agent_with_app_type, global_agent, AgentError};
pub use config::{set_config_file_path, set_config_string, Config};

// Re-export the API surface so hosts can depend on this crate alone.
pub use pinpoint::annotation;
pub use pinpoint::propagation;
pub use pinpoint::trace::{Agent, AgentPtr, HeaderType, Span, SpanEvent, SpanEventPtr, SpanPtr,
    TraceId};

//! # Pinpoint agent API
//!
//! This crate defines the surface that instrumented applications program
//! against: the [`trace::Agent`], [`trace::Span`] and [`trace::SpanEvent`]
//! traits, the typed [`annotation`] bag attached to spans, and the
//! [`propagation`] ports used to carry trace context across process
//! boundaries.
//!
//! It intentionally contains no I/O and no transport. The concrete agent
//! lives in the `pinpoint-sdk` crate; hosts that only *instrument* (for
//! example middleware crates) should depend on this crate alone.
//!
//! All handle types are `Arc<dyn …>` aliases ([`trace::AgentPtr`],
//! [`trace::SpanPtr`], [`trace::SpanEventPtr`]) so instrumentation can be
//! threaded through request handlers and across threads without lifetime
//! coupling. Every operation is infallible from the caller's point of
//! view: a misuse or an internal fault degrades to a no-op, never to a
//! panic or an error returned into user code.

pub mod annotation;
pub mod noop;
pub mod propagation;
pub mod trace;

pub use annotation::{Annotation, AnnotationValue};
pub use trace::{Agent, AgentPtr, HeaderType, Span, SpanEvent, SpanEventPtr, SpanPtr, TraceId};

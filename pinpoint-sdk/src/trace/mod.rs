//! Span and span-event implementations.

pub(crate) mod span;
pub(crate) mod span_event;

pub use span::{Exception, ExceptionMeta, SpanChunk, SpanImpl, StackFrame, UnsampledSpan};

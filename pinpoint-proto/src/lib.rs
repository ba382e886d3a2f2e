//! Protobuf wire format bindings for the Pinpoint collector services.
//!
//! The collector exposes four gRPC services — `v1.Agent`, `v1.Metadata`,
//! `v1.Span` and `v1.Stat` — whose IDL is owned by the collector project
//! and treated as fixed here. The bindings are committed to the tree in
//! generated form (no protoc at build time) and trimmed to the messages
//! the agent actually sends.

/// Bindings for the `v1` collector package.
pub mod v1 {
    include!("generated/v1.rs");
}

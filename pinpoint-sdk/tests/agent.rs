//! End-to-end checks of the public agent surface.
//!
//! The process-wide agent and the config source are global, so the whole
//! lifecycle is exercised from a single test.

use pinpoint::trace::Span;
use pinpoint_sdk::{create_agent, global_agent, set_config_string};

#[test]
fn global_agent_lifecycle() {
    // Nothing created yet: the global handle is a no-op.
    assert!(!global_agent().enable());

    // Disabled configuration yields a no-op agent.
    set_config_string("Enable: false\nApplicationName: \"itest\"\n");
    let agent = create_agent();
    assert!(!agent.enable());
    assert!(!agent.new_span("op", "/x").is_sampled());
    assert!(!global_agent().enable());

    // A missing application name refuses to start as well.
    set_config_string("Enable: true\n");
    assert!(!create_agent().enable());

    // A real agent pointed at an unreachable collector: spans degrade to
    // no-ops while registration is pending, and shutdown stays clean.
    set_config_string(
        "ApplicationName: \"itest\"\nAgentId: \"itest-agent\"\nCollector:\n  GrpcHost: \"127.0.0.1\"\n  GrpcAgentPort: 1\n  GrpcSpanPort: 1\n  GrpcStatPort: 1\n",
    );
    let agent = create_agent();
    let span = agent.new_span("op", "/x");
    assert!(!span.is_sampled());
    span.end_span();

    // The same handle is now reachable globally; creating again reuses it.
    let again = create_agent();
    again.shutdown();
    // Shutdown cleared the global pointer and is idempotent.
    assert!(!global_agent().enable());
    agent.shutdown();

    set_config_string("");
}

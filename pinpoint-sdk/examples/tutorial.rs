//! Minimal walkthrough of the agent surface: one server span with a
//! nested event, context injected toward a downstream call.
//!
//! Run with a collector listening on localhost, e.g.:
//!
//! ```text
//! PINPOINT_CPP_APPLICATION_NAME=tutorial cargo run --example tutorial
//! ```

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use pinpoint::trace::{Span, SpanEvent};

fn main() {
    pinpoint_sdk::set_config_string(
        "ApplicationName: \"rust-tutorial\"\nSampling:\n  Type: \"COUNTER\"\n  CounterRate: 1\n",
    );
    let agent = pinpoint_sdk::create_agent();

    // Give the init task a moment to register with the collector;
    // spans created before that degrade to no-ops.
    thread::sleep(Duration::from_secs(1));

    for i in 0..3 {
        let span = agent.new_span("tutorial.handler", "/tutorial");
        span.set_remote_address("127.0.0.1");

        let event = span.new_span_event("tutorial.backend_call");
        event.set_destination("backend");

        // Propagate trace context toward the downstream service.
        let mut headers: HashMap<String, String> = HashMap::new();
        span.inject_context(&mut headers);
        println!("request {} outbound headers: {:?}", i, headers);

        thread::sleep(Duration::from_millis(20));
        span.end_span_event();

        span.set_status_code(200);
        span.set_url_stat("/tutorial", "GET", 200);
        span.end_span();
    }

    agent.shutdown();
}

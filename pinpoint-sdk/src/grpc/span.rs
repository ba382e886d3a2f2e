//! Span stream worker.
//!
//! Owns the write side of the client-streaming `SendSpan` RPC. Chunks
//! arrive on a bounded queue; a stream failure tears the call down,
//! reconnects, and — when `force_queue_empty` was armed (queue overflow
//! or a slow reconnect) — discards the accumulated backlog so the
//! collector is not hit with a stale burst.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use pinpoint_proto::v1::span_client::SpanClient;
use pinpoint_proto::v1::PSpanMessage;

use crate::agent::AgentService;
use crate::grpc::{convert, grpc_request, ready_channel, ClientKind};
use crate::trace::SpanChunk;

pub(crate) async fn span_worker(
    agent: Arc<dyn AgentService>,
    mut rx: mpsc::Receiver<SpanChunk>,
    force_queue_empty: Arc<AtomicBool>,
) {
    let mut shutdown = agent.shutdown_signal();

    'stream: loop {
        if agent.is_exiting() {
            break;
        }
        let Some((channel, slow)) = ready_channel(&agent, ClientKind::Span).await else {
            break;
        };
        if slow {
            force_queue_empty.store(true, Ordering::Relaxed);
        }
        if force_queue_empty.swap(false, Ordering::Relaxed) {
            let mut dropped = 0usize;
            while rx.try_recv().is_ok() {
                dropped += 1;
            }
            debug!(dropped, "span backlog discarded after reconnect");
        }

        let mut client = SpanClient::new(channel);
        let (tx, stream_rx) = mpsc::channel::<PSpanMessage>(1);
        let request = grpc_request(agent.as_ref(), ReceiverStream::new(stream_rx), 0);
        let mut call = tokio::spawn(async move { client.send_span(request).await });

        loop {
            tokio::select! {
                result = &mut call => {
                    match result {
                        Ok(Err(status)) => {
                            warn!(code = ?status.code(), message = status.message(), "span stream failed")
                        }
                        _ => debug!("span stream closed"),
                    }
                    continue 'stream;
                }
                chunk = rx.recv() => match chunk {
                    Some(chunk) => {
                        let message = convert::span_message(&chunk);
                        if tx.send(message).await.is_err() {
                            continue 'stream;
                        }
                    }
                    None => {
                        drop(tx);
                        let _ = call.await;
                        break 'stream;
                    }
                },
                _ = shutdown.changed() => {
                    // Half-close the stream and wait for the collector ack.
                    drop(tx);
                    let _ = call.await;
                    break 'stream;
                }
            }
        }
    }
    info!("grpc span worker end");
}

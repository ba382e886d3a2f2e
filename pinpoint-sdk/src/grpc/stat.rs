//! Stat stream worker.
//!
//! Drains a tiny queue of [`StatsType`] markers: each marker is expanded
//! at send time into either the latest agent-stat batch or the current
//! URL-stat snapshot (which is swapped for an empty one). Discarding the
//! backlog after a reconnect also resets both aggregates so the next
//! upload starts from a clean interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use pinpoint_proto::v1::stat_client::StatClient;
use pinpoint_proto::v1::{p_stat_message, PStatMessage};

use crate::agent::AgentService;
use crate::grpc::{convert, grpc_request, ready_channel, ClientKind};
use crate::stats::StatsType;

fn stat_message(agent: &Arc<dyn AgentService>, kind: StatsType) -> PStatMessage {
    let field = match kind {
        StatsType::AgentStats => {
            let batch = agent.agent_stats().take_batch();
            p_stat_message::Field::AgentStatBatch(convert::agent_stat_batch(
                &batch,
                agent.config().stat.collect_interval_ms,
            ))
        }
        StatsType::UrlStats => {
            let snapshot = agent.take_url_snapshot();
            p_stat_message::Field::AgentUriStat(convert::agent_uri_stat(&snapshot))
        }
    };
    PStatMessage { field: Some(field) }
}

fn empty_stats_backlog(agent: &Arc<dyn AgentService>, rx: &mut mpsc::Receiver<StatsType>) {
    let mut dropped = 0usize;
    while rx.try_recv().is_ok() {
        dropped += 1;
    }
    agent.agent_stats().reset();
    let _ = agent.take_url_snapshot();
    debug!(dropped, "stat backlog discarded after reconnect");
}

pub(crate) async fn stat_worker(
    agent: Arc<dyn AgentService>,
    mut rx: mpsc::Receiver<StatsType>,
    force_queue_empty: Arc<AtomicBool>,
) {
    {
        let config = agent.config();
        if !config.stat.enable && !config.http.url_stat.enable {
            return;
        }
    }

    let mut shutdown = agent.shutdown_signal();

    'stream: loop {
        if agent.is_exiting() {
            break;
        }
        let Some((channel, slow)) = ready_channel(&agent, ClientKind::Stats).await else {
            break;
        };
        if slow {
            force_queue_empty.store(true, Ordering::Relaxed);
        }
        if force_queue_empty.swap(false, Ordering::Relaxed) {
            empty_stats_backlog(&agent, &mut rx);
        }

        let mut client = StatClient::new(channel);
        let (tx, stream_rx) = mpsc::channel::<PStatMessage>(1);
        let request = grpc_request(agent.as_ref(), ReceiverStream::new(stream_rx), 0);
        let mut call = tokio::spawn(async move { client.send_agent_stat(request).await });

        loop {
            tokio::select! {
                result = &mut call => {
                    match result {
                        Ok(Err(status)) => {
                            warn!(code = ?status.code(), message = status.message(), "stat stream failed")
                        }
                        _ => debug!("stat stream closed"),
                    }
                    continue 'stream;
                }
                kind = rx.recv() => match kind {
                    Some(kind) => {
                        let message = stat_message(&agent, kind);
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
                    drop(tx);
                    let _ = call.await;
                    break 'stream;
                }
            }
        }
    }
    info!("grpc stats worker end");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestAgentService;
    use crate::url_stat::UrlStatEntry;

    #[test]
    fn agent_stat_marker_expands_to_the_pending_batch() {
        let test_agent = Arc::new(TestAgentService::new());
        let agent: Arc<dyn AgentService> = test_agent.clone();
        let stats = agent.agent_stats();
        stats.init_collection(1);
        stats.collect_response_time(10);
        assert!(stats.collect_snapshot());

        let message = stat_message(&agent, StatsType::AgentStats);
        let Some(p_stat_message::Field::AgentStatBatch(batch)) = message.field else {
            panic!("expected agent stat batch");
        };
        assert_eq!(batch.agent_stat.len(), 1);
        assert_eq!(batch.agent_stat[0].response_time.clone().unwrap().avg, 10);
    }

    #[test]
    fn url_stat_marker_takes_and_resets_the_snapshot() {
        let test_agent = Arc::new(TestAgentService::with_config({
            let mut cfg = crate::config::Config::default();
            cfg.http.url_stat.enable = true;
            cfg
        }));
        let agent: Arc<dyn AgentService> = test_agent.clone();
        agent.add_url_stat_to_snapshot(UrlStatEntry {
            url_pattern: "/a".to_string(),
            method: "GET".to_string(),
            status_code: 200,
            end_time: 1000,
            elapsed: 5,
        });

        let message = stat_message(&agent, StatsType::UrlStats);
        let Some(p_stat_message::Field::AgentUriStat(uri_stat)) = message.field else {
            panic!("expected uri stat");
        };
        assert_eq!(uri_stat.each_uri_stat.len(), 1);

        // Snapshot was replaced with an empty one.
        let message = stat_message(&agent, StatsType::UrlStats);
        let Some(p_stat_message::Field::AgentUriStat(uri_stat)) = message.field else {
            panic!("expected uri stat");
        };
        assert!(uri_stat.each_uri_stat.is_empty());
    }
}

//! Collector transport.
//!
//! Four worker families cooperate over three collector ports: agent
//! registration + ping (agent port), metadata uploads (agent port), the
//! span stream (span port) and the stat stream (stat port). Every worker
//! is a tokio task owned by the agent's runtime; producers only ever
//! `try_send` into bounded queues, so instrumented threads never block on
//! I/O.

pub(crate) mod convert;
pub(crate) mod span;
pub(crate) mod stat;

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::metadata::MetadataValue;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info, warn};

use pinpoint_proto::v1::agent_client::AgentClient;
use pinpoint_proto::v1::metadata_client::MetadataClient;
use pinpoint_proto::v1::PPing;

use crate::agent::AgentService;
use crate::config::Config;
use crate::trace::ExceptionMeta;

/// Deadline for the one-shot agent registration call.
const REGISTER_TIMEOUT: Duration = Duration::from_secs(60);
/// Deadline for metadata uploads.
const META_TIMEOUT: Duration = Duration::from_secs(5);
/// Write cadence of the ping stream.
const PING_INTERVAL: Duration = Duration::from_secs(60);
/// Per-attempt connect budget; readiness that takes longer than one
/// attempt flags the owning worker to discard its backlog.
const CONNECT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

static SOCKET_ID: AtomicI32 = AtomicI32::new(0);

fn next_socket_id() -> i32 {
    SOCKET_ID.fetch_add(1, Ordering::Relaxed) + 1
}

/// Which collector port a client talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ClientKind {
    Agent,
    Span,
    Stats,
}

impl ClientKind {
    fn name(self) -> &'static str {
        match self {
            ClientKind::Agent => "agent",
            ClientKind::Span => "span",
            ClientKind::Stats => "stats",
        }
    }

    fn port(self, config: &Config) -> u16 {
        match self {
            ClientKind::Agent => config.collector.agent_port,
            ClientKind::Span => config.collector.span_port,
            ClientKind::Stats => config.collector.stat_port,
        }
    }
}

/// One pending metadata upload.
#[derive(Clone, Debug)]
pub(crate) enum MetaData {
    Api {
        id: i32,
        api_type: i32,
        api_str: String,
    },
    Error {
        id: i32,
        name: String,
    },
    Sql {
        id: i32,
        sql: String,
    },
    SqlUid {
        uid: Vec<u8>,
        sql: String,
    },
    Exception(ExceptionMeta),
}

fn endpoint_for(config: &Config, kind: ClientKind) -> Option<Endpoint> {
    let uri = format!("http://{}:{}", config.collector.host, kind.port(config));
    match Endpoint::from_shared(uri.clone()) {
        Ok(endpoint) => Some(
            endpoint
                .connect_timeout(CONNECT_ATTEMPT_TIMEOUT)
                .http2_keep_alive_interval(Duration::from_secs(30))
                .keep_alive_timeout(Duration::from_secs(60)),
        ),
        Err(err) => {
            warn!(%uri, %err, "invalid collector endpoint");
            None
        }
    }
}

/// Waits for a connected channel, retrying until the agent shuts down.
///
/// The returned flag is true when readiness took at least one full
/// attempt; the owning worker uses it to arm `force_queue_empty`.
pub(crate) async fn ready_channel(
    agent: &Arc<dyn AgentService>,
    kind: ClientKind,
) -> Option<(Channel, bool)> {
    let started = tokio::time::Instant::now();
    let mut shutdown = agent.shutdown_signal();

    loop {
        if agent.is_exiting() {
            return None;
        }
        let endpoint = endpoint_for(&agent.config(), kind)?;

        tokio::select! {
            result = endpoint.connect() => match result {
                Ok(channel) => {
                    let slow = started.elapsed() >= CONNECT_ATTEMPT_TIMEOUT;
                    if slow {
                        info!(client = kind.name(), "channel ready after extended wait");
                    }
                    return Some((channel, slow));
                }
                Err(err) => {
                    debug!(client = kind.name(), %err, "collector not reachable, retrying");
                    tokio::select! {
                        _ = tokio::time::sleep(CONNECT_ATTEMPT_TIMEOUT) => {}
                        _ = shutdown.changed() => return None,
                    }
                }
            },
            _ = shutdown.changed() => return None,
        }
    }
}

fn ascii_metadata(value: &str) -> Option<MetadataValue<tonic::metadata::Ascii>> {
    MetadataValue::try_from(value).ok()
}

/// Wraps a message (or request stream) with the per-call metadata the
/// collector requires.
pub(crate) fn grpc_request<T>(
    agent: &dyn AgentService,
    message: T,
    socket_id: i32,
) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);
    let metadata = request.metadata_mut();

    if let Some(value) = ascii_metadata(&agent.app_name()) {
        metadata.insert("applicationname", value);
    }
    if let Some(value) = ascii_metadata(&agent.agent_id()) {
        metadata.insert("agentid", value);
    }
    if let Some(value) = ascii_metadata(&agent.start_time().to_string()) {
        metadata.insert("starttime", value);
    }
    let agent_name = agent.agent_name();
    if !agent_name.is_empty() {
        if let Some(value) = ascii_metadata(&agent_name) {
            metadata.insert("agentname", value);
        }
    }
    if socket_id > 0 {
        if let Some(value) = ascii_metadata(&socket_id.to_string()) {
            metadata.insert("socketid", value);
        }
    }

    request
}

/// Registers this agent instance; retried by the init task until it
/// succeeds or the agent exits.
pub(crate) async fn register_agent(
    agent: &Arc<dyn AgentService>,
    channel: Channel,
) -> Result<(), tonic::Status> {
    let mut client = AgentClient::new(channel);
    let config = agent.config();

    let mut request = grpc_request(agent.as_ref(), convert::agent_info(agent.as_ref(), &config), 0);
    request.set_timeout(REGISTER_TIMEOUT);

    match tokio::time::timeout(REGISTER_TIMEOUT, client.request_agent_info(request)).await {
        Ok(Ok(_)) => {
            info!("agent registered with collector");
            Ok(())
        }
        Ok(Err(status)) => {
            warn!(code = ?status.code(), message = status.message(), "agent registration failed");
            Err(status)
        }
        Err(_) => {
            warn!("agent registration timed out");
            Err(tonic::Status::deadline_exceeded("register timeout"))
        }
    }
}

/// Keeps the bidirectional ping stream open, writing every 60 seconds.
/// Each (re)opened stream carries a fresh `socketid`.
pub(crate) async fn ping_worker(agent: Arc<dyn AgentService>, initial: Option<Channel>) {
    let mut shutdown = agent.shutdown_signal();
    let mut next_channel = initial;

    'stream: loop {
        let channel = match next_channel.take() {
            Some(channel) => channel,
            None => match ready_channel(&agent, ClientKind::Agent).await {
                Some((channel, _)) => channel,
                None => break,
            },
        };

        let mut client = AgentClient::new(channel);
        let (tx, rx) = mpsc::channel::<PPing>(1);
        let request = grpc_request(agent.as_ref(), ReceiverStream::new(rx), next_socket_id());

        let mut inbound = match client.ping_session(request).await {
            Ok(response) => response.into_inner(),
            Err(status) => {
                warn!(code = ?status.code(), "failed to open ping stream");
                tokio::select! {
                    _ = tokio::time::sleep(CONNECT_ATTEMPT_TIMEOUT) => continue 'stream,
                    _ = shutdown.changed() => break 'stream,
                }
            }
        };

        let mut ticker = tokio::time::interval(PING_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if tx.send(PPing {}).await.is_err() {
                        continue 'stream;
                    }
                }
                pong = inbound.message() => match pong {
                    Ok(Some(_)) => {}
                    Ok(None) | Err(_) => {
                        debug!("ping stream closed by collector");
                        continue 'stream;
                    }
                },
                _ = shutdown.changed() => {
                    // Half-close and wait for the stream to finish.
                    drop(tx);
                    let _ = inbound.message().await;
                    break 'stream;
                }
            }
        }
    }
    info!("grpc ping worker end");
}

async fn send_meta(
    client: &mut MetadataClient<Channel>,
    agent: &Arc<dyn AgentService>,
    meta: &MetaData,
) -> Result<(), tonic::Status> {
    match meta {
        MetaData::Api { id, api_type, api_str } => {
            let mut request =
                grpc_request(agent.as_ref(), convert::api_meta(*id, *api_type, api_str), 0);
            request.set_timeout(META_TIMEOUT);
            tokio::time::timeout(META_TIMEOUT, client.request_api_meta_data(request))
                .await
                .map_err(|_| tonic::Status::deadline_exceeded("meta timeout"))?
                .map(|_| ())
        }
        MetaData::Error { id, name } => {
            let mut request = grpc_request(agent.as_ref(), convert::string_meta(*id, name), 0);
            request.set_timeout(META_TIMEOUT);
            tokio::time::timeout(META_TIMEOUT, client.request_string_meta_data(request))
                .await
                .map_err(|_| tonic::Status::deadline_exceeded("meta timeout"))?
                .map(|_| ())
        }
        MetaData::Sql { id, sql } => {
            let mut request = grpc_request(agent.as_ref(), convert::string_meta(*id, sql), 0);
            request.set_timeout(META_TIMEOUT);
            tokio::time::timeout(META_TIMEOUT, client.request_string_meta_data(request))
                .await
                .map_err(|_| tonic::Status::deadline_exceeded("meta timeout"))?
                .map(|_| ())
        }
        MetaData::SqlUid { uid, sql } => {
            let mut request = grpc_request(agent.as_ref(), convert::sql_uid_meta(uid, sql), 0);
            request.set_timeout(META_TIMEOUT);
            tokio::time::timeout(META_TIMEOUT, client.request_sql_uid_meta_data(request))
                .await
                .map_err(|_| tonic::Status::deadline_exceeded("meta timeout"))?
                .map(|_| ())
        }
        MetaData::Exception(exception) => {
            let mut request = grpc_request(agent.as_ref(), convert::exception_meta(exception), 0);
            request.set_timeout(META_TIMEOUT);
            tokio::time::timeout(META_TIMEOUT, client.request_exception_meta_data(request))
                .await
                .map_err(|_| tonic::Status::deadline_exceeded("meta timeout"))?
                .map(|_| ())
        }
    }
}

fn evict_failed_meta(agent: &Arc<dyn AgentService>, meta: &MetaData) {
    match meta {
        MetaData::Api { api_type, api_str, .. } => agent.remove_cache_api(api_str, *api_type),
        MetaData::Error { name, .. } => agent.remove_cache_error(name),
        MetaData::Sql { sql, .. } => agent.remove_cache_sql(sql),
        MetaData::SqlUid { sql, .. } => agent.remove_cache_sql_uid(sql),
        MetaData::Exception(_) => {}
    }
}

/// Drains the metadata queue with unary uploads; a failed upload evicts
/// the cache entry so the next observation reassigns and retries.
pub(crate) async fn meta_worker(
    agent: Arc<dyn AgentService>,
    channel: Channel,
    mut rx: mpsc::Receiver<MetaData>,
) {
    let mut client = MetadataClient::new(channel);
    let mut shutdown = agent.shutdown_signal();

    loop {
        tokio::select! {
            meta = rx.recv() => match meta {
                Some(meta) => {
                    if let Err(status) = send_meta(&mut client, &agent, &meta).await {
                        debug!(code = ?status.code(), "metadata upload failed, evicting entry");
                        evict_failed_meta(&agent, &meta);
                    }
                }
                None => break,
            },
            _ = shutdown.changed() => break,
        }
    }
    info!("send meta worker end");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestAgentService;

    #[test]
    fn socket_ids_are_strictly_increasing() {
        let a = next_socket_id();
        let b = next_socket_id();
        assert!(b > a);
        assert!(a > 0);
    }

    #[test]
    fn request_carries_identity_metadata() {
        let agent = TestAgentService::new();
        let request = grpc_request(&agent, PPing {}, 7);
        let metadata = request.metadata();
        assert_eq!(
            metadata.get("applicationname").and_then(|v| v.to_str().ok()),
            Some("test-app")
        );
        assert_eq!(
            metadata.get("agentid").and_then(|v| v.to_str().ok()),
            Some("test-agent")
        );
        assert!(metadata.get("starttime").is_some());
        assert_eq!(
            metadata.get("socketid").and_then(|v| v.to_str().ok()),
            Some("7")
        );
    }

    #[test]
    fn request_omits_optional_metadata() {
        let agent = TestAgentService::new();
        let request = grpc_request(&agent, PPing {}, 0);
        assert!(request.metadata().get("socketid").is_none());
        assert!(request.metadata().get("agentname").is_none());
    }

    #[test]
    fn evicting_failed_meta_reassigns_ids() {
        let agent: Arc<dyn AgentService> = Arc::new(TestAgentService::new());
        let first = agent.cache_api("GET /users", 100);
        evict_failed_meta(
            &agent,
            &MetaData::Api {
                id: first,
                api_type: 100,
                api_str: "GET /users".to_string(),
            },
        );
        let second = agent.cache_api("GET /users", 100);
        assert_ne!(first, second);
    }

    #[test]
    fn endpoint_is_rejected_for_garbage_hosts() {
        let mut config = Config::default();
        config.collector.host = "bad host with spaces".to_string();
        assert!(endpoint_for(&config, ClientKind::Span).is_none());
    }
}

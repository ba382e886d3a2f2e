//! Small shared helpers: millisecond clocks, id generation, sql uid
//! hashing, host identity and lenient string parsing.

use std::net::UdpSocket;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

/// Milliseconds since the unix epoch for the given time.
pub fn to_millis(tm: SystemTime) -> i64 {
    tm.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Current wall-clock time in milliseconds since the unix epoch.
pub fn now_millis() -> i64 {
    to_millis(SystemTime::now())
}

/// Draws a random 63-bit span id from the thread-local generator.
/// Zero is reserved and never returned.
pub fn generate_span_id() -> i64 {
    let mut rng = rand::thread_rng();
    loop {
        let id = rng.gen::<i64>();
        if id != 0 {
            return id;
        }
    }
}

/// Random 16-char lowercase hex string, used for auto-generated agent ids.
pub fn generate_agent_id() -> String {
    format!("{:016x}", rand::thread_rng().gen::<u64>())
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(seed: u64, data: &[u8]) -> u64 {
    let mut hash = seed;
    for b in data {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Stable 16-byte uid of a normalized SQL statement.
///
/// Two independent FNV-1a passes (the second seeded with the first) give a
/// 128-bit value; the uid only has to be stable and well distributed, it is
/// not a cryptographic digest.
pub fn generate_sql_uid(sql: &str) -> Vec<u8> {
    let bytes = sql.as_bytes();
    let lo = fnv1a(FNV_OFFSET_BASIS, bytes);
    let hi = fnv1a(lo ^ FNV_OFFSET_BASIS, bytes);
    let mut uid = Vec::with_capacity(16);
    uid.extend_from_slice(&hi.to_be_bytes());
    uid.extend_from_slice(&lo.to_be_bytes());
    uid
}

/// Host name as reported by the OS, `"unknown"` when unavailable.
pub fn host_name() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| "unknown".to_string())
}

/// Best-effort primary IP address of this host.
///
/// Opens an unconnected UDP socket toward a public address to learn which
/// local interface the OS would route through; nothing is sent.
pub fn host_ip_addr() -> String {
    let fallback = "0.0.0.0".to_string();
    let socket = match UdpSocket::bind("0.0.0.0:0") {
        Ok(s) => s,
        Err(_) => return fallback,
    };
    if socket.connect("8.8.8.8:80").is_err() {
        return fallback;
    }
    socket
        .local_addr()
        .map(|a| a.ip().to_string())
        .unwrap_or(fallback)
}

pub fn parse_i32(value: &str) -> Option<i32> {
    value.trim().parse::<i32>().ok()
}

pub fn parse_i64(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

pub fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

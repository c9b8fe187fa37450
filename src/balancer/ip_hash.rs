//! IP-hash load balancing strategy.

use std::sync::Arc;

use crate::balancer::backend::Backend;
use crate::balancer::{Strategy, StrategyKind};

/// IP-hash selector.
///
/// CRC-32 of the client IP string, reduced modulo the fleet size, indexes
/// the backend. The mapping is deterministic for a fixed fleet; any
/// membership change reshuffles it for every client, which is the accepted
/// cost of plain modulo hashing. A dead backend at the hashed slot means
/// no selection rather than a silent rehash.
#[derive(Debug, Default)]
pub struct IpHash;

impl IpHash {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for IpHash {
    fn kind(&self) -> StrategyKind {
        StrategyKind::IpHash
    }

    fn next_backend(&self, backends: &[Arc<Backend>], client_ip: &str) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }

        let hash = crc32fast::hash(client_ip.as_bytes());
        let index = hash as usize % backends.len();
        let backend = &backends[index];

        if backend.is_alive() {
            tracing::debug!(client_ip = %client_ip, backend = %backend.url(), "ip-hash selection");
            Some(backend.clone())
        } else {
            None
        }
    }
}

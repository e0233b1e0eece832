//! Connection registry: every open streaming connection keyed by client id.

use std::collections::HashMap;

use crate::domain::{ClientConnection, ClientId, SessionId};

/// Keyed collection of live connections. Last write wins on `register`;
/// the replaced connection is handed back to the caller.
#[derive(Default)]
pub struct ConnectionRegistry {
    entries: HashMap<ClientId, ClientConnection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for the connection's uid, returning the
    /// replaced connection if one existed.
    pub fn register(&mut self, conn: ClientConnection) -> Option<ClientConnection> {
        self.entries.insert(conn.uid.clone(), conn)
    }

    /// Remove the entry for `uid` only while it still belongs to `session`.
    ///
    /// Returns `None` when the entry is absent or owned by a newer session,
    /// so a superseded session's teardown cannot evict its successor.
    /// Calling twice has the same end state as calling once.
    pub fn release(&mut self, uid: &ClientId, session: SessionId) -> Option<ClientConnection> {
        match self.entries.get(uid) {
            Some(conn) if conn.session == session => self.entries.remove(uid),
            _ => None,
        }
    }

    /// Look a connection up; never fails.
    pub fn get(&self, uid: &ClientId) -> Option<&ClientConnection> {
        self.entries.get(uid)
    }

    /// Snapshot iterator over currently registered connections (diagnostics).
    pub fn iter(&self) -> impl Iterator<Item = &ClientConnection> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

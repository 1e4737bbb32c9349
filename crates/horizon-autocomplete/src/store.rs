//! Key-value store contract backing quick-complete lookup.
//!
//! Quick-complete templates can live in host configuration rather than being
//! passed explicitly. The controller resolves them through [`KeyValueStore`],
//! trying the user scope first and falling back to the system scope, the way
//! per-user settings shadow machine-wide ones.
//!
//! Store failures never fail initialization; a controller that cannot
//! resolve a template simply ends up without quick complete.

/// Which tier of the store a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreScope {
    /// Per-user settings. Consulted first.
    User,
    /// Machine-wide settings. Fallback tier.
    System,
}

/// Errors a key-value store can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No value under the given path and name.
    #[error("value not found")]
    NotFound,
    /// The backend failed (I/O, permissions, serialization).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Read access to tiered host configuration.
pub trait KeyValueStore {
    /// Look up the string value stored at `path` under `name` in `scope`.
    fn lookup(&self, scope: StoreScope, path: &str, name: &str) -> Result<String, StoreError>;
}

/// An in-memory two-tier store.
///
/// The canonical store for tests and in-process hosts; persistent hosts
/// implement [`KeyValueStore`] over their own configuration system.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    user: Vec<(String, String, String)>,
    system: Vec<(String, String, String)>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value into the given scope, replacing any existing value.
    pub fn insert(
        &mut self,
        scope: StoreScope,
        path: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        let (path, name, value) = (path.into(), name.into(), value.into());
        let tier = self.tier_mut(scope);
        if let Some(entry) = tier.iter_mut().find(|(p, n, _)| *p == path && *n == name) {
            entry.2 = value;
        } else {
            tier.push((path, name, value));
        }
    }

    /// Insert a value using builder pattern.
    pub fn with_value(
        mut self,
        scope: StoreScope,
        path: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.insert(scope, path, name, value);
        self
    }

    fn tier(&self, scope: StoreScope) -> &[(String, String, String)] {
        match scope {
            StoreScope::User => &self.user,
            StoreScope::System => &self.system,
        }
    }

    fn tier_mut(&mut self, scope: StoreScope) -> &mut Vec<(String, String, String)> {
        match scope {
            StoreScope::User => &mut self.user,
            StoreScope::System => &mut self.system,
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn lookup(&self, scope: StoreScope, path: &str, name: &str) -> Result<String, StoreError> {
        self.tier(scope)
            .iter()
            .find(|(p, n, _)| p == path && n == name)
            .map(|(_, _, v)| v.clone())
            .ok_or(StoreError::NotFound)
    }
}

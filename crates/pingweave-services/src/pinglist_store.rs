//! Pinglist store — holds the target list served to agents.
//!
//! Reload is clear-then-load: the current list is emptied before the source
//! is read, all under the store lock. A failed reload therefore leaves the
//! store empty rather than serving a list that was not validated this cycle.
//! Readers queue behind an in-flight reload and never see a partial list.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use pingweave_core::pinglist::{parse_pinglist, LoadError, Pinglist};

/// Where the raw pinglist document comes from.
pub trait PinglistSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<String, LoadError>> + Send;
}

/// A YAML file on local disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl PinglistSource for FileSource {
    async fn fetch(&self) -> Result<String, LoadError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(LoadError::NotFound(self.path.clone()))
            }
            Err(e) => Err(LoadError::Read(self.path.clone(), e)),
        }
    }
}

/// The current pinglist. Cheap to clone; clones share the same list.
#[derive(Clone, Default)]
pub struct PinglistStore {
    current: Arc<Mutex<Arc<Pinglist>>>,
}

impl PinglistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with a fresh parse of `source`.
    ///
    /// On error the store is left empty and the error is returned for the
    /// caller to log.
    pub async fn reload<S: PinglistSource>(&self, source: &S) -> Result<(), LoadError> {
        let mut current = self.current.lock().await;
        *current = Arc::new(Pinglist::new());

        let text = source.fetch().await?;
        let list = parse_pinglist(&text)?;

        tracing::debug!(entries = list.len(), "pinglist loaded");
        *current = Arc::new(list);
        Ok(())
    }

    /// Immutable view of the current list. Waits for any in-flight reload.
    pub async fn snapshot(&self) -> Arc<Pinglist> {
        self.current.lock().await.clone()
    }
}

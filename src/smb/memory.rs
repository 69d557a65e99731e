//! In-memory share used by tests
//!
//! Implements both session traits over a shared map of directories and files,
//! records every call, and can be scripted to fail individual operations.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use tokio::io::AsyncRead;

use super::error::SmbError;
use super::params::ConnectionParameters;
use super::path_utils::split_parent;
use super::session::{copy_in_chunks, RemoteEntry, SessionConnector, ShareSession};

/// Calls observed by the share, in order per operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallLog {
    pub connects: usize,
    pub list_path: Vec<String>,
    pub stat: Vec<String>,
    pub create_directory: Vec<String>,
    pub store_file: Vec<String>,
    pub closes: usize,
}

#[derive(Debug, Default)]
struct Faults {
    connect: Option<String>,
    deny_listing: bool,
    deny_mkdir: bool,
    stat: Option<String>,
    store: Option<String>,
    close: Option<String>,
    /// Store creates missing parent directories instead of failing
    auto_create_dirs: bool,
}

#[derive(Debug, Default)]
struct State {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    calls: CallLog,
    faults: Faults,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryShare {
    state: Arc<Mutex<State>>,
}

impl MemoryShare {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock()
    }

    pub fn with_dir(self, path: &str) -> Self {
        {
            let mut state = self.lock();
            let mut current = String::new();
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                if !current.is_empty() {
                    current.push('/');
                }
                current.push_str(segment);
                state.dirs.insert(current.clone());
            }
        }
        self
    }

    pub fn with_file(self, path: &str, content: &[u8]) -> Self {
        let (parent, _) = split_parent(path);
        let share = self.with_dir(parent);
        share.lock().files.insert(path.to_string(), content.to_vec());
        share
    }

    pub fn fail_connect(self, message: &str) -> Self {
        self.lock().faults.connect = Some(message.to_string());
        self
    }

    pub fn deny_listing(self) -> Self {
        self.lock().faults.deny_listing = true;
        self
    }

    pub fn deny_mkdir(self) -> Self {
        self.lock().faults.deny_mkdir = true;
        self
    }

    pub fn fail_stat(self, message: &str) -> Self {
        self.lock().faults.stat = Some(message.to_string());
        self
    }

    pub fn fail_store(self, message: &str) -> Self {
        self.lock().faults.store = Some(message.to_string());
        self
    }

    pub fn fail_close(self, message: &str) -> Self {
        self.lock().faults.close = Some(message.to_string());
        self
    }

    pub fn auto_create_dirs(self) -> Self {
        self.lock().faults.auto_create_dirs = true;
        self
    }

    pub fn calls(&self) -> CallLog {
        self.lock().calls.clone()
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().files.get(path).cloned()
    }

    pub fn has_dir(&self, path: &str) -> bool {
        self.lock().dirs.contains(path)
    }

    pub fn dir_count(&self) -> usize {
        self.lock().dirs.len()
    }
}

#[async_trait::async_trait]
impl SessionConnector for MemoryShare {
    async fn connect(
        &self,
        _params: &ConnectionParameters,
    ) -> Result<Box<dyn ShareSession>, SmbError> {
        let mut state = self.lock();
        state.calls.connects += 1;
        if let Some(message) = &state.faults.connect {
            return Err(SmbError::ConnectionFailed(message.clone()));
        }
        Ok(Box::new(MemorySession {
            share: self.clone(),
        }))
    }
}

pub struct MemorySession {
    share: MemoryShare,
}

#[async_trait::async_trait]
impl ShareSession for MemorySession {
    async fn list_path(&self, _share: &str, path: &str) -> Result<Vec<RemoteEntry>, SmbError> {
        let mut state = self.share.lock();
        state.calls.list_path.push(path.to_string());
        if state.faults.deny_listing {
            return Err(SmbError::AccessDenied(format!("listing {}", path)));
        }
        if !path.is_empty() && !state.dirs.contains(path) {
            return Err(SmbError::NotFound(path.to_string()));
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };
        let is_child = |p: &str| {
            p.strip_prefix(prefix.as_str())
                .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
        };
        let mut entries: Vec<RemoteEntry> = state
            .dirs
            .iter()
            .filter(|d| is_child(d))
            .map(|d| RemoteEntry {
                name: split_parent(d).1.to_string(),
                is_dir: true,
                size: 0,
                modified: None,
            })
            .collect();
        entries.extend(state.files.iter().filter(|(f, _)| is_child(f)).map(|(f, data)| {
            RemoteEntry {
                name: split_parent(f).1.to_string(),
                is_dir: false,
                size: data.len() as u64,
                modified: None,
            }
        }));
        Ok(entries)
    }

    async fn stat(&self, _share: &str, path: &str) -> Result<RemoteEntry, SmbError> {
        let mut state = self.share.lock();
        state.calls.stat.push(path.to_string());
        if let Some(message) = &state.faults.stat {
            return Err(SmbError::CommandFailed(message.clone()));
        }
        let name = split_parent(path).1.to_string();
        if let Some(data) = state.files.get(path) {
            return Ok(RemoteEntry {
                name,
                is_dir: false,
                size: data.len() as u64,
                modified: None,
            });
        }
        if state.dirs.contains(path) {
            return Ok(RemoteEntry {
                name,
                is_dir: true,
                size: 0,
                modified: None,
            });
        }
        Err(SmbError::NotFound(path.to_string()))
    }

    async fn create_directory(&self, _share: &str, path: &str) -> Result<(), SmbError> {
        let mut state = self.share.lock();
        state.calls.create_directory.push(path.to_string());
        if state.faults.deny_mkdir {
            return Err(SmbError::AccessDenied(format!("mkdir {}", path)));
        }
        if state.dirs.contains(path) {
            return Err(SmbError::AlreadyExists(path.to_string()));
        }
        let (parent, _) = split_parent(path);
        if !parent.is_empty() && !state.dirs.contains(parent) {
            return Err(SmbError::NotFound(parent.to_string()));
        }
        state.dirs.insert(path.to_string());
        Ok(())
    }

    async fn store_file(
        &self,
        _share: &str,
        path: &str,
        source: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<u64, SmbError> {
        {
            let mut state = self.share.lock();
            state.calls.store_file.push(path.to_string());
            if let Some(message) = &state.faults.store {
                return Err(SmbError::CommandFailed(message.clone()));
            }
            let (parent, _) = split_parent(path);
            if !parent.is_empty() && !state.dirs.contains(parent) {
                if !state.faults.auto_create_dirs {
                    return Err(SmbError::NotFound(format!("unable to open {}", path)));
                }
                drop(state);
                self.share.clone().with_dir(parent);
            }
        }

        let mut buffer = Vec::new();
        let written = copy_in_chunks(source, &mut buffer).await?;
        self.share.lock().files.insert(path.to_string(), buffer);
        Ok(written)
    }

    async fn close(self: Box<Self>) -> Result<(), SmbError> {
        let mut state = self.share.lock();
        state.calls.closes += 1;
        match &state.faults.close {
            Some(message) => Err(SmbError::ConnectionFailed(message.clone())),
            None => Ok(()),
        }
    }
}

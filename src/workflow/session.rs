//! Session-scoped temporary workspace.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

/// A uniquely identified, request-scoped temporary directory.
///
/// The session id namespaces every temp path and published artifact name,
/// so concurrent sessions never collide. The directory is removed when the
/// session is dropped, which covers success, warning-only success, and
/// every early-return failure path.
#[derive(Debug)]
pub struct WorkflowSession {
    id: String,
    dir: PathBuf,
    cleaned: bool,
}

impl WorkflowSession {
    /// Create a fresh session directory under `work_root`.
    pub fn create(work_root: &Path) -> std::io::Result<Self> {
        let id = Uuid::new_v4().to_string();
        let dir = work_root.join(&id);
        fs::create_dir_all(&dir)?;
        debug!(session_id = %id, dir = %dir.display(), "created session workspace");
        Ok(Self {
            id,
            dir,
            cleaned: false,
        })
    }

    /// The session's unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The session's temporary directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Remove the session directory now instead of waiting for drop.
    pub fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;
        if let Err(e) = fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(session_id = %self.id, "session cleanup failed: {}", e);
            }
        } else {
            debug!(session_id = %self.id, "removed session workspace");
        }
    }
}

impl Drop for WorkflowSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

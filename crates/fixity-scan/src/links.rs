//! Resolution of files reached through followed symlinks.

use std::io;
use std::path::{Path, PathBuf};

use dashmap::DashSet;

/// What to do with a file found while following links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkResolution {
    /// The path is the file's own location, or the first route to a target
    /// outside the root.
    Emit,
    /// The file is already covered under `target`.
    Alias { target: PathBuf },
}

/// Decides which walk paths stand for a real file when links are followed.
///
/// Keyed on resolved paths, not inodes, so hard links stay separate files
/// with their own records. A link into the root is dropped in favour of the
/// target's own path; a target outside the root is emitted once, under the
/// first path that reaches it.
#[derive(Debug)]
pub struct LinkTargets {
    root: PathBuf,
    external: DashSet<PathBuf>,
}

impl LinkTargets {
    /// `root` must already be canonical.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            external: DashSet::new(),
        }
    }

    /// Resolve `path` and decide whether it becomes a task.
    pub fn resolve(&self, path: &Path) -> io::Result<LinkResolution> {
        let target = path.canonicalize()?;
        if target == path {
            return Ok(LinkResolution::Emit);
        }
        if target.starts_with(&self.root) || !self.external.insert(target.clone()) {
            return Ok(LinkResolution::Alias { target });
        }
        Ok(LinkResolution::Emit)
    }

    /// Number of distinct outside-root targets emitted.
    pub fn external_len(&self) -> usize {
        self.external.len()
    }
}

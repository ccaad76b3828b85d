//! Repository classification and the bounded-depth tree walk

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use super::config::ScanConfig;
use super::stats::RunStats;
use crate::git::{SyncResult, Syncer};
use crate::utils::repo_display_name;

/// A directory whose children could not be enumerated
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    pub fn path(&self) -> &Path {
        match self {
            ScanError::ReadDir { path, .. } => path,
        }
    }
}

/// A directory met by the walk, with its depth below the root (children are 1)
pub type WalkItem = Result<(PathBuf, usize), ScanError>;

/// Depth-first, name-ordered walk over the directories below a root
///
/// The root itself is never yielded and only directories come out. A
/// directory is entered on the call to `next` that follows its own item,
/// so `skip_current_dir` right after an item keeps the walk out of it.
pub trait DirWalk: Iterator<Item = WalkItem> + Send {
    /// Do not descend into the directory yielded last
    fn skip_current_dir(&mut self);
}

/// Filesystem access needed by the scanner
pub trait RepoFs: Send + Sync {
    /// True iff `path` directly contains a directory named `marker`.
    /// Any failure to inspect the path counts as "not a repository".
    fn is_repository(&self, path: &Path, marker: &str) -> bool;

    /// Starts a walk below `root` that never goes deeper than `max_depth`
    fn walk(&self, root: &Path, max_depth: usize) -> Box<dyn DirWalk + '_>;

    /// Identity of a directory, so aliases of one checkout compare equal
    fn canonicalize(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

/// `RepoFs` backed by the local filesystem
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFs;

impl RepoFs for LocalFs {
    fn is_repository(&self, path: &Path, marker: &str) -> bool {
        is_repository(path, marker)
    }

    fn walk(&self, root: &Path, max_depth: usize) -> Box<dyn DirWalk + '_> {
        Box::new(LocalWalk::new(root, max_depth))
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}

/// `DirWalk` over the local filesystem
///
/// Symlinks are followed, so a link to a checkout is scanned like the
/// checkout; link cycles come back as errors instead of looping.
pub struct LocalWalk {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl LocalWalk {
    pub fn new(root: &Path, max_depth: usize) -> Self {
        let inner = WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();
        Self {
            root: root.to_path_buf(),
            inner,
        }
    }
}

impl Iterator for LocalWalk {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        loop {
            match self.inner.next()? {
                Ok(entry) if entry.file_type().is_dir() => {
                    let depth = entry.depth();
                    return Some(Ok((entry.into_path(), depth)));
                }
                Ok(_) => continue,
                Err(err) if is_dangling_link(&err) => continue,
                Err(err) => {
                    let path = err.path().unwrap_or(&self.root).to_path_buf();
                    return Some(Err(ScanError::ReadDir {
                        path,
                        source: err.into(),
                    }));
                }
            }
        }
    }
}

impl DirWalk for LocalWalk {
    fn skip_current_dir(&mut self) {
        self.inner.skip_current_dir();
    }
}

/// A link whose target is gone is a non-directory entry, not a read failure
fn is_dangling_link(err: &walkdir::Error) -> bool {
    if err.depth() == 0 || err.loop_ancestor().is_some() {
        return false;
    }
    let not_found = err
        .io_error()
        .is_some_and(|io| io.kind() == io::ErrorKind::NotFound);
    not_found
        && err
            .path()
            .and_then(|path| fs::symlink_metadata(path).ok())
            .is_some_and(|meta| meta.file_type().is_symlink())
}

/// Checks whether `path` is a repository root, i.e. contains a `marker` directory
pub fn is_repository(path: &Path, marker: &str) -> bool {
    fs::metadata(path.join(marker)).is_ok_and(|meta| meta.is_dir())
}

/// Receives scan events as they happen, e.g. to render progress
pub trait ScanObserver: Send + Sync {
    fn repo_started(&self, _name: &str, _path: &Path) {}
    fn repo_finished(&self, _name: &str, _path: &Path, _result: &SyncResult) {}
    fn dir_skipped(&self, _error: &ScanError) {}
    /// A directory was looked at and is not a repository root
    fn dir_passed(&self, _path: &Path) {}
}

/// Observer that ignores every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {}

/// Depth-first walk that syncs every repository root it meets
pub struct Scanner<'a> {
    config: &'a ScanConfig,
    fs: &'a dyn RepoFs,
    syncer: &'a dyn Syncer,
    observer: &'a dyn ScanObserver,
}

impl<'a> Scanner<'a> {
    pub fn new(
        config: &'a ScanConfig,
        fs: &'a dyn RepoFs,
        syncer: &'a dyn Syncer,
        observer: &'a dyn ScanObserver,
    ) -> Self {
        Self {
            config,
            fs,
            syncer,
            observer,
        }
    }

    /// Walks the tree under the configured root and returns the tallied results
    ///
    /// The root itself is never classified. Its children are depth 1; a plain
    /// directory at depth `d < max_depth` is descended into, a repository root
    /// never is. Unreadable directories are counted as skipped and the walk
    /// carries on with their siblings. A checkout reached through several
    /// paths (symlinks) is synced once, under the first path met.
    pub async fn run(&self) -> RunStats {
        let mut stats = RunStats::new();
        let mut synced = HashSet::new();
        let mut walk = self.fs.walk(&self.config.root, self.config.max_depth);

        while let Some(item) = walk.next() {
            let (path, depth) = match item {
                Ok(found) => found,
                Err(err) => {
                    tracing::warn!(path = %err.path().display(), error = %err, "skipping");
                    self.observer.dir_skipped(&err);
                    stats.record_skip(&err);
                    continue;
                }
            };

            if !self.fs.is_repository(&path, &self.config.marker) {
                tracing::debug!(path = %path.display(), depth, "not a repository");
                self.observer.dir_passed(&path);
                continue;
            }

            walk.skip_current_dir();
            if !synced.insert(self.fs.canonicalize(&path)) {
                tracing::debug!(path = %path.display(), "already synced through another path");
                continue;
            }
            self.sync_repo(&path, &mut stats).await;
        }

        stats
    }

    async fn sync_repo(&self, path: &Path, stats: &mut RunStats) {
        let name = repo_display_name(path);
        self.observer.repo_started(&name, path);
        let result = self.syncer.sync(path).await;
        self.observer.repo_finished(&name, path, &result);
        stats.record(&name, path, &result);
    }
}

/// Scans `config.root` on the local filesystem, syncing each repository found
pub async fn scan(
    config: &ScanConfig,
    syncer: &dyn Syncer,
    observer: &dyn ScanObserver,
) -> RunStats {
    Scanner::new(config, &LocalFs, syncer, observer).run().await
}

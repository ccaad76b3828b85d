//! Test fixtures and builders

use async_trait::async_trait;
use batch_pull::core::{DirWalk, RepoFs, ScanError, ScanObserver, WalkItem};
use batch_pull::git::{SyncError, SyncOutput, SyncResult, Syncer};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Builds a directory tree in a temporary directory
///
/// Repositories are plain directories with an empty `.git` directory inside;
/// that is all the classifier looks at.
pub struct TreeBuilder {
    temp_dir: TempDir,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Creates a plain directory (and its parents)
    pub fn dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.root().join(rel)).expect("Failed to create directory");
        self
    }

    /// Creates a repository root at `rel`
    pub fn repo(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.root().join(rel).join(".git"))
            .expect("Failed to create repository");
        self
    }

    /// Creates a symlink at `rel` pointing to `target` (relative to the root)
    #[cfg(unix)]
    pub fn symlink(self, target: &str, rel: &str) -> Self {
        let link = self.root().join(rel);
        if let Some(parent) = link.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::os::unix::fs::symlink(self.root().join(target), link)
            .expect("Failed to create symlink");
        self
    }

    /// Creates a regular file
    pub fn file(self, rel: &str) -> Self {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(path, "content").expect("Failed to write file");
        self
    }

    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

/// Syncer that fails for the repository names it was told to fail and
/// remembers every path it was asked to sync
#[derive(Default)]
pub struct ScriptedSyncer {
    failing: HashSet<String>,
    calls: Mutex<Vec<PathBuf>>,
}

impl ScriptedSyncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|name| name.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }

    /// Names of the synced repositories, sorted so tests never depend on walk order
    pub fn synced_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .calls()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl Syncer for ScriptedSyncer {
    async fn sync(&self, repo_path: &Path) -> SyncResult {
        self.calls.lock().unwrap().push(repo_path.to_path_buf());
        let name = repo_path.file_name().unwrap().to_string_lossy();
        if self.failing.contains(name.as_ref()) {
            Err(SyncError::Exited {
                code: Some(1),
                stderr: format!("error: cannot pull {name}"),
            })
        } else {
            Ok(SyncOutput {
                stdout: "Already up to date.".to_string(),
            })
        }
    }
}

/// In-memory `RepoFs` that can simulate unreadable directories and aliases
#[derive(Default)]
pub struct MemoryFs {
    children: BTreeMap<PathBuf, Vec<PathBuf>>,
    repos: HashSet<PathBuf>,
    unreadable: HashSet<PathBuf>,
    aliases: HashMap<PathBuf, PathBuf>,
    listed: Mutex<Vec<PathBuf>>,
    classified: Mutex<Vec<PathBuf>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plain directory (and any missing ancestors)
    pub fn dir(mut self, path: &str) -> Self {
        self.insert(PathBuf::from(path));
        self
    }

    /// Adds a repository root
    pub fn repo(mut self, path: &str) -> Self {
        let path = PathBuf::from(path);
        self.insert(path.clone());
        self.repos.insert(path);
        self
    }

    /// Adds a directory whose listing fails with permission denied
    pub fn unreadable(mut self, path: &str) -> Self {
        let path = PathBuf::from(path);
        self.insert(path.clone());
        self.unreadable.insert(path);
        self
    }

    /// Adds `link` as another name for the existing directory `target`
    pub fn alias(mut self, link: &str, target: &str) -> Self {
        let link = PathBuf::from(link);
        self.insert(link.clone());
        self.aliases.insert(link, PathBuf::from(target));
        self
    }

    fn insert(&mut self, path: PathBuf) {
        self.children.entry(path.clone()).or_default();
        if let Some(parent) = path.parent() {
            if parent.as_os_str().is_empty() {
                return;
            }
            let parent = parent.to_path_buf();
            self.insert(parent.clone());
            let siblings = self.children.entry(parent).or_default();
            if !siblings.contains(&path) {
                siblings.push(path);
            }
        }
    }

    /// Real location of `path` once aliases are followed
    fn resolve(&self, path: &Path) -> PathBuf {
        for (link, target) in &self.aliases {
            if let Ok(rest) = path.strip_prefix(link) {
                return self.resolve(&target.join(rest));
            }
        }
        path.to_path_buf()
    }

    fn list_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
        self.listed.lock().unwrap().push(dir.to_path_buf());
        let real = self.resolve(dir);
        if self.unreadable.contains(&real) {
            return Err(ScanError::ReadDir {
                path: dir.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "Permission denied",
                ),
            });
        }
        match self.children.get(&real) {
            Some(children) => {
                let mut names: Vec<PathBuf> = children
                    .iter()
                    .map(|child| dir.join(child.file_name().unwrap()))
                    .collect();
                names.sort();
                Ok(names)
            }
            None => Err(ScanError::ReadDir {
                path: dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such directory"),
            }),
        }
    }

    pub fn listed(&self) -> Vec<PathBuf> {
        self.listed.lock().unwrap().clone()
    }

    pub fn classified(&self) -> Vec<PathBuf> {
        self.classified.lock().unwrap().clone()
    }
}

impl RepoFs for MemoryFs {
    fn is_repository(&self, path: &Path, _marker: &str) -> bool {
        self.classified.lock().unwrap().push(path.to_path_buf());
        self.repos.contains(&self.resolve(path))
    }

    fn walk(&self, root: &Path, max_depth: usize) -> Box<dyn DirWalk + '_> {
        Box::new(MemoryWalk {
            fs: self,
            max_depth,
            stack: Vec::new(),
            pending: Some((root.to_path_buf(), 0)),
        })
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        self.resolve(path)
    }
}

/// Walk over a `MemoryFs`; a directory is listed only when the walk moves past it
pub struct MemoryWalk<'a> {
    fs: &'a MemoryFs,
    max_depth: usize,
    stack: Vec<(PathBuf, usize)>,
    pending: Option<(PathBuf, usize)>,
}

impl Iterator for MemoryWalk<'_> {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        if let Some((dir, depth)) = self.pending.take() {
            if depth < self.max_depth {
                match self.fs.list_dirs(&dir) {
                    Ok(children) => self
                        .stack
                        .extend(children.into_iter().rev().map(|child| (child, depth + 1))),
                    Err(err) => return Some(Err(err)),
                }
            }
        }
        let (dir, depth) = self.stack.pop()?;
        self.pending = Some((dir.clone(), depth));
        Some(Ok((dir, depth)))
    }
}

impl DirWalk for MemoryWalk<'_> {
    fn skip_current_dir(&mut self) {
        self.pending = None;
    }
}

/// Observer that keeps every event it receives
#[derive(Default)]
pub struct RecordingObserver {
    pub started: Mutex<Vec<String>>,
    pub finished: Mutex<Vec<(String, bool)>>,
    pub skipped: Mutex<Vec<PathBuf>>,
    pub passed: Mutex<Vec<PathBuf>>,
}

impl ScanObserver for RecordingObserver {
    fn repo_started(&self, name: &str, _path: &Path) {
        self.started.lock().unwrap().push(name.to_string());
    }

    fn repo_finished(&self, name: &str, _path: &Path, result: &SyncResult) {
        self.finished
            .lock()
            .unwrap()
            .push((name.to_string(), result.is_ok()));
    }

    fn dir_skipped(&self, error: &ScanError) {
        self.skipped.lock().unwrap().push(error.path().to_path_buf());
    }

    fn dir_passed(&self, path: &Path) {
        self.passed.lock().unwrap().push(path.to_path_buf());
    }
}

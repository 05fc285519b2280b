//! Test fixtures and builders

use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use reposweep::core::{Console, RootMap, Settings, Verbosity, WalkOptions, Walker};

use super::git::{create_test_commit, setup_git_repo};

/// A directory tree with automatic cleanup
pub struct TestTree {
    pub temp_dir: TempDir,
}

impl TestTree {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.path().join(relative)
    }
}

enum Node {
    Dir(String),
    MarkerRepo(String),
    GitRepo(String),
    Ignored(String),
}

/// Builder for trees of repositories, ignore markers and plain directories
#[derive(Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dir(mut self, relative: &str) -> Self {
        self.nodes.push(Node::Dir(relative.to_string()));
        self
    }

    /// A directory holding an empty `.git` directory; enough for discovery
    pub fn repo(mut self, relative: &str) -> Self {
        self.nodes.push(Node::MarkerRepo(relative.to_string()));
        self
    }

    /// A real repository with one commit
    pub fn git_repo(mut self, relative: &str) -> Self {
        self.nodes.push(Node::GitRepo(relative.to_string()));
        self
    }

    /// A directory holding a `.ignore` file
    pub fn ignored(mut self, relative: &str) -> Self {
        self.nodes.push(Node::Ignored(relative.to_string()));
        self
    }

    pub fn build(self) -> Result<TestTree> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        for node in self.nodes {
            match node {
                Node::Dir(rel) => std::fs::create_dir_all(root.join(rel))?,
                Node::MarkerRepo(rel) => std::fs::create_dir_all(root.join(rel).join(".git"))?,
                Node::GitRepo(rel) => {
                    let path = root.join(rel);
                    setup_git_repo(&path)?;
                    create_test_commit(&path, "README.md", "# test\n", "Initial commit")?;
                }
                Node::Ignored(rel) => {
                    let path = root.join(rel);
                    std::fs::create_dir_all(&path)?;
                    std::fs::write(path.join(".ignore"), "")?;
                }
            }
        }

        Ok(TestTree { temp_dir })
    }
}

/// A walker over a single aliased root
pub fn walker_for(alias: &str, root: &Path, options: WalkOptions) -> Walker {
    let mut roots = RootMap::new();
    roots.insert(alias, [root.to_path_buf()]);
    Walker::new(roots, Settings::default()).with_options(options)
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

/// Runs `f` with a console and returns what it wrote to (stdout, stderr)
pub fn capture_output<T>(threshold: Verbosity, f: impl FnOnce(&Console) -> T) -> (T, String, String) {
    let out = SharedBuffer::default();
    let err = SharedBuffer::default();
    let (console, guard) = Console::with_writers(threshold, out.clone(), err.clone());
    let value = f(&console);
    drop(console);
    guard.finish();
    (value, out.contents(), err.contents())
}

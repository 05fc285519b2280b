//! Discovery and dispatch across all configured roots
//!
//! The scan always runs on the calling thread. In serial mode each
//! repository is handed to the callback as soon as it is found; in parallel
//! mode it is queued on a worker pool while the scan carries on.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::config::worker_count_for;
use super::error::{Completion, SweepError};
use super::interrupt::Interrupt;
use super::pool::{TaskSender, WorkerPool};
use super::roots::{resolve_roots, RootMap};
use super::scanner::{TreeScan, VisitedSet};
use super::settings::Settings;

/// What per-repository operations need from the engine
pub trait RepoContext: Sync {
    /// Display form of `dir` relative to the alias of its root
    fn abbreviate_path(&self, dir: &Path) -> String;

    fn settings(&self) -> &Settings;

    fn git_timeout(&self) -> Duration {
        self.settings().git_timeout()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkOptions {
    /// Run callbacks on the calling thread in discovery order
    pub serial: bool,
    /// Fraction of cores used as workers in parallel mode
    pub worker_fraction: f64,
    /// Exact worker count, overriding `worker_fraction`
    pub jobs: Option<usize>,
}

impl WalkOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            serial: false,
            worker_fraction: settings.worker_fraction,
            jobs: None,
        }
    }

    /// Rejects an out-of-range fraction when it would size the pool
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.serial || self.jobs.is_some() {
            return Ok(());
        }
        match worker_count_for(1, self.worker_fraction) {
            Some(_) => Ok(()),
            None => Err(SweepError::InvalidWorkerFraction(self.worker_fraction)),
        }
    }
}

pub struct Walker {
    roots: RootMap,
    settings: Settings,
    options: WalkOptions,
    interrupt: Interrupt,
}

impl Walker {
    pub fn new(roots: RootMap, settings: Settings) -> Self {
        let options = WalkOptions::from_settings(&settings);
        Self {
            roots,
            settings,
            options,
            interrupt: Interrupt::new(),
        }
    }

    /// Resolves `args` (or the configured defaults) against the environment
    pub fn from_args(args: &[String], settings: Settings) -> Result<Self, SweepError> {
        let roots = resolve_roots(args, &settings)?;
        Ok(Self::new(roots, settings))
    }

    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn roots(&self) -> &RootMap {
        &self.roots
    }

    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    /// Runs the scan alone, calling `on_found` for each repository in discovery order
    ///
    /// Aliases are visited in insertion order and the paths of one alias in
    /// sorted order. One visited set spans the whole pass.
    pub fn find_and_process_repos(&self, mut on_found: impl FnMut(&Path)) -> Completion {
        let mut visited = VisitedSet::new();

        for spec in self.roots.iter() {
            let mut paths = spec.resolved_paths.clone();
            paths.sort();

            for root in &paths {
                debug!(alias = %spec.display_alias, root = %root.display(), "scanning root");
                for repo in TreeScan::new(root, &mut visited) {
                    if self.interrupt.is_triggered() {
                        return Completion::Interrupted;
                    }
                    on_found(&repo);
                }
            }
        }

        if self.interrupt.is_triggered() {
            Completion::Interrupted
        } else {
            Completion::Finished
        }
    }

    /// Collects every repository path in discovery order
    pub fn repos(&self) -> (Vec<PathBuf>, Completion) {
        let mut repos = Vec::new();
        let completion = self.find_and_process_repos(|dir| repos.push(dir.to_path_buf()));
        (repos, completion)
    }

    /// Dispatches `callback(dir, worker_index, walker)` for every repository
    ///
    /// Serial mode always reports worker index 0. Callback failures are the
    /// callback's own business; the engine neither catches nor retries them.
    pub fn process<F>(&self, callback: F) -> Result<Completion, SweepError>
    where
        F: Fn(&Path, usize, &Walker) + Sync,
    {
        if self.options.serial {
            debug!("dispatching serially");
            return Ok(self.find_and_process_repos(|dir| callback(dir, 0, self)));
        }

        let adapter = |_: &TaskSender, task: PathBuf, worker: usize| callback(&task, worker, self);

        thread::scope(|scope| -> Result<Completion, SweepError> {
            let mut pool = match self.options.jobs {
                Some(jobs) => WorkerPool::with_worker_count(jobs, self.interrupt.clone()),
                None => WorkerPool::new(self.options.worker_fraction, self.interrupt.clone())?,
            };
            pool.start(scope, &adapter)?;
            info!(workers = pool.worker_count(), "dispatching in parallel");

            let scanned = self.find_and_process_repos(|dir| {
                if let Err(e) = pool.add_task(dir.to_path_buf()) {
                    warn!(dir = %dir.display(), "could not queue repository: {e}");
                }
            });
            let completion = pool.wait_for_completion();

            Ok(if scanned.is_interrupted() {
                Completion::Interrupted
            } else {
                completion
            })
        })
    }

    /// Rewrites `dir` as `alias/suffix` using the longest matching root
    pub fn abbreviate_path(&self, dir: &Path) -> String {
        let mut best: Option<(&str, &Path)> = None;
        for spec in self.roots.iter() {
            for root in &spec.resolved_paths {
                let longer = best.map_or(true, |(_, current)| {
                    root.as_os_str().len() > current.as_os_str().len()
                });
                if longer && dir.starts_with(root) {
                    best = Some((spec.display_alias.as_str(), root.as_path()));
                }
            }
        }

        match best.and_then(|(alias, root)| Some((alias, dir.strip_prefix(root).ok()?))) {
            Some((alias, suffix)) if suffix.as_os_str().is_empty() => alias.to_string(),
            Some((alias, suffix)) => {
                format!("{}/{}", alias.trim_end_matches('/'), suffix.display())
            }
            None => dir.display().to_string(),
        }
    }
}

impl RepoContext for Walker {
    fn abbreviate_path(&self, dir: &Path) -> String {
        Walker::abbreviate_path(self, dir)
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }
}

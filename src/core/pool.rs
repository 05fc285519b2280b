//! Fixed-size worker pool
//!
//! Workers are scoped threads sharing one unbounded FIFO queue. Each worker
//! pops a message, runs the callback for a task, and exits on the shutdown
//! sentinel. Submitted tasks are counted until their callback returns, so
//! sentinels are only queued once nothing (including follow-up work added
//! by callbacks) is outstanding. Termination is then observed by polling
//! worker liveness.
//!
//! ```text
//! producer ──add_task──▶ [ queue ] ──▶ worker 0 ─┐
//!                                 ├──▶ worker 1 ─┼─▶ callback(task, index)
//!                                 └──▶ worker N ─┘
//! ```

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Duration;
use tracing::{debug, info, trace};

use super::config::{worker_count_for, POOL_POLL_INTERVAL_MS, QUEUE_POLL_INTERVAL_MS};
use super::error::{Completion, SweepError};
use super::interrupt::Interrupt;

enum Message {
    Task(PathBuf),
    Shutdown,
}

/// Queue handle passed to callbacks
///
/// Tasks added from inside a callback are guaranteed to run before
/// `wait_for_completion` lets the workers go.
#[derive(Clone)]
pub struct TaskSender {
    tx: Sender<Message>,
    pending: Arc<AtomicUsize>,
}

impl TaskSender {
    /// Enqueues follow-up work
    pub fn add_task(&self, task: PathBuf) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(Message::Task(task)).is_err() {
            // unreachable while the pool holds its receiver
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

/// Marks one task finished when dropped, even if its callback panicked
struct TaskDone<'a>(&'a AtomicUsize);

impl Drop for TaskDone<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct WorkerPool<'scope> {
    worker_count: usize,
    queue_tx: Sender<Message>,
    queue_rx: Receiver<Message>,
    sender: TaskSender,
    workers: Vec<ScopedJoinHandle<'scope, ()>>,
    interrupt: Interrupt,
    drained: bool,
}

impl<'scope> WorkerPool<'scope> {
    /// Creates a pool using `fraction` of the available cores
    ///
    /// `fraction` must lie in (0, 1].
    pub fn new(fraction: f64, interrupt: Interrupt) -> Result<Self, SweepError> {
        let worker_count = worker_count_for(num_cpus::get(), fraction)
            .ok_or(SweepError::InvalidWorkerFraction(fraction))?;
        Ok(Self::with_worker_count(worker_count, interrupt))
    }

    pub fn with_worker_count(worker_count: usize, interrupt: Interrupt) -> Self {
        let (queue_tx, queue_rx) = unbounded();
        let sender = TaskSender {
            tx: queue_tx.clone(),
            pending: Arc::new(AtomicUsize::new(0)),
        };
        Self {
            worker_count: worker_count.max(1),
            queue_tx,
            queue_rx,
            sender,
            workers: Vec::new(),
            interrupt,
            drained: false,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Number of workers that have not terminated yet
    pub fn alive_workers(&self) -> usize {
        self.workers.iter().filter(|w| !w.is_finished()).count()
    }

    /// Spawns the workers inside `scope`
    pub fn start<F>(
        &mut self,
        scope: &'scope Scope<'scope, '_>,
        callback: &'scope F,
    ) -> Result<(), SweepError>
    where
        F: Fn(&TaskSender, PathBuf, usize) + Sync,
    {
        if !self.workers.is_empty() {
            return Err(SweepError::PoolAlreadyStarted);
        }

        for index in 0..self.worker_count {
            let queue_rx = self.queue_rx.clone();
            let sender = self.sender.clone();
            let interrupt = self.interrupt.clone();

            let spawned = thread::Builder::new()
                .name(format!("sweep-worker-{index}"))
                .spawn_scoped(scope, move || {
                    worker_loop(index, queue_rx, sender, interrupt, callback)
                });

            match spawned {
                Ok(handle) => self.workers.push(handle),
                Err(source) => {
                    // Release the workers that did start so the scope can join them
                    self.release_workers();
                    return Err(SweepError::WorkerSpawn { index, source });
                }
            }
        }

        debug!(workers = self.worker_count, "worker pool started");
        Ok(())
    }

    /// Pushes one task; fails if the pool was never started
    pub fn add_task(&self, task: PathBuf) -> Result<(), SweepError> {
        if self.workers.is_empty() {
            return Err(SweepError::PoolNotStarted);
        }
        self.sender.add_task(task);
        Ok(())
    }

    /// Pushes a single sentinel; tasks queued before it still run
    pub fn shutdown(&self) {
        let _ = self.queue_tx.send(Message::Shutdown);
    }

    /// Blocks until every worker has terminated or an interrupt arrives
    ///
    /// Waits for all submitted tasks, including follow-ups added by
    /// callbacks, then queues one sentinel per worker. On interrupt the
    /// polling stops; running callbacks still finish and the workers exit
    /// before taking another task.
    pub fn wait_for_completion(&mut self) -> Completion {
        let poll_interval = Duration::from_millis(POOL_POLL_INTERVAL_MS);

        while self.sender.pending() > 0 && self.alive_workers() > 0 {
            if self.interrupt.is_triggered() {
                info!(pending = self.sender.pending(), "interrupted, abandoning queued tasks");
                self.release_workers();
                return Completion::Interrupted;
            }
            thread::sleep(poll_interval);
        }
        self.release_workers();

        let mut last_alive = None;
        loop {
            let alive = self.alive_workers();
            if last_alive != Some(alive) {
                debug!(alive, total = self.workers.len(), "waiting for workers");
                last_alive = Some(alive);
            }
            if alive == 0 {
                break;
            }
            if self.interrupt.is_triggered() {
                info!(alive, "interrupted, no longer waiting for workers");
                return Completion::Interrupted;
            }
            thread::sleep(poll_interval);
        }

        for handle in self.workers.drain(..) {
            if let Err(payload) = handle.join() {
                std::panic::resume_unwind(payload);
            }
        }

        if self.interrupt.is_triggered() {
            Completion::Interrupted
        } else {
            Completion::Finished
        }
    }
}

impl WorkerPool<'_> {
    /// Queues one sentinel per worker, once
    fn release_workers(&mut self) {
        if self.drained {
            return;
        }
        for _ in 0..self.workers.len() {
            let _ = self.queue_tx.send(Message::Shutdown);
        }
        self.drained = true;
    }
}

impl Drop for WorkerPool<'_> {
    fn drop(&mut self) {
        // Without sentinels the enclosing scope would wait on idle workers forever
        self.release_workers();
    }
}

fn worker_loop<F>(
    index: usize,
    queue_rx: Receiver<Message>,
    sender: TaskSender,
    interrupt: Interrupt,
    callback: &F,
) where
    F: Fn(&TaskSender, PathBuf, usize) + Sync,
{
    trace!(worker = index, "worker started");
    let poll_interval = Duration::from_millis(QUEUE_POLL_INTERVAL_MS);

    loop {
        if interrupt.is_triggered() {
            debug!(worker = index, "worker stopping after interrupt");
            break;
        }
        match queue_rx.recv_timeout(poll_interval) {
            Ok(Message::Task(task)) => {
                let _done = TaskDone(&sender.pending);
                callback(&sender, task, index);
            }
            Ok(Message::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => continue,
        }
    }

    trace!(worker = index, "worker terminated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Mutex;

    fn task(i: usize) -> PathBuf {
        PathBuf::from(format!("/repos/r{i}"))
    }

    #[test]
    fn test_invalid_fractions_are_rejected() {
        for fraction in [0.0, -1.0, 1.5, f64::NAN] {
            match WorkerPool::new(fraction, Interrupt::new()) {
                Err(SweepError::InvalidWorkerFraction(_)) => {}
                Err(other) => panic!("unexpected error for {fraction}: {other}"),
                Ok(_) => panic!("fraction {fraction} should be rejected"),
            }
        }
    }

    #[test]
    fn test_full_fraction_matches_core_count() {
        let pool = WorkerPool::new(1.0, Interrupt::new()).unwrap();
        assert_eq!(pool.worker_count(), num_cpus::get());
    }

    #[test]
    fn test_worker_count_is_at_least_one() {
        let pool = WorkerPool::with_worker_count(0, Interrupt::new());
        assert_eq!(pool.worker_count(), 1);
    }

    #[test]
    fn test_add_task_before_start_fails() {
        let pool = WorkerPool::with_worker_count(2, Interrupt::new());
        assert!(matches!(
            pool.add_task(task(0)),
            Err(SweepError::PoolNotStarted)
        ));
    }

    #[test]
    fn test_start_twice_fails() {
        let callback = |_: &TaskSender, _: PathBuf, _: usize| {};
        thread::scope(|scope| {
            let mut pool = WorkerPool::with_worker_count(1, Interrupt::new());
            pool.start(scope, &callback).unwrap();
            assert!(matches!(
                pool.start(scope, &callback),
                Err(SweepError::PoolAlreadyStarted)
            ));
            pool.wait_for_completion();
        });
    }

    #[test]
    fn test_every_task_runs_exactly_once() {
        for (tasks, workers) in [(1, 1), (7, 3), (64, 4), (10, 10)] {
            let seen = Mutex::new(Vec::new());
            let indexes = Mutex::new(HashSet::new());
            let callback = |_: &TaskSender, path: PathBuf, worker: usize| {
                seen.lock().unwrap().push(path);
                indexes.lock().unwrap().insert(worker);
            };

            let (completion, alive) = thread::scope(|scope| {
                let mut pool = WorkerPool::with_worker_count(workers, Interrupt::new());
                pool.start(scope, &callback).unwrap();
                for i in 0..tasks {
                    pool.add_task(task(i)).unwrap();
                }
                let completion = pool.wait_for_completion();
                (completion, pool.alive_workers())
            });

            assert_eq!(completion, Completion::Finished);
            assert_eq!(alive, 0);

            let mut seen = seen.into_inner().unwrap();
            seen.sort();
            let mut expected: Vec<_> = (0..tasks).map(task).collect();
            expected.sort();
            assert_eq!(seen, expected, "{tasks} tasks on {workers} workers");
            assert!(indexes.into_inner().unwrap().iter().all(|&i| i < workers));
        }
    }

    #[test]
    fn test_single_worker_preserves_queue_order() {
        let seen = Mutex::new(Vec::new());
        let callback = |_: &TaskSender, path: PathBuf, _: usize| seen.lock().unwrap().push(path);

        thread::scope(|scope| {
            let mut pool = WorkerPool::with_worker_count(1, Interrupt::new());
            pool.start(scope, &callback).unwrap();
            for i in 0..20 {
                pool.add_task(task(i)).unwrap();
            }
            pool.wait_for_completion();
        });

        assert_eq!(seen.into_inner().unwrap(), (0..20).map(task).collect::<Vec<_>>());
    }

    #[test]
    fn test_shutdown_lets_queued_tasks_finish() {
        let count = AtomicUsize::new(0);
        let callback = |_: &TaskSender, _: PathBuf, _: usize| {
            count.fetch_add(1, Ordering::SeqCst);
        };

        thread::scope(|scope| {
            let mut pool = WorkerPool::with_worker_count(1, Interrupt::new());
            pool.start(scope, &callback).unwrap();
            pool.add_task(task(0)).unwrap();
            pool.add_task(task(1)).unwrap();
            pool.shutdown();
            assert_eq!(pool.wait_for_completion(), Completion::Finished);
        });

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_follow_up_tasks_run_before_shutdown() {
        let seen = Mutex::new(Vec::new());
        let callback = |sender: &TaskSender, path: PathBuf, _: usize| {
            if path == Path::new("/first") {
                thread::sleep(Duration::from_millis(200));
                sender.add_task(PathBuf::from("/follow-up"));
            }
            seen.lock().unwrap().push(path);
        };

        let completion = thread::scope(|scope| {
            let mut pool = WorkerPool::with_worker_count(1, Interrupt::new());
            pool.start(scope, &callback).unwrap();
            pool.add_task(PathBuf::from("/first")).unwrap();
            pool.wait_for_completion()
        });

        assert_eq!(completion, Completion::Finished);
        assert_eq!(
            seen.into_inner().unwrap(),
            vec![PathBuf::from("/first"), PathBuf::from("/follow-up")]
        );
    }

    #[test]
    fn test_chained_follow_ups_across_workers() {
        let count = AtomicUsize::new(0);
        let callback = |sender: &TaskSender, path: PathBuf, _: usize| {
            count.fetch_add(1, Ordering::SeqCst);
            let depth = path.components().count();
            if depth < 6 {
                thread::sleep(Duration::from_millis(10));
                sender.add_task(path.join("a"));
                sender.add_task(path.join("b"));
            }
        };

        let completion = thread::scope(|scope| {
            let mut pool = WorkerPool::with_worker_count(3, Interrupt::new());
            pool.start(scope, &callback).unwrap();
            pool.add_task(PathBuf::from("/r")).unwrap();
            pool.wait_for_completion()
        });

        assert_eq!(completion, Completion::Finished);
        // "/r" has 2 components; a binary tree down to 6 components
        assert_eq!(count.load(Ordering::SeqCst), 1 + 2 + 4 + 8 + 16);
    }

    #[test]
    fn test_interrupt_stops_waiting_and_abandons_queued_tasks() {
        let interrupt = Interrupt::new();
        let count = AtomicUsize::new(0);
        let callback = |_: &TaskSender, _: PathBuf, _: usize| {
            count.fetch_add(1, Ordering::SeqCst);
            interrupt.trigger();
            thread::sleep(Duration::from_millis(50));
        };

        let completion = thread::scope(|scope| {
            let mut pool = WorkerPool::with_worker_count(2, interrupt.clone());
            pool.start(scope, &callback).unwrap();
            for i in 0..10 {
                pool.add_task(task(i)).unwrap();
            }
            pool.wait_for_completion()
        });

        assert_eq!(completion, Completion::Interrupted);
        assert!(count.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_dropping_an_undrained_pool_releases_workers() {
        let callback = |_: &TaskSender, _: PathBuf, _: usize| {};
        thread::scope(|scope| {
            let mut pool = WorkerPool::with_worker_count(3, Interrupt::new());
            pool.start(scope, &callback).unwrap();
            drop(pool);
        });
    }
}

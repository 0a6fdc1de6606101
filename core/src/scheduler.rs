//! Fixed-size worker pool with a FIFO queue and a completion barrier.
//!
//! Tasks may submit further tasks through a [`Spawner`]; the barrier in
//! [`WorkQueue::finish`] waits for those too.

use anyhow::Result;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

#[derive(Default)]
struct Queue {
    tasks: VecDeque<Task>,
    shutdown: bool,
}

#[derive(Default)]
struct Shared {
    queue: Mutex<Queue>,
    available: Condvar,
    pending: Mutex<usize>,
    idle: Condvar,
}

impl Shared {
    fn submit(&self, task: Task) {
        let mut queue = self.queue.lock();
        if queue.shutdown {
            tracing::warn!("work queue is shut down, dropping task");
            return;
        }
        // counted before it becomes visible to workers
        *self.pending.lock() += 1;
        queue.tasks.push_back(task);
        self.available.notify_one();
    }

    fn complete(&self, n: usize) {
        let mut pending = self.pending.lock();
        *pending -= n;
        if *pending == 0 {
            self.idle.notify_all();
        }
    }
}

/// Decrements the pending counter when dropped, so a task that panics still counts as done.
struct Completion<'a>(&'a Shared);

impl Drop for Completion<'_> {
    fn drop(&mut self) { self.0.complete(1); }
}

/// Cloneable submission handle, usable from inside running tasks.
#[derive(Clone)]
pub struct Spawner {
    shared: Arc<Shared>,
}

impl Spawner {
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.shared.submit(Box::new(task));
    }
}

pub struct WorkQueue {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkQueue {
    pub const DEFAULT_THREADS: usize = 5;

    /// Start `threads` workers (at least one).
    pub fn new(threads: usize) -> Self {
        let shared = Arc::new(Shared::default());
        let workers = (0..threads.max(1))
            .map(|id| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("sift-worker-{id}"))
                    .spawn(move || run_worker(&shared, id))
                    .expect("spawn worker thread")
            })
            .collect();
        tracing::debug!(threads = threads.max(1), "work queue started");
        Self { shared, workers }
    }

    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.shared.submit(Box::new(task));
    }

    pub fn spawner(&self) -> Spawner { Spawner { shared: Arc::clone(&self.shared) } }

    /// Block until every submitted task, including tasks submitted by tasks, has run.
    pub fn finish(&self) {
        let mut pending = self.shared.pending.lock();
        while *pending > 0 {
            self.shared.idle.wait(&mut pending);
        }
    }

    /// Stop dispatching. Running tasks complete; queued ones are dropped.
    pub fn shutdown(&self) {
        let abandoned = {
            let mut queue = self.shared.queue.lock();
            queue.shutdown = true;
            let abandoned = queue.tasks.len();
            queue.tasks.clear();
            self.shared.available.notify_all();
            abandoned
        };
        if abandoned > 0 {
            tracing::warn!(abandoned, "work queue shut down with queued tasks");
            self.shared.complete(abandoned);
        }
    }

    pub fn size(&self) -> usize { self.workers.len() }
}

impl Default for WorkQueue {
    fn default() -> Self { Self::new(Self::DEFAULT_THREADS) }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn run_worker(shared: &Shared, id: usize) {
    loop {
        let task = {
            let mut queue = shared.queue.lock();
            while queue.tasks.is_empty() && !queue.shutdown {
                shared.available.wait(&mut queue);
            }
            if queue.shutdown {
                break;
            }
            queue.tasks.pop_front()
        };
        let Some(task) = task else { continue };

        let _done = Completion(shared);
        match panic::catch_unwind(AssertUnwindSafe(task)) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(worker = id, error = %format!("{err:#}"), "task failed"),
            Err(_) => tracing::error!(worker = id, "task panicked"),
        }
    }
    tracing::trace!(worker = id, "worker stopped");
}

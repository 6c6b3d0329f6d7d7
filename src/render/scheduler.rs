//! Fixed-size work-stealing thread pool for asynchronous renders.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use once_cell::sync::Lazy;
use parking_lot::{Condvar, Mutex};

use crate::foundation::error::{LottieError, LottieResult};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Steal attempts per worker before blocking, multiplied by the pool size.
const STEAL_ROUNDS: usize = 32;

/// Options for [`RenderScheduler::new`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SchedulerOpts {
    /// Worker count; `None` uses the hardware concurrency.
    pub threads: Option<usize>,
}

#[derive(Default)]
struct QueueState {
    jobs: VecDeque<Job>,
    done: bool,
}

#[derive(Default)]
struct TaskQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl TaskQueue {
    fn try_pop(&self) -> Option<Job> {
        self.state.try_lock()?.jobs.pop_front()
    }

    fn try_push(&self, job: Job) -> Result<(), Job> {
        match self.state.try_lock() {
            Some(mut state) => {
                state.jobs.push_back(job);
                drop(state);
                self.ready.notify_one();
                Ok(())
            }
            None => Err(job),
        }
    }

    fn push(&self, job: Job) {
        self.state.lock().jobs.push_back(job);
        self.ready.notify_one();
    }

    /// Block until a job arrives; `None` once the queue is done and drained.
    fn pop(&self) -> Option<Job> {
        let mut state = self.state.lock();
        while state.jobs.is_empty() && !state.done {
            self.ready.wait(&mut state);
        }
        state.jobs.pop_front()
    }

    fn done(&self) {
        self.state.lock().done = true;
        self.ready.notify_all();
    }
}

/// Pool of render workers, each owning a job queue and stealing from its
/// siblings when idle.
pub struct RenderScheduler {
    queues: Arc<[TaskQueue]>,
    workers: Vec<JoinHandle<()>>,
    next: AtomicUsize,
}

impl std::fmt::Debug for RenderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("threads", &self.queues.len())
            .finish()
    }
}

static GLOBAL: Lazy<LottieResult<RenderScheduler>> =
    Lazy::new(|| RenderScheduler::new(SchedulerOpts::default()));

impl RenderScheduler {
    /// Start a pool.
    pub fn new(opts: SchedulerOpts) -> LottieResult<Self> {
        let threads = match opts.threads {
            Some(0) => return Err(LottieError::validation("scheduler needs at least one thread")),
            Some(n) => n,
            None => std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
        };
        let queues: Arc<[TaskQueue]> = (0..threads).map(|_| TaskQueue::default()).collect();
        let mut scheduler = Self {
            queues,
            workers: Vec::with_capacity(threads),
            next: AtomicUsize::new(0),
        };
        for index in 0..threads {
            let queues = Arc::clone(&scheduler.queues);
            // On failure the partial pool is shut down by Drop.
            let handle = std::thread::Builder::new()
                .name(format!("lottie-render-{index}"))
                .spawn(move || run_worker(&queues, index))
                .map_err(|e| LottieError::render(format!("spawn render worker: {e}")))?;
            scheduler.workers.push(handle);
        }
        tracing::debug!(threads, "render scheduler started");
        Ok(scheduler)
    }

    /// Process-wide pool sized to the hardware concurrency, started on first use.
    pub fn global() -> LottieResult<&'static RenderScheduler> {
        GLOBAL
            .as_ref()
            .map_err(|e| LottieError::render(format!("global scheduler unavailable: {e}")))
    }

    /// Number of workers.
    pub fn threads(&self) -> usize {
        self.queues.len()
    }

    pub(crate) fn spawn(&self, job: Job) {
        let n = self.queues.len();
        let start = self.next.fetch_add(1, Ordering::Relaxed);
        let mut job = job;
        for offset in 0..n {
            match self.queues[(start + offset) % n].try_push(job) {
                Ok(()) => return,
                Err(back) => job = back,
            }
        }
        self.queues[start % n].push(job);
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        for queue in self.queues.iter() {
            queue.done();
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("render worker exited abnormally");
            }
        }
        tracing::debug!(threads = self.queues.len(), "render scheduler stopped");
    }
}

fn run_worker(queues: &[TaskQueue], index: usize) {
    let n = queues.len();
    loop {
        let stolen = (0..n * STEAL_ROUNDS).find_map(|k| queues[(index + k) % n].try_pop());
        let Some(job) = stolen.or_else(|| queues[index].pop()) else {
            break;
        };
        if catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::error!(worker = index, "render job panicked");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scheduler.rs"]
mod tests;

//! Background work for rasterization passes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{GlanceError, Result};

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Somewhere to run render jobs off the UI thread.
pub trait RenderExecutor: Send + Sync {
    fn spawn(&self, task: Task);
}

/// Bounded rayon pool; the default executor.
pub struct RayonExecutor {
    pool: rayon::ThreadPool,
}

impl RayonExecutor {
    /// # Errors
    ///
    /// Returns an error if the thread pool cannot be created.
    pub fn new(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("glance-render-{i}"))
            .build()
            .map_err(GlanceError::generic)?;
        Ok(Self { pool })
    }
}

impl RenderExecutor for RayonExecutor {
    fn spawn(&self, task: Task) {
        self.pool.spawn(task);
    }
}

/// Holds tasks until the host pumps them, e.g. from an idle handler.
#[derive(Default)]
pub struct QueuedExecutor {
    queue: Mutex<VecDeque<Task>>,
}

impl QueuedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Runs the oldest task. Returns `false` if the queue was empty.
    pub fn run_one(&self) -> bool {
        let task = self.queue.lock().pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Runs tasks until the queue is empty, including ones queued meanwhile.
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        while self.run_one() {
            count += 1;
        }
        count
    }
}

impl RenderExecutor for QueuedExecutor {
    fn spawn(&self, task: Task) {
        self.queue.lock().push_back(task);
    }
}

/// Cooperative cancellation flag, polled by the rasterizer once per token.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Canceled,
}

/// Handle to one rasterization pass.
#[derive(Clone, Debug)]
pub struct RenderJob {
    id: u64,
    token: CancelToken,
    state: Arc<Mutex<JobState>>,
}

impl RenderJob {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            token: CancelToken::new(),
            state: Arc::new(Mutex::new(JobState::Queued)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub fn state(&self) -> JobState {
        *self.state.lock()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Moves a queued job to running; a job canceled before it started stays canceled.
    pub fn start(&self) -> bool {
        let mut state = self.state.lock();
        if *state != JobState::Queued || self.token.is_cancelled() {
            *state = JobState::Canceled;
            return false;
        }
        *state = JobState::Running;
        true
    }

    pub fn finish(&self, completed: bool) {
        *self.state.lock() = if completed { JobState::Completed } else { JobState::Canceled };
    }
}

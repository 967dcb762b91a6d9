use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use rayon::prelude::*;
use rayon::{ThreadBuilder, ThreadPool, ThreadPoolBuilder};

use crate::error::{OptimizeError, Result};

type SpawnHandler = Arc<dyn Fn(ThreadBuilder) -> io::Result<JoinHandle<()>> + Send + Sync>;

/// Describes the worker pool a sweep runs on. Nothing is started until
/// [`ParallelProcessor::acquire`].
#[derive(Clone)]
pub struct ParallelProcessor {
    num_workers: usize,
    spawn_handler: Option<SpawnHandler>,
}

impl ParallelProcessor {
    pub fn new(num_workers: Option<usize>) -> Self {
        let num_workers = num_workers.filter(|&n| n > 0).unwrap_or_else(num_cpus::get);

        Self {
            num_workers,
            spawn_handler: None,
        }
    }

    /// Spawn worker threads through `handler` instead of `std::thread`.
    ///
    /// The handler must call [`ThreadBuilder::run`] on a new thread and
    /// return that thread's handle; the pool joins it on release. Returning
    /// an error makes [`acquire`](Self::acquire) fail.
    pub fn with_spawn_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(ThreadBuilder) -> io::Result<JoinHandle<()>> + Send + Sync + 'static,
    {
        self.spawn_handler = Some(Arc::new(handler));
        self
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Start a dedicated pool. The workers live exactly as long as the
    /// returned guard: dropping it joins every worker thread.
    pub fn acquire(&self) -> Result<WorkerPool> {
        let spawned = Arc::new(Mutex::new(Vec::with_capacity(self.num_workers)));
        let handles = Arc::clone(&spawned);
        let custom = self.spawn_handler.clone();

        let built = ThreadPoolBuilder::new()
            .num_threads(self.num_workers)
            .thread_name(|i| format!("windrose-worker-{i}"))
            .spawn_handler(move |thread| {
                let handle = match custom {
                    Some(ref handler) => handler(thread)?,
                    None => spawn_worker(thread)?,
                };
                handles.lock().push(handle);
                Ok(())
            })
            .build();

        let workers = WorkerThreads(std::mem::take(&mut *spawned.lock()));

        // On failure rayon stops the workers it already started; `workers`
        // joins them when it goes out of scope here.
        let pool = built.map_err(OptimizeError::WorkerPoolUnavailable)?;

        tracing::debug!(workers = pool.current_num_threads(), "worker pool started");

        Ok(WorkerPool { pool, workers })
    }
}

impl fmt::Debug for ParallelProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelProcessor")
            .field("num_workers", &self.num_workers)
            .field("custom_spawn", &self.spawn_handler.is_some())
            .finish()
    }
}

fn spawn_worker(thread: ThreadBuilder) -> io::Result<JoinHandle<()>> {
    let mut builder = std::thread::Builder::new();
    if let Some(name) = thread.name() {
        builder = builder.name(name.to_owned());
    }
    if let Some(stack_size) = thread.stack_size() {
        builder = builder.stack_size(stack_size);
    }
    builder.spawn(move || thread.run())
}

/// Scoped worker pool; dropping it shuts the worker threads down and waits
/// for them to exit.
pub struct WorkerPool {
    // Field order matters: the pool is dropped (workers told to stop)
    // before the handles are joined.
    pool: ThreadPool,
    workers: WorkerThreads,
}

impl WorkerPool {
    pub fn num_workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Map `f` over indexed items on the pool and return the results in
    /// index order, whatever order the workers finish in.
    ///
    /// `state` is cloned for each worker task so no mutable state is shared.
    /// The first error stops the map and is returned.
    pub fn map_ordered<T, S, R, E, F>(
        &self,
        items: Vec<(usize, T)>,
        state: S,
        f: F,
    ) -> std::result::Result<Vec<R>, E>
    where
        T: Send,
        S: Clone + Send,
        R: Send,
        E: Send,
        F: Fn(&mut S, usize, T) -> std::result::Result<R, E> + Send + Sync,
    {
        let mut results: Vec<(usize, R)> = self.pool.install(|| {
            items
                .into_par_iter()
                .map_with(state, |state, (index, item)| {
                    f(state, index, item).map(|result| (index, result))
                })
                .collect::<std::result::Result<Vec<_>, E>>()
        })?;

        // Sort results to maintain input order
        results.sort_by_key(|(index, _)| *index);

        Ok(results.into_iter().map(|(_, result)| result).collect())
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("num_workers", &self.workers.0.len())
            .finish()
    }
}

struct WorkerThreads(Vec<JoinHandle<()>>);

impl Drop for WorkerThreads {
    fn drop(&mut self) {
        let count = self.0.len();
        for handle in self.0.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("worker thread panicked during shutdown");
            }
        }
        if count > 0 {
            tracing::debug!(workers = count, "worker pool released");
        }
    }
}

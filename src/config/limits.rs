//! Worker pool sizing policy

/// Hard cap on download workers; more than this buys nothing against one thread.
pub const MAX_WORKERS: usize = 4;

/// Effective worker count and download concurrency for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSize {
    /// Number of worker tasks spawned
    pub workers: usize,

    /// Maximum downloads handed out before the first completion arrives
    pub concurrency: usize,
}

/// Resolves the requested pool size into the effective one
///
/// - `workers` defaults to `cpu_count` and is clamped into `1..=MAX_WORKERS`
/// - `concurrency` defaults to `default_concurrency` and is never below `workers`
///
/// # Examples
///
/// ```
/// use threadget::config::resolve_pool;
///
/// let pool = resolve_pool(Some(16), Some(2), 8, 8);
/// assert_eq!(pool.workers, 4);
/// assert_eq!(pool.concurrency, 4);
/// ```
pub fn resolve_pool(
    requested_workers: Option<usize>,
    requested_concurrency: Option<usize>,
    cpu_count: usize,
    default_concurrency: usize,
) -> PoolSize {
    let workers = requested_workers
        .unwrap_or(cpu_count)
        .clamp(1, MAX_WORKERS);
    let concurrency = requested_concurrency
        .unwrap_or(default_concurrency)
        .max(workers);

    PoolSize {
        workers,
        concurrency,
    }
}

/// Number of CPU cores available to this process (1 if it cannot be determined)
pub fn detected_cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

//! # Repeating Task Scheduling
//!
//! Plugins that need periodic work hand a [`RepeatingTask`] to a
//! [`Scheduler`]. The scheduler invokes [`RepeatingTask::tick`] once after the
//! initial delay and then once per period until the task reports
//! [`TickOutcome::Stopped`] or its [`TaskHandle`] is cancelled.
//!
//! Two schedulers are provided:
//! - [`TokioScheduler`] drives each task from its own tokio task with a
//!   `tokio::time::interval`, so ticks of one task never overlap.
//! - [`ManualScheduler`] ticks on demand, for deterministic tests and replays.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::debug;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep scheduling the task
    Continue,
    /// The task is done; never tick it again
    Stopped,
}

/// Shared cancellation flag of a scheduled task.
///
/// Cloning the handle shares the flag, so the task itself, the scheduler and
/// any observer all agree on whether the task is still live.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self {
            id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Cancels the task. Returns `true` only for the call that flipped the flag.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for TaskHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// A unit of periodic work.
pub trait RepeatingTask: Send + Sync {
    /// Runs one invocation of the task.
    fn tick(&self) -> TickOutcome;

    /// The cancellation handle owned by this task.
    fn handle(&self) -> TaskHandle;

    /// Name used in logs.
    fn name(&self) -> &str {
        "repeating_task"
    }
}

/// Host facility for running repeating tasks.
pub trait Scheduler: Send + Sync + Debug {
    /// Starts ticking `task` after `initial_delay`, then every `period`.
    fn schedule_repeating(
        &self,
        task: Arc<dyn RepeatingTask>,
        initial_delay: Duration,
        period: Duration,
    ) -> TaskHandle;

    /// Stops a task; it will not be ticked again.
    fn cancel(&self, handle: &TaskHandle) {
        handle.cancel();
    }
}

/// Scheduler backed by the tokio runtime it was created on.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: tokio::runtime::Handle,
}

impl TokioScheduler {
    /// Creates a scheduler bound to the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new() -> Self {
        Self {
            runtime: tokio::runtime::Handle::current(),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(
        &self,
        task: Arc<dyn RepeatingTask>,
        initial_delay: Duration,
        period: Duration,
    ) -> TaskHandle {
        let handle = task.handle();
        let task_handle = handle.clone();
        // tokio intervals reject a zero period
        let period = period.max(Duration::from_millis(1));

        self.runtime.spawn(async move {
            if !initial_delay.is_zero() {
                tokio::time::sleep(initial_delay).await;
            }

            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if task_handle.is_cancelled() {
                    break;
                }
                if task.tick() == TickOutcome::Stopped {
                    task_handle.cancel();
                    break;
                }
            }

            debug!("⏹️ Task {} ({}) finished", task_handle.id(), task.name());
        });

        handle
    }
}

/// Scheduler that only ticks when told to.
///
/// Delays and periods are recorded but ignored: every call to
/// [`ManualScheduler::run_pending`] ticks each live task exactly once, in
/// scheduling order.
#[derive(Default)]
pub struct ManualScheduler {
    tasks: Mutex<Vec<Arc<dyn RepeatingTask>>>,
}

impl Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("active", &self.active_count())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks every live task once and drops the ones that stopped.
    ///
    /// Returns the number of tasks that were ticked.
    pub fn run_pending(&self) -> usize {
        let tasks: Vec<Arc<dyn RepeatingTask>> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut ticked = 0;
        for task in &tasks {
            let handle = task.handle();
            if handle.is_cancelled() {
                continue;
            }
            ticked += 1;
            if task.tick() == TickOutcome::Stopped {
                handle.cancel();
            }
        }

        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|task| !task.handle().is_cancelled());
        ticked
    }

    /// Number of tasks that will be ticked by the next [`run_pending`](Self::run_pending).
    pub fn active_count(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|task| !task.handle().is_cancelled())
            .count()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(
        &self,
        task: Arc<dyn RepeatingTask>,
        _initial_delay: Duration,
        _period: Duration,
    ) -> TaskHandle {
        let handle = task.handle();
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(task);
        handle
    }
}

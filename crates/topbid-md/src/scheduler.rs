//! Fixed-interval background job runner.
//!
//! [`RepeatEvery`] runs an async job every `interval` on a tokio task. The
//! first run happens one interval after [`start`](RepeatEvery::start). Each
//! run executes on its own task so a failing or panicking job is logged and
//! the loop keeps going. Runs never overlap: if a run takes longer than the
//! interval, the next tick is delayed rather than bunched up.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

pub struct RepeatEvery {
    shutdown_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl Default for RepeatEvery {
    fn default() -> Self {
        Self::new()
    }
}

impl RepeatEvery {
    pub fn new() -> Self {
        Self { shutdown_tx: None, task: None }
    }

    /// Start running `job` every `interval`.
    ///
    /// If already running, the previous loop is stopped first (its in-flight
    /// run, if any, is allowed to finish).
    pub fn start<F, Fut>(&mut self, label: &str, interval: Duration, job: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.stop();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let label = label.to_string();
        info!("[{label}] running every {interval:?}");

        let task = tokio::spawn(repeat_loop(label, interval, job, shutdown_rx));
        self.shutdown_tx = Some(shutdown_tx);
        self.task = Some(task);
    }

    /// Signal the loop to exit. Does not wait for an in-flight run.
    ///
    /// Returns `true` if a loop was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.is_running();
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        self.task = None;
        was_running
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for RepeatEvery {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn repeat_loop<F, Fut>(label: String, period: Duration, job: F, mut shutdown_rx: watch::Receiver<bool>)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // skip the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => {
                debug!("[{label}] stopped");
                return;
            }
            _ = interval.tick() => {}
        }

        match tokio::spawn(job()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("[{label}] run failed: {e:#}"),
            Err(e) if e.is_panic() => error!("[{label}] run panicked: {e}"),
            Err(e) => error!("[{label}] run aborted: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    const TICK: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn first_run_waits_one_interval() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut every = RepeatEvery::new();
        every.start("test", Duration::from_millis(200), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        every.stop();
    }

    #[tokio::test]
    async fn keeps_running_after_errors_and_panics() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut every = RepeatEvery::new();
        every.start("test", TICK, move || {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                match n {
                    0 => anyhow::bail!("first run fails"),
                    1 => panic!("second run panics"),
                    _ => Ok(()),
                }
            }
        });
        tokio::time::sleep(TICK * 10).await;
        assert!(every.is_running());
        assert!(runs.load(Ordering::SeqCst) >= 3);
        assert!(every.stop());
    }

    #[tokio::test]
    async fn stop_halts_runs() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut every = RepeatEvery::new();
        every.start("test", TICK, move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });
        tokio::time::sleep(TICK * 4).await;
        assert!(every.stop());
        assert!(!every.is_running());
        assert!(!every.stop());

        tokio::time::sleep(TICK * 2).await;
        let after_stop = runs.load(Ordering::SeqCst);
        tokio::time::sleep(TICK * 4).await;
        assert_eq!(runs.load(Ordering::SeqCst), after_stop);
    }
}

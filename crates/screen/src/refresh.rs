// Cancellable periodic refresh task

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Runs a tick callback at a fixed period on its own thread until cancelled
///
/// Ticks keep the original schedule (start + n * period) rather than
/// drifting by the callback's run time.
pub struct RefreshTask {
    cancelled: Arc<(Mutex<bool>, Condvar)>,
    thread: Option<JoinHandle<()>>,
}

impl RefreshTask {
    /// Start ticking. The callback returns `false` to end the task itself.
    pub fn start<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let cancelled = Arc::new((Mutex::new(false), Condvar::new()));
        let worker_cancelled = cancelled.clone();

        let thread = thread::spawn(move || {
            let (lock, cvar) = &*worker_cancelled;
            let mut next = Instant::now() + period;
            let mut guard = lock.lock();
            loop {
                while !*guard {
                    if cvar.wait_until(&mut guard, next).timed_out() {
                        break;
                    }
                }
                if *guard {
                    break;
                }
                if !MutexGuard::unlocked(&mut guard, &mut on_tick) {
                    log::debug!("[refresh] tick receiver gone, stopping");
                    break;
                }
                next += period;
            }
        });

        log::debug!("[refresh] started with period {:?}", period);
        Self {
            cancelled,
            thread: Some(thread),
        }
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the task and wait for its thread; no tick runs after this returns
    pub fn cancel(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        let (lock, cvar) = &*self.cancelled;
        *lock.lock() = true;
        cvar.notify_all();
        if thread.join().is_err() {
            log::error!("[refresh] task thread panicked");
        }
        log::debug!("[refresh] cancelled");
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_ticks_until_cancelled() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let mut task = RefreshTask::start(Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        let deadline = Instant::now() + Duration::from_secs(5);
        while ticks.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(ticks.load(Ordering::SeqCst) >= 3);

        task.cancel();
        assert!(!task.is_running());
        let after_cancel = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);
    }

    #[test]
    fn test_cancel_wakes_a_long_wait() {
        let mut task = RefreshTask::start(Duration::from_secs(3600), || true);
        let started = Instant::now();
        task.cancel();
        task.cancel();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_callback_can_end_the_task() {
        let mut task = RefreshTask::start(Duration::from_millis(1), || false);
        let deadline = Instant::now() + Duration::from_secs(5);
        while task.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        assert!(!task.is_running());
        task.cancel();
    }
}

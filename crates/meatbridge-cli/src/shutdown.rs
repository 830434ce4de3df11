use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Shutdown flag whose waits wake up as soon as it is set
///
/// The bridge loop reads the flag through [`ShutdownSignal::flag`]; the
/// reconnect loops sleep with [`ShutdownSignal::wait`].
#[derive(Default)]
pub struct ShutdownSignal {
    requested: AtomicBool,
    condvar: Condvar,
    mutex: Mutex<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
        let _guard = self.mutex.lock().unwrap_or_else(PoisonError::into_inner);
        self.condvar.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`; returns `true` when shutdown cut it short
    pub fn wait(&self, duration: Duration) -> bool {
        let guard = self.mutex.lock().unwrap_or_else(PoisonError::into_inner);
        let (_guard, _) = self
            .condvar
            .wait_timeout_while(guard, duration, |_| !self.is_shutdown())
            .unwrap_or_else(PoisonError::into_inner);
        self.is_shutdown()
    }

    pub fn flag(&self) -> &AtomicBool {
        &self.requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_wait_runs_to_timeout() {
        let signal = ShutdownSignal::new();
        let start = Instant::now();
        assert!(!signal.wait(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_trigger_wakes_waiter() {
        let signal = Arc::new(ShutdownSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || {
                let start = Instant::now();
                (signal.wait(Duration::from_secs(10)), start.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(30));
        signal.trigger();

        let (interrupted, elapsed) = waiter.join().unwrap();
        assert!(interrupted);
        assert!(elapsed < Duration::from_secs(2));
    }

    #[test]
    fn test_flag_follows_trigger() {
        let signal = ShutdownSignal::new();
        assert!(!signal.flag().load(Ordering::SeqCst));
        signal.trigger();
        assert!(signal.flag().load(Ordering::SeqCst));
        assert!(signal.wait(Duration::from_secs(10)));
    }
}

//! Shared helpers for the integration tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use callflow::{spawn_task, Task};

/// Aborts the process if a test is still running when the guard has not been
/// dropped after `duration`. A combinator that never settles would otherwise
/// hang the suite.
pub struct TestTimeoutGuard {
    cancelled: Arc<AtomicBool>,
}

impl Drop for TestTimeoutGuard {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

pub fn test_timeout_guard(duration: Duration) -> TestTimeoutGuard {
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_clone = Arc::clone(&cancelled);
    std::thread::spawn(move || {
        std::thread::sleep(duration);
        if !cancelled_clone.load(Ordering::SeqCst) {
            eprintln!("Test timeout exceeded ({}s). Aborting.", duration.as_secs());
            std::process::abort();
        }
    });
    TestTimeoutGuard { cancelled }
}

/// Install a fmt subscriber once per test binary; honours `RUST_LOG`
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .with_target(false)
            .try_init();
    });
}

/// Timeline of task starts and finishes, plus the in-flight high-water mark
#[derive(Clone, Default)]
pub struct Timeline {
    events: Rc<RefCell<Vec<String>>>,
    in_flight: Rc<Cell<usize>>,
    peak: Rc<Cell<usize>>,
}

impl Timeline {
    /// A task that sleeps for `delay_ms`, then succeeds with `value`
    pub fn delayed<T: 'static>(
        &self,
        name: &'static str,
        delay_ms: u64,
        value: T,
    ) -> Task<T, anyhow::Error> {
        self.delayed_outcome(name, delay_ms, Ok(value))
    }

    /// A task that sleeps for `delay_ms`, then fails
    pub fn failing<T: 'static>(&self, name: &'static str, delay_ms: u64) -> Task<T, anyhow::Error> {
        self.delayed_outcome(name, delay_ms, Err(anyhow::anyhow!("{name} failed")))
    }

    fn delayed_outcome<T: 'static>(
        &self,
        name: &'static str,
        delay_ms: u64,
        outcome: anyhow::Result<T>,
    ) -> Task<T, anyhow::Error> {
        let timeline = self.clone();
        spawn_task(move || async move {
            timeline.enter(name);
            compio::time::sleep(Duration::from_millis(delay_ms)).await;
            timeline.leave(name);
            outcome
        })
    }

    pub fn enter(&self, name: &str) {
        self.events.borrow_mut().push(format!("start {name}"));
        let in_flight = self.in_flight.get() + 1;
        self.in_flight.set(in_flight);
        self.peak.set(self.peak.get().max(in_flight));
    }

    pub fn leave(&self, name: &str) {
        self.events.borrow_mut().push(format!("end {name}"));
        self.in_flight.set(self.in_flight.get() - 1);
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn peak(&self) -> usize {
        self.peak.get()
    }

    pub fn started(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.starts_with("start"))
            .count()
    }
}

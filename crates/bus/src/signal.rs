use std::panic::{catch_unwind, AssertUnwindSafe};

/// A list of observer callbacks fired synchronously, in subscription order,
/// on the owning DB's call stack — the observer pattern from the design
/// notes. A panicking observer is caught so later observers still run and
/// the mutation that triggered the fan-out is never rolled back.
pub struct Signal<T> {
    handlers: Vec<Box<dyn Fn(&T) + Send + Sync>>,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Signal { handlers: Vec::new() }
    }
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer. Observers fire in the order they connect.
    pub fn connect(&mut self, handler: impl Fn(&T) + Send + Sync + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Fire every registered observer with `event`. A panicking observer is
    /// logged and skipped; it does not stop later observers from running.
    pub fn fire(&self, event: &T) {
        for handler in &self.handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                tracing::error!("observer panicked while handling a signal — continuing");
            }
        }
    }

    pub fn observer_count(&self) -> usize {
        self.handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn fires_observers_in_subscription_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut signal: Signal<()> = Signal::new();
        for i in 0..3 {
            let order = Arc::clone(&order);
            signal.connect(move |_| order.lock().unwrap().push(i));
        }
        signal.fire(&());
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn a_panicking_observer_does_not_skip_later_ones() {
        let ran_after = Arc::new(AtomicUsize::new(0));
        let mut signal: Signal<()> = Signal::new();
        signal.connect(|_| panic!("boom"));
        {
            let ran_after = Arc::clone(&ran_after);
            signal.connect(move |_| {
                ran_after.fetch_add(1, Ordering::SeqCst);
            });
        }
        signal.fire(&());
        assert_eq!(ran_after.load(Ordering::SeqCst), 1);
    }
}

//! Test harness: tasks whose completion handles are parked until the test
//! decides to complete them, standing in for I/O completions.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::{Done, Settled, Task};

pub(crate) struct Deferred<T, E> {
    parked: Rc<RefCell<Vec<(usize, Done<T, E>)>>>,
    launched: Rc<RefCell<Vec<usize>>>,
    peak: Rc<Cell<usize>>,
}

impl<T: 'static, E: 'static> Deferred<T, E> {
    pub(crate) fn new() -> Self {
        Self {
            parked: Rc::new(RefCell::new(Vec::new())),
            launched: Rc::new(RefCell::new(Vec::new())),
            peak: Rc::new(Cell::new(0)),
        }
    }

    pub(crate) fn task(&self, id: usize) -> Task<T, E> {
        let parked = Rc::clone(&self.parked);
        let launched = Rc::clone(&self.launched);
        let peak = Rc::clone(&self.peak);
        Task::new(move |done| {
            launched.borrow_mut().push(id);
            let mut parked = parked.borrow_mut();
            parked.push((id, done));
            peak.set(peak.get().max(parked.len()));
        })
    }

    pub(crate) fn tasks(&self, count: usize) -> Vec<Task<T, E>> {
        (0..count).map(|id| self.task(id)).collect()
    }

    pub(crate) fn in_flight(&self) -> Vec<usize> {
        self.parked.borrow().iter().map(|(id, _)| *id).collect()
    }

    pub(crate) fn launched(&self) -> Vec<usize> {
        self.launched.borrow().clone()
    }

    pub(crate) fn peak(&self) -> usize {
        self.peak.get()
    }

    pub(crate) fn complete(&self, id: usize, outcome: Result<T, E>) {
        let done = {
            let mut parked = self.parked.borrow_mut();
            let pos = parked
                .iter()
                .position(|(parked_id, _)| *parked_id == id)
                .unwrap_or_else(|| panic!("task {id} is not in flight"));
            parked.remove(pos).1
        };
        done.complete(outcome);
    }
}

/// Records every invocation of a final callback
pub(crate) fn capture<R: 'static>() -> (Rc<RefCell<Vec<R>>>, impl FnOnce(R) + 'static) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    (calls, move |outcome| sink.borrow_mut().push(outcome))
}

pub(crate) fn only<T: Clone, E: Clone>(calls: &Rc<RefCell<Vec<Settled<T, E>>>>) -> Settled<T, E> {
    let calls = calls.borrow();
    assert_eq!(calls.len(), 1, "final callback must fire exactly once");
    calls[0].clone()
}

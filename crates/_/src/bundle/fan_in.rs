use std::{cell::RefCell, rc::Rc};

type FanInDone<T> = Box<dyn FnOnce(Vec<T>)>;

struct FanInState<T> {
    remaining: usize,
    failed: Vec<T>,
    on_done: Option<FanInDone<T>>,
}

/// Fan-in counter: combines N independent completions into a single callback.
///
/// Cloned handles share the same counter, so each in-flight operation can own
/// its own reporter. The completion callback fires exactly once, with the items
/// that reported failure, in the order they reported.
pub struct FanIn<T: 'static> {
    state: Rc<RefCell<FanInState<T>>>,
}

impl<T: 'static> Clone for FanIn<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: 'static> FanIn<T> {
    /// Creates counter awaiting `count` reports.
    ///
    /// # Arguments
    /// - `count`: Number of reports to await. Zero fires `on_done` right away.
    /// - `on_done`: Called once with failed items after all reports arrived.
    pub fn new(count: usize, on_done: impl FnOnce(Vec<T>) + 'static) -> Self {
        let result = Self {
            state: Rc::new(RefCell::new(FanInState {
                remaining: count,
                failed: Default::default(),
                on_done: Some(Box::new(on_done)),
            })),
        };
        if count == 0 {
            result.complete();
        }
        result
    }

    /// Reports completion of one item. Reports arriving after completion are ignored.
    pub fn report(&self, item: T, ok: bool) {
        let completed = {
            let mut state = self.state.borrow_mut();
            if state.on_done.is_none() {
                tracing::trace!("Ignoring fan-in report after completion");
                return;
            }
            if !ok {
                state.failed.push(item);
            }
            state.remaining = state.remaining.saturating_sub(1);
            state.remaining == 0
        };
        if completed {
            self.complete();
        }
    }

    pub fn remaining(&self) -> usize {
        self.state.borrow().remaining
    }

    pub fn is_done(&self) -> bool {
        self.state.borrow().on_done.is_none()
    }

    fn complete(&self) {
        // State borrow has to end before user code runs, it may report again.
        let (on_done, failed) = {
            let mut state = self.state.borrow_mut();
            (state.on_done.take(), std::mem::take(&mut state.failed))
        };
        if let Some(on_done) = on_done {
            on_done(failed);
        }
    }
}

/// Starts `op` for every item and calls `on_done` once all of them reported.
///
/// # Arguments
/// - `items`: Items to process. Duplicates are counted independently.
/// - `op`: Starts single operation, gets item and reporter to call when it ends.
/// - `on_done`: Receives items that reported failure.
pub fn await_all<T: Clone + 'static>(
    items: impl IntoIterator<Item = T>,
    mut op: impl FnMut(T, FanIn<T>),
    on_done: impl FnOnce(Vec<T>) + 'static,
) {
    let items = items.into_iter().collect::<Vec<_>>();
    let fan_in = FanIn::new(items.len(), on_done);
    for item in items {
        op(item, fan_in.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_empty_fires_immediately() {
        let fired = Rc::new(Cell::new(0));
        let fired2 = fired.clone();
        await_all(Vec::<u32>::new(), |_, _| {}, move |failed| {
            assert!(failed.is_empty());
            fired2.set(fired2.get() + 1);
        });
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_collects_failures_once() {
        let result = Rc::new(RefCell::new(None));
        let result2 = result.clone();
        let mut reporters = vec![];
        await_all(
            ["a", "b", "c"],
            |item, reporter| reporters.push((item, reporter)),
            move |failed| {
                assert!(result2.borrow().is_none());
                *result2.borrow_mut() = Some(failed);
            },
        );
        assert_eq!(reporters.len(), 3);
        let (item, reporter) = reporters.pop().unwrap();
        reporter.report(item, false);
        assert_eq!(reporter.remaining(), 2);
        let (item, reporter) = reporters.remove(0);
        reporter.report(item, true);
        assert!(result.borrow().is_none());
        let (item, reporter) = reporters.remove(0);
        reporter.report(item, false);
        assert!(reporter.is_done());
        assert_eq!(*result.borrow(), Some(vec!["c", "b"]));

        reporter.report("late", false);
        assert_eq!(*result.borrow(), Some(vec!["c", "b"]));
    }

    #[test]
    fn test_duplicates_counted_independently() {
        let fired = Rc::new(Cell::new(false));
        let fired2 = fired.clone();
        let fan_in = FanIn::new(2, move |failed: Vec<&str>| {
            assert_eq!(failed, vec!["x"]);
            fired2.set(true);
        });
        fan_in.report("x", false);
        assert!(!fired.get());
        fan_in.report("x", true);
        assert!(fired.get());
    }

    #[test]
    fn test_synchronous_reports_inside_op() {
        let failed = Rc::new(RefCell::new(vec![]));
        let failed2 = failed.clone();
        await_all(
            1..=4,
            |item, reporter| reporter.report(item, item % 2 == 0),
            move |items| *failed2.borrow_mut() = items,
        );
        assert_eq!(*failed.borrow(), vec![1, 3]);
    }
}

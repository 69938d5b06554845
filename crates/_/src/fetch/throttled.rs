use crate::fetch::{FetchEngine, FetchError, FetchReport, FetchRequest, FetchTicket, ResourceFetch};
use std::{
    collections::VecDeque,
    error::Error,
    time::{Duration, Instant},
};

/// Strategy for throttling fetches during maintenance ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThrottledFetchStrategy {
    /// Limits fetches to specified maximum number per maintenance tick.
    Number(usize),
    /// Limits fetches to specified maximum duration per maintenance tick.
    Duration(Duration),
}

/// Fetch engine that queues requests and runs only part of them on every
/// maintenance, in order they were started.
pub struct ThrottledFetch<Fetch: ResourceFetch> {
    fetch: Fetch,
    strategy: ThrottledFetchStrategy,
    awaiting: VecDeque<(FetchTicket, FetchRequest)>,
}

impl<Fetch: ResourceFetch> ThrottledFetch<Fetch> {
    pub fn new(fetch: Fetch, strategy: ThrottledFetchStrategy) -> Self {
        Self {
            fetch,
            strategy,
            awaiting: Default::default(),
        }
    }
}

impl<Fetch: ResourceFetch> FetchEngine for ThrottledFetch<Fetch> {
    fn start(&mut self, ticket: FetchTicket, request: FetchRequest) -> Result<(), FetchError> {
        self.awaiting.push_back((ticket, request));
        Ok(())
    }

    fn maintain(&mut self, reports: &mut Vec<FetchReport>) -> Result<(), Box<dyn Error>> {
        let mut number = 0;
        let timer = Instant::now();
        while let Some((ticket, request)) = self.awaiting.pop_front() {
            let result = self.fetch.fetch(&request);
            reports.push(FetchReport::new(ticket, request, result));
            number += 1;
            match self.strategy {
                ThrottledFetchStrategy::Number(max_per_tick) => {
                    if number >= max_per_tick {
                        break;
                    }
                }
                ThrottledFetchStrategy::Duration(max_duration) => {
                    if timer.elapsed() >= max_duration {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn in_flight(&self) -> usize {
        self.awaiting.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_strategy() {
        let fetch = [("a.js", b"a".as_slice()), ("b.js", b"b".as_slice())];
        let mut engine = ThrottledFetch::new(fetch, ThrottledFetchStrategy::Number(1));
        for (index, path) in ["a.js", "b.js", "c.js"].into_iter().enumerate() {
            engine
                .start(FetchTicket::new(index as u64), FetchRequest::new(path))
                .unwrap();
        }

        let mut reports = vec![];
        engine.maintain(&mut reports).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(engine.in_flight(), 2);
        engine.maintain(&mut reports).unwrap();
        engine.maintain(&mut reports).unwrap();
        assert_eq!(
            reports.iter().map(|report| report.is_loaded()).collect::<Vec<_>>(),
            vec![true, true, false]
        );
        assert_eq!(engine.in_flight(), 0);
    }
}

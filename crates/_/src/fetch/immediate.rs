use crate::fetch::{FetchEngine, FetchError, FetchReport, FetchRequest, FetchTicket, ResourceFetch};
use std::error::Error;

/// Fetch engine that runs fetches right away, on the calling thread.
///
/// Results are still held back until next maintenance, so loader callbacks
/// never fire from inside of `load` call that started the fetch.
pub struct ImmediateFetch<Fetch: ResourceFetch> {
    fetch: Fetch,
    completed: Vec<FetchReport>,
}

impl<Fetch: ResourceFetch> ImmediateFetch<Fetch> {
    pub fn new(fetch: Fetch) -> Self {
        Self {
            fetch,
            completed: Default::default(),
        }
    }

    pub fn into_inner(self) -> Fetch {
        self.fetch
    }
}

impl<Fetch: ResourceFetch> FetchEngine for ImmediateFetch<Fetch> {
    fn start(&mut self, ticket: FetchTicket, request: FetchRequest) -> Result<(), FetchError> {
        let result = self.fetch.fetch(&request);
        self.completed.push(FetchReport::new(ticket, request, result));
        Ok(())
    }

    fn maintain(&mut self, reports: &mut Vec<FetchReport>) -> Result<(), Box<dyn Error>> {
        reports.append(&mut self.completed);
        Ok(())
    }

    fn in_flight(&self) -> usize {
        self.completed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_reports_on_maintain() {
        let mut engine = ImmediateFetch::new(HashMap::from([(
            "a.js".to_owned(),
            b"a()".to_vec(),
        )]));
        engine
            .start(FetchTicket::new(0), FetchRequest::new("a.js"))
            .unwrap();
        engine
            .start(FetchTicket::new(1), FetchRequest::new("b.js"))
            .unwrap();
        assert_eq!(engine.in_flight(), 2);

        let mut reports = vec![];
        engine.maintain(&mut reports).unwrap();
        assert_eq!(engine.in_flight(), 0);
        assert_eq!(reports.len(), 2);
        assert!(reports[0].is_loaded());
        assert!(!reports[1].is_loaded());
        assert_eq!(reports[1].path, "b.js");
    }
}

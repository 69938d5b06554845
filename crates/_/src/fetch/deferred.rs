use crate::fetch::{FetchEngine, FetchError, FetchReport, FetchRequest, FetchTicket, ResourceFetch};
use std::{
    error::Error,
    sync::Arc,
    thread::JoinHandle,
};

/// Fetch engine that runs every fetch on its own background thread.
pub struct DeferredFetch<Fetch: ResourceFetch> {
    #[allow(clippy::type_complexity)]
    tasks: Vec<(FetchTicket, FetchRequest, JoinHandle<Result<Vec<u8>, FetchError>>)>,
    fetch: Arc<Fetch>,
}

impl<Fetch: ResourceFetch> DeferredFetch<Fetch> {
    pub fn new(fetch: Fetch) -> Self {
        Self {
            tasks: Default::default(),
            fetch: Arc::new(fetch),
        }
    }
}

impl<Fetch: ResourceFetch> FetchEngine for DeferredFetch<Fetch> {
    fn start(&mut self, ticket: FetchTicket, request: FetchRequest) -> Result<(), FetchError> {
        let fetch = self.fetch.clone();
        let job_request = request.clone();
        let join = std::thread::Builder::new()
            .name(format!("fetch-{}", ticket.index()))
            .spawn(move || fetch.fetch(&job_request))
            .map_err(|error| format!("Failed to spawn fetch thread: {}", error))?;
        self.tasks.push((ticket, request, join));
        Ok(())
    }

    fn maintain(&mut self, reports: &mut Vec<FetchReport>) -> Result<(), Box<dyn Error>> {
        let complete = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, (_, _, join))| join.is_finished())
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        for index in complete.into_iter().rev() {
            let (ticket, request, join) = self.tasks.swap_remove(index);
            let result = join.join().unwrap_or_else(|_| {
                Err(format!("Fetch job of `{}` resource panicked!", request.path).into())
            });
            reports.push(FetchReport::new(ticket, request, result));
        }
        Ok(())
    }

    fn in_flight(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::closure::ClosureResourceFetch;

    #[test]
    fn test_background_fetch() {
        let mut engine = DeferredFetch::new(ClosureResourceFetch::new(|request| {
            if request.path.path().starts_with("missing") {
                Err("not found".into())
            } else {
                Ok(request.path.content().as_bytes().to_vec())
            }
        }));
        engine
            .start(FetchTicket::new(0), FetchRequest::new("ok.js"))
            .unwrap();
        engine
            .start(FetchTicket::new(1), FetchRequest::new("missing.js"))
            .unwrap();

        let mut reports = vec![];
        while engine.in_flight() > 0 {
            engine.maintain(&mut reports).unwrap();
            std::thread::yield_now();
        }
        reports.sort_by_key(|report| report.ticket);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].result.as_ref().unwrap().bytes, b"ok.js");
        assert!(reports[1].result.is_err());
    }
}

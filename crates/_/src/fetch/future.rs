use crate::fetch::{FetchEngine, FetchError, FetchReport, FetchRequest, FetchTicket};
use std::{
    error::Error,
    pin::Pin,
    task::{Context, Poll, Waker},
};

type ResourceFetchFuture = Pin<Box<dyn Future<Output = Result<Vec<u8>, FetchError>>>>;

/// A future-based fetch engine.
///
/// Uses user-defined future spawner to create fetch futures and polls them on
/// every maintenance, so any async library can drive the actual loading as
/// long as its futures make progress when polled with no-op waker (for example
/// futures backed by channels fed by another runtime).
pub struct FutureFetch {
    future_spawner: Box<dyn Fn(FetchRequest) -> ResourceFetchFuture>,
    futures: Vec<(FetchTicket, FetchRequest, ResourceFetchFuture)>,
}

impl FutureFetch {
    /// Creates a new `FutureFetch` with a specified future spawner function.
    ///
    /// # Arguments
    /// - `future_spawner`: A function that takes a `FetchRequest` and returns
    ///   a future that resolves to resource bytes or an error.
    pub fn new<Fut>(future_spawner: impl Fn(FetchRequest) -> Fut + 'static) -> Self
    where
        Fut: Future<Output = Result<Vec<u8>, FetchError>> + 'static,
    {
        Self {
            future_spawner: Box::new(move |request| Box::pin(future_spawner(request))),
            futures: Default::default(),
        }
    }
}

impl FetchEngine for FutureFetch {
    fn start(&mut self, ticket: FetchTicket, request: FetchRequest) -> Result<(), FetchError> {
        let future = (self.future_spawner)(request.clone());
        self.futures.push((ticket, request, future));
        Ok(())
    }

    fn maintain(&mut self, reports: &mut Vec<FetchReport>) -> Result<(), Box<dyn Error>> {
        let mut cx = Context::from_waker(Waker::noop());
        let mut index = 0;
        while index < self.futures.len() {
            if let Poll::Ready(result) = self.futures[index].2.as_mut().poll(&mut cx) {
                let (ticket, request, _) = self.futures.remove(index);
                reports.push(FetchReport::new(ticket, request, result));
            } else {
                index += 1;
            }
        }
        Ok(())
    }

    fn in_flight(&self) -> usize {
        self.futures.len()
    }
}

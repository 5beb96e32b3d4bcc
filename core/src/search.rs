//! Sequential, single-flight pagination over a search endpoint.
//!
//! # Design
//! A `SearchCoordinator` owns the accumulated results for one query. Calling
//! `search` either rejects immediately (`None`) or marks the coordinator
//! in-flight and hands back a future for the next page. The in-flight flag is
//! set synchronously, before the caller ever polls, so a second `search`
//! issued while the first future is pending is rejected rather than queued.
//!
//! The flag lives in its own `Rc<Cell<bool>>`, apart from the page data in
//! `Rc<RefCell<_>>`; both are shared with the returned future, so the
//! coordinator is `!Send` and meant for a single-threaded executor. Readers
//! never get a `Ref` guard back: accessors return owned values, and
//! `with_items` scopes its borrow to a closure. The only mutable borrow is
//! the one synchronous commit step after the transport resolves.
//!
//! A failed (or dropped) future only clears the in-flight flag. Items, page
//! counter and completion are updated together or not at all.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::client::ApiClient;
use crate::endpoint::{PagedSearch, SearchRepositories};
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::SearchResult;

/// Snapshot of the pagination bookkeeping for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState<I> {
    /// Page requested by the next non-reload search. Starts at 1.
    pub page: u32,
    pub items: Vec<I>,
    pub completed: bool,
    pub in_flight: bool,
    /// Server-reported total from the last committed page.
    pub total_count: Option<u64>,
}

impl<I> Default for PaginationState<I> {
    fn default() -> Self {
        Self {
            page: 1,
            items: Vec::new(),
            completed: false,
            in_flight: false,
            total_count: None,
        }
    }
}

/// What a successful `search` changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProgress {
    /// Page number that was requested.
    pub page: u32,
    pub appended: usize,
    pub total_count: u64,
    pub incomplete_results: bool,
    pub completed: bool,
}

pub type RepositorySearch<T> = SearchCoordinator<T, SearchRepositories>;

/// Committed results. Only `InFlightGuard::commit` mutates it.
struct Pages<I> {
    page: u32,
    items: Vec<I>,
    completed: bool,
    total_count: Option<u64>,
}

impl<I> Default for Pages<I> {
    fn default() -> Self {
        Self {
            page: 1,
            items: Vec::new(),
            completed: false,
            total_count: None,
        }
    }
}

pub struct SearchCoordinator<T, E: PagedSearch> {
    client: ApiClient<T>,
    query: String,
    pages: Rc<RefCell<Pages<E::Item>>>,
    in_flight: Rc<Cell<bool>>,
    endpoint: PhantomData<fn() -> E>,
}

impl<T, E> SearchCoordinator<T, E>
where
    T: Transport,
    E: PagedSearch,
{
    /// Returns `None` for an empty query.
    pub fn new(client: ApiClient<T>, query: impl Into<String>) -> Option<Self> {
        let query = query.into();
        if query.is_empty() {
            return None;
        }
        Some(Self {
            client,
            query,
            pages: Rc::new(RefCell::new(Pages::default())),
            in_flight: Rc::new(Cell::new(false)),
            endpoint: PhantomData,
        })
    }

    /// Start fetching the next page, or page 1 again when `reload` is set.
    ///
    /// Returns `None` without touching any state when a request is already
    /// outstanding, or when results are complete and `reload` is false.
    pub fn search(
        &self,
        reload: bool,
    ) -> Option<impl Future<Output = Result<SearchProgress, ApiError>>> {
        let (completed, next_page) = {
            let pages = self.pages.borrow();
            (pages.completed, pages.page)
        };
        if self.in_flight.get() || (completed && !reload) {
            trace!(
                query = %self.query,
                in_flight = self.in_flight.get(),
                completed,
                "search rejected"
            );
            return None;
        }
        self.in_flight.set(true);
        let requested = if reload { 1 } else { next_page };
        debug!(query = %self.query, page = requested, reload, "search started");

        let guard = InFlightGuard {
            pages: Rc::clone(&self.pages),
            in_flight: Rc::clone(&self.in_flight),
        };
        let client = self.client.clone();
        let endpoint = E::for_page(&self.query, requested);

        Some(async move {
            let response = client.request(&endpoint).await?;
            Ok::<_, ApiError>(guard.commit(E::into_page(response), reload, requested))
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    /// Run `f` over the accumulated results, in server order.
    ///
    /// The borrow ends when `f` returns. Starting a search from inside `f`
    /// is fine; awaiting one there is not.
    pub fn with_items<R>(&self, f: impl FnOnce(&[E::Item]) -> R) -> R {
        f(&self.pages.borrow().items)
    }

    pub fn len(&self) -> usize {
        self.pages.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.borrow().items.is_empty()
    }

    pub fn page(&self) -> u32 {
        self.pages.borrow().page
    }

    pub fn is_completed(&self) -> bool {
        self.pages.borrow().completed
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    pub fn total_count(&self) -> Option<u64> {
        self.pages.borrow().total_count
    }
}

impl<T, E> SearchCoordinator<T, E>
where
    T: Transport,
    E: PagedSearch,
    E::Item: Clone,
{
    /// Accumulated results in server order, copied out.
    pub fn items(&self) -> Vec<E::Item> {
        self.with_items(<[E::Item]>::to_vec)
    }

    pub fn snapshot(&self) -> PaginationState<E::Item> {
        let pages = self.pages.borrow();
        PaginationState {
            page: pages.page,
            items: pages.items.clone(),
            completed: pages.completed,
            in_flight: self.in_flight.get(),
            total_count: pages.total_count,
        }
    }
}

/// Clears the in-flight flag when the search future finishes or is dropped.
struct InFlightGuard<I> {
    pages: Rc<RefCell<Pages<I>>>,
    in_flight: Rc<Cell<bool>>,
}

impl<I> InFlightGuard<I> {
    fn commit(self, page: SearchResult<I>, reload: bool, requested: u32) -> SearchProgress {
        let mut pages = self.pages.borrow_mut();
        if reload {
            pages.items.clear();
            pages.page = 1;
        }

        let appended = page.items.len();
        pages.items.extend(page.items);
        pages.completed = page.total_count <= pages.items.len() as u64;
        // Advances even for an empty page or a reload.
        pages.page += 1;
        pages.total_count = Some(page.total_count);

        debug!(
            appended,
            accumulated = pages.items.len(),
            total_count = page.total_count,
            completed = pages.completed,
            next_page = pages.page,
            "page committed"
        );

        SearchProgress {
            page: requested,
            appended,
            total_count: page.total_count,
            incomplete_results: page.incomplete_results,
            completed: pages.completed,
        }
    }
}

impl<I> Drop for InFlightGuard<I> {
    fn drop(&mut self) {
        self.in_flight.set(false);
    }
}

//! Paginated event list behind the home screen: search and category
//! filters with a trailing-edge debounce, infinite scroll, and
//! pull-to-refresh.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use shared::{
    domain::{Category, EventSummary},
    protocol::EventListQuery,
};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{api::ApiClient, error::FetchError, presentation::EventCard};

pub const FIRST_PAGE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Next page to request.
    Page(u32),
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    pub items: Vec<EventSummary>,
    pub cursor: Cursor,
    pub query: String,
    pub category: Option<Category>,
    pub is_loading_first_page: bool,
    pub is_loading_more: bool,
    pub is_refreshing: bool,
    pub last_error: Option<String>,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: Cursor::Page(FIRST_PAGE),
            query: String::new(),
            category: None,
            is_loading_first_page: false,
            is_loading_more: false,
            is_refreshing: false,
            last_error: None,
        }
    }
}

impl ListState {
    pub fn is_loading(&self) -> bool {
        self.is_loading_first_page || self.is_loading_more
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchClass {
    FirstPage,
    More,
}

struct PendingFetch {
    generation: u64,
    class: FetchClass,
    query: EventListQuery,
}

pub struct ListLoader {
    api: ApiClient,
    debounce: Duration,
    state: watch::Sender<ListState>,
    // Single slot: scheduling a fetch aborts whatever was waiting here.
    scheduled: Mutex<Option<JoinHandle<()>>>,
    generation: AtomicU64,
}

impl ListLoader {
    pub fn new(api: ApiClient, debounce: Duration) -> Arc<Self> {
        let (state, _) = watch::channel(ListState::default());
        Arc::new(Self {
            api,
            debounce,
            state,
            scheduled: Mutex::new(None),
            generation: AtomicU64::new(0),
        })
    }

    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    pub fn cards(&self) -> Vec<EventCard> {
        let base_url = self.api.base_url();
        self.state
            .borrow()
            .items
            .iter()
            .map(|event| EventCard::from_summary(event, base_url))
            .collect()
    }

    pub async fn set_query(self: &Arc<Self>, text: impl Into<String>) {
        let query = text.into();
        let generation = self.reset(|state| state.query = query);
        self.schedule_first_page(generation).await;
    }

    /// `None` selects all categories.
    pub async fn set_category(self: &Arc<Self>, category: Option<Category>) {
        let generation = self.reset(|state| state.category = category);
        self.schedule_first_page(generation).await;
    }

    /// Requests the page at the cursor. Returns `false` without touching the
    /// network when the list is exhausted, a fetch is in flight, or a
    /// debounced first page has not been requested yet.
    pub async fn load_more(&self) -> bool {
        if self.has_scheduled_fetch().await {
            debug!("load_more skipped: first page still scheduled");
            return false;
        }

        let mut pending = None;
        self.state.send_if_modified(|state| {
            let Cursor::Page(page) = state.cursor else {
                return false;
            };
            if state.is_loading() {
                return false;
            }
            let class = if page == FIRST_PAGE {
                state.is_loading_first_page = true;
                FetchClass::FirstPage
            } else {
                state.is_loading_more = true;
                FetchClass::More
            };
            pending = Some(PendingFetch {
                generation: self.generation.load(Ordering::SeqCst),
                class,
                query: EventListQuery::new(page, &state.query, state.category),
            });
            true
        });

        match pending {
            Some(pending) => {
                self.fetch(pending).await;
                true
            }
            None => {
                debug!("load_more skipped: list exhausted or fetch in flight");
                false
            }
        }
    }

    /// Initial load for the current filters, without the refresh indicator.
    pub async fn start(&self) {
        self.reload(false).await;
    }

    /// Drops the current items and reloads the first page immediately.
    pub async fn refresh(&self) {
        self.reload(true).await;
    }

    async fn reload(&self, refreshing: bool) {
        self.cancel_scheduled().await;
        let generation = self.reset(|state| state.is_refreshing = refreshing);
        if let Some(pending) = self.begin_first_page(generation) {
            self.fetch(pending).await;
        }
    }

    fn reset(&self, apply: impl FnOnce(&mut ListState)) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.items.clear();
            state.cursor = Cursor::Page(FIRST_PAGE);
            state.is_loading_first_page = false;
            state.is_loading_more = false;
            state.is_refreshing = false;
            state.last_error = None;
            apply(state);
        });
        generation
    }

    async fn schedule_first_page(self: &Arc<Self>, generation: u64) {
        let mut scheduled = self.scheduled.lock().await;
        if let Some(previous) = scheduled.take() {
            previous.abort();
        }

        let loader = Arc::clone(self);
        let delay = self.debounce;
        *scheduled = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(pending) = loader.begin_first_page(generation) {
                // Detached: rescheduling cancels timers, never requests.
                tokio::spawn(async move { loader.fetch(pending).await });
            }
        }));
    }

    async fn cancel_scheduled(&self) {
        if let Some(previous) = self.scheduled.lock().await.take() {
            previous.abort();
        }
    }

    async fn has_scheduled_fetch(&self) -> bool {
        self.scheduled
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn begin_first_page(&self, generation: u64) -> Option<PendingFetch> {
        let mut pending = None;
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            state.is_loading_first_page = true;
            state.last_error = None;
            pending = Some(PendingFetch {
                generation,
                class: FetchClass::FirstPage,
                query: EventListQuery::new(FIRST_PAGE, &state.query, state.category),
            });
            true
        });
        pending
    }

    async fn fetch(&self, pending: PendingFetch) {
        let PendingFetch {
            generation,
            class,
            query,
        } = pending;
        let page = query.page;
        info!(
            page,
            q = query.q.as_deref().unwrap_or(""),
            category = query.category.map(Category::id).unwrap_or("all"),
            "loading events"
        );

        let result = self.api.list_events(&query).await.map_err(FetchError::from);

        self.state.send_if_modified(|state| {
            let current = self.generation.load(Ordering::SeqCst);
            if current != generation {
                debug!(page, generation, current, "discarding superseded events response");
                return false;
            }

            match class {
                FetchClass::FirstPage => {
                    state.is_loading_first_page = false;
                    state.is_refreshing = false;
                }
                FetchClass::More => state.is_loading_more = false,
            }

            match result {
                Ok(body) => {
                    let has_more = body.has_more();
                    if page == FIRST_PAGE {
                        state.items = body.results;
                    } else {
                        state.items.extend(body.results);
                    }
                    state.cursor = if has_more {
                        Cursor::Page(page + 1)
                    } else {
                        Cursor::Exhausted
                    };
                    state.last_error = None;
                }
                Err(err) => {
                    warn!(page, error = %err, "failed to load events");
                    state.last_error = Some(err.to_string());
                }
            }
            true
        });
    }
}

#[cfg(test)]
#[path = "tests/list_loader_tests.rs"]
mod tests;

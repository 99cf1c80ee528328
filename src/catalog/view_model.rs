use crate::api::{search_service_catalog, PortalClient};
use crate::error::PortalError;
use crate::models::{ResultPage, SearchQuery};
use crate::notice::{Notice, Notices};

use super::pagination::{PageDirection, Pagination};
use super::view_mode::{ViewMode, ViewModeToggle};

/// Anything that can answer a catalog search.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    async fn search(&self, query: &SearchQuery) -> Result<ResultPage, PortalError>;
}

impl CatalogSource for PortalClient {
    async fn search(&self, query: &SearchQuery) -> Result<ResultPage, PortalError> {
        search_service_catalog(self, query).await
    }
}

/// A query handed out by the view-model. Its response is only accepted while
/// the ticket is the most recently issued one.
///
/// The ticket also carries the paging and view mode it was issued for. They
/// replace the view-model's own only once the response is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    token: u64,
    query: SearchQuery,
    pagination: Pagination,
    mode: ViewMode,
}

impl QueryTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The page was replaced
    Updated,
    /// The query failed; the previous page stays visible
    Failed,
    /// A newer query was issued since; the response was dropped
    Stale,
    /// The reported total no longer reaches the requested offset. The
    /// follow-up ticket asks for the new last page.
    Requery(QueryTicket),
}

/// State behind the catalog page: query text, paging, view mode and the
/// page currently on screen.
///
/// Every user action returns a [`QueryTicket`] to run; the view-model itself
/// does no I/O. [`CatalogViewModel::run`] is the usual driver.
///
/// `pagination` and the view mode always describe `page`. Navigation while a
/// query is in flight builds on that query's paging instead.
#[derive(Debug)]
pub struct CatalogViewModel {
    text: String,
    pagination: Pagination,
    view: ViewModeToggle,
    page: ResultPage,
    loading: bool,
    error: Option<PortalError>,
    issued: u64,
    in_flight: Option<(Pagination, ViewMode)>,
    failed: Option<QueryTicket>,
    notices: Notices,
}

impl CatalogViewModel {
    pub fn new(card_page_size: u64, table_page_size: u64) -> Self {
        let view = ViewModeToggle::new(card_page_size, table_page_size);
        Self {
            text: String::new(),
            pagination: Pagination::new(view.page_size()),
            view,
            page: ResultPage::default(),
            loading: false,
            error: None,
            issued: 0,
            in_flight: None,
            failed: None,
            notices: Notices::new(),
        }
    }

    pub fn with_view_mode(mut self, mode: ViewMode) -> Self {
        self.view.set(mode);
        self.pagination.set_page_size(self.view.page_size());
        self
    }

    /// The parameters the next query will carry.
    pub fn query(&self) -> SearchQuery {
        let (pagination, _) = self.base();
        SearchQuery {
            text: self.text.clone(),
            offset: pagination.offset(),
            limit: pagination.page_size(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn page(&self) -> &ResultPage {
        &self.page
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view.mode()
    }

    pub fn can_toggle_view(&self) -> bool {
        self.view.is_enabled(!self.page.is_empty())
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&PortalError> {
        self.error.as_ref()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    fn base(&self) -> (Pagination, ViewMode) {
        match &self.in_flight {
            Some((pagination, mode)) => (pagination.clone(), *mode),
            None => (self.pagination.clone(), self.view.mode()),
        }
    }

    fn issue(&mut self, pagination: Pagination, mode: ViewMode) -> QueryTicket {
        self.issued += 1;
        self.loading = true;
        self.failed = None;
        self.in_flight = Some((pagination.clone(), mode));
        let ticket = QueryTicket {
            token: self.issued,
            query: SearchQuery {
                text: self.text.clone(),
                offset: pagination.offset(),
                limit: pagination.page_size(),
            },
            pagination,
            mode,
        };
        tracing::debug!(token = ticket.token, text = %ticket.query.text, offset = ticket.query.offset, limit = ticket.query.limit, "catalog query issued");
        ticket
    }

    /// Re-issue the current parameters (initial load). After a failure this
    /// retries exactly the request that failed.
    pub fn refresh(&mut self) -> QueryTicket {
        if let Some(failed) = self.failed.take() {
            return self.issue(failed.pagination, failed.mode);
        }
        let (pagination, mode) = self.base();
        self.issue(pagination, mode)
    }

    /// New search text always starts from the first page. An empty text
    /// lists the whole catalog.
    pub fn submit_query(&mut self, text: &str) -> QueryTicket {
        self.text = text.trim().to_string();
        let (mut pagination, mode) = self.base();
        pagination.reset();
        self.issue(pagination, mode)
    }

    /// `None` when the move is not possible from the current page.
    pub fn change_page(&mut self, direction: PageDirection) -> Option<QueryTicket> {
        let (mut pagination, mode) = self.base();
        if pagination.go(direction) {
            Some(self.issue(pagination, mode))
        } else {
            None
        }
    }

    /// Jump straight to a 0-based page index of the current result set.
    pub fn jump_to_page(&mut self, page: u64) -> Option<QueryTicket> {
        let (mut pagination, mode) = self.base();
        if pagination.go_to_page(page) {
            Some(self.issue(pagination, mode))
        } else {
            None
        }
    }

    /// Switch card/table. Always restarts at offset 0 and re-queries, even
    /// when already on the first page. `None` while there is nothing shown.
    pub fn toggle_view_mode(&mut self) -> Option<QueryTicket> {
        let (mut pagination, mode) = self.base();
        let mut view = self.view.clone();
        view.set(mode);
        let next = view.toggle(!self.page.is_empty())?;
        pagination.set_page_size(view.page_size_for(next));
        Some(self.issue(pagination, next))
    }

    /// Feed a response back in. Only the latest ticket may change state.
    pub fn apply(&mut self, ticket: QueryTicket, result: Result<ResultPage, PortalError>) -> QueryOutcome {
        if ticket.token != self.issued {
            tracing::debug!(token = ticket.token, latest = self.issued, "discarding stale catalog response");
            return QueryOutcome::Stale;
        }
        self.loading = false;
        self.in_flight = None;
        match result {
            Ok(page) => {
                let mut pagination = ticket.pagination;
                if pagination.set_total(page.total_count) {
                    tracing::debug!(token = ticket.token, total = page.total_count, offset = pagination.offset(), "total shrank below offset, re-querying");
                    return QueryOutcome::Requery(self.issue(pagination, ticket.mode));
                }
                self.pagination = pagination;
                self.view.set(ticket.mode);
                self.page = page;
                self.error = None;
                self.failed = None;
                QueryOutcome::Updated
            }
            Err(e) => {
                tracing::warn!(token = ticket.token, error = %e, "catalog query failed");
                self.notices.error("Failed to load services", &e);
                self.error = Some(e);
                self.failed = Some(ticket);
                QueryOutcome::Failed
            }
        }
    }

    /// Run a ticket to completion, following any re-query the response asks for.
    pub async fn run<S: CatalogSource>(&mut self, source: &S, ticket: QueryTicket) -> QueryOutcome {
        let mut ticket = ticket;
        loop {
            let result = source.search(ticket.query()).await;
            match self.apply(ticket, result) {
                QueryOutcome::Requery(next) => ticket = next,
                outcome => return outcome,
            }
        }
    }
}

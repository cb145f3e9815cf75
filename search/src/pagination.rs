//! Multi-page browsing on top of [`SearchService`] and [`SessionCache`].
//!
//! The first page runs a search plus a count and registers a session; later pages carry only
//! the session id and an offset (see [`PageRequest`]) and replay the stored query.

use std::sync::Arc;

use storage::{ChannelFilter, SearchRow};
use tracing::{info, instrument};

use crate::error::Result;
use crate::service::SearchService;
use crate::session::SessionCache;

const PAGE_CALLBACK_PREFIX: &str = "pg";

/// Page position for rendering navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub offset: i64,
    pub page_size: i64,
    /// 1-based.
    pub current_page: i64,
    /// Never less than 1, even with no hits.
    pub total_pages: i64,
    pub prev_offset: Option<i64>,
    pub next_offset: Option<i64>,
}

impl PageCursor {
    pub fn new(offset: i64, page_size: i64, total_found: i64) -> Self {
        let page_size = page_size.max(1);
        let offset = offset.max(0);
        let current_page = offset / page_size + 1;
        let total_pages = if total_found <= 0 {
            1
        } else {
            (total_found - 1) / page_size + 1
        };
        let prev_offset = (offset > 0).then(|| (offset - page_size).max(0));
        let next_offset = (current_page < total_pages).then(|| offset + page_size);

        Self {
            offset,
            page_size,
            current_page,
            total_pages,
            prev_offset,
            next_offset,
        }
    }
}

/// A "go to offset" request for a session, encoded as `pg:<session_id>:<offset>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub session_id: String,
    pub offset: i64,
}

impl PageRequest {
    pub fn new(session_id: impl Into<String>, offset: i64) -> Self {
        Self {
            session_id: session_id.into(),
            offset,
        }
    }

    pub fn encode(&self) -> String {
        format!("{}:{}:{}", PAGE_CALLBACK_PREFIX, self.session_id, self.offset)
    }

    /// Parses an encoded request; `None` for anything else (including negative offsets).
    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.splitn(3, ':');
        if parts.next()? != PAGE_CALLBACK_PREFIX {
            return None;
        }
        let session_id = parts.next().filter(|id| !id.is_empty())?;
        let offset = parts.next()?.parse::<i64>().ok().filter(|o| *o >= 0)?;
        Some(Self::new(session_id, offset))
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub session_id: String,
    pub rows: Vec<SearchRow>,
    pub cursor: PageCursor,
}

impl Page {
    pub fn prev_request(&self) -> Option<PageRequest> {
        self.cursor
            .prev_offset
            .map(|offset| PageRequest::new(self.session_id.clone(), offset))
    }

    pub fn next_request(&self) -> Option<PageRequest> {
        self.cursor
            .next_offset
            .map(|offset| PageRequest::new(self.session_id.clone(), offset))
    }
}

#[derive(Clone)]
pub struct Paginator {
    service: SearchService,
    sessions: Arc<SessionCache>,
    page_size: i64,
}

impl Paginator {
    pub fn new(service: SearchService, sessions: Arc<SessionCache>, page_size: i64) -> Self {
        Self {
            service,
            sessions,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Runs the first page. Returns `None` when there are no hits; no session is opened then.
    #[instrument(skip(self, query_text, channel))]
    pub async fn first_page(
        &self,
        query_text: &str,
        channel: &ChannelFilter,
    ) -> Result<Option<Page>> {
        let query_text = query_text.trim();
        let rows = self
            .service
            .search(query_text, self.page_size, 0, channel)
            .await?;
        if rows.is_empty() {
            return Ok(None);
        }

        let total_found = self.service.count(query_text, channel).await?;
        let session_id = self
            .sessions
            .open(query_text, channel.clone(), total_found);
        info!(
            session_id = %session_id,
            total_found,
            rows = rows.len(),
            "step: search session opened"
        );

        Ok(Some(Page {
            session_id,
            rows,
            cursor: PageCursor::new(0, self.page_size, total_found),
        }))
    }

    /// Replays a session at `request.offset`. `None` when the session is unknown or expired;
    /// a page past the end comes back with no rows.
    #[instrument(skip(self, request), fields(session_id = %request.session_id, offset = request.offset))]
    pub async fn page(&self, request: &PageRequest) -> Result<Option<Page>> {
        let Some(session) = self.sessions.get(&request.session_id) else {
            info!("step: pagination session expired or unknown");
            return Ok(None);
        };

        let rows = self
            .service
            .search(
                &session.query_text,
                self.page_size,
                request.offset,
                &session.channel_filter,
            )
            .await?;

        Ok(Some(Page {
            session_id: request.session_id.clone(),
            rows,
            cursor: PageCursor::new(request.offset, self.page_size, session.total_found),
        }))
    }
}

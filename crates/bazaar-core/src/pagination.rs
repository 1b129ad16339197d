//! Generic pagination over ordered id lists.
//!
//! One mechanism pages every entity type: the caller supplies the ordered id
//! list once (`init`) and a renderer that turns the current page's ids into
//! messages; the engine owns page arithmetic, context storage and the
//! temporary-message handover. The stored context lives in the session's
//! context bag and is discarded with it when the owning screen is left.

use crate::error::{BazaarError, Result};
use crate::messaging::MessageLifecycle;
use crate::session::Session;
use crate::types::{EntityId, MessageId};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// What kind of entities a paginated view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Application,
    Order,
    Notification,
}

/// Navigation directive for a paginated view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirective {
    /// Establish a new context from a fresh result set, at page 0.
    Init,
    /// Advance one page; a no-op on the last page.
    Next,
    /// Retreat one page; a no-op on page 0.
    Prev,
    /// Re-render the current page without moving.
    Current,
}

impl PageDirective {
    /// Parses the directive segment of a pagination action parameter.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "init" => Some(Self::Init),
            "next" => Some(Self::Next),
            "prev" => Some(Self::Prev),
            "current" => Some(Self::Current),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Next => "next",
            Self::Prev => "prev",
            Self::Current => "current",
        }
    }
}

/// The stored state of one named paginated view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContext {
    pub context_key: String,
    pub entity_kind: EntityKind,
    /// Full ordered result set, immutable for the context's lifetime.
    pub ids: Vec<EntityId>,
    pub page: usize,
    pub page_size: usize,
}

impl PageContext {
    fn new(
        context_key: impl Into<String>,
        entity_kind: EntityKind,
        ids: Vec<EntityId>,
        page_size: usize,
    ) -> Self {
        Self {
            context_key: context_key.into(),
            entity_kind,
            ids,
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn total_pages(&self) -> usize {
        self.ids.len().div_ceil(self.page_size)
    }

    fn last_page(&self) -> usize {
        self.total_pages().saturating_sub(1)
    }

    /// Keeps `page` inside `[0, max(total_pages - 1, 0)]`.
    fn clamp(&mut self) {
        if self.page > self.last_page() {
            self.page = self.last_page();
        }
    }

    fn advance(&mut self) {
        if self.page < self.last_page() {
            self.page += 1;
        }
    }

    fn retreat(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Ids on the current page.
    pub fn page_ids(&self) -> &[EntityId] {
        let start = self.page * self.page_size;
        let end = (start + self.page_size).min(self.ids.len());
        &self.ids[start..end]
    }

    pub fn is_first(&self) -> bool {
        self.page == 0
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.last_page()
    }
}

/// Fresh result set establishing a new context on `init`.
#[derive(Debug, Clone)]
pub struct PageSeed {
    pub entity_kind: EntityKind,
    pub ids: Vec<EntityId>,
    pub page_size: usize,
}

/// What a renderer gets to work with: the current page, not the whole set.
#[derive(Debug, Clone)]
pub struct PageView {
    pub entity_kind: EntityKind,
    pub ids: Vec<EntityId>,
    pub page: usize,
    pub total_pages: usize,
}

/// Result of a pagination render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Rendered {
        page: usize,
        total_pages: usize,
        shown: usize,
    },
    /// `init` with an empty result set: no context was created, nothing was
    /// rendered; the caller shows its own "no results" screen.
    NoResults,
}

/// The pagination engine, borrowing the lifecycle manager for the
/// temporary-message handover.
pub struct Paginator<'a> {
    lifecycle: &'a MessageLifecycle,
}

impl<'a> Paginator<'a> {
    pub fn new(lifecycle: &'a MessageLifecycle) -> Self {
        Self { lifecycle }
    }

    fn bag_key(context_key: &str) -> String {
        format!("page:{context_key}")
    }

    /// Renders one page of the named view.
    ///
    /// `Init` requires a [`PageSeed`]; the other directives reuse the context
    /// stored under `context_key` and fail with a not-found error when the
    /// view no longer exists (screen was left, session reset). Whatever
    /// temporaries the previous render produced are deleted before the
    /// renderer runs; whatever the renderer returns becomes the new set.
    pub async fn render<F, Fut>(
        &self,
        session: &mut Session,
        context_key: &str,
        directive: PageDirective,
        seed: Option<PageSeed>,
        renderer: F,
    ) -> Result<PageOutcome>
    where
        F: FnOnce(PageView) -> Fut,
        Fut: Future<Output = Result<Vec<MessageId>>>,
    {
        let key = Self::bag_key(context_key);

        let mut ctx = match directive {
            PageDirective::Init => {
                let seed = seed.ok_or_else(|| {
                    BazaarError::internal("pagination init without a result set")
                })?;
                if seed.ids.is_empty() {
                    session.context.remove(&key);
                    self.lifecycle.clear_temporaries(session).await;
                    return Ok(PageOutcome::NoResults);
                }
                PageContext::new(context_key, seed.entity_kind, seed.ids, seed.page_size)
            }
            _ => session
                .context
                .get::<PageContext>(&key)?
                .ok_or_else(|| BazaarError::not_found("pagination context", context_key))?,
        };

        match directive {
            PageDirective::Next => ctx.advance(),
            PageDirective::Prev => ctx.retreat(),
            PageDirective::Init | PageDirective::Current => {}
        }
        ctx.clamp();

        self.lifecycle.clear_temporaries(session).await;

        let view = PageView {
            entity_kind: ctx.entity_kind,
            ids: ctx.page_ids().to_vec(),
            page: ctx.page,
            total_pages: ctx.total_pages(),
        };
        let produced = renderer(view).await?;
        let shown = produced.len();
        for id in produced {
            self.lifecycle.track_temporary(session, id);
        }

        let outcome = PageOutcome::Rendered {
            page: ctx.page,
            total_pages: ctx.total_pages(),
            shown,
        };
        session.context.put(key, &ctx)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{ChannelGateway, DeliveryStatus, ScreenContent};
    use crate::types::{ChatId, MessageId};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};

    struct StubGateway {
        next_id: AtomicI64,
        deleted: Mutex<Vec<MessageId>>,
    }

    impl StubGateway {
        fn new() -> Self {
            Self {
                next_id: AtomicI64::new(1),
                deleted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChannelGateway for StubGateway {
        async fn send(&self, _chat_id: ChatId, _content: ScreenContent) -> crate::error::Result<MessageId> {
            Ok(MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)))
        }

        async fn edit(
            &self,
            _chat_id: ChatId,
            _message_id: MessageId,
            _content: ScreenContent,
        ) -> crate::error::Result<DeliveryStatus> {
            Ok(DeliveryStatus::Ok)
        }

        async fn delete(
            &self,
            _chat_id: ChatId,
            message_id: MessageId,
        ) -> crate::error::Result<DeliveryStatus> {
            self.deleted.lock().unwrap().push(message_id);
            Ok(DeliveryStatus::Ok)
        }
    }

    fn seed(ids: Vec<EntityId>, page_size: usize) -> Option<PageSeed> {
        Some(PageSeed {
            entity_kind: EntityKind::Project,
            ids,
            page_size,
        })
    }

    async fn render_ids(
        paginator: &Paginator<'_>,
        session: &mut Session,
        directive: PageDirective,
        seed: Option<PageSeed>,
    ) -> (PageOutcome, Vec<EntityId>) {
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let seen_in = seen.clone();
        let outcome = paginator
            .render(session, "browse", directive, seed, |view: PageView| {
                let seen = seen_in.clone();
                async move {
                    *seen.lock().unwrap() = view.ids.clone();
                    // One message per entity card
                    Ok(view.ids.iter().map(|id| MessageId(1000 + id)).collect())
                }
            })
            .await
            .unwrap();
        let ids = seen.lock().unwrap().clone();
        (outcome, ids)
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        for (n, p, expected) in [(7, 3, 3), (6, 3, 2), (1, 3, 1), (3, 1, 3), (10, 5, 2)] {
            let ctx = PageContext::new("k", EntityKind::Project, (0..n).collect(), p);
            assert_eq!(ctx.total_pages(), expected, "n={n} p={p}");
        }
    }

    #[tokio::test]
    async fn test_seven_ids_page_size_three_walkthrough() {
        let lifecycle = MessageLifecycle::new(std::sync::Arc::new(StubGateway::new()));
        let paginator = Paginator::new(&lifecycle);
        let mut session = Session::new(ChatId(1));

        let (outcome, ids) = render_ids(
            &paginator,
            &mut session,
            PageDirective::Init,
            seed((1..=7).collect(), 3),
        )
        .await;
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(matches!(outcome, PageOutcome::Rendered { page: 0, total_pages: 3, .. }));

        let (_, ids) = render_ids(&paginator, &mut session, PageDirective::Next, None).await;
        assert_eq!(ids, vec![4, 5, 6]);

        let (outcome, ids) = render_ids(&paginator, &mut session, PageDirective::Next, None).await;
        assert_eq!(ids, vec![7]);
        assert!(matches!(outcome, PageOutcome::Rendered { page: 2, .. }));

        // Next from the last page stays put
        let (outcome, ids) = render_ids(&paginator, &mut session, PageDirective::Next, None).await;
        assert_eq!(ids, vec![7]);
        assert!(matches!(outcome, PageOutcome::Rendered { page: 2, .. }));
    }

    #[tokio::test]
    async fn test_prev_from_first_page_stays_put() {
        let lifecycle = MessageLifecycle::new(std::sync::Arc::new(StubGateway::new()));
        let paginator = Paginator::new(&lifecycle);
        let mut session = Session::new(ChatId(1));

        render_ids(
            &paginator,
            &mut session,
            PageDirective::Init,
            seed(vec![1, 2, 3], 2),
        )
        .await;
        let (outcome, ids) = render_ids(&paginator, &mut session, PageDirective::Prev, None).await;
        assert_eq!(ids, vec![1, 2]);
        assert!(matches!(outcome, PageOutcome::Rendered { page: 0, .. }));
    }

    #[tokio::test]
    async fn test_empty_init_creates_no_context() {
        let lifecycle = MessageLifecycle::new(std::sync::Arc::new(StubGateway::new()));
        let paginator = Paginator::new(&lifecycle);
        let mut session = Session::new(ChatId(1));

        let (outcome, _) =
            render_ids(&paginator, &mut session, PageDirective::Init, seed(vec![], 3)).await;
        assert_eq!(outcome, PageOutcome::NoResults);
        assert!(!session.context.contains("page:browse"));
    }

    #[tokio::test]
    async fn test_empty_init_still_sweeps_previous_temporaries() {
        let lifecycle = MessageLifecycle::new(std::sync::Arc::new(StubGateway::new()));
        let paginator = Paginator::new(&lifecycle);
        let mut session = Session::new(ChatId(1));

        render_ids(
            &paginator,
            &mut session,
            PageDirective::Init,
            seed(vec![1, 2], 3),
        )
        .await;
        assert_eq!(session.temporary_message_ids.len(), 2);

        // Result set shrank to nothing (filter change): old cards must not linger
        let (outcome, _) =
            render_ids(&paginator, &mut session, PageDirective::Init, seed(vec![], 3)).await;
        assert_eq!(outcome, PageOutcome::NoResults);
        assert!(session.temporary_message_ids.is_empty());
    }

    #[tokio::test]
    async fn test_directive_without_context_is_not_found() {
        let lifecycle = MessageLifecycle::new(std::sync::Arc::new(StubGateway::new()));
        let paginator = Paginator::new(&lifecycle);
        let mut session = Session::new(ChatId(1));

        let err = paginator
            .render(
                &mut session,
                "browse",
                PageDirective::Next,
                None,
                |_view: PageView| async move { Ok(Vec::new()) },
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_temporaries_are_superseded_not_accumulated() {
        let gateway = std::sync::Arc::new(StubGateway::new());
        let lifecycle = MessageLifecycle::new(gateway.clone());
        let paginator = Paginator::new(&lifecycle);
        let mut session = Session::new(ChatId(1));

        render_ids(
            &paginator,
            &mut session,
            PageDirective::Init,
            seed((1..=7).collect(), 3),
        )
        .await;
        assert_eq!(session.temporary_message_ids.len(), 3);

        render_ids(&paginator, &mut session, PageDirective::Next, None).await;
        assert_eq!(session.temporary_message_ids.len(), 3);

        // The first page's three cards were deleted before the second render
        assert_eq!(gateway.deleted.lock().unwrap().len(), 3);
    }
}

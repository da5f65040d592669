//! List controller: page state, loading state and the forward pipeline
//! (fetch → derive status → filter → paginate) for one admin list page.
//!
//! Reloads may overlap. Every fetch is stamped with a generation number and
//! only the newest generation is ever applied; an older result arriving late
//! is discarded. Reload failures never surface as errors: they move the
//! controller to [`LoadingState::Failed`] and keep the previously loaded rows.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use validator::Validate;

use crate::errors::{ConsoleError, MutationKind};
use crate::models::pagination::{paginate, total_pages};
use crate::repository::{ListParams, Repository};
use crate::services::filter::{self, FilterSet};
use crate::services::mutation::{MutationCoordinator, Reload};
use crate::services::permissions::Capabilities;
use crate::services::resource::{Resource, ResourceDescriptor, ResourceId};
use crate::services::status::Clock;

/// Tunables shared by every list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSettings {
    pub default_page_size: usize,
    /// Quiet period before a server-side search is sent.
    pub search_debounce: Duration,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            search_debounce: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// User-controlled page state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageState {
    pub search_term: String,
    pub filters: FilterSet,
    pub current_page: usize,
    pub items_per_page: usize,
}

impl PageState {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            search_term: String::new(),
            filters: FilterSet::default(),
            current_page: 1,
            items_per_page: items_per_page.max(1),
        }
    }
}

/// Everything the rendering layer needs for one render.
#[derive(Debug, Clone, Serialize)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
    pub total_items: usize,
    pub current_page: usize,
    pub items_per_page: usize,
    pub search_term: String,
    pub filters: FilterSet,
    pub loading_state: LoadingState,
    pub last_error: Option<String>,
    pub capabilities: Capabilities,
}

/// Result of one fetch, tagged with the generation that issued it.
#[derive(Debug)]
pub struct FetchOutcome<T> {
    pub generation: u64,
    pub result: Result<Vec<T>, ConsoleError>,
}

/// A fetch that has been issued but not yet run.
///
/// Owns everything it needs, so it can be awaited without holding the
/// controller and several can be in flight at once.
pub struct PendingReload<T: Resource> {
    generation: u64,
    latest: Arc<AtomicU64>,
    repository: Arc<dyn Repository<T>>,
    params: ListParams,
    delay: Duration,
}

impl<T: Resource> PendingReload<T> {
    pub fn params(&self) -> &ListParams {
        &self.params
    }

    /// Run the fetch. A debounced fetch that is superseded while waiting
    /// skips the repository entirely.
    pub async fn fetch(self) -> FetchOutcome<T> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
            if self.latest.load(Ordering::SeqCst) != self.generation {
                return FetchOutcome {
                    generation: self.generation,
                    result: Err(ConsoleError::StaleResponseDiscarded {
                        generation: self.generation,
                    }),
                };
            }
        }
        FetchOutcome {
            generation: self.generation,
            result: self.repository.get_list(&self.params).await,
        }
    }
}

/// Loaded rows plus page state. Separate from the coordinator so a mutation
/// can borrow the coordinator and reload the store at the same time.
pub struct ListStore<T: Resource> {
    descriptor: Arc<ResourceDescriptor<T>>,
    repository: Arc<dyn Repository<T>>,
    clock: Arc<dyn Clock>,
    settings: ListSettings,
    page: PageState,
    data: Vec<T>,
    loading_state: LoadingState,
    last_error: Option<ConsoleError>,
    generation: Arc<AtomicU64>,
}

impl<T: Resource> ListStore<T> {
    fn new(
        descriptor: Arc<ResourceDescriptor<T>>,
        repository: Arc<dyn Repository<T>>,
        clock: Arc<dyn Clock>,
        settings: ListSettings,
    ) -> Self {
        Self {
            descriptor,
            repository,
            clock,
            settings,
            page: PageState::new(settings.default_page_size),
            data: Vec::new(),
            loading_state: LoadingState::Idle,
            last_error: None,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Query for the current data source: upstream search while a term is
    /// set on a server-searched resource, the full list otherwise.
    fn list_params(&self) -> ListParams {
        let term = self.page.search_term.trim();
        if self.descriptor.server_side_search && !term.is_empty() {
            ListParams::search(term)
        } else {
            ListParams::all()
        }
    }

    fn issue(&mut self, delay: Duration) -> PendingReload<T> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.loading_state = LoadingState::Loading;
        tracing::debug!(
            resource = T::FAMILY.path(),
            generation,
            delay_ms = delay.as_millis() as u64,
            "Reload issued"
        );
        PendingReload {
            generation,
            latest: Arc::clone(&self.generation),
            repository: Arc::clone(&self.repository),
            params: self.list_params(),
            delay,
        }
    }

    pub fn begin_reload(&mut self) -> PendingReload<T> {
        self.issue(Duration::ZERO)
    }

    /// Apply a finished fetch unless a newer one has been issued since.
    pub fn apply(&mut self, outcome: FetchOutcome<T>) -> Result<(), ConsoleError> {
        let latest = self.generation.load(Ordering::SeqCst);
        if outcome.generation != latest {
            tracing::debug!(
                resource = T::FAMILY.path(),
                generation = outcome.generation,
                latest,
                "Discarding stale list response"
            );
            return Err(ConsoleError::StaleResponseDiscarded {
                generation: outcome.generation,
            });
        }

        match outcome.result {
            Ok(rows) => {
                tracing::debug!(
                    resource = T::FAMILY.path(),
                    generation = outcome.generation,
                    rows = rows.len(),
                    "List loaded"
                );
                self.data = rows;
                self.loading_state = LoadingState::Loaded;
                self.last_error = None;
                self.clamp_page();
            }
            Err(e) => {
                tracing::warn!(resource = T::FAMILY.path(), error = %e, "List reload failed");
                self.loading_state = LoadingState::Failed;
                self.last_error = Some(e);
            }
        }
        Ok(())
    }

    pub async fn reload(&mut self) {
        let outcome = self.begin_reload().fetch().await;
        // Holding `&mut self` throughout, so nothing newer can have been issued.
        let _ = self.apply(outcome);
    }

    /// Rows after search and filters, in display order.
    pub fn filtered(&self) -> Vec<T> {
        filter::apply(
            &self.data,
            &self.descriptor,
            &self.page.search_term,
            &self.page.filters,
            self.clock.now(),
        )
    }

    fn clamp_page(&mut self) {
        let pages = total_pages(self.filtered().len(), self.page.items_per_page);
        if self.page.current_page > pages {
            self.page.current_page = pages;
        }
    }

    fn find(&self, id: ResourceId) -> Result<T, ConsoleError> {
        self.data
            .iter()
            .find(|row| row.id() == id)
            .cloned()
            .ok_or_else(|| ConsoleError::NotFound(format!("{} #{id}", T::FAMILY.noun())))
    }
}

#[async_trait]
impl<T: Resource> Reload for ListStore<T> {
    async fn reload(&mut self) {
        ListStore::reload(self).await;
    }
}

/// One admin list page for resource `T`.
pub struct ListController<T: Resource> {
    store: ListStore<T>,
    coordinator: MutationCoordinator<T>,
}

impl<T: Resource> ListController<T> {
    pub fn new(
        repository: Arc<dyn Repository<T>>,
        capabilities: Capabilities,
        clock: Arc<dyn Clock>,
        settings: ListSettings,
    ) -> Self {
        let descriptor = Arc::new(T::descriptor());
        Self {
            coordinator: MutationCoordinator::new(
                Arc::clone(&descriptor),
                Arc::clone(&repository),
                capabilities,
                Arc::clone(&clock),
            ),
            store: ListStore::new(descriptor, repository, clock, settings),
        }
    }

    /// Replace the whole page state at once, without fetching.
    pub fn with_state(mut self, mut state: PageState) -> Self {
        state.current_page = state.current_page.max(1);
        state.items_per_page = state.items_per_page.max(1);
        self.store.page = state;
        self
    }

    pub fn page_state(&self) -> &PageState {
        &self.store.page
    }

    pub fn data(&self) -> &[T] {
        &self.store.data
    }

    pub fn loading_state(&self) -> LoadingState {
        self.store.loading_state
    }

    pub fn last_error(&self) -> Option<&ConsoleError> {
        self.store.last_error.as_ref()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.coordinator.capabilities()
    }

    /// Update the search term and go back to page 1.
    ///
    /// Client-searched resources filter loaded rows and return `None`. A
    /// server-searched resource whose query changed returns the fetch to run:
    /// debounced while a term is present, immediate when it was cleared.
    pub fn set_search_term(&mut self, term: impl Into<String>) -> Option<PendingReload<T>> {
        let before = self.store.list_params();
        self.store.page.search_term = term.into();
        self.store.page.current_page = 1;

        if !self.store.descriptor.server_side_search {
            return None;
        }
        let after = self.store.list_params();
        if after == before {
            return None;
        }
        let delay = if after.search.is_some() {
            self.store.settings.search_debounce
        } else {
            Duration::ZERO
        };
        Some(self.store.issue(delay))
    }

    pub fn apply_filters(&mut self, filters: FilterSet) {
        self.store.page.filters = filters;
        self.store.page.current_page = 1;
    }

    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        self.store.page.items_per_page = items_per_page.max(1);
        self.store.page.current_page = 1;
    }

    /// Move to `page` without resetting; a page past the end shows no rows.
    pub fn set_page(&mut self, page: usize) {
        self.store.page.current_page = page.max(1);
    }

    pub fn begin_reload(&mut self) -> PendingReload<T> {
        self.store.begin_reload()
    }

    pub fn apply(&mut self, outcome: FetchOutcome<T>) -> Result<(), ConsoleError> {
        self.store.apply(outcome)
    }

    pub async fn reload(&mut self) {
        self.store.reload().await;
    }

    /// Refresh when the page becomes visible again.
    pub async fn on_visibility_change(&mut self, visible: bool) {
        if visible {
            self.store.reload().await;
        }
    }

    pub fn view(&self) -> ListView<T> {
        let rows = self.store.filtered();
        let page = &self.store.page;
        let paged = paginate(&rows, page.current_page, page.items_per_page);
        ListView {
            items: paged.items,
            total_pages: paged.total_pages,
            total_items: paged.total,
            current_page: paged.page,
            items_per_page: paged.per_page,
            search_term: page.search_term.clone(),
            filters: page.filters.clone(),
            loading_state: self.store.loading_state,
            last_error: self.store.last_error.as_ref().map(ToString::to_string),
            capabilities: self.coordinator.capabilities(),
        }
    }

    /// Forbidden callers are turned away before their draft is validated.
    pub async fn create(&mut self, draft: &T::Draft) -> Result<(), ConsoleError> {
        self.capabilities().require(MutationKind::Create, T::FAMILY)?;
        draft.validate()?;
        self.coordinator.create(draft, &mut self.store).await
    }

    pub async fn update(&mut self, id: ResourceId, draft: &T::Draft) -> Result<(), ConsoleError> {
        self.capabilities().require(MutationKind::Update, T::FAMILY)?;
        draft.validate()?;
        let target = self.store.find(id)?;
        self.coordinator.update(&target, draft, &mut self.store).await
    }

    pub async fn delete(&mut self, id: ResourceId) -> Result<(), ConsoleError> {
        let target = self.store.find(id)?;
        self.coordinator.delete(&target, &mut self.store).await
    }

    pub async fn change_status(&mut self, id: ResourceId, status: i64) -> Result<(), ConsoleError> {
        let target = self.store.find(id)?;
        self.coordinator
            .change_status(&target, status, &mut self.store)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::{Account, AccountDraft, STATUS_INACTIVE};
    use crate::models::category::{Category, CategoryDraft};
    use crate::models::discount::DiscountEvent;
    use crate::repository::InMemoryRepository;
    use crate::services::status::{FixedClock, Status};
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn category(id: i64) -> Category {
        Category {
            category_id: id,
            category_name: format!("Category {id:02}"),
            description: None,
        }
    }

    fn categories(n: i64) -> Vec<Category> {
        (1..=n).map(category).collect()
    }

    fn controller<T: Resource>(
        repo: Arc<dyn Repository<T>>,
        capabilities: Capabilities,
    ) -> ListController<T> {
        ListController::new(
            repo,
            capabilities,
            Arc::new(FixedClock(now())),
            ListSettings {
                default_page_size: 10,
                search_debounce: Duration::from_millis(40),
            },
        )
    }

    /// Repository answering list fetches from a script of (delay, rows).
    struct ScriptedRepository {
        script: Mutex<VecDeque<(Duration, Vec<Category>)>>,
    }

    impl ScriptedRepository {
        fn new(script: Vec<(Duration, Vec<Category>)>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    #[async_trait]
    impl Repository<Category> for ScriptedRepository {
        async fn get_list(&self, _params: &ListParams) -> Result<Vec<Category>, ConsoleError> {
            let next = self.script.lock().unwrap().pop_front();
            let (delay, rows) = next.expect("script exhausted");
            tokio::time::sleep(delay).await;
            Ok(rows)
        }

        async fn create(&self, _draft: &CategoryDraft) -> Result<Option<Category>, ConsoleError> {
            unimplemented!()
        }

        async fn update(
            &self,
            _id: ResourceId,
            _draft: &CategoryDraft,
        ) -> Result<Option<Category>, ConsoleError> {
            unimplemented!()
        }

        async fn delete(&self, _id: ResourceId) -> Result<(), ConsoleError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn first_load_moves_idle_to_loaded() {
        let repo = Arc::new(InMemoryRepository::with_rows(categories(23)));
        let mut list = controller::<Category>(repo, Capabilities::ALL);
        assert_eq!(list.loading_state(), LoadingState::Idle);

        list.reload().await;

        let view = list.view();
        assert_eq!(view.loading_state, LoadingState::Loaded);
        assert_eq!(view.total_items, 23);
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.items.len(), 10);
    }

    #[tokio::test]
    async fn search_and_filters_reset_page() {
        let repo = Arc::new(InMemoryRepository::with_rows(categories(23)));
        let mut list = controller::<Category>(repo, Capabilities::ALL);
        list.reload().await;

        list.set_page(3);
        assert_eq!(list.view().items.len(), 3);
        assert!(list.set_search_term("category").is_none());
        assert_eq!(list.page_state().current_page, 1);

        list.set_page(2);
        list.apply_filters(FilterSet::default());
        assert_eq!(list.page_state().current_page, 1);

        list.set_page(2);
        list.set_items_per_page(5);
        assert_eq!(list.page_state().current_page, 1);
        assert_eq!(list.view().total_pages, 5);
    }

    #[tokio::test]
    async fn set_page_does_not_reset() {
        let repo = Arc::new(InMemoryRepository::with_rows(categories(23)));
        let mut list = controller::<Category>(repo, Capabilities::ALL);
        list.reload().await;

        list.set_page(2);
        assert_eq!(list.page_state().current_page, 2);
        list.set_page(9);
        let view = list.view();
        assert_eq!(view.current_page, 9);
        assert!(view.items.is_empty());
    }

    #[tokio::test]
    async fn reload_clamps_page_when_list_shrinks() {
        let repo = Arc::new(InMemoryRepository::with_rows(categories(23)));
        let mut list = controller::<Category>(repo.clone(), Capabilities::ALL);
        list.reload().await;
        list.set_page(3);

        for id in 11..=23 {
            repo.delete(id).await.unwrap();
        }
        list.reload().await;

        assert_eq!(list.page_state().current_page, 1);
        assert_eq!(list.view().items.len(), 10);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_rows() {
        let repo = Arc::new(InMemoryRepository::with_rows(categories(4)));
        let mut list = controller::<Category>(repo.clone(), Capabilities::ALL);
        list.reload().await;

        repo.fail_next("Service unavailable");
        list.reload().await;

        let view = list.view();
        assert_eq!(view.loading_state, LoadingState::Failed);
        assert_eq!(view.last_error.as_deref(), Some("Service unavailable"));
        assert_eq!(view.total_items, 4);

        list.reload().await;
        assert_eq!(list.loading_state(), LoadingState::Loaded);
        assert!(list.last_error().is_none());
    }

    #[tokio::test]
    async fn failed_first_load_has_no_rows() {
        let repo = Arc::new(InMemoryRepository::with_rows(categories(4)));
        let mut list = controller::<Category>(repo.clone(), Capabilities::ALL);

        repo.fail_next("down");
        list.reload().await;

        let view = list.view();
        assert_eq!(view.loading_state, LoadingState::Failed);
        assert_eq!(view.last_error.as_deref(), Some("down"));
        assert!(view.items.is_empty());
        assert_eq!(view.total_items, 0);
        assert_eq!(view.total_pages, 1);
    }

    #[tokio::test]
    async fn later_reload_wins_when_applied_out_of_order() {
        let repo = Arc::new(InMemoryRepository::with_rows(categories(2)));
        let mut list = controller::<Category>(repo.clone(), Capabilities::ALL);

        let first = list.begin_reload();
        let first = first.fetch().await;
        repo.insert(category(3)).await;
        let second = list.begin_reload().fetch().await;

        list.apply(second).unwrap();
        let err = list.apply(first).unwrap_err();

        assert!(matches!(err, ConsoleError::StaleResponseDiscarded { generation: 1 }));
        assert_eq!(list.data().len(), 3);
        assert_eq!(list.loading_state(), LoadingState::Loaded);
    }

    #[tokio::test]
    async fn slow_first_response_is_discarded() {
        let repo = Arc::new(ScriptedRepository::new(vec![
            (Duration::from_millis(120), categories(1)),
            (Duration::from_millis(5), categories(2)),
        ]));
        let mut list = controller::<Category>(repo, Capabilities::ALL);

        let first = list.begin_reload();
        let second = list.begin_reload();
        let (first, second) = tokio::join!(first.fetch(), second.fetch());

        // Second resolves first; the late first response must not overwrite it.
        list.apply(second).unwrap();
        assert!(list.apply(first).is_err());
        assert_eq!(list.data().len(), 2);
    }

    fn windowed_event(id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> DiscountEvent {
        DiscountEvent {
            event_id: id,
            event_name: format!("Event {id}"),
            description: None,
            discount_value: 10.0,
            time_start: start,
            time_end: end,
        }
    }

    #[tokio::test]
    async fn status_filter_uses_injected_clock() {
        let day = chrono::Duration::days(1);
        let repo = Arc::new(InMemoryRepository::with_rows(vec![
            windowed_event(1, now() + day, now() + day * 2),
            windowed_event(2, now() - day, now() + day),
            windowed_event(3, now() - day * 3, now() - day),
        ]));
        let mut list = controller::<DiscountEvent>(repo, Capabilities::ALL);
        list.reload().await;

        list.apply_filters(FilterSet::default().with_status(Status::Scheduled));
        let view = list.view();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].event_id, 1);
    }

    #[tokio::test]
    async fn delete_through_controller_reloads_once() {
        let repo = Arc::new(InMemoryRepository::with_rows(categories(3)));
        let mut list = controller::<Category>(repo.clone(), Capabilities::ALL);
        list.reload().await;

        list.delete(2).await.unwrap();

        assert_eq!(repo.calls().delete, 1);
        assert_eq!(repo.calls().get_list, 2);
        assert_eq!(list.view().total_items, 2);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_repository() {
        let repo = Arc::new(InMemoryRepository::<Category>::new());
        let mut list = controller::<Category>(repo.clone(), Capabilities::ALL);

        let err = list
            .create(&CategoryDraft {
                category_name: String::new(),
                description: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ConsoleError::Validation(_)));
        assert_eq!(repo.calls().create, 0);
    }

    #[tokio::test]
    async fn forbidden_caller_is_rejected_before_validation() {
        let repo = Arc::new(InMemoryRepository::with_rows(categories(1)));
        let mut list = controller::<Category>(repo.clone(), Capabilities::NONE);
        list.reload().await;
        let invalid = CategoryDraft {
            category_name: String::new(),
            description: None,
        };

        let err = list.create(&invalid).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Forbidden(_)));
        let err = list.update(1, &invalid).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Forbidden(_)));

        assert_eq!(repo.calls().create, 0);
        assert_eq!(repo.calls().update, 0);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let repo = Arc::new(InMemoryRepository::with_rows(categories(1)));
        let mut list = controller::<Category>(repo.clone(), Capabilities::ALL);
        list.reload().await;

        assert!(list.delete(42).await.unwrap_err().is_not_found());
        assert_eq!(repo.calls().delete, 0);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_list_untouched() {
        let repo = Arc::new(InMemoryRepository::with_rows(categories(3)));
        let mut list = controller::<Category>(repo.clone(), Capabilities::ALL);
        list.reload().await;
        let before = list.data().to_vec();

        repo.fail_next("Category still has products");
        assert!(list.delete(1).await.is_err());

        assert_eq!(list.data(), before.as_slice());
        assert_eq!(repo.calls().get_list, 1);
    }

    fn account(name: &str) -> AccountDraft {
        AccountDraft {
            user_name: name.to_string(),
            email: format!("{name}@cellar.test"),
            full_name: None,
            role_id: 3,
            tier_id: None,
        }
    }

    async fn seeded_accounts() -> Arc<InMemoryRepository<Account>> {
        let repo = Arc::new(InMemoryRepository::<Account>::new());
        for name in ["anna", "bruno", "annika"] {
            repo.create(&account(name)).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn server_side_search_switches_data_source() {
        let repo = seeded_accounts().await;
        let mut list = controller::<Account>(repo.clone(), Capabilities::ALL);
        list.reload().await;
        assert_eq!(list.view().total_items, 3);

        let pending = list.set_search_term("ann").expect("search fetch");
        assert_eq!(pending.params(), &ListParams::search("ann"));
        let outcome = pending.fetch().await;
        list.apply(outcome).unwrap();
        assert_eq!(list.view().total_items, 2);

        let pending = list.set_search_term("  ").expect("full list fetch");
        assert_eq!(pending.params(), &ListParams::all());
        let outcome = pending.fetch().await;
        list.apply(outcome).unwrap();
        assert_eq!(list.view().total_items, 3);
    }

    #[tokio::test]
    async fn debounced_search_skips_superseded_fetch() {
        let repo = seeded_accounts().await;
        let mut list = controller::<Account>(repo.clone(), Capabilities::ALL);

        let typed_a = list.set_search_term("a").expect("fetch");
        let typed_an = list.set_search_term("an").expect("fetch");
        let (a, an) = tokio::join!(typed_a.fetch(), typed_an.fetch());

        assert!(matches!(a.result, Err(ConsoleError::StaleResponseDiscarded { .. })));
        assert_eq!(repo.calls().get_list, 1);
        assert!(list.apply(a).is_err());
        list.apply(an).unwrap();
        assert_eq!(list.view().total_items, 2);
    }

    #[tokio::test]
    async fn client_side_search_needs_no_fetch() {
        let repo = Arc::new(InMemoryRepository::with_rows(categories(12)));
        let mut list = controller::<Category>(repo.clone(), Capabilities::ALL);
        list.reload().await;

        assert!(list.set_search_term("category 1").is_none());
        assert_eq!(list.view().total_items, 3);
        assert_eq!(repo.calls().get_list, 1);
    }

    #[tokio::test]
    async fn becoming_visible_reloads() {
        let repo = Arc::new(InMemoryRepository::with_rows(categories(2)));
        let mut list = controller::<Category>(repo.clone(), Capabilities::ALL);

        list.on_visibility_change(false).await;
        assert_eq!(repo.calls().get_list, 0);
        list.on_visibility_change(true).await;
        assert_eq!(repo.calls().get_list, 1);
        assert_eq!(list.view().total_items, 2);
    }

    #[tokio::test]
    async fn status_change_through_controller() {
        let repo = seeded_accounts().await;
        let mut list = controller::<Account>(repo.clone(), Capabilities::ALL);
        list.reload().await;

        list.change_status(2, STATUS_INACTIVE).await.unwrap();

        let view = list.view();
        let bruno = view.items.iter().find(|a| a.user_id == 2).unwrap();
        assert_eq!(bruno.status_id, STATUS_INACTIVE);
    }

    #[tokio::test]
    async fn account_status_filter_reads_persisted_status() {
        let repo = seeded_accounts().await;
        repo.change_status(2, STATUS_INACTIVE).await.unwrap();
        let mut list = controller::<Account>(repo, Capabilities::ALL);
        list.reload().await;

        list.apply_filters(FilterSet::default().with_status(Status::Inactive));
        let ids: Vec<_> = list.view().items.iter().map(|a| a.user_id).collect();
        assert_eq!(ids, vec![2]);

        list.apply_filters(FilterSet::default().with_status(Status::Active));
        let ids: Vec<_> = list.view().items.iter().map(|a| a.user_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn view_reports_capabilities() {
        let repo = Arc::new(InMemoryRepository::<Category>::new());
        let list = controller::<Category>(repo, Capabilities::NONE);
        assert_eq!(list.view().capabilities, Capabilities::NONE);
    }
}

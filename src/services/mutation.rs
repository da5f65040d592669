//! Mutation coordinator: permission and lifecycle checks around one
//! repository call, then a full reload.
//!
//! Order of checks for every mutation:
//! 1. the capability set must allow the action (`Forbidden`);
//! 2. the target's currently derived status must pass the lifecycle gate
//!    (`BlockedByLifecycle`), so a blocked action never reaches the network;
//! 3. exactly one repository call. A failure is returned as-is and nothing
//!    is reloaded, leaving the list exactly as it was;
//! 4. on success, exactly one reload through [`Reload`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{ConsoleError, MutationKind};
use crate::repository::Repository;
use crate::services::permissions::Capabilities;
use crate::services::resource::{Resource, ResourceDescriptor};
use crate::services::status::Clock;

/// Something that re-fetches the list after a successful mutation.
#[async_trait]
pub trait Reload: Send {
    async fn reload(&mut self);
}

/// Runs create/update/delete/status changes for one resource family.
pub struct MutationCoordinator<T: Resource> {
    descriptor: Arc<ResourceDescriptor<T>>,
    repository: Arc<dyn Repository<T>>,
    capabilities: Capabilities,
    clock: Arc<dyn Clock>,
}

impl<T: Resource> MutationCoordinator<T> {
    pub fn new(
        descriptor: Arc<ResourceDescriptor<T>>,
        repository: Arc<dyn Repository<T>>,
        capabilities: Capabilities,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            descriptor,
            repository,
            capabilities,
            clock,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub async fn create<R: Reload + ?Sized>(
        &self,
        draft: &T::Draft,
        reloader: &mut R,
    ) -> Result<(), ConsoleError> {
        self.capabilities.require(MutationKind::Create, T::FAMILY)?;
        let result = self.repository.create(draft).await.map(|_| ());
        self.finish(MutationKind::Create, None, result, reloader).await
    }

    pub async fn update<R: Reload + ?Sized>(
        &self,
        target: &T,
        draft: &T::Draft,
        reloader: &mut R,
    ) -> Result<(), ConsoleError> {
        self.precheck(MutationKind::Update, target)?;
        let result = self.repository.update(target.id(), draft).await.map(|_| ());
        self.finish(MutationKind::Update, Some(target), result, reloader)
            .await
    }

    pub async fn delete<R: Reload + ?Sized>(
        &self,
        target: &T,
        reloader: &mut R,
    ) -> Result<(), ConsoleError> {
        self.precheck(MutationKind::Delete, target)?;
        let result = self.repository.delete(target.id()).await;
        self.finish(MutationKind::Delete, Some(target), result, reloader)
            .await
    }

    /// Set a persisted status value (accounts: 1 active, 2 inactive).
    pub async fn change_status<R: Reload + ?Sized>(
        &self,
        target: &T,
        status: i64,
        reloader: &mut R,
    ) -> Result<(), ConsoleError> {
        if !self.descriptor.status_change {
            return Err(ConsoleError::Unsupported(format!(
                "{} rows have no persisted status",
                T::FAMILY.noun()
            )));
        }
        self.precheck(MutationKind::ChangeStatus, target)?;
        let result = self.repository.change_status(target.id(), status).await;
        self.finish(MutationKind::ChangeStatus, Some(target), result, reloader)
            .await
    }

    fn precheck(&self, action: MutationKind, target: &T) -> Result<(), ConsoleError> {
        self.capabilities.require(action, T::FAMILY)?;
        if let Some(gate) = &self.descriptor.lifecycle_gate {
            let status = target.status(self.clock.now());
            if let Err(e) = gate.check(action, T::FAMILY, status) {
                tracing::debug!(
                    resource = T::FAMILY.path(),
                    id = target.id(),
                    ?status,
                    %action,
                    "Mutation blocked by lifecycle gate"
                );
                return Err(e);
            }
        }
        Ok(())
    }

    async fn finish<R: Reload + ?Sized>(
        &self,
        action: MutationKind,
        target: Option<&T>,
        result: Result<(), ConsoleError>,
        reloader: &mut R,
    ) -> Result<(), ConsoleError> {
        let id = target.map(Resource::id);
        match result {
            Ok(()) => {
                tracing::info!(resource = T::FAMILY.path(), ?id, %action, "Mutation applied");
                reloader.reload().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    resource = T::FAMILY.path(),
                    ?id,
                    %action,
                    error = %e,
                    "Mutation rejected by repository"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::{Account, AccountDraft, STATUS_ACTIVE, STATUS_INACTIVE};
    use crate::models::category::{Category, CategoryDraft};
    use crate::models::discount::{DiscountEvent, DiscountEventDraft};
    use crate::repository::InMemoryRepository;
    use crate::services::status::{FixedClock, Status};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    #[derive(Default)]
    struct CountingReload {
        count: usize,
    }

    #[async_trait]
    impl Reload for CountingReload {
        async fn reload(&mut self) {
            self.count += 1;
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn event(id: i64, start_offset_days: i64, end_offset_days: i64) -> DiscountEvent {
        DiscountEvent {
            event_id: id,
            event_name: format!("Harvest sale {id}"),
            description: None,
            discount_value: 15.0,
            time_start: now() + Duration::days(start_offset_days),
            time_end: now() + Duration::days(end_offset_days),
        }
    }

    fn coordinator<T: Resource>(
        repo: Arc<InMemoryRepository<T>>,
        capabilities: Capabilities,
    ) -> MutationCoordinator<T> {
        MutationCoordinator::new(
            Arc::new(T::descriptor()),
            repo,
            capabilities,
            Arc::new(FixedClock(now())),
        )
    }

    #[tokio::test]
    async fn delete_scheduled_event_calls_repository_once() {
        let scheduled = event(1, 5, 10);
        let repo = Arc::new(InMemoryRepository::with_rows(vec![scheduled.clone()]));
        let mut reload = CountingReload::default();

        coordinator(repo.clone(), Capabilities::ALL)
            .delete(&scheduled, &mut reload)
            .await
            .unwrap();

        assert_eq!(repo.calls().delete, 1);
        assert_eq!(reload.count, 1);
        assert!(repo.rows().await.is_empty());
    }

    #[tokio::test]
    async fn delete_active_or_expired_event_never_reaches_repository() {
        let active = event(1, -2, 3);
        let expired = event(2, -10, -1);
        let repo = Arc::new(InMemoryRepository::with_rows(vec![
            active.clone(),
            expired.clone(),
        ]));
        let coordinator = coordinator(repo.clone(), Capabilities::ALL);
        let mut reload = CountingReload::default();

        for (target, status) in [(&active, Status::Active), (&expired, Status::Expired)] {
            let err = coordinator.delete(target, &mut reload).await.unwrap_err();
            assert_eq!(
                err,
                ConsoleError::BlockedByLifecycle {
                    action: MutationKind::Delete,
                    resource: "discount event",
                    status,
                }
            );
        }

        assert_eq!(repo.calls().delete, 0);
        assert_eq!(reload.count, 0);
        assert_eq!(repo.rows().await.len(), 2);
    }

    #[tokio::test]
    async fn expired_event_cannot_be_edited() {
        let expired = event(1, -10, -1);
        let repo = Arc::new(InMemoryRepository::with_rows(vec![expired.clone()]));
        let draft = DiscountEventDraft {
            event_name: "Renamed".to_string(),
            description: None,
            discount_value: 20.0,
            time_start: expired.time_start,
            time_end: expired.time_end,
        };
        let mut reload = CountingReload::default();

        let err = coordinator(repo.clone(), Capabilities::ALL)
            .update(&expired, &draft, &mut reload)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("currently Expired"));
        assert_eq!(repo.calls().update, 0);
    }

    #[tokio::test]
    async fn active_event_can_be_edited() {
        let active = event(1, -1, 1);
        let repo = Arc::new(InMemoryRepository::with_rows(vec![active.clone()]));
        let draft = DiscountEventDraft {
            event_name: "Extended".to_string(),
            description: None,
            discount_value: 25.0,
            time_start: active.time_start,
            time_end: active.time_end + Duration::days(7),
        };
        let mut reload = CountingReload::default();

        coordinator(repo.clone(), Capabilities::ALL)
            .update(&active, &draft, &mut reload)
            .await
            .unwrap();

        assert_eq!(repo.calls().update, 1);
        assert_eq!(reload.count, 1);
        assert_eq!(repo.rows().await[0].event_name, "Extended");
    }

    #[tokio::test]
    async fn forbidden_action_skips_repository() {
        let repo = Arc::new(InMemoryRepository::<Category>::new());
        let mut reload = CountingReload::default();
        let draft = CategoryDraft {
            category_name: "Sparkling".to_string(),
            description: None,
        };

        let err = coordinator(repo.clone(), Capabilities::NONE)
            .create(&draft, &mut reload)
            .await
            .unwrap_err();

        assert!(matches!(err, ConsoleError::Forbidden(_)));
        assert_eq!(repo.calls(), Default::default());
        assert_eq!(reload.count, 0);
    }

    #[tokio::test]
    async fn repository_failure_is_returned_without_reload() {
        let category = Category {
            category_id: 3,
            category_name: "Fortified".to_string(),
            description: None,
        };
        let repo = Arc::new(InMemoryRepository::with_rows(vec![category.clone()]));
        repo.fail_next("Category still has products");
        let mut reload = CountingReload::default();

        let err = coordinator(repo.clone(), Capabilities::ALL)
            .delete(&category, &mut reload)
            .await
            .unwrap_err();

        assert_eq!(err, ConsoleError::Repository("Category still has products".into()));
        assert_eq!(repo.calls().delete, 1);
        assert_eq!(reload.count, 0);
        assert_eq!(repo.rows().await.len(), 1);
    }

    #[tokio::test]
    async fn ungated_resource_deletes_freely() {
        let category = Category {
            category_id: 8,
            category_name: "Dessert".to_string(),
            description: None,
        };
        let repo = Arc::new(InMemoryRepository::with_rows(vec![category.clone()]));
        let mut reload = CountingReload::default();

        coordinator(repo.clone(), Capabilities::ALL)
            .delete(&category, &mut reload)
            .await
            .unwrap();

        assert_eq!(repo.calls().delete, 1);
        assert_eq!(reload.count, 1);
    }

    #[tokio::test]
    async fn account_status_change() {
        let repo = Arc::new(InMemoryRepository::<Account>::new());
        let account = repo
            .create(&AccountDraft {
                user_name: "dora".to_string(),
                email: "dora@cellar.test".to_string(),
                full_name: None,
                role_id: 3,
                tier_id: None,
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.status_id, STATUS_ACTIVE);
        let mut reload = CountingReload::default();

        coordinator(repo.clone(), Capabilities::ALL)
            .change_status(&account, STATUS_INACTIVE, &mut reload)
            .await
            .unwrap();

        assert_eq!(repo.calls().change_status, 1);
        assert_eq!(reload.count, 1);
        assert_eq!(repo.rows().await[0].status_id, STATUS_INACTIVE);
    }

    #[tokio::test]
    async fn status_change_unsupported_for_windowed_resources() {
        let scheduled = event(1, 1, 2);
        let repo = Arc::new(InMemoryRepository::with_rows(vec![scheduled.clone()]));
        let mut reload = CountingReload::default();

        let err = coordinator(repo.clone(), Capabilities::ALL)
            .change_status(&scheduled, 2, &mut reload)
            .await
            .unwrap_err();

        assert!(matches!(err, ConsoleError::Unsupported(_)));
        assert_eq!(repo.calls().change_status, 0);
    }
}

//! The canonical owner of the action collection.
//!
//! [`ActionStore`] applies mutations to an in-memory collection and knows
//! nothing about disk. [`ActionRepository`] wraps it behind an async mutex
//! and persists every mutation before it becomes visible.

use crate::errors::RepositoryError;
use crate::models::{Action, ActionData, ActionInput, ActionStats, HealthStatistics};
use crate::stats::build_stats_at;
use crate::storage::persist_data;
use crate::validation::{check_full, check_partial};
use chrono::{Local, NaiveDate};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionStore {
    data: ActionData,
}

impl ActionStore {
    pub fn new(data: ActionData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &ActionData {
        &self.data
    }

    pub fn list(&self) -> &[Action] {
        &self.data.actions
    }

    pub fn get(&self, id: u64) -> Result<&Action, RepositoryError> {
        self.data
            .actions
            .iter()
            .find(|action| action.id == id)
            .ok_or(RepositoryError::NotFound(id))
    }

    pub fn create(
        &mut self,
        input: &ActionInput,
        today: NaiveDate,
    ) -> Result<Action, RepositoryError> {
        let fields = check_full(input, today).map_err(RepositoryError::Validation)?;

        let action = Action {
            id: self.data.next_id,
            description: fields.description,
            date: fields.date,
            points: fields.points,
        };
        self.data.next_id += 1;
        self.data.actions.push(action.clone());
        Ok(action)
    }

    /// Full update: every field is required and overwritten.
    pub fn replace(
        &mut self,
        id: u64,
        input: &ActionInput,
        today: NaiveDate,
    ) -> Result<Action, RepositoryError> {
        let index = self.position(id)?;
        let fields = check_full(input, today).map_err(RepositoryError::Validation)?;

        let action = &mut self.data.actions[index];
        action.description = fields.description;
        action.date = fields.date;
        action.points = fields.points;
        Ok(action.clone())
    }

    /// Partial update: omitted fields keep their current values.
    pub fn merge(
        &mut self,
        id: u64,
        input: &ActionInput,
        today: NaiveDate,
    ) -> Result<Action, RepositoryError> {
        let index = self.position(id)?;
        let fields = check_partial(input, today).map_err(RepositoryError::Validation)?;

        let action = &mut self.data.actions[index];
        if let Some(description) = fields.description {
            action.description = description;
        }
        if let Some(date) = fields.date {
            action.date = date;
        }
        if let Some(points) = fields.points {
            action.points = points;
        }
        Ok(action.clone())
    }

    pub fn remove(&mut self, id: u64) -> Result<Action, RepositoryError> {
        let index = self.position(id)?;
        Ok(self.data.actions.remove(index))
    }

    pub fn health(&self) -> HealthStatistics {
        HealthStatistics {
            total_actions: self.data.actions.len(),
            total_points: self
                .data
                .actions
                .iter()
                .map(|action| u64::from(action.points))
                .sum(),
        }
    }

    fn position(&self, id: u64) -> Result<usize, RepositoryError> {
        self.data
            .actions
            .iter()
            .position(|action| action.id == id)
            .ok_or(RepositoryError::NotFound(id))
    }
}

#[derive(Clone)]
pub struct ActionRepository {
    data_path: PathBuf,
    store: Arc<Mutex<ActionStore>>,
}

impl ActionRepository {
    pub fn new(data_path: PathBuf, data: ActionData) -> Self {
        Self {
            data_path,
            store: Arc::new(Mutex::new(ActionStore::new(data))),
        }
    }

    pub async fn list(&self) -> Vec<Action> {
        let store = self.store.lock().await;
        let actions = store.list().to_vec();
        info!("retrieved {} actions", actions.len());
        actions
    }

    pub async fn get(&self, id: u64) -> Result<Action, RepositoryError> {
        let store = self.store.lock().await;
        match store.get(id) {
            Ok(action) => Ok(action.clone()),
            Err(err) => {
                warn!("{err}");
                Err(err)
            }
        }
    }

    pub async fn create(&self, input: &ActionInput) -> Result<Action, RepositoryError> {
        let action = self.mutate(|store, today| store.create(input, today)).await?;
        info!(id = action.id, "created action: {}", action.description);
        Ok(action)
    }

    pub async fn replace(&self, id: u64, input: &ActionInput) -> Result<Action, RepositoryError> {
        let action = self.mutate(|store, today| store.replace(id, input, today)).await?;
        info!(id, "replaced action");
        Ok(action)
    }

    pub async fn merge(&self, id: u64, input: &ActionInput) -> Result<Action, RepositoryError> {
        let action = self.mutate(|store, today| store.merge(id, input, today)).await?;
        info!(id, "updated action");
        Ok(action)
    }

    pub async fn remove(&self, id: u64) -> Result<(), RepositoryError> {
        self.mutate(|store, _| store.remove(id)).await?;
        info!(id, "deleted action");
        Ok(())
    }

    pub async fn health(&self) -> HealthStatistics {
        self.store.lock().await.health()
    }

    pub async fn stats(&self) -> ActionStats {
        let store = self.store.lock().await;
        build_stats_at(Local::now().date_naive(), store.list())
    }

    /// Applies `op` to a copy of the store, persists the copy, then swaps it
    /// in. The lock is held throughout so writers are serialized.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut ActionStore, NaiveDate) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut store = self.store.lock().await;
        let mut next = store.clone();

        let value = match op(&mut next, Local::now().date_naive()) {
            Ok(value) => value,
            Err(err) => {
                warn!("rejected mutation: {err}");
                return Err(err);
            }
        };

        if let Err(err) = persist_data(&self.data_path, next.data()).await {
            error!("failed to persist actions: {err}");
            return Err(err.into());
        }

        *store = next;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::load_data;
    use crate::validation::{FIELD_DATE, FIELD_DESCRIPTION, FIELD_POINTS};
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    fn seeded() -> (ActionStore, Action) {
        let mut store = ActionStore::default();
        let action = store
            .create(&ActionInput::new("Recycling plastic bottles", "2025-01-08", 25), today())
            .unwrap();
        (store, action)
    }

    fn validation_fields(err: RepositoryError) -> Vec<String> {
        match err {
            RepositoryError::Validation(errors) => errors.into_keys().collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_assigns_id_and_echoes_fields() {
        let (_, action) = seeded();
        assert_eq!(action.id, 1);
        assert_eq!(action.description, "Recycling plastic bottles");
        assert_eq!(action.date, NaiveDate::from_ymd_opt(2025, 1, 8).unwrap());
        assert_eq!(action.points, 25);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let (mut store, first) = seeded();
        store.remove(first.id).unwrap();
        let second = store
            .create(&ActionInput::new("Bike to work", "2025-01-09", 10), today())
            .unwrap();
        assert!(second.id > first.id);
    }

    fn single_violations() -> [(ActionInput, &'static str); 5] {
        [
            (ActionInput::new("ab", "2025-01-08", 25), FIELD_DESCRIPTION),
            (ActionInput::new("Bike to work", "2099-01-01", 10), FIELD_DATE),
            (ActionInput::new("Bike to work", "2025-01-08", 1001), FIELD_POINTS),
            (
                ActionInput {
                    description: Some(json!(12345)),
                    ..ActionInput::new("unused", "2025-01-08", 25)
                },
                FIELD_DESCRIPTION,
            ),
            (
                ActionInput {
                    date: Some(json!(20250108)),
                    ..ActionInput::new("Bike to work", "unused", 25)
                },
                FIELD_DATE,
            ),
        ]
    }

    #[test]
    fn create_rejects_exactly_the_invalid_field() {
        let mut store = ActionStore::default();
        for (input, field) in single_violations() {
            let err = store.create(&input, today()).unwrap_err();
            assert_eq!(validation_fields(err), vec![field.to_string()]);
        }
        assert!(store.list().is_empty());
        assert_eq!(store.data().next_id, 1);
    }

    #[test]
    fn replace_rejects_exactly_the_invalid_field() {
        let (mut store, action) = seeded();
        for (input, field) in single_violations() {
            let err = store.replace(action.id, &input, today()).unwrap_err();
            assert_eq!(validation_fields(err), vec![field.to_string()]);
            assert_eq!(store.get(action.id).unwrap(), &action);
        }
    }

    #[test]
    fn replace_requires_all_fields() {
        let (mut store, action) = seeded();
        let err = store.replace(action.id, &ActionInput::points_only(5), today()).unwrap_err();
        assert_eq!(
            validation_fields(err),
            vec![FIELD_DESCRIPTION.to_string(), FIELD_DATE.to_string()]
        );

        let replaced = store
            .replace(action.id, &ActionInput::new("Composting", "2025-01-09", 5), today())
            .unwrap();
        assert_eq!(replaced.id, action.id);
        assert_eq!(replaced.description, "Composting");
        assert_eq!(replaced.points, 5);
    }

    #[test]
    fn merge_changes_only_supplied_fields() {
        let (mut store, action) = seeded();
        let merged = store.merge(action.id, &ActionInput::points_only(40), today()).unwrap();
        assert_eq!(merged.points, 40);
        assert_eq!(merged.description, action.description);
        assert_eq!(merged.date, action.date);
    }

    #[test]
    fn rejected_merge_leaves_action_untouched() {
        let (mut store, action) = seeded();
        let err = store.merge(action.id, &ActionInput::points_only(1001), today()).unwrap_err();
        assert_eq!(validation_fields(err), vec![FIELD_POINTS.to_string()]);
        assert_eq!(store.get(action.id).unwrap(), &action);
    }

    #[test]
    fn missing_ids_report_not_found() {
        let (mut store, action) = seeded();
        assert!(matches!(store.get(9999), Err(RepositoryError::NotFound(9999))));
        assert!(matches!(
            store.replace(9999, &ActionInput::new("Bike to work", "2025-01-08", 1), today()),
            Err(RepositoryError::NotFound(9999))
        ));
        assert!(matches!(
            store.merge(9999, &ActionInput::points_only(1), today()),
            Err(RepositoryError::NotFound(9999))
        ));
        assert!(matches!(store.remove(9999), Err(RepositoryError::NotFound(9999))));

        store.remove(action.id).unwrap();
        assert!(matches!(store.get(action.id), Err(RepositoryError::NotFound(_))));
        assert!(matches!(store.remove(action.id), Err(RepositoryError::NotFound(_))));
    }

    #[test]
    fn health_sums_points() {
        let (mut store, _) = seeded();
        store
            .create(&ActionInput::new("Bike to work", "2025-01-09", 10), today())
            .unwrap();
        let health = store.health();
        assert_eq!(health.total_actions, 2);
        assert_eq!(health.total_points, 35);
    }

    #[tokio::test]
    async fn repository_persists_each_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actions.json");
        let repo = ActionRepository::new(path.clone(), ActionData::default());

        let created = repo
            .create(&ActionInput::new("Recycling plastic bottles", "2025-01-08", 25))
            .await
            .unwrap();
        repo.merge(created.id, &ActionInput::points_only(30)).await.unwrap();

        let on_disk = load_data(&path).await;
        assert_eq!(on_disk.actions.len(), 1);
        assert_eq!(on_disk.actions[0].points, 30);

        repo.remove(created.id).await.unwrap();
        let on_disk = load_data(&path).await;
        assert!(on_disk.actions.is_empty());
        assert_eq!(on_disk.next_id, 2);
    }

    #[tokio::test]
    async fn failed_persist_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let repo = ActionRepository::new(blocker.join("actions.json"), ActionData::default());

        let err = repo
            .create(&ActionInput::new("Recycling plastic bottles", "2025-01-08", 25))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Storage(_)));
        assert!(repo.list().await.is_empty());
    }
}

use crate::data::activity::Activity;
use crate::error::StoreError;
use crate::store::query::Condition;
use crate::store::{DocumentCollection, Filter, Pipeline, Store, Update};

const PARTICIPANTS_FIELD: &str = "participants";

/// Optional schedule constraints for listing activities.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ActivityQuery {
    pub day: Option<String>,
    /// Only activities starting at or after this `"HH:MM"`.
    pub start_time: Option<String>,
    /// Only activities ending at or before this `"HH:MM"`.
    pub end_time: Option<String>,
}

impl ActivityQuery {
    pub fn filter(&self) -> Filter {
        let mut filter = Filter::all();
        if let Some(day) = &self.day {
            filter = filter.and(Condition::DaysIn(vec![day.clone()]));
        }
        if let Some(start) = &self.start_time {
            filter = filter.and(Condition::TimeAtLeast(start.clone()));
        }
        if let Some(end) = &self.end_time {
            filter = filter.and(Condition::TimeAtMost(end.clone()));
        }
        filter
    }
}

pub trait ActivityDbExt {
    async fn list_activities(&self, query: &ActivityQuery) -> Result<Vec<Activity>, StoreError>;

    async fn get_activity(&self, name: impl AsRef<str>) -> Result<Option<Activity>, StoreError>;

    /// Every weekday with at least one activity, in plain string order.
    async fn available_days(&self) -> Result<Vec<String>, StoreError>;

    /// Returns `false` when no activity has that name.
    async fn add_participant(
        &mut self,
        activity: impl AsRef<str>,
        email: impl AsRef<str>,
    ) -> Result<bool, StoreError>;

    /// Returns `false` when no activity has that name.
    async fn remove_participant(
        &mut self,
        activity: impl AsRef<str>,
        email: impl AsRef<str>,
    ) -> Result<bool, StoreError>;
}

impl ActivityDbExt for Store {
    async fn list_activities(&self, query: &ActivityQuery) -> Result<Vec<Activity>, StoreError> {
        self.activities
            .find(&query.filter())
            .await?
            .into_iter()
            .map(Activity::try_from)
            .collect()
    }

    async fn get_activity(&self, name: impl AsRef<str>) -> Result<Option<Activity>, StoreError> {
        self.activities
            .find_one(&Filter::by_id(name.as_ref()))
            .await?
            .map(Activity::try_from)
            .transpose()
    }

    async fn available_days(&self) -> Result<Vec<String>, StoreError> {
        let rows = self.activities.aggregate(&Pipeline::distinct_days()).await?;

        Ok(rows
            .iter()
            .filter_map(|row| row.get_str("_id").ok())
            .map(str::to_string)
            .collect())
    }

    async fn add_participant(
        &mut self,
        activity: impl AsRef<str>,
        email: impl AsRef<str>,
    ) -> Result<bool, StoreError> {
        let result = self
            .activities
            .update_one(
                &Filter::by_id(activity.as_ref()),
                &Update::push(PARTICIPANTS_FIELD, email.as_ref()),
            )
            .await?;

        let found = result.matched_count > 0;
        if found {
            tracing::debug!("Signed up {} for {}", email.as_ref(), activity.as_ref());
        } else {
            tracing::debug!("No activity named {} to sign up for", activity.as_ref());
        }
        Ok(found)
    }

    async fn remove_participant(
        &mut self,
        activity: impl AsRef<str>,
        email: impl AsRef<str>,
    ) -> Result<bool, StoreError> {
        let result = self
            .activities
            .update_one(
                &Filter::by_id(activity.as_ref()),
                &Update::pull(PARTICIPANTS_FIELD, email.as_ref()),
            )
            .await?;

        let found = result.matched_count > 0;
        if found {
            tracing::debug!("Unregistered {} from {}", email.as_ref(), activity.as_ref());
        } else {
            tracing::debug!("No activity named {} to unregister from", activity.as_ref());
        }
        Ok(found)
    }
}

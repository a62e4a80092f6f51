//! Event service: lifecycle management and registration commits.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::retry::ConflictRetryPolicy;
use crate::domain::{
    Event, EventDraft, EventId, EventLocks, EventStatus, EventSummary, FeedBus, FeedEvent,
    Registration, RegistrationConfigPatch, RegistrationRequest, RequestingUser, apply_registration,
    count_active_participants, project_event_for_listing, project_event_for_student,
};
use crate::error::CampusError;
use crate::persistence::{EventFilter, EventStore, StoreError, Versioned};

/// Result of a committed registration.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationOutcome {
    /// The record that was appended.
    pub registration: Registration,
    /// The event as the registrant now sees it.
    pub event: EventSummary,
}

/// Orchestration layer for events and registrations.
///
/// Every write follows the same path: take the event's in-process lock,
/// load the current version, apply the change to the snapshot, save
/// conditionally on that version, then publish a [`FeedEvent`] unless the
/// event is still a draft. A version conflict (another process wrote
/// first) re-runs the whole sequence on a fresh snapshot, up to the
/// [`ConflictRetryPolicy`] budget.
#[derive(Debug, Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
    locks: Arc<EventLocks>,
    feed_bus: FeedBus,
    retry: ConflictRetryPolicy,
}

impl EventService {
    /// Creates a new `EventService`.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>, feed_bus: FeedBus, retry: ConflictRetryPolicy) -> Self {
        Self {
            store,
            locks: Arc::new(EventLocks::new()),
            feed_bus,
            retry,
        }
    }

    /// Returns a reference to the inner [`FeedBus`].
    #[must_use]
    pub fn feed_bus(&self) -> &FeedBus {
        &self.feed_bus
    }

    /// Creates a `Draft` event owned by `organizer`.
    ///
    /// # Errors
    ///
    /// [`CampusError::Forbidden`] for students, [`CampusError::InvalidRequest`]
    /// for an invalid draft, or a store failure.
    pub async fn create_event(
        &self,
        organizer: &RequestingUser,
        draft: EventDraft,
    ) -> Result<EventSummary, CampusError> {
        if !organizer.can_manage_events() {
            return Err(CampusError::Forbidden(
                "only organizers can create events".to_string(),
            ));
        }
        let event = Event::create(organizer.id, draft)?;
        self.store.insert(&event).await?;

        info!(event_id = %event.id, organizer_id = %organizer.id, "event created");
        Ok(project_event_for_listing(&event))
    }

    /// Moves an event to `next`.
    ///
    /// # Errors
    ///
    /// [`CampusError::Forbidden`] unless the caller owns the event or is an
    /// admin, [`CampusError::InvalidRequest`] for a disallowed transition,
    /// [`CampusError::EventNotFound`], or [`CampusError::Busy`].
    pub async fn change_status(
        &self,
        user: &RequestingUser,
        event_id: EventId,
        next: EventStatus,
    ) -> Result<EventSummary, CampusError> {
        let (event, old_status) = self
            .commit(event_id, |event| {
                ensure_manager(user, event)?;
                let old = event.status;
                event.transition_to(next)?;
                Ok(old)
            })
            .await?;

        if old_status != next {
            if let Some(feed_event) = status_feed_event(&event, old_status) {
                let _ = self.feed_bus.publish(feed_event);
            }
            info!(%event_id, from = %old_status, to = %next, "event status changed");
        }
        Ok(project_event_for_listing(&event))
    }

    /// Applies a partial update to an event's registration policy.
    ///
    /// The patch is merged into the config of the snapshot being written,
    /// so a retried write never resurrects stale values.
    ///
    /// # Errors
    ///
    /// [`CampusError::Forbidden`] unless the caller owns the event or is an
    /// admin, [`CampusError::InvalidRequest`] for invalid values,
    /// [`CampusError::EventNotFound`], or [`CampusError::Busy`].
    pub async fn update_registration_config(
        &self,
        user: &RequestingUser,
        event_id: EventId,
        patch: &RegistrationConfigPatch,
    ) -> Result<EventSummary, CampusError> {
        let (event, ()) = self
            .commit(event_id, |event| {
                ensure_manager(user, event)?;
                let next = patch.apply_to(&event.registration);
                event.replace_registration_config(next)
            })
            .await?;

        if event.status.is_public() {
            let _ = self.feed_bus.publish(FeedEvent::RegistrationConfigUpdated {
                event_id,
                is_open: event.registration.is_open,
                participation_mode: event.registration.participation_mode,
                max_participants: event.registration.max_participants,
                timestamp: event.updated_at,
            });
        }
        info!(%event_id, is_open = event.registration.is_open, "registration config updated");
        Ok(project_event_for_listing(&event))
    }

    /// Validates and commits a registration from a raw JSON payload.
    ///
    /// The payload is parsed once, then every rule runs against a fresh
    /// snapshot on each attempt, so a retried commit never relies on a
    /// stale duplicate or capacity check.
    ///
    /// # Errors
    ///
    /// [`CampusError::Rejected`] with the first failing rule,
    /// [`CampusError::EventNotFound`], [`CampusError::Busy`] when conflicts
    /// outlast the retry budget, or a store failure.
    pub async fn register(
        &self,
        user: &RequestingUser,
        event_id: EventId,
        payload: serde_json::Value,
    ) -> Result<RegistrationOutcome, CampusError> {
        let request = RegistrationRequest::from_json(payload).inspect_err(|rejection| {
            debug!(%event_id, kind = rejection.kind(), "registration payload rejected");
        })?;

        let result = self
            .commit(event_id, |event| {
                apply_registration(event, user, &request, Utc::now()).map_err(CampusError::from)
            })
            .await;

        let (event, registration) = match result {
            Ok(committed) => committed,
            Err(CampusError::Rejected(rejection)) => {
                debug!(%event_id, student_id = %user.id, kind = rejection.kind(), "registration rejected");
                return Err(CampusError::Rejected(rejection));
            }
            Err(err) => return Err(err),
        };

        let participant_count = count_active_participants(event.participants());
        let remaining_capacity = event
            .registration
            .capacity()
            .map(|cap| cap.saturating_sub(participant_count));

        let _ = self.feed_bus.publish(FeedEvent::RegistrationCommitted {
            event_id,
            registration_type: registration.registration_type,
            head_count: registration.head_count,
            participant_count,
            remaining_capacity,
            timestamp: registration.registered_at,
        });

        info!(
            %event_id,
            student_id = %user.id,
            registration_type = registration.registration_type.as_str(),
            head_count = registration.head_count,
            participant_count,
            "registration committed"
        );

        Ok(RegistrationOutcome {
            event: project_event_for_student(&event, user.id),
            registration,
        })
    }

    /// Lists `Published` events, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a store failure.
    pub async fn list_published(&self) -> Result<Vec<EventSummary>, CampusError> {
        let events = self.store.list(EventFilter::Published).await?;
        Ok(events.iter().map(project_event_for_listing).collect())
    }

    /// Returns a publicly visible event.
    ///
    /// With a `viewer`, the summary includes their own registration.
    ///
    /// # Errors
    ///
    /// [`CampusError::EventNotFound`] for unknown events and for events in
    /// `Draft` or `Cancelled` status, or a store failure.
    pub async fn event_detail(
        &self,
        event_id: EventId,
        viewer: Option<&RequestingUser>,
    ) -> Result<EventSummary, CampusError> {
        let Versioned { value: event, .. } = self.store.load(event_id).await?;
        let may_see = event.status.is_public()
            || viewer.is_some_and(|user| event.is_owned_by(user.id) || user.is_admin());
        if !may_see {
            return Err(CampusError::EventNotFound(event_id));
        }
        Ok(match viewer {
            Some(user) => project_event_for_student(&event, user.id),
            None => project_event_for_listing(&event),
        })
    }

    /// Lists the events `organizer` owns, in any status.
    ///
    /// # Errors
    ///
    /// [`CampusError::Forbidden`] for students, or a store failure.
    pub async fn organizer_events(
        &self,
        organizer: &RequestingUser,
    ) -> Result<Vec<EventSummary>, CampusError> {
        if !organizer.can_manage_events() {
            return Err(CampusError::Forbidden(
                "only organizers have organized events".to_string(),
            ));
        }
        let events = self
            .store
            .list(EventFilter::OrganizedBy(organizer.id))
            .await?;
        Ok(events.iter().map(project_event_for_listing).collect())
    }

    /// Returns the full registration records of an event.
    ///
    /// # Errors
    ///
    /// [`CampusError::Forbidden`] unless the caller owns the event or is an
    /// admin, [`CampusError::EventNotFound`], or a store failure.
    pub async fn participants(
        &self,
        user: &RequestingUser,
        event_id: EventId,
    ) -> Result<Vec<Registration>, CampusError> {
        let Versioned { value: event, .. } = self.store.load(event_id).await?;
        ensure_manager(user, &event)?;
        Ok(event.participants().to_vec())
    }

    /// Lists events on which `student` holds an active registration.
    ///
    /// # Errors
    ///
    /// Returns a store failure.
    pub async fn my_registrations(
        &self,
        student: &RequestingUser,
    ) -> Result<Vec<EventSummary>, CampusError> {
        let events = self
            .store
            .list(EventFilter::RegisteredBy(student.id))
            .await?;
        Ok(events
            .iter()
            .filter(|event| event.active_registration_of(student.id).is_some())
            .map(|event| project_event_for_student(event, student.id))
            .collect())
    }

    /// Runs `mutate` against the latest snapshot and saves it conditionally.
    ///
    /// Holds the event's lock for the whole sequence. A failing `mutate`
    /// aborts without writing.
    async fn commit<T, F>(&self, event_id: EventId, mutate: F) -> Result<(Event, T), CampusError>
    where
        F: FnMut(&mut Event) -> Result<T, CampusError> + Send,
        T: Send,
    {
        let guard = self.locks.acquire(event_id).await;
        let result = self.commit_locked(event_id, mutate).await;
        self.locks.release(guard).await;
        result
    }

    async fn commit_locked<T, F>(
        &self,
        event_id: EventId,
        mut mutate: F,
    ) -> Result<(Event, T), CampusError>
    where
        F: FnMut(&mut Event) -> Result<T, CampusError> + Send,
        T: Send,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            let Versioned {
                value: mut event,
                version,
            } = self.store.load(event_id).await?;

            let output = mutate(&mut event)?;

            match self.store.save(&event, version).await {
                Ok(_) => return Ok((event, output)),
                Err(StoreError::Conflict { .. }) if self.retry.allows_retry_after(attempt) => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(%event_id, attempt, delay_ms = delay.as_millis(), "write conflict, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(StoreError::Conflict { .. }) => {
                    warn!(%event_id, attempt, "write conflict, retries exhausted");
                    return Err(CampusError::Busy(event_id));
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Feed notification for a status change, if the event was or became
/// public. Drafts stay off the feed.
fn status_feed_event(event: &Event, old_status: EventStatus) -> Option<FeedEvent> {
    if old_status == EventStatus::Draft && event.status == EventStatus::Published {
        return Some(FeedEvent::EventPublished {
            event_id: event.id,
            title: event.title.clone(),
            timestamp: event.updated_at,
        });
    }
    old_status.is_public().then(|| FeedEvent::EventStatusChanged {
        event_id: event.id,
        old_status,
        new_status: event.status,
        timestamp: event.updated_at,
    })
}

fn ensure_manager(user: &RequestingUser, event: &Event) -> Result<(), CampusError> {
    if event.is_owned_by(user.id) || user.is_admin() {
        Ok(())
    } else {
        Err(CampusError::Forbidden(
            "only the event's organizer can do this".to_string(),
        ))
    }
}

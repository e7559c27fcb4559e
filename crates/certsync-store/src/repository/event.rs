//! SurrealDB implementation of [`EventRecorder`].

use certsync_core::error::CertsyncResult;
use certsync_core::models::event::{Event, EventType, NewEvent, ObjectReference};
use certsync_core::repository::EventRecorder;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::parse_uid;
use crate::error::StoreError;

const EVENT_KIND: &str = "Event";

#[derive(Debug, SurrealValue)]
struct EventRow {
    involved_kind: String,
    involved_namespace: String,
    involved_name: String,
    involved_uid: String,
    event_type: String,
    reason: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl EventRow {
    fn into_event(self, id: Uuid) -> Result<Event, StoreError> {
        let event_type = parse_event_type(&self.event_type)?;
        let uid = parse_uid(EVENT_KIND, &self.involved_uid)?;
        Ok(Event {
            id,
            involved_object: ObjectReference {
                kind: self.involved_kind,
                namespace: self.involved_namespace,
                name: self.involved_name,
                uid,
            },
            event_type,
            reason: self.reason,
            message: self.message,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct EventRowWithId {
    record_id: String,
    involved_kind: String,
    involved_namespace: String,
    involved_name: String,
    involved_uid: String,
    event_type: String,
    reason: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl EventRowWithId {
    fn try_into_event(self) -> Result<Event, StoreError> {
        let id = parse_uid(EVENT_KIND, &self.record_id)?;
        EventRow {
            involved_kind: self.involved_kind,
            involved_namespace: self.involved_namespace,
            involved_name: self.involved_name,
            involved_uid: self.involved_uid,
            event_type: self.event_type,
            reason: self.reason,
            message: self.message,
            created_at: self.created_at,
        }
        .into_event(id)
    }
}

fn event_type_str(t: EventType) -> &'static str {
    match t {
        EventType::Normal => "Normal",
        EventType::Warning => "Warning",
    }
}

fn parse_event_type(s: &str) -> Result<EventType, StoreError> {
    match s {
        "Normal" => Ok(EventType::Normal),
        "Warning" => Ok(EventType::Warning),
        other => Err(StoreError::decode(
            EVENT_KIND,
            format!("unknown event type: {other}"),
        )),
    }
}

/// Event recorder that persists events into the `event` table.
#[derive(Clone)]
pub struct SurrealEventRecorder<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEventRecorder<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> EventRecorder for SurrealEventRecorder<C> {
    async fn record(&self, input: NewEvent) -> CertsyncResult<Event> {
        let id = Uuid::new_v4();
        let target = &input.involved_object;

        debug!(
            kind = %target.kind,
            namespace = %target.namespace,
            name = %target.name,
            event_type = %input.event_type,
            reason = %input.reason,
            "Recording event"
        );

        let result = self
            .db
            .query(
                "CREATE type::record('event', $id) SET \
                 involved_kind = $kind, involved_namespace = $namespace, \
                 involved_name = $name, involved_uid = $uid, \
                 event_type = $event_type, reason = $reason, \
                 message = $message",
            )
            .bind(("id", id.to_string()))
            .bind(("kind", target.kind.clone()))
            .bind(("namespace", target.namespace.clone()))
            .bind(("name", target.name.clone()))
            .bind(("uid", target.uid.to_string()))
            .bind(("event_type", event_type_str(input.event_type)))
            .bind(("reason", input.reason.clone()))
            .bind(("message", input.message.clone()))
            .await
            .map_err(StoreError::from)?;

        let mut result = result
            .check()
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let rows: Vec<EventRow> = result.take(0).map_err(StoreError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Query("event was not persisted".into()))?;

        Ok(row.into_event(id)?)
    }

    async fn list_for(&self, involved_object: &ObjectReference) -> CertsyncResult<Vec<Event>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM event \
                 WHERE involved_uid = $uid \
                 ORDER BY created_at ASC",
            )
            .bind(("uid", involved_object.uid.to_string()))
            .await
            .map_err(StoreError::from)?;

        let rows: Vec<EventRowWithId> = result.take(0).map_err(StoreError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_event())
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(items)
    }
}

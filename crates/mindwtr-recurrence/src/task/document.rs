use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value};

use super::{CompletionOutcome, RecurringTask, TaskDate};
use crate::error::{RecurrenceError, RecurrenceResult};
use crate::normalize::reconcile;
use crate::spec::Recurrence;
use crate::stored::StoredRecurrence;

const TASKS: &str = "tasks";

/// A `data.json` task file: `{ "tasks": [ ... ], ... }`.
///
/// Only the fields touched by completion are interpreted. Everything else,
/// including unknown keys on each task, is written back unchanged and in its
/// original order.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDocument {
    root: Map<String, Value>,
}

impl TaskDocument {
    /// ## Summary
    /// Reads a task file.
    ///
    /// ## Errors
    /// Returns `RecurrenceError::Json` for invalid JSON and
    /// `RecurrenceError::Document` when the top level is not an object with a
    /// `tasks` array.
    pub fn from_json_str(input: &str) -> RecurrenceResult<Self> {
        let Value::Object(root) = serde_json::from_str::<Value>(input)? else {
            return Err(RecurrenceError::Document(
                "top level must be a JSON object".to_string(),
            ));
        };

        match root.get(TASKS) {
            Some(Value::Array(_)) => Ok(Self { root }),
            Some(_) => Err(RecurrenceError::Document(
                "\"tasks\" must be an array".to_string(),
            )),
            None => Err(RecurrenceError::Document(
                "missing \"tasks\" array".to_string(),
            )),
        }
    }

    /// ## Errors
    /// Returns `RecurrenceError::Json` if serialization fails.
    pub fn to_json_string_pretty(&self) -> RecurrenceResult<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    /// Looks up a task record by id.
    #[must_use]
    pub fn task(&self, id: &str) -> Option<&Map<String, Value>> {
        self.root
            .get(TASKS)?
            .as_array()?
            .iter()
            .filter_map(Value::as_object)
            .find(|task| task.get("id").and_then(Value::as_str) == Some(id))
    }

    fn task_mut(&mut self, id: &str) -> RecurrenceResult<&mut Map<String, Value>> {
        self.root
            .get_mut(TASKS)
            .and_then(Value::as_array_mut)
            .and_then(|tasks| {
                tasks
                    .iter_mut()
                    .filter_map(Value::as_object_mut)
                    .find(|task| task.get("id").and_then(Value::as_str) == Some(id))
            })
            .ok_or_else(|| RecurrenceError::TaskNotFound(id.to_string()))
    }

    /// ## Summary
    /// Completes the task with the given id and writes the result back.
    ///
    /// - rescheduled: `startTime`/`dueDate` move to the next occurrence, the
    ///   recurrence is rewritten in its full stored form, and any
    ///   `completedAt` is cleared so the record is open again
    /// - not recurring: `status` becomes `done` and `completedAt` is set
    /// - recurrence ended: as above, and the `recurrence` key is removed
    ///
    /// `updatedAt` is set to `completed_at` in every case.
    ///
    /// ## Errors
    /// Returns `RecurrenceError::TaskNotFound` for an unknown id,
    /// `RecurrenceError::InvalidDate` for unreadable task dates, and
    /// `RecurrenceError::Validation` for a recurrence whose parts conflict.
    pub fn complete_task(
        &mut self,
        id: &str,
        completed_at: DateTime<Utc>,
        zone: Tz,
    ) -> RecurrenceResult<CompletionOutcome> {
        let task = self.task_mut(id)?;

        let recurring = RecurringTask {
            start_time: read_date(task, "startTime")?,
            due_date: read_date(task, "dueDate")?,
            recurrence: read_recurrence(task.get("recurrence"))?,
        };

        let outcome = recurring.complete(completed_at, zone);
        write_outcome(task, &outcome, &recurring.recurrence, completed_at)?;

        tracing::info!(task = id, outcome = ?outcome, "Completed task");
        Ok(outcome)
    }
}

fn write_outcome(
    task: &mut Map<String, Value>,
    outcome: &CompletionOutcome,
    recurrence: &Recurrence,
    completed_at: DateTime<Utc>,
) -> RecurrenceResult<()> {
    let timestamp = Value::String(completed_at.to_rfc3339_opts(SecondsFormat::Millis, true));

    match outcome {
        CompletionOutcome::Rescheduled {
            start_time,
            due_date,
        } => {
            write_date(task, "startTime", *start_time);
            write_date(task, "dueDate", *due_date);
            if let Some(stored) = recurrence.to_stored() {
                task.insert("recurrence".to_string(), serde_json::to_value(stored)?);
            }
            task.remove("completedAt");
        }
        CompletionOutcome::NotRecurring => {
            task.insert("status".to_string(), Value::String("done".to_string()));
            task.insert("completedAt".to_string(), timestamp.clone());
        }
        CompletionOutcome::RecurrenceEnded => {
            task.remove("recurrence");
            task.insert("status".to_string(), Value::String("done".to_string()));
            task.insert("completedAt".to_string(), timestamp.clone());
        }
    }
    task.insert("updatedAt".to_string(), timestamp);
    Ok(())
}

fn read_date(task: &Map<String, Value>, key: &str) -> RecurrenceResult<Option<TaskDate>> {
    match task.get(key) {
        Some(Value::String(value)) if !value.trim().is_empty() => TaskDate::parse(value).map(Some),
        Some(Value::String(_) | Value::Null) | None => Ok(None),
        Some(other) => Err(RecurrenceError::InvalidDate {
            value: other.to_string(),
            reason: format!("{key} must be a string"),
        }),
    }
}

fn write_date(task: &mut Map<String, Value>, key: &str, date: Option<TaskDate>) {
    if let Some(date) = date {
        task.insert(key.to_string(), Value::String(date.to_string()));
    }
}

/// Reads a `recurrence` value. Records copied out of the SQLite store may hold
/// the object as JSON text; shapes that are not a recurrence at all are
/// treated as no recurrence.
fn read_recurrence(value: Option<&Value>) -> RecurrenceResult<Recurrence> {
    let value = match value {
        None | Some(Value::Null) => return Ok(Recurrence::None),
        Some(Value::String(text)) if text.trim_start().starts_with('{') => {
            match serde_json::from_str::<Value>(text) {
                Ok(inner) => inner,
                Err(err) => {
                    tracing::warn!(error = %err, "Unreadable recurrence JSON text, ignoring");
                    return Ok(Recurrence::None);
                }
            }
        }
        Some(other) => other.clone(),
    };

    match serde_json::from_value::<StoredRecurrence>(value) {
        Ok(stored) => reconcile(&stored),
        Err(err) => {
            tracing::warn!(error = %err, "Unexpected recurrence shape, ignoring");
            Ok(Recurrence::None)
        }
    }
}

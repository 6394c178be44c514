//! Validated status transitions and process-date assignment for a request
use super::dates::{AssignableDateField, CalendarDate};
use super::error::{TransitionRejection, WorkflowError};
use super::history::{DateChange, StateChange};
use super::request::{MigratoryRequest, TimeStamp};
use super::status::RequestStatus;
use chrono::Utc;
use std::collections::BTreeMap;

impl MigratoryRequest {
    /// Checks `target` against the current status without mutating anything.
    pub fn check_transition(
        &self,
        target: RequestStatus,
        reason: &str,
    ) -> Result<(), TransitionRejection> {
        // order matters: a closed request reports the lock, and a rejection
        // without reason is reported even when the table would refuse it too
        if self.status == RequestStatus::Closed {
            return Err(TransitionRejection::Closed);
        }
        if target == RequestStatus::Rejected && reason.trim().is_empty() {
            return Err(TransitionRejection::MissingReason);
        }
        if !self.status.can_transition_to(target) {
            return Err(TransitionRejection::NotPermitted {
                from: self.status,
                to: target,
            });
        }

        Ok(())
    }

    /// Moves the request to `target`, recording who did it and why.
    /// `event_time` defaults to now; only its UTC day is recorded.
    pub fn change_status(
        &mut self,
        target: RequestStatus,
        actor: &str,
        reason: &str,
        event_time: Option<TimeStamp<Utc>>,
    ) -> Result<(), WorkflowError> {
        self.check_transition(target, reason)
            .map_err(WorkflowError::InvalidTransition)?;

        let day = event_time.unwrap_or_default().date();
        let previous = self.status;

        self.status = target;
        self.process_dates.touch(day);
        self.state_history.append(StateChange {
            actor: actor.to_string(),
            previous,
            new: target,
            date: day,
            reason: reason.to_string(),
        });

        Ok(())
    }

    /// Sets one of the assignable process dates from an ISO `YYYY-MM-DD` literal.
    /// Closed requests still accept date corrections.
    pub fn assign_process_date(
        &mut self,
        field: AssignableDateField,
        iso_value: &str,
        actor: &str,
        event_time: Option<TimeStamp<Utc>>,
    ) -> Result<(), WorkflowError> {
        let value = CalendarDate::parse_iso(iso_value)?;
        self.process_dates.check_assignment(field, value)?;

        let day = event_time.unwrap_or_default().date();
        let previous = self.process_dates.assigned(field);

        self.process_dates.set(field, value);
        self.process_dates.touch(day);
        self.date_history.append(DateChange {
            actor: actor.to_string(),
            field,
            previous,
            new: value,
            date: day,
        });

        Ok(())
    }

    /// Same as [`MigratoryRequest::assign_process_date`] with the field given by name,
    /// as it arrives from a form.
    pub fn assign_process_date_by_name(
        &mut self,
        field: &str,
        iso_value: &str,
        actor: &str,
        event_time: Option<TimeStamp<Utc>>,
    ) -> Result<(), WorkflowError> {
        let field: AssignableDateField = field.parse()?;
        self.assign_process_date(field, iso_value, actor, event_time)
    }

    /// Status changes, most recent first.
    pub fn state_history(&self) -> Vec<StateChange> {
        self.state_history.newest_first()
    }

    /// Date assignments, most recent first.
    pub fn date_history(&self) -> Vec<DateChange> {
        self.date_history.newest_first()
    }

    pub fn key_dates(&self) -> BTreeMap<&'static str, Option<String>> {
        self.process_dates.snapshot()
    }
}

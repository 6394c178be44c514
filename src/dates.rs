//! Process dates tracked against a request and the coherence rules between them
use super::error::{DateRangeViolation, WorkflowError};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const ISO_FORMAT: &str = "%Y-%m-%d";

/// A calendar day, stored and displayed as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(CalendarDate)
    }
    pub fn parse_iso(value: &str) -> Result<Self, WorkflowError> {
        NaiveDate::parse_from_str(value.trim(), ISO_FORMAT)
            .map(CalendarDate)
            .map_err(|_| WorkflowError::InvalidDate(value.to_string()))
    }
    pub fn to_naive_date(&self) -> NaiveDate {
        self.0
    }
    pub fn to_iso(&self) -> String {
        self.0.format(ISO_FORMAT).to_string()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(value: NaiveDate) -> Self {
        CalendarDate(value)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_FORMAT))
    }
}

impl<C> minicbor::Encode<C> for CalendarDate {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.str(&self.to_iso())?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for CalendarDate {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let iso = d.str()?;

        NaiveDate::parse_from_str(iso, ISO_FORMAT)
            .map(CalendarDate)
            .map_err(|_| minicbor::decode::Error::message("failed to parse stored ISO date"))
    }
}

/// Every process date a request carries, system-managed ones included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProcessDateField {
    Creation,
    LastUpdate,
    Reception,
    Submission,
    Appointment,
}

impl ProcessDateField {
    pub const ALL: [ProcessDateField; 5] = [
        ProcessDateField::Creation,
        ProcessDateField::LastUpdate,
        ProcessDateField::Reception,
        ProcessDateField::Submission,
        ProcessDateField::Appointment,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ProcessDateField::Creation => "creationDate",
            ProcessDateField::LastUpdate => "lastUpdateDate",
            ProcessDateField::Reception => "receptionDate",
            ProcessDateField::Submission => "submissionDate",
            ProcessDateField::Appointment => "appointmentDate",
        }
    }
}

/// The process dates an actor may set. Creation and last-update are kept by the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, minicbor::Encode, minicbor::Decode)]
pub enum AssignableDateField {
    #[n(0)]
    Reception,
    #[n(1)]
    Submission,
    #[n(2)]
    Appointment,
}

impl AssignableDateField {
    pub const ALL: [AssignableDateField; 3] = [
        AssignableDateField::Reception,
        AssignableDateField::Submission,
        AssignableDateField::Appointment,
    ];

    pub fn key(self) -> &'static str {
        ProcessDateField::from(self).key()
    }
}

impl From<AssignableDateField> for ProcessDateField {
    fn from(value: AssignableDateField) -> Self {
        match value {
            AssignableDateField::Reception => ProcessDateField::Reception,
            AssignableDateField::Submission => ProcessDateField::Submission,
            AssignableDateField::Appointment => ProcessDateField::Appointment,
        }
    }
}

impl fmt::Display for AssignableDateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// legacy field names are still sent by older forms
impl FromStr for AssignableDateField {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "receptionDate" | "fechaRecepcionDocs" => Ok(AssignableDateField::Reception),
            "submissionDate" | "fechaEnvioSolicitud" => Ok(AssignableDateField::Submission),
            "appointmentDate" | "fechaCita" => Ok(AssignableDateField::Appointment),
            other => Err(WorkflowError::InvalidField(other.to_string())),
        }
    }
}

/// Milestone dates of a request. Creation is fixed at construction and last-update mirrors it
/// until the first mutation; the assignable dates start unset.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct ProcessDates {
    #[n(0)]
    creation: CalendarDate,
    #[n(1)]
    last_update: CalendarDate,
    #[n(2)]
    reception: Option<CalendarDate>,
    #[n(3)]
    submission: Option<CalendarDate>,
    #[n(4)]
    appointment: Option<CalendarDate>,
}

impl ProcessDates {
    pub fn new(creation: CalendarDate) -> Self {
        Self {
            creation,
            last_update: creation,
            reception: None,
            submission: None,
            appointment: None,
        }
    }

    pub fn creation(&self) -> CalendarDate {
        self.creation
    }

    pub fn last_update(&self) -> CalendarDate {
        self.last_update
    }

    pub fn get(&self, field: ProcessDateField) -> Option<CalendarDate> {
        match field {
            ProcessDateField::Creation => Some(self.creation),
            ProcessDateField::LastUpdate => Some(self.last_update),
            ProcessDateField::Reception => self.reception,
            ProcessDateField::Submission => self.submission,
            ProcessDateField::Appointment => self.appointment,
        }
    }

    pub fn assigned(&self, field: AssignableDateField) -> Option<CalendarDate> {
        self.get(field.into())
    }

    /// Checks `value` against the creation date and keeps submission on or after reception.
    pub fn check_assignment(
        &self,
        field: AssignableDateField,
        value: CalendarDate,
    ) -> Result<(), WorkflowError> {
        if value < self.creation {
            return Err(WorkflowError::DateOutOfRange(
                DateRangeViolation::BeforeCreation { field: field.key() },
            ));
        }

        let out_of_order = match field {
            AssignableDateField::Submission => self.reception.is_some_and(|r| value < r),
            AssignableDateField::Reception => self.submission.is_some_and(|s| s < value),
            AssignableDateField::Appointment => false,
        };
        if out_of_order {
            return Err(WorkflowError::DateOutOfRange(
                DateRangeViolation::SubmissionBeforeReception,
            ));
        }

        Ok(())
    }

    // callers must run check_assignment first
    pub(crate) fn set(&mut self, field: AssignableDateField, value: CalendarDate) {
        let slot = match field {
            AssignableDateField::Reception => &mut self.reception,
            AssignableDateField::Submission => &mut self.submission,
            AssignableDateField::Appointment => &mut self.appointment,
        };
        *slot = Some(value);
    }

    // last-update never falls before creation, even for back-dated events
    pub(crate) fn touch(&mut self, date: CalendarDate) {
        self.last_update = date.max(self.creation);
    }

    /// All five dates keyed by field name, unset ones as `None`.
    pub fn snapshot(&self) -> BTreeMap<&'static str, Option<String>> {
        ProcessDateField::ALL
            .into_iter()
            .map(|field| (field.key(), self.get(field).map(|d| d.to_iso())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(iso: &str) -> CalendarDate {
        CalendarDate::parse_iso(iso).unwrap()
    }

    #[test]
    fn parses_iso_dates_and_ignores_padding() {
        assert_eq!(date(" 2026-01-15 "), CalendarDate::from_ymd(2026, 1, 15).unwrap());
    }

    #[test]
    fn rejects_malformed_dates() {
        for bad in ["2026-13-01", "15/01/2026", "2026-02-30", ""] {
            assert_eq!(
                CalendarDate::parse_iso(bad),
                Err(WorkflowError::InvalidDate(bad.to_string()))
            );
        }
    }

    #[test]
    fn system_managed_fields_are_not_assignable() {
        for key in ["creationDate", "lastUpdateDate", "fechaCreacion", "birthday"] {
            assert_eq!(
                key.parse::<AssignableDateField>(),
                Err(WorkflowError::InvalidField(key.to_string()))
            );
        }
    }

    #[test]
    fn legacy_field_names_map_onto_assignable_fields() {
        assert_eq!(
            "fechaEnvioSolicitud".parse::<AssignableDateField>(),
            Ok(AssignableDateField::Submission)
        );
        assert_eq!(
            "fechaCita".parse::<AssignableDateField>(),
            Ok(AssignableDateField::Appointment)
        );
    }

    #[test]
    fn new_dates_seed_creation_and_last_update() {
        let dates = ProcessDates::new(date("2026-01-10"));
        let snapshot = dates.snapshot();

        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot["creationDate"].as_deref(), Some("2026-01-10"));
        assert_eq!(snapshot["lastUpdateDate"].as_deref(), Some("2026-01-10"));
        assert_eq!(snapshot["receptionDate"], None);
        assert_eq!(snapshot["submissionDate"], None);
        assert_eq!(snapshot["appointmentDate"], None);
    }

    #[test]
    fn touch_is_floored_at_creation() {
        let mut dates = ProcessDates::new(date("2026-01-10"));

        dates.touch(date("2025-06-01"));
        assert_eq!(dates.last_update(), dates.creation());

        dates.touch(date("2026-02-01"));
        assert_eq!(dates.last_update(), date("2026-02-01"));
    }

    #[test]
    fn same_day_as_creation_is_accepted() {
        let dates = ProcessDates::new(date("2026-01-10"));

        for field in AssignableDateField::ALL {
            assert!(dates.check_assignment(field, date("2026-01-10")).is_ok());
        }
    }

    #[test]
    fn submission_may_equal_reception() {
        let mut dates = ProcessDates::new(date("2026-01-10"));
        dates.set(AssignableDateField::Reception, date("2026-01-15"));

        assert!(
            dates
                .check_assignment(AssignableDateField::Submission, date("2026-01-15"))
                .is_ok()
        );
    }

    #[test]
    fn reception_cannot_move_past_an_existing_submission() {
        let mut dates = ProcessDates::new(date("2026-01-10"));
        dates.set(AssignableDateField::Submission, date("2026-01-12"));

        assert_eq!(
            dates.check_assignment(AssignableDateField::Reception, date("2026-01-20")),
            Err(WorkflowError::DateOutOfRange(
                DateRangeViolation::SubmissionBeforeReception
            ))
        );
        assert!(
            dates
                .check_assignment(AssignableDateField::Reception, date("2026-01-11"))
                .is_ok()
        );
    }

    #[test]
    fn process_dates_cbor_roundtrip() {
        let mut dates = ProcessDates::new(date("2026-01-10"));
        dates.set(AssignableDateField::Appointment, date("2026-03-01"));

        let encoded = minicbor::to_vec(&dates).unwrap();
        let decoded: ProcessDates = minicbor::decode(&encoded).unwrap();

        assert_eq!(dates, decoded);
    }
}

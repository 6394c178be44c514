//! The migratory request aggregate and its supporting value types
use super::dates::{CalendarDate, ProcessDates};
use super::history::{DateChange, HistoryLog, StateChange};
use super::status::RequestStatus;
use chrono::{DateTime, TimeZone, Utc};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>)
where
    T::Offset: Copy;

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(TimeStamp)
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
    /// The UTC calendar day this instant falls on.
    pub fn date(&self) -> CalendarDate {
        self.0.date_naive().into()
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

impl From<DateTime<Utc>> for TimeStamp<Utc> {
    fn from(value: DateTime<Utc>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    #[n(0)]
    TouristVisa,
    #[n(1)]
    WorkVisa,
    #[n(2)]
    Studies,
    #[n(3)]
    Residence,
}

/// Weak reference to an applicant held by the applicant repository.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
#[cbor(array)]
pub struct ApplicantRef(#[n(0)] pub String); // national id number

/// Weak reference to the advisor in charge.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
#[cbor(array)]
pub struct AdvisorRef(#[n(0)] pub String); // advisor email

// Appointments, tasks, notifications and documents are owned by their own
// repositories, the request only tracks their ids.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments {
    #[n(0)]
    pub appointments: Vec<String>,
    #[n(1)]
    pub tasks: Vec<String>,
    #[n(2)]
    pub notifications: Vec<String>,
    #[n(3)]
    pub documents: Vec<String>,
}

/// A migratory request. Status and process dates only move through
/// [`MigratoryRequest::change_status`] and [`MigratoryRequest::assign_process_date`].
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct MigratoryRequest {
    #[n(0)]
    pub(crate) code: String,
    #[n(1)]
    pub(crate) service_type: Option<ServiceType>,
    #[n(2)]
    pub(crate) status: RequestStatus,
    #[n(3)]
    pub(crate) created_at: TimeStamp<Utc>,
    #[n(4)]
    pub(crate) expires_at: Option<TimeStamp<Utc>>,
    #[n(5)]
    pub(crate) applicant: Option<ApplicantRef>,
    #[n(6)]
    pub(crate) advisor: Option<AdvisorRef>,
    #[n(7)]
    pub(crate) attachments: Attachments,
    #[n(8)]
    pub(crate) process_dates: ProcessDates,
    #[n(9)]
    pub(crate) state_history: HistoryLog<StateChange>,
    #[n(10)]
    pub(crate) date_history: HistoryLog<DateChange>,
}

impl MigratoryRequest {
    /// A fresh request in `CREATED`, its creation date taken from `created_at`.
    pub fn new(code: impl Into<String>, created_at: TimeStamp<Utc>) -> Self {
        Self {
            code: code.into(),
            service_type: None,
            status: RequestStatus::Created,
            created_at,
            expires_at: None,
            applicant: None,
            advisor: None,
            attachments: Attachments::default(),
            process_dates: ProcessDates::new(created_at.date()),
            state_history: HistoryLog::new(),
            date_history: HistoryLog::new(),
        }
    }
    pub fn set_service_type(mut self, service_type: ServiceType) -> Self {
        self.service_type = Some(service_type);
        self
    }
    pub fn set_expires_at(mut self, expires_at: TimeStamp<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
    pub fn set_applicant(mut self, id_number: impl Into<String>) -> Self {
        self.applicant = Some(ApplicantRef(id_number.into()));
        self
    }
    pub fn set_advisor(mut self, email: impl Into<String>) -> Self {
        self.advisor = Some(AdvisorRef(email.into()));
        self
    }

    pub fn assign_applicant(&mut self, id_number: impl Into<String>) {
        self.applicant = Some(ApplicantRef(id_number.into()));
    }
    pub fn assign_advisor(&mut self, email: impl Into<String>) {
        self.advisor = Some(AdvisorRef(email.into()));
    }
    pub fn add_appointment(&mut self, appointment_id: impl Into<String>) {
        self.attachments.appointments.push(appointment_id.into());
    }
    pub fn add_task(&mut self, task_id: impl Into<String>) {
        self.attachments.tasks.push(task_id.into());
    }
    pub fn add_notification(&mut self, notification_id: impl Into<String>) {
        self.attachments.notifications.push(notification_id.into());
    }
    pub fn add_document(&mut self, document_id: impl Into<String>) {
        self.attachments.documents.push(document_id.into());
    }

    pub fn code(&self) -> &str {
        &self.code
    }
    pub fn service_type(&self) -> Option<ServiceType> {
        self.service_type
    }
    pub fn status(&self) -> RequestStatus {
        self.status
    }
    pub fn created_at(&self) -> TimeStamp<Utc> {
        self.created_at
    }
    pub fn expires_at(&self) -> Option<TimeStamp<Utc>> {
        self.expires_at
    }
    pub fn applicant(&self) -> Option<&ApplicantRef> {
        self.applicant.as_ref()
    }
    pub fn advisor(&self) -> Option<&AdvisorRef> {
        self.advisor.as_ref()
    }
    pub fn attachments(&self) -> &Attachments {
        &self.attachments
    }
    pub fn process_dates(&self) -> &ProcessDates {
        &self.process_dates
    }

    /// Serialises the request into CBOR and returns it alongside its sha256 digest.
    pub fn build(&self) -> anyhow::Result<(String, Vec<u8>)> {
        let cbor = minicbor::to_vec(self)?;
        let hash = sha256::digest(&cbor);

        Ok((hash, cbor))
    }
}

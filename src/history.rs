//! Append-only audit records of status and date changes
use super::dates::{AssignableDateField, CalendarDate};
use super::status::RequestStatus;
use std::cmp::Reverse;

/// Anything kept in a [`HistoryLog`] is stamped with the day it happened.
pub trait HistoryRecord {
    fn date(&self) -> CalendarDate;
}

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct StateChange {
    #[n(0)]
    pub actor: String, // advisor email or other audit identifier
    #[n(1)]
    pub previous: RequestStatus,
    #[n(2)]
    pub new: RequestStatus,
    #[n(3)]
    pub date: CalendarDate,
    #[n(4)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct DateChange {
    #[n(0)]
    pub actor: String,
    #[n(1)]
    pub field: AssignableDateField,
    #[n(2)]
    pub previous: Option<CalendarDate>,
    #[n(3)]
    pub new: CalendarDate,
    #[n(4)]
    pub date: CalendarDate, // when the change was made, not the value assigned
}

impl HistoryRecord for StateChange {
    fn date(&self) -> CalendarDate {
        self.date
    }
}

impl HistoryRecord for DateChange {
    fn date(&self) -> CalendarDate {
        self.date
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog<R> {
    records: Vec<R>,
}

impl<R> Default for HistoryLog<R> {
    fn default() -> Self {
        Self { records: vec![] }
    }
}

impl<R: HistoryRecord + Clone> HistoryLog<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: R) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.iter()
    }

    /// Owned copy of the records, most recent date first. Records sharing a
    /// day come out last-appended first.
    pub fn newest_first(&self) -> Vec<R> {
        let mut records: Vec<R> = self.records.iter().rev().cloned().collect();
        // stable sort keeps the reversed insertion order within a day
        records.sort_by_key(|r| Reverse(r.date()));
        records
    }
}

impl<C, R: minicbor::Encode<C>> minicbor::Encode<C> for HistoryLog<R> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        minicbor::Encode::encode(&self.records, e, ctx)
    }
}

impl<'b, C, R: minicbor::Decode<'b, C>> minicbor::Decode<'b, C> for HistoryLog<R> {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let records = minicbor::Decode::decode(d, ctx)?;

        Ok(Self { records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(reason: &str, iso: &str) -> StateChange {
        StateChange {
            actor: "alice@sgpm.test".into(),
            previous: RequestStatus::Created,
            new: RequestStatus::InReview,
            date: CalendarDate::parse_iso(iso).unwrap(),
            reason: reason.into(),
        }
    }

    #[test]
    fn newest_first_orders_by_date_descending() {
        let mut log = HistoryLog::new();
        log.append(change("a", "2026-01-10"));
        log.append(change("b", "2026-01-12"));
        log.append(change("c", "2026-01-11"));

        let reasons: Vec<_> = log.newest_first().into_iter().map(|r| r.reason).collect();
        assert_eq!(reasons, vec!["b", "c", "a"]);
    }

    #[test]
    fn same_day_records_come_out_last_inserted_first() {
        let mut log = HistoryLog::new();
        log.append(change("first", "2026-01-10"));
        log.append(change("second", "2026-01-10"));
        log.append(change("third", "2026-01-10"));
        log.append(change("older", "2026-01-09"));

        let reasons: Vec<_> = log.newest_first().into_iter().map(|r| r.reason).collect();
        assert_eq!(reasons, vec!["third", "second", "first", "older"]);
    }

    #[test]
    fn iter_walks_insertion_order() {
        let mut log = HistoryLog::new();
        log.append(change("late", "2026-01-12"));
        log.append(change("early", "2026-01-10"));

        let reasons: Vec<_> = log.iter().map(|r| r.reason.as_str()).collect();
        assert_eq!(reasons, vec!["late", "early"]);
        assert!(!log.is_empty());
    }

    #[test]
    fn returned_copy_does_not_alias_the_log() {
        let mut log = HistoryLog::new();
        log.append(change("kept", "2026-01-10"));

        let mut copy = log.newest_first();
        copy[0].reason = "tampered".into();
        copy.clear();

        assert_eq!(log.len(), 1);
        assert_eq!(log.newest_first()[0].reason, "kept");
    }

    #[test]
    fn history_log_cbor_roundtrip() {
        let mut log = HistoryLog::new();
        log.append(change("a", "2026-01-10"));
        log.append(change("b", "2026-01-11"));

        let encoded = minicbor::to_vec(&log).unwrap();
        let decoded: HistoryLog<StateChange> = minicbor::decode(&encoded).unwrap();

        assert_eq!(log, decoded);
    }
}

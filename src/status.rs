//! Request statuses and the table of permitted transitions between them
use super::error::UnknownStatus;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequestStatus {
    Created,
    InReview,
    DocumentsPending,
    Submitted,
    Approved,
    Rejected,
    Closed,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 7] = [
        RequestStatus::Created,
        RequestStatus::InReview,
        RequestStatus::DocumentsPending,
        RequestStatus::Submitted,
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::Closed,
    ];

    /// The statuses reachable in one step from `self`.
    pub fn allowed_transitions(self) -> &'static [RequestStatus] {
        use RequestStatus::*;

        match self {
            Created => &[InReview, Closed],
            InReview => &[DocumentsPending, Submitted, Rejected, Closed],
            DocumentsPending => &[InReview, Closed],
            Submitted => &[Approved, Rejected, Closed],
            Approved => &[Closed],
            Rejected => &[Closed],
            Closed => &[],
        }
    }

    pub fn can_transition_to(self, target: RequestStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Canonical code used for storage and display.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Created => "CREATED",
            RequestStatus::InReview => "IN_REVIEW",
            RequestStatus::DocumentsPending => "DOCUMENTS_PENDING",
            RequestStatus::Submitted => "SUBMITTED",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Accepts the canonical codes as well as the legacy spanish labels.
// ARCHIVED has no behaviour of its own and collapses into CLOSED here.
impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_uppercase().replace([' ', '-'], "_");

        let status = match key.as_str() {
            "CREATED" | "CREADA" => RequestStatus::Created,
            "IN_REVIEW" | "EN_REVISION" | "EN_REVISIÓN" => RequestStatus::InReview,
            "DOCUMENTS_PENDING" | "DOCUMENTOS_PENDIENTES" | "DOCS_PENDIENTES" => {
                RequestStatus::DocumentsPending
            }
            "SUBMITTED" | "ENVIADA" => RequestStatus::Submitted,
            "APPROVED" | "APROBADA" => RequestStatus::Approved,
            "REJECTED" | "RECHAZADA" => RequestStatus::Rejected,
            "CLOSED" | "CERRADA" | "ARCHIVED" | "ARCHIVADA" => RequestStatus::Closed,
            _ => return Err(UnknownStatus(s.to_string())),
        };

        Ok(status)
    }
}

impl<C> minicbor::Encode<C> for RequestStatus {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.str(self.as_str())?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for RequestStatus {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let code = d.str()?;

        code.parse()
            .map_err(|e: UnknownStatus| minicbor::decode::Error::message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_is_the_only_terminal_status() {
        let terminal: Vec<_> = RequestStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();

        assert_eq!(terminal, vec![RequestStatus::Closed]);
    }

    #[test]
    fn every_open_status_can_be_closed() {
        for status in RequestStatus::ALL {
            if status != RequestStatus::Closed {
                assert!(status.can_transition_to(RequestStatus::Closed), "{status}");
            }
        }
    }

    #[test]
    fn parses_canonical_and_legacy_labels() {
        assert_eq!("IN_REVIEW".parse::<RequestStatus>(), Ok(RequestStatus::InReview));
        assert_eq!("en revision".parse::<RequestStatus>(), Ok(RequestStatus::InReview));
        assert_eq!("Documentos pendientes".parse::<RequestStatus>(), Ok(RequestStatus::DocumentsPending));
        assert_eq!("docs-pendientes".parse::<RequestStatus>(), Ok(RequestStatus::DocumentsPending));
        assert_eq!(" Enviada ".parse::<RequestStatus>(), Ok(RequestStatus::Submitted));
    }

    #[test]
    fn archived_is_an_alias_for_closed() {
        assert_eq!("ARCHIVED".parse::<RequestStatus>(), Ok(RequestStatus::Closed));
        assert_eq!("Archivada".parse::<RequestStatus>(), Ok(RequestStatus::Closed));
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = "PAUSED".parse::<RequestStatus>().unwrap_err();
        assert_eq!(err, UnknownStatus("PAUSED".into()));
    }

    #[test]
    fn encodes_as_its_code() {
        let encoded = minicbor::to_vec(RequestStatus::DocumentsPending).unwrap();
        let mut d = minicbor::Decoder::new(&encoded);

        assert_eq!(d.str().unwrap(), "DOCUMENTS_PENDING");
    }
}

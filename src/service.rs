//! Persistence-backed API over the request workflow
use super::config::Config;
use super::dates::AssignableDateField;
use super::error::{StoreError, WorkflowError};
use super::request::{MigratoryRequest, TimeStamp};
use super::status::RequestStatus;
use super::utils;
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// A stored request together with the sha256 digest of the bytes it was read from.
#[derive(Debug, Clone)]
pub struct Revision {
    pub request: MigratoryRequest,
    pub digest: String,
}

pub struct RequestService {
    instance: Arc<sled::Db>,
    code_prefix: String,
}

impl RequestService {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self {
            instance,
            code_prefix: Config::default().code_prefix,
        }
    }

    /// Opens (or creates) the database named in `config`.
    pub fn open(config: &Config) -> anyhow::Result<Self> {
        let db = sled::open(&config.db_path)
            .with_context(|| format!("failed to open store at {}", config.db_path.display()))?;

        Ok(Self {
            instance: Arc::new(db),
            code_prefix: config.code_prefix.clone(),
        })
    }

    pub fn new_request_code(&self) -> anyhow::Result<String> {
        utils::new_uuid_to_bech32(&self.code_prefix)
    }

    /// Stores a new request. Fails if its code is already taken.
    pub fn create_request(&self, request: MigratoryRequest) -> anyhow::Result<MigratoryRequest> {
        let (digest, cbor) = request.build()?;

        let swapped = self
            .instance
            .compare_and_swap(request.code().as_bytes(), None::<&[u8]>, Some(cbor))?;
        if swapped.is_err() {
            tracing::warn!(code = request.code(), "duplicate request code");
            return Err(StoreError::DuplicateCode(request.code().to_string()).into());
        }

        tracing::info!(code = request.code(), %digest, "request created");
        Ok(request)
    }

    pub fn get_request(&self, code: &str) -> anyhow::Result<Option<MigratoryRequest>> {
        self.instance
            .get(code.as_bytes())?
            .map(|bytes| decode_request(code, &bytes))
            .transpose()
    }

    /// Loads a request along with its revision digest, for a later [`RequestService::commit`].
    pub fn fetch(&self, code: &str) -> anyhow::Result<Revision> {
        let bytes = self
            .instance
            .get(code.as_bytes())?
            .ok_or_else(|| StoreError::RequestNotFound(code.to_string()))?;

        Ok(Revision {
            request: decode_request(code, &bytes)?,
            digest: sha256::digest(&bytes.to_vec()),
        })
    }

    /// Writes `request` back if the stored bytes still match `expected_digest`.
    /// Returns the digest of the new revision.
    pub fn commit(&self, expected_digest: &str, request: &MigratoryRequest) -> anyhow::Result<String> {
        let code = request.code();
        let current = self
            .instance
            .get(code.as_bytes())?
            .ok_or_else(|| StoreError::RequestNotFound(code.to_string()))?;

        if sha256::digest(&current.to_vec()) != expected_digest {
            tracing::warn!(code, "stale revision rejected");
            return Err(StoreError::ConcurrentModification(code.to_string()).into());
        }

        let (digest, cbor) = request.build()?;
        let swapped = self
            .instance
            .compare_and_swap(code.as_bytes(), Some(current), Some(cbor))?;
        if swapped.is_err() {
            tracing::warn!(code, "request changed while committing");
            return Err(StoreError::ConcurrentModification(code.to_string()).into());
        }

        tracing::debug!(code, %digest, "request committed");
        Ok(digest)
    }

    /// Load, apply a workflow operation, then commit. Nothing is written if the operation fails.
    fn apply<F>(&self, code: &str, operation: F) -> anyhow::Result<MigratoryRequest>
    where
        F: FnOnce(&mut MigratoryRequest) -> Result<(), WorkflowError>,
    {
        let Revision {
            mut request,
            digest,
        } = self.fetch(code)?;

        if let Err(e) = operation(&mut request) {
            tracing::warn!(code, error = %e, "workflow operation rejected");
            return Err(e.into());
        }

        self.commit(&digest, &request)?;
        Ok(request)
    }

    pub fn change_status(
        &self,
        code: &str,
        target: RequestStatus,
        actor: &str,
        reason: &str,
        event_time: Option<TimeStamp<Utc>>,
    ) -> anyhow::Result<MigratoryRequest> {
        let request = self.apply(code, |r| r.change_status(target, actor, reason, event_time))?;

        tracing::info!(code, actor, status = %target, "request status changed");
        Ok(request)
    }

    pub fn assign_process_date(
        &self,
        code: &str,
        field: AssignableDateField,
        iso_value: &str,
        actor: &str,
        event_time: Option<TimeStamp<Utc>>,
    ) -> anyhow::Result<MigratoryRequest> {
        let request = self.apply(code, |r| {
            r.assign_process_date(field, iso_value, actor, event_time)
        })?;

        tracing::info!(code, actor, %field, value = iso_value, "process date assigned");
        Ok(request)
    }

    pub fn list_requests(&self) -> anyhow::Result<Vec<MigratoryRequest>> {
        self.instance
            .iter()
            .map(|entry| {
                let (key, bytes) = entry?;
                decode_request(&String::from_utf8_lossy(&key), &bytes)
            })
            .collect()
    }

    pub fn list_by_status(&self, status: RequestStatus) -> anyhow::Result<Vec<MigratoryRequest>> {
        self.list_where(|r| r.status() == status)
    }

    pub fn list_by_applicant(&self, id_number: &str) -> anyhow::Result<Vec<MigratoryRequest>> {
        self.list_where(|r| r.applicant().is_some_and(|a| a.0 == id_number))
    }

    pub fn list_by_advisor(&self, email: &str) -> anyhow::Result<Vec<MigratoryRequest>> {
        self.list_where(|r| r.advisor().is_some_and(|a| a.0 == email))
    }

    fn list_where<P>(&self, predicate: P) -> anyhow::Result<Vec<MigratoryRequest>>
    where
        P: Fn(&MigratoryRequest) -> bool,
    {
        let mut requests = self.list_requests()?;
        requests.retain(|r| predicate(r));
        Ok(requests)
    }

    pub fn exists(&self, code: &str) -> anyhow::Result<bool> {
        Ok(self.instance.contains_key(code.as_bytes())?)
    }

    /// Removes a request. Returns whether anything was stored under `code`.
    pub fn delete_request(&self, code: &str) -> anyhow::Result<bool> {
        let removed = self.instance.remove(code.as_bytes())?.is_some();
        if removed {
            tracing::info!(code, "request deleted");
        }
        Ok(removed)
    }
}

fn decode_request(code: &str, bytes: &[u8]) -> anyhow::Result<MigratoryRequest> {
    minicbor::decode(bytes).with_context(|| format!("corrupt record for request {code}"))
}

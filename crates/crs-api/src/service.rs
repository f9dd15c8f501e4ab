//! # Record Lifecycle Façade
//!
//! The thin, stateless service the stakeholder-facing surfaces (HTTP
//! routes, CLI) call into. Validates caller input, then delegates:
//! creation to the compute provider and store, verification to the
//! coordinator. No business logic lives here beyond input validation.

use std::sync::Arc;

use crs_compute::ConfidentialCompute;
use crs_core::{FieldError, OwnerId, PublicAttributes, RecordId};
use crs_protocol::{VerificationCoordinator, VerificationOutcome};
use crs_store::{Record, RecordFilter, RecordStore, StoreError};

use crate::error::ApiError;

/// Stakeholder-facing façade over the store, provider, and coordinator.
pub struct RecordLifecycleApi<P> {
    coordinator: VerificationCoordinator<P>,
}

impl<P: ConfidentialCompute> RecordLifecycleApi<P> {
    /// Build the façade from an assembled coordinator.
    pub fn new(coordinator: VerificationCoordinator<P>) -> Self {
        Self { coordinator }
    }

    /// The underlying store, for read-side access.
    pub fn store(&self) -> &Arc<RecordStore> {
        self.coordinator.store()
    }

    /// The compute provider in use.
    pub fn compute(&self) -> &Arc<P> {
        self.coordinator.compute()
    }

    /// Create a confidential record under a caller-supplied identifier.
    ///
    /// Validates the attributes and the secret value against the
    /// provider's domain, encrypts, then inserts. The secret value never
    /// reaches the store.
    ///
    /// # Errors
    ///
    /// Per-field [`ApiError::Validation`] for malformed input,
    /// [`ApiError::Encryption`] on provider failure,
    /// [`ApiError::Conflict`] if the identifier is already taken (the
    /// existing record is untouched).
    pub async fn create(
        &self,
        id: RecordId,
        owner: OwnerId,
        attributes: PublicAttributes,
        secret_value: u64,
    ) -> Result<RecordId, ApiError> {
        attributes.validate()?;
        let bound = self.compute().value_bound();
        if secret_value > bound {
            return Err(ApiError::Validation(FieldError::new(
                "secret_value",
                format!("must not exceed the provider bound {bound}"),
            )));
        }

        let encrypted = self
            .compute()
            .encrypt(secret_value, self.coordinator.context())
            .await?;

        let record = Record::new(id, owner, attributes, encrypted.handle);
        match self.store().insert(record) {
            Ok(id) => {
                tracing::info!(record_id = %id, "record created");
                Ok(id)
            }
            Err(StoreError::DuplicateId { id }) => {
                Err(ApiError::Conflict(format!("record {id} already exists")))
            }
        }
    }

    /// Read-only snapshot of one record.
    pub fn get(&self, id: &RecordId) -> Result<Record, ApiError> {
        self.store()
            .get(id)
            .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))
    }

    /// Records passing the filter, oldest first.
    pub fn list(&self, filter: &RecordFilter) -> Vec<Record> {
        let mut records = self.store().list(filter);
        records.sort_by_key(|r| (r.created_at, r.id.as_uuid().as_u128()));
        records
    }

    /// Request verification of one record; see the coordinator for the
    /// protocol. The outcome and error taxonomy pass through unchanged.
    pub async fn request_verification(
        &self,
        id: &RecordId,
    ) -> Result<VerificationOutcome, ApiError> {
        Ok(self.coordinator.request_verification(id).await?)
    }
}

// ── Request validation ──
//
// Schema checks the caller runs before handing a request to the store.
// The store itself dispatches whatever it is given.

use relaydeck_api::{CreateProxyRequest, UpdateProxyRequest};

use crate::error::StoreError;

/// Client-side schema check for an outgoing request.
pub trait Validate {
    fn validate(&self) -> Result<(), StoreError>;
}

fn non_empty(field: &'static str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation {
            field,
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

fn positive(field: &'static str, value: u32) -> Result<(), StoreError> {
    if value == 0 {
        return Err(StoreError::Validation {
            field,
            reason: "must be greater than zero".into(),
        });
    }
    Ok(())
}

impl Validate for CreateProxyRequest {
    fn validate(&self) -> Result<(), StoreError> {
        non_empty("name", &self.name)?;
        non_empty("serverLocation", &self.server_location)?;
        positive("maxConcurrentStreams", self.max_concurrent_streams)
    }
}

impl Validate for UpdateProxyRequest {
    fn validate(&self) -> Result<(), StoreError> {
        if self.is_empty() {
            return Err(StoreError::Validation {
                field: "update",
                reason: "at least one field must be set".into(),
            });
        }
        if let Some(ref name) = self.name {
            non_empty("name", name)?;
        }
        if let Some(ref location) = self.server_location {
            non_empty("serverLocation", location)?;
        }
        if let Some(max) = self.max_concurrent_streams {
            positive("maxConcurrentStreams", max)?;
        }
        Ok(())
    }
}

//! Protocol Validator
//!
//! Checks the HTTP verb and the JSON-RPC envelope before anything is
//! admitted to the dispatch queue. Every rejection except the non-POST
//! one is a well-formed JSON-RPC response.

use crate::error::{ErrorCode, RpcError, INVALID_JSONRPC_MESSAGE};
use crate::registry::Registry;
use crate::types::{RawRequest, Request, Response, JSONRPC_VERSION};
use axum::http::Method;
use serde_json::Value;
use tracing::debug;

/// Outcome of validating one HTTP call
#[derive(Debug, PartialEq)]
pub enum Validation {
    /// Verb other than POST; answered outside the JSON-RPC envelope
    NotPost,
    /// Terminal response, never queued
    Rejected(Response),
    /// Ready for admission
    Accepted(Request),
}

pub fn validate(method: &Method, body: &[u8], registry: &Registry) -> Validation {
    if method != Method::POST {
        return Validation::NotPost;
    }

    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "Rejecting unparseable body");
            return Validation::Rejected(Response::error(
                None,
                RpcError::new(ErrorCode::ParseError),
            ));
        }
    };

    // Salvage the id before the structural check so it can still be echoed
    let salvaged_id = value.get("id").and_then(Value::as_str).map(str::to_owned);

    // The body parsed as JSON, so a shape mismatch (numeric id, array body)
    // is an invalid Request (-32600), not a parse error (-32700)
    let raw: RawRequest = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => {
            return Validation::Rejected(Response::error(
                salvaged_id,
                RpcError::new(ErrorCode::InvalidRequest).with_data(e.to_string()),
            ));
        }
    };

    let Some(id) = raw.id else {
        return Validation::Rejected(Response::error(
            None,
            RpcError::new(ErrorCode::InvalidRequest).with_data("missing id"),
        ));
    };

    if raw.jsonrpc != JSONRPC_VERSION {
        return Validation::Rejected(Response::error(
            Some(id),
            RpcError::new(ErrorCode::InvalidRequest).with_message(INVALID_JSONRPC_MESSAGE),
        ));
    }

    if raw.method.is_empty() || !registry.contains(&raw.method) {
        return Validation::Rejected(Response::error(
            Some(id),
            RpcError::new(ErrorCode::MethodNotFound),
        ));
    }

    Validation::Accepted(Request {
        id,
        jsonrpc: raw.jsonrpc,
        method: raw.method,
        params: raw.params.unwrap_or_default(),
    })
}

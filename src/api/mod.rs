//! HTTP handlers. Each one parses its path and body, calls into the matching
//! service and counts itself in the instance [`Metrics`].

pub mod poll;
pub mod vote;
pub mod voter;

use crate::error::ApiError;
use actix_web::{web, HttpResponse};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

/// Call and error counters of one service instance, shared by all workers.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<Counters>,
}

struct Counters {
    started: Instant,
    calls: AtomicU64,
    errors: AtomicU64,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    #[serde(rename = "UpTime")]
    pub up_time: String,
    #[serde(rename = "TotalCalls")]
    pub total_calls: u64,
    #[serde(rename = "TotalErrors")]
    pub total_errors: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Counters {
                started: Instant::now(),
                calls: AtomicU64::new(0),
                errors: AtomicU64::new(0),
            }),
        }
    }

    /// Runs one request, counting it and logging it if it fails.
    pub async fn track<T, F>(&self, request: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        self.inner.calls.fetch_add(1, Ordering::Relaxed);
        let result = request.await;
        if let Err(err) = &result {
            self.inner.errors.fetch_add(1, Ordering::Relaxed);
            if err.is_internal() {
                error!("Request failed: {:?}", err);
            } else {
                warn!("Request rejected: {}", err);
            }
        }
        result
    }

    pub fn report(&self) -> HealthReport {
        HealthReport {
            up_time: format!("{:?}", self.inner.started.elapsed()),
            total_calls: self.inner.calls.load(Ordering::Relaxed),
            total_errors: self.inner.errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn health(metrics: web::Data<Metrics>) -> HttpResponse {
    HttpResponse::Ok().json(metrics.report())
}

pub(crate) fn parse_id<I>(what: &str, raw: &str) -> Result<I, ApiError>
where
    I: FromStr,
    I::Err: Display,
{
    raw.parse().map_err(|err| {
        ApiError::BadRequest(format!("invalid {} id {:?}: {}", what, raw, err))
    })
}

pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|err| ApiError::BadRequest(format!("malformed request body: {}", err)))
}

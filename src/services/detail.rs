//! Resolves the addresses stored in a [`Vote`] into a [`VoteDetail`].
//!
//! The voter, poll and poll option lookups are independent, so they run
//! concurrently under one shared deadline. The first failure drops the other
//! in-flight requests and no partial detail is ever returned.

use crate::db::poll::{Poll, PollOption};
use crate::db::vote::{Vote, VoteDetail};
use crate::db::voter::Voter;
use crate::error::DetailError;
use awc::Client;
use futures::future::try_join3;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, debug_span, instrument};
use tracing_futures::Instrument;

pub struct DetailResolver {
    client: Client,
    timeout: Duration,
}

impl DetailResolver {
    /// `timeout` bounds each request as well as the whole fan-out.
    pub fn new(timeout: Duration) -> Self {
        Self::with_timeouts(timeout, timeout)
    }

    /// `deadline` bounds the whole fan-out, `request_timeout` each request.
    pub fn with_timeouts(deadline: Duration, request_timeout: Duration) -> Self {
        Self {
            client: Client::build().timeout(request_timeout).finish(),
            timeout: deadline,
        }
    }

    #[instrument(skip(self, vote), fields(vote_id = vote.id.0))]
    pub async fn resolve(&self, vote: Vote) -> Result<VoteDetail, DetailError> {
        let voter = self
            .fetch::<Voter>(&vote.voter)
            .instrument(debug_span!("fetch_voter"));
        let poll = self
            .fetch::<Poll>(&vote.poll)
            .instrument(debug_span!("fetch_poll"));
        let poll_option = self
            .fetch::<PollOption>(&vote.poll_option)
            .instrument(debug_span!("fetch_poll_option"));

        let (voter, poll, poll_option) = timeout(self.timeout, try_join3(voter, poll, poll_option))
            .await
            .map_err(|_| DetailError::Timeout(self.timeout))??;

        debug!("Resolved vote references");
        Ok(VoteDetail {
            id: vote.id,
            voter,
            poll,
            poll_option,
            vote_date: vote.vote_date,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, DetailError> {
        debug!(url = url, "Fetching reference");
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| DetailError::Request {
                url: url.to_owned(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetailError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| DetailError::Decode {
                url: url.to_owned(),
                reason: err.to_string(),
            })
    }
}

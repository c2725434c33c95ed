use super::{
    ensure_same_id, ensure_unique, find_nested, insert_nested, or_existing, remove_nested,
    update_nested, Entity, EntityService, Nested,
};
use crate::db::voter::{Voter, VoterPoll, VoterPollPayload};
use crate::db::{PollId, VoterId};
use crate::error::ApiError;
use chrono::Utc;

impl Entity for Voter {
    fn merge(self, existing: &Self) -> Self {
        Self {
            id: self.id,
            first_name: or_existing(self.first_name, &existing.first_name),
            last_name: or_existing(self.last_name, &existing.last_name),
            vote_history: if self.vote_history.is_empty() {
                existing.vote_history.clone()
            } else {
                self.vote_history
            },
        }
    }

    fn validate(&self) -> Result<(), ApiError> {
        ensure_unique(&self.vote_history)
    }
}

impl Nested for VoterPoll {
    type Key = PollId;
    const NAME: &'static str = "voter poll";

    fn key(&self) -> PollId {
        self.poll_id
    }

    fn merge(self, _existing: &Self) -> Self {
        self
    }
}

pub type VoterService = EntityService<Voter>;

/// Poll history of a voter.
impl EntityService<Voter> {
    pub async fn history(&self, voter_id: VoterId) -> Result<Vec<VoterPoll>, ApiError> {
        Ok(self.get(voter_id).await?.vote_history)
    }

    pub async fn history_entry(
        &self,
        voter_id: VoterId,
        poll_id: PollId,
    ) -> Result<VoterPoll, ApiError> {
        let voter = self.get(voter_id).await?;
        find_nested(&voter.vote_history, poll_id).map(Clone::clone)
    }

    /// Records participation in `poll_id`, stamped with the current time.
    pub async fn add_history(
        &self,
        voter_id: VoterId,
        poll_id: PollId,
        payload: VoterPollPayload,
    ) -> Result<VoterPoll, ApiError> {
        ensure_same_id("poll", poll_id, payload.poll_id)?;
        let entry = VoterPoll {
            poll_id,
            vote_date: Utc::now(),
        };
        self.modify(voter_id, |voter| {
            insert_nested(&mut voter.vote_history, entry)
        })
        .await
    }

    pub async fn update_history(
        &self,
        voter_id: VoterId,
        poll_id: PollId,
        payload: VoterPollPayload,
    ) -> Result<VoterPoll, ApiError> {
        ensure_same_id("poll", poll_id, payload.poll_id)?;
        self.modify(voter_id, |voter| {
            let stored = find_nested(&voter.vote_history, poll_id)?.vote_date;
            let entry = VoterPoll {
                poll_id,
                vote_date: payload.vote_date.unwrap_or(stored),
            };
            update_nested(&mut voter.vote_history, entry)
        })
        .await
    }

    pub async fn delete_history(&self, voter_id: VoterId, poll_id: PollId) -> Result<(), ApiError> {
        self.modify(voter_id, |voter| {
            remove_nested(&mut voter.vote_history, poll_id)
        })
        .await
    }
}

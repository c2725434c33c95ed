use super::{or_existing, Entity, EntityService};
use crate::config::Dependencies;
use crate::db::vote::{Vote, VoteKeys};
use crate::db::{PollId, PollOptionId, SharedStore, VoteId, VoterId};
use crate::error::ApiError;
use chrono::Utc;

impl Entity for Vote {
    fn merge(self, existing: &Self) -> Self {
        Self {
            id: self.id,
            voter: or_existing(self.voter, &existing.voter),
            poll: or_existing(self.poll, &existing.poll),
            poll_option: or_existing(self.poll_option, &existing.poll_option),
            // The cast time never moves.
            vote_date: existing.vote_date,
        }
    }
}

/// Builds the addresses a vote stores for its references.
#[derive(Clone, Debug)]
pub struct VoteAddresses {
    dependencies: Dependencies,
}

impl VoteAddresses {
    pub fn new(dependencies: Dependencies) -> Self {
        Self { dependencies }
    }

    pub fn voter(&self, id: VoterId) -> String {
        format!("{}/voters/{}", self.dependencies.voters_url, id)
    }

    pub fn poll(&self, id: PollId) -> String {
        format!("{}/polls/{}", self.dependencies.polls_url, id)
    }

    pub fn poll_option(&self, poll_id: PollId, option_id: PollOptionId) -> String {
        format!("{}/polloption/{}", self.poll(poll_id), option_id)
    }
}

#[derive(Clone)]
pub struct VoteService {
    votes: EntityService<Vote>,
    addresses: VoteAddresses,
}

impl VoteService {
    pub fn new(store: SharedStore, dependencies: Dependencies) -> Self {
        Self {
            votes: EntityService::new(store),
            addresses: VoteAddresses::new(dependencies),
        }
    }

    pub async fn list(&self) -> Result<Vec<Vote>, ApiError> {
        self.votes.list().await
    }

    pub async fn get(&self, id: VoteId) -> Result<Vote, ApiError> {
        self.votes.get(id).await
    }

    /// Stores a new vote pointing at the given voter, poll and option.
    pub async fn create(&self, id: VoteId, keys: VoteKeys) -> Result<Vote, ApiError> {
        let vote = Vote {
            id: keys.id,
            voter: self.addresses.voter(keys.voter_id),
            poll: self.addresses.poll(keys.poll_id),
            poll_option: self.addresses.poll_option(keys.poll_id, keys.poll_option_id),
            vote_date: Utc::now(),
        };
        self.votes.create(id, vote).await
    }

    /// Re-points an existing vote. Zero ids keep the stored reference; the
    /// poll and its option are replaced together since the option address
    /// lives under the poll.
    pub async fn update(&self, id: VoteId, keys: VoteKeys) -> Result<Vote, ApiError> {
        let poll_changed = keys.poll_id != PollId::default();
        let option_changed = keys.poll_option_id != PollOptionId::default();
        if poll_changed != option_changed {
            return Err(ApiError::BadRequest(
                "PollID and PollOptionID must be updated together".to_owned(),
            ));
        }

        let patch = Vote {
            id: keys.id,
            voter: if keys.voter_id == VoterId::default() {
                String::new()
            } else {
                self.addresses.voter(keys.voter_id)
            },
            poll: if poll_changed {
                self.addresses.poll(keys.poll_id)
            } else {
                String::new()
            },
            poll_option: if option_changed {
                self.addresses.poll_option(keys.poll_id, keys.poll_option_id)
            } else {
                String::new()
            },
            vote_date: Utc::now(),
        };
        self.votes.update(id, patch).await
    }

    pub async fn delete(&self, id: VoteId) -> Result<(), ApiError> {
        self.votes.delete(id).await
    }
}

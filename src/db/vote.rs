use super::{poll::Poll, poll::PollOption, voter::Voter, PollId, PollOptionId, Record, VoteId, VoterId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cast vote. The references are addresses resolved at read time, not snapshots.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Vote {
    #[serde(rename = "VoteID")]
    pub id: VoteId,
    #[serde(rename = "Voter")]
    pub voter: String,
    #[serde(rename = "Poll")]
    pub poll: String,
    #[serde(rename = "PollOption")]
    pub poll_option: String,
    #[serde(rename = "VoteDate")]
    pub vote_date: DateTime<Utc>,
}

impl Record for Vote {
    type Id = VoteId;
    const PREFIX: &'static str = "vote";

    fn id(&self) -> VoteId {
        self.id
    }
}

/// Body accepted on vote create and update.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VoteKeys {
    #[serde(rename = "VoteID")]
    pub id: VoteId,
    #[serde(rename = "VoterID")]
    pub voter_id: VoterId,
    #[serde(rename = "PollID")]
    pub poll_id: PollId,
    #[serde(rename = "PollOptionID")]
    pub poll_option_id: PollOptionId,
}

/// A vote with its references resolved. Built per request, never stored.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct VoteDetail {
    #[serde(rename = "VoteID")]
    pub id: VoteId,
    #[serde(rename = "Voter")]
    pub voter: Voter,
    #[serde(rename = "Poll")]
    pub poll: Poll,
    #[serde(rename = "PollOption")]
    pub poll_option: PollOption,
    #[serde(rename = "VoteDate")]
    pub vote_date: DateTime<Utc>,
}

use super::{PollId, Record, VoterId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Voter {
    #[serde(rename = "VoterID")]
    pub id: VoterId,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "VoteHistory")]
    pub vote_history: Vec<VoterPoll>,
}

impl Record for Voter {
    type Id = VoterId;
    const PREFIX: &'static str = "voter";

    fn id(&self) -> VoterId {
        self.id
    }
}

/// A poll the voter took part in.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct VoterPoll {
    #[serde(rename = "PollID")]
    pub poll_id: PollId,
    #[serde(rename = "VoteDate")]
    pub vote_date: DateTime<Utc>,
}

/// Body accepted for a history entry; the date is stamped server side when absent.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct VoterPollPayload {
    #[serde(rename = "PollID")]
    pub poll_id: PollId,
    #[serde(rename = "VoteDate")]
    pub vote_date: Option<DateTime<Utc>>,
}

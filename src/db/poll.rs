use super::{PollId, PollOptionId, Record};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Poll {
    #[serde(rename = "PollID")]
    pub id: PollId,
    #[serde(rename = "PollTitle")]
    pub title: String,
    #[serde(rename = "PollQuestion")]
    pub question: String,
    #[serde(rename = "PollOptions")]
    pub options: Vec<PollOption>,
}

impl Record for Poll {
    type Id = PollId;
    const PREFIX: &'static str = "poll";

    fn id(&self) -> PollId {
        self.id
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollOption {
    #[serde(rename = "PollOptionID")]
    pub id: PollOptionId,
    #[serde(rename = "PollOptionText")]
    pub text: String,
}

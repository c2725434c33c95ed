use super::{
    ensure_same_id, ensure_unique, find_nested, insert_nested, or_existing, remove_nested,
    update_nested, Entity, EntityService, Nested,
};
use crate::db::poll::{Poll, PollOption};
use crate::db::{PollId, PollOptionId};
use crate::error::ApiError;

impl Entity for Poll {
    fn merge(self, existing: &Self) -> Self {
        Self {
            id: self.id,
            title: or_existing(self.title, &existing.title),
            question: or_existing(self.question, &existing.question),
            options: if self.options.is_empty() {
                existing.options.clone()
            } else {
                self.options
            },
        }
    }

    fn validate(&self) -> Result<(), ApiError> {
        ensure_unique(&self.options)
    }
}

impl Nested for PollOption {
    type Key = PollOptionId;
    const NAME: &'static str = "poll option";

    fn key(&self) -> PollOptionId {
        self.id
    }

    fn merge(self, existing: &Self) -> Self {
        Self {
            id: self.id,
            text: or_existing(self.text, &existing.text),
        }
    }
}

pub type PollService = EntityService<Poll>;

impl EntityService<Poll> {
    pub async fn options(&self, poll_id: PollId) -> Result<Vec<PollOption>, ApiError> {
        Ok(self.get(poll_id).await?.options)
    }

    pub async fn option(
        &self,
        poll_id: PollId,
        option_id: PollOptionId,
    ) -> Result<PollOption, ApiError> {
        let poll = self.get(poll_id).await?;
        find_nested(&poll.options, option_id).map(Clone::clone)
    }

    pub async fn add_option(
        &self,
        poll_id: PollId,
        option_id: PollOptionId,
        option: PollOption,
    ) -> Result<PollOption, ApiError> {
        ensure_same_id("poll option", option_id, option.id)?;
        self.modify(poll_id, |poll| insert_nested(&mut poll.options, option))
            .await
    }

    pub async fn update_option(
        &self,
        poll_id: PollId,
        option_id: PollOptionId,
        option: PollOption,
    ) -> Result<PollOption, ApiError> {
        ensure_same_id("poll option", option_id, option.id)?;
        self.modify(poll_id, |poll| update_nested(&mut poll.options, option))
            .await
    }

    pub async fn delete_option(
        &self,
        poll_id: PollId,
        option_id: PollOptionId,
    ) -> Result<(), ApiError> {
        self.modify(poll_id, |poll| remove_nested(&mut poll.options, option_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use std::sync::Arc;

    fn service() -> PollService {
        EntityService::new(Arc::new(MemoryStore::new()))
    }

    fn poll(id: u64, title: &str, question: &str) -> Poll {
        Poll {
            id: PollId(id),
            title: title.to_owned(),
            question: question.to_owned(),
            options: vec![],
        }
    }

    fn option(id: u64, text: &str) -> PollOption {
        PollOption {
            id: PollOptionId(id),
            text: text.to_owned(),
        }
    }

    #[actix_rt::test]
    async fn option_added_under_poll_is_visible_on_the_poll() {
        let polls = service();
        polls.create(PollId(1), poll(1, "T", "Q")).await.unwrap();
        polls
            .add_option(PollId(1), PollOptionId(1), option(1, "X"))
            .await
            .unwrap();

        let stored = polls.get(PollId(1)).await.unwrap();
        assert_eq!(stored.options, vec![option(1, "X")]);
        assert_eq!(
            polls.option(PollId(1), PollOptionId(1)).await.unwrap(),
            option(1, "X")
        );
    }

    #[actix_rt::test]
    async fn option_on_missing_poll_is_not_found() {
        let polls = service();
        let err = polls
            .add_option(PollId(7), PollOptionId(1), option(1, "X"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(matches!(
            polls.options(PollId(7)).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[actix_rt::test]
    async fn duplicate_option_conflicts() {
        let polls = service();
        polls.create(PollId(1), poll(1, "T", "Q")).await.unwrap();
        polls
            .add_option(PollId(1), PollOptionId(1), option(1, "X"))
            .await
            .unwrap();
        let err = polls
            .add_option(PollId(1), PollOptionId(1), option(1, "Y"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(polls.options(PollId(1)).await.unwrap(), vec![option(1, "X")]);
    }

    #[actix_rt::test]
    async fn option_ids_must_match() {
        let polls = service();
        polls.create(PollId(1), poll(1, "T", "Q")).await.unwrap();
        let err = polls
            .add_option(PollId(1), PollOptionId(2), option(1, "X"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[actix_rt::test]
    async fn update_option_merges_text() {
        let polls = service();
        polls.create(PollId(1), poll(1, "T", "Q")).await.unwrap();
        polls
            .add_option(PollId(1), PollOptionId(1), option(1, "X"))
            .await
            .unwrap();

        let kept = polls
            .update_option(PollId(1), PollOptionId(1), option(1, ""))
            .await
            .unwrap();
        assert_eq!(kept.text, "X");
        let changed = polls
            .update_option(PollId(1), PollOptionId(1), option(1, "Z"))
            .await
            .unwrap();
        assert_eq!(changed.text, "Z");
        assert_eq!(polls.options(PollId(1)).await.unwrap(), vec![option(1, "Z")]);
    }

    #[actix_rt::test]
    async fn delete_option_removes_only_that_option() {
        let polls = service();
        polls.create(PollId(1), poll(1, "T", "Q")).await.unwrap();
        for (id, text) in &[(1, "X"), (2, "Y")] {
            polls
                .add_option(PollId(1), PollOptionId(*id), option(*id, text))
                .await
                .unwrap();
        }

        polls.delete_option(PollId(1), PollOptionId(1)).await.unwrap();
        assert_eq!(polls.options(PollId(1)).await.unwrap(), vec![option(2, "Y")]);
        let err = polls
            .delete_option(PollId(1), PollOptionId(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_rt::test]
    async fn update_keeps_options_when_body_has_none() {
        let polls = service();
        let mut created = poll(1, "T", "Q");
        created.options = vec![option(1, "X")];
        polls.create(PollId(1), created).await.unwrap();

        let updated = polls.update(PollId(1), poll(1, "New", "")).await.unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.question, "Q");
        assert_eq!(updated.options, vec![option(1, "X")]);
    }

    #[actix_rt::test]
    async fn create_rejects_repeated_option_ids() {
        let polls = service();
        let mut created = poll(1, "T", "Q");
        created.options = vec![option(1, "X"), option(1, "Y")];
        let err = polls.create(PollId(1), created).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(polls.list().await.unwrap().is_empty());
    }
}

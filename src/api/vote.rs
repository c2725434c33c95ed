use super::{decode_body, parse_id, Metrics};
use crate::db::vote::VoteKeys;
use crate::db::VoteId;
use crate::error::ApiError;
use crate::services::detail::DetailResolver;
use crate::services::vote::VoteService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct VoteQuery {
    detail: Option<String>,
}

impl VoteQuery {
    fn wants_detail(&self) -> bool {
        self.detail.as_deref() == Some("true")
    }
}

#[instrument(skip(votes, metrics))]
pub async fn list_votes(
    votes: web::Data<VoteService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async { Ok(HttpResponse::Ok().json(votes.list().await?)) })
        .await
}

/// `?detail=true` answers with the voter, poll and option resolved from
/// their services instead of the stored addresses.
#[instrument(skip(votes, resolver, metrics))]
pub async fn get_vote(
    path: web::Path<String>,
    query: web::Query<VoteQuery>,
    votes: web::Data<VoteService>,
    resolver: web::Data<DetailResolver>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let id: VoteId = parse_id("vote", &path)?;
            let vote = votes.get(id).await?;
            if query.wants_detail() {
                let detail = resolver.resolve(vote).await?;
                Ok(HttpResponse::Ok().json(detail))
            } else {
                Ok(HttpResponse::Ok().json(vote))
            }
        })
        .await
}

#[instrument(skip(body, votes, metrics))]
pub async fn create_vote(
    path: web::Path<String>,
    body: web::Bytes,
    votes: web::Data<VoteService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let id: VoteId = parse_id("vote", &path)?;
            let keys: VoteKeys = decode_body(&body)?;
            Ok(HttpResponse::Ok().json(votes.create(id, keys).await?))
        })
        .await
}

#[instrument(skip(body, votes, metrics))]
pub async fn update_vote(
    path: web::Path<String>,
    body: web::Bytes,
    votes: web::Data<VoteService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let id: VoteId = parse_id("vote", &path)?;
            let keys: VoteKeys = decode_body(&body)?;
            Ok(HttpResponse::Ok().json(votes.update(id, keys).await?))
        })
        .await
}

#[instrument(skip(votes, metrics))]
pub async fn delete_vote(
    path: web::Path<String>,
    votes: web::Data<VoteService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let id: VoteId = parse_id("vote", &path)?;
            votes.delete(id).await?;
            Ok(HttpResponse::Ok().finish())
        })
        .await
}

use super::{decode_body, parse_id, Metrics};
use crate::db::voter::{Voter, VoterPollPayload};
use crate::db::{PollId, VoterId};
use crate::error::ApiError;
use crate::services::voter::VoterService;
use actix_web::{web, HttpResponse};
use tracing::instrument;

#[instrument(skip(voters, metrics))]
pub async fn list_voters(
    voters: web::Data<VoterService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async { Ok(HttpResponse::Ok().json(voters.list().await?)) })
        .await
}

#[instrument(skip(voters, metrics))]
pub async fn get_voter(
    path: web::Path<String>,
    voters: web::Data<VoterService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let id: VoterId = parse_id("voter", &path)?;
            Ok(HttpResponse::Ok().json(voters.get(id).await?))
        })
        .await
}

#[instrument(skip(body, voters, metrics))]
pub async fn create_voter(
    path: web::Path<String>,
    body: web::Bytes,
    voters: web::Data<VoterService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let id: VoterId = parse_id("voter", &path)?;
            let voter: Voter = decode_body(&body)?;
            Ok(HttpResponse::Ok().json(voters.create(id, voter).await?))
        })
        .await
}

#[instrument(skip(body, voters, metrics))]
pub async fn update_voter(
    path: web::Path<String>,
    body: web::Bytes,
    voters: web::Data<VoterService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let id: VoterId = parse_id("voter", &path)?;
            let voter: Voter = decode_body(&body)?;
            Ok(HttpResponse::Ok().json(voters.update(id, voter).await?))
        })
        .await
}

#[instrument(skip(voters, metrics))]
pub async fn delete_voter(
    path: web::Path<String>,
    voters: web::Data<VoterService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let id: VoterId = parse_id("voter", &path)?;
            voters.delete(id).await?;
            Ok(HttpResponse::Ok().finish())
        })
        .await
}

#[instrument(skip(voters, metrics))]
pub async fn list_history(
    path: web::Path<String>,
    voters: web::Data<VoterService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let id: VoterId = parse_id("voter", &path)?;
            Ok(HttpResponse::Ok().json(voters.history(id).await?))
        })
        .await
}

fn history_path(path: &(String, String)) -> Result<(VoterId, PollId), ApiError> {
    Ok((parse_id("voter", &path.0)?, parse_id("poll", &path.1)?))
}

#[instrument(skip(voters, metrics))]
pub async fn get_history(
    path: web::Path<(String, String)>,
    voters: web::Data<VoterService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let (voter_id, poll_id) = history_path(&path)?;
            Ok(HttpResponse::Ok().json(voters.history_entry(voter_id, poll_id).await?))
        })
        .await
}

#[instrument(skip(body, voters, metrics))]
pub async fn add_history(
    path: web::Path<(String, String)>,
    body: web::Bytes,
    voters: web::Data<VoterService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let (voter_id, poll_id) = history_path(&path)?;
            let payload: VoterPollPayload = decode_body(&body)?;
            let entry = voters.add_history(voter_id, poll_id, payload).await?;
            Ok(HttpResponse::Ok().json(entry))
        })
        .await
}

#[instrument(skip(body, voters, metrics))]
pub async fn update_history(
    path: web::Path<(String, String)>,
    body: web::Bytes,
    voters: web::Data<VoterService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let (voter_id, poll_id) = history_path(&path)?;
            let payload: VoterPollPayload = decode_body(&body)?;
            let entry = voters.update_history(voter_id, poll_id, payload).await?;
            Ok(HttpResponse::Ok().json(entry))
        })
        .await
}

#[instrument(skip(voters, metrics))]
pub async fn delete_history(
    path: web::Path<(String, String)>,
    voters: web::Data<VoterService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let (voter_id, poll_id) = history_path(&path)?;
            voters.delete_history(voter_id, poll_id).await?;
            Ok(HttpResponse::Ok().finish())
        })
        .await
}

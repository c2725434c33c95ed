use super::{decode_body, parse_id, Metrics};
use crate::db::poll::{Poll, PollOption};
use crate::db::{PollId, PollOptionId};
use crate::error::ApiError;
use crate::services::poll::PollService;
use actix_web::{web, HttpResponse};
use tracing::instrument;

#[instrument(skip(polls, metrics))]
pub async fn list_polls(
    polls: web::Data<PollService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async { Ok(HttpResponse::Ok().json(polls.list().await?)) })
        .await
}

#[instrument(skip(polls, metrics))]
pub async fn get_poll(
    path: web::Path<String>,
    polls: web::Data<PollService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let id: PollId = parse_id("poll", &path)?;
            Ok(HttpResponse::Ok().json(polls.get(id).await?))
        })
        .await
}

#[instrument(skip(body, polls, metrics))]
pub async fn create_poll(
    path: web::Path<String>,
    body: web::Bytes,
    polls: web::Data<PollService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let id: PollId = parse_id("poll", &path)?;
            let poll: Poll = decode_body(&body)?;
            Ok(HttpResponse::Ok().json(polls.create(id, poll).await?))
        })
        .await
}

#[instrument(skip(body, polls, metrics))]
pub async fn update_poll(
    path: web::Path<String>,
    body: web::Bytes,
    polls: web::Data<PollService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let id: PollId = parse_id("poll", &path)?;
            let poll: Poll = decode_body(&body)?;
            Ok(HttpResponse::Ok().json(polls.update(id, poll).await?))
        })
        .await
}

#[instrument(skip(polls, metrics))]
pub async fn delete_poll(
    path: web::Path<String>,
    polls: web::Data<PollService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let id: PollId = parse_id("poll", &path)?;
            polls.delete(id).await?;
            Ok(HttpResponse::Ok().finish())
        })
        .await
}

#[instrument(skip(polls, metrics))]
pub async fn list_options(
    path: web::Path<String>,
    polls: web::Data<PollService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let id: PollId = parse_id("poll", &path)?;
            Ok(HttpResponse::Ok().json(polls.options(id).await?))
        })
        .await
}

fn option_path(path: &(String, String)) -> Result<(PollId, PollOptionId), ApiError> {
    Ok((parse_id("poll", &path.0)?, parse_id("poll option", &path.1)?))
}

#[instrument(skip(polls, metrics))]
pub async fn get_option(
    path: web::Path<(String, String)>,
    polls: web::Data<PollService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let (poll_id, option_id) = option_path(&path)?;
            Ok(HttpResponse::Ok().json(polls.option(poll_id, option_id).await?))
        })
        .await
}

#[instrument(skip(body, polls, metrics))]
pub async fn add_option(
    path: web::Path<(String, String)>,
    body: web::Bytes,
    polls: web::Data<PollService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let (poll_id, option_id) = option_path(&path)?;
            let option: PollOption = decode_body(&body)?;
            let added = polls.add_option(poll_id, option_id, option).await?;
            Ok(HttpResponse::Ok().json(added))
        })
        .await
}

#[instrument(skip(body, polls, metrics))]
pub async fn update_option(
    path: web::Path<(String, String)>,
    body: web::Bytes,
    polls: web::Data<PollService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let (poll_id, option_id) = option_path(&path)?;
            let option: PollOption = decode_body(&body)?;
            let updated = polls.update_option(poll_id, option_id, option).await?;
            Ok(HttpResponse::Ok().json(updated))
        })
        .await
}

#[instrument(skip(polls, metrics))]
pub async fn delete_option(
    path: web::Path<(String, String)>,
    polls: web::Data<PollService>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, ApiError> {
    metrics
        .track(async {
            let (poll_id, option_id) = option_path(&path)?;
            polls.delete_option(poll_id, option_id).await?;
            Ok(HttpResponse::Ok().finish())
        })
        .await
}

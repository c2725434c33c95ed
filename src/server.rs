use crate::api::{self, poll, vote, voter, Metrics};
use crate::config::{Config, StoreBackend};
use crate::db::{MemoryStore, RedisStore, SharedStore};
use crate::services::detail::DetailResolver;
use crate::services::poll::PollService;
use crate::services::vote::VoteService;
use crate::services::voter::VoterService;
use actix_web::{web, App, HttpServer};
use color_eyre::eyre::Report;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub fn configure_voter_api(cfg: &mut web::ServiceConfig, voters: VoterService, metrics: Metrics) {
    cfg.data(voters)
        .data(metrics)
        .service(web::resource("/voters").route(web::get().to(voter::list_voters)))
        .service(web::resource("/voters/health").route(web::get().to(api::health)))
        .service(
            web::resource("/voters/{id}")
                .route(web::get().to(voter::get_voter))
                .route(web::post().to(voter::create_voter))
                .route(web::put().to(voter::update_voter))
                .route(web::delete().to(voter::delete_voter)),
        )
        .service(web::resource("/voters/{id}/polls").route(web::get().to(voter::list_history)))
        .service(
            web::resource("/voters/{id}/polls/{pollid}")
                .route(web::get().to(voter::get_history))
                .route(web::post().to(voter::add_history))
                .route(web::put().to(voter::update_history))
                .route(web::delete().to(voter::delete_history)),
        );
}

pub fn configure_poll_api(cfg: &mut web::ServiceConfig, polls: PollService, metrics: Metrics) {
    cfg.data(polls)
        .data(metrics)
        .service(web::resource("/polls").route(web::get().to(poll::list_polls)))
        .service(web::resource("/polls/health").route(web::get().to(api::health)))
        .service(
            web::resource("/polls/{id}")
                .route(web::get().to(poll::get_poll))
                .route(web::post().to(poll::create_poll))
                .route(web::put().to(poll::update_poll))
                .route(web::delete().to(poll::delete_poll)),
        )
        .service(web::resource("/polls/{id}/polloption").route(web::get().to(poll::list_options)))
        .service(
            web::resource("/polls/{id}/polloption/{optionid}")
                .route(web::get().to(poll::get_option))
                .route(web::post().to(poll::add_option))
                .route(web::put().to(poll::update_option))
                .route(web::delete().to(poll::delete_option)),
        );
}

/// The detail resolver owns an HTTP client, which is per worker, so it is
/// built here rather than passed in.
pub fn configure_vote_api(
    cfg: &mut web::ServiceConfig,
    votes: VoteService,
    metrics: Metrics,
    detail_timeout: Duration,
) {
    cfg.data(votes)
        .data(DetailResolver::new(detail_timeout))
        .data(metrics)
        .service(web::resource("/votes").route(web::get().to(vote::list_votes)))
        .service(web::resource("/votes/health").route(web::get().to(api::health)))
        .service(
            web::resource("/votes/{id}")
                .route(web::get().to(vote::get_vote))
                .route(web::post().to(vote::create_vote))
                .route(web::put().to(vote::update_vote))
                .route(web::delete().to(vote::delete_vote)),
        );
}

pub async fn open_store(config: &Config) -> Result<SharedStore, Report> {
    match config.store {
        StoreBackend::Memory => {
            warn!("Using in-memory store, records are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Redis => Ok(Arc::new(RedisStore::connect(&config.redis_url).await?)),
    }
}

pub async fn run_voter_api(config: Config) -> Result<(), Report> {
    let voters = VoterService::new(open_store(&config).await?);
    let metrics = Metrics::new();
    info!("Starting voter api on {}", config.bind_address());
    HttpServer::new(move || {
        let (voters, metrics) = (voters.clone(), metrics.clone());
        App::new().configure(move |cfg| configure_voter_api(cfg, voters, metrics))
    })
    .bind(config.bind_address())?
    .run()
    .await?;
    Ok(())
}

pub async fn run_poll_api(config: Config) -> Result<(), Report> {
    let polls = PollService::new(open_store(&config).await?);
    let metrics = Metrics::new();
    info!("Starting poll api on {}", config.bind_address());
    HttpServer::new(move || {
        let (polls, metrics) = (polls.clone(), metrics.clone());
        App::new().configure(move |cfg| configure_poll_api(cfg, polls, metrics))
    })
    .bind(config.bind_address())?
    .run()
    .await?;
    Ok(())
}

pub async fn run_vote_api(config: Config) -> Result<(), Report> {
    let votes = VoteService::new(open_store(&config).await?, config.dependencies.clone());
    let metrics = Metrics::new();
    let detail_timeout = config.detail_timeout;
    info!(
        voters = config.dependencies.voters_url.as_str(),
        polls = config.dependencies.polls_url.as_str(),
        "Starting vote api on {}",
        config.bind_address()
    );
    HttpServer::new(move || {
        let (votes, metrics) = (votes.clone(), metrics.clone());
        App::new().configure(move |cfg| configure_vote_api(cfg, votes, metrics, detail_timeout))
    })
    .bind(config.bind_address())?
    .run()
    .await?;
    Ok(())
}

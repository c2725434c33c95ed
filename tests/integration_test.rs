extern crate voting_services;
use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpResponse};
use insta::assert_json_snapshot;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use voting_services::{
    api::Metrics,
    config::Dependencies,
    db::{
        poll::{Poll, PollOption},
        vote::{Vote, VoteDetail},
        voter::Voter,
        MemoryStore, PollId, PollOptionId, VoteId, VoterId,
    },
    error::DetailError,
    server,
    services::{detail::DetailResolver, poll::PollService, vote::VoteService, voter::VoterService},
};

const DETAIL_TIMEOUT: Duration = Duration::from_secs(2);

macro_rules! request {
    ($app:expr, $method:ident, $uri:expr) => {
        test::call_service(
            &mut $app,
            test::TestRequest::$method().uri($uri).to_request(),
        )
        .await
    };
    ($app:expr, $method:ident, $uri:expr, $body:expr) => {
        test::call_service(
            &mut $app,
            test::TestRequest::$method()
                .uri($uri)
                .set_json(&$body)
                .to_request(),
        )
        .await
    };
}

fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

fn sample_voter() -> Voter {
    Voter {
        id: VoterId(1),
        first_name: "A".to_owned(),
        last_name: "B".to_owned(),
        vote_history: vec![],
    }
}

fn sample_poll() -> Poll {
    Poll {
        id: PollId(1),
        title: "T".to_owned(),
        question: "Q".to_owned(),
        options: vec![],
    }
}

fn sample_option() -> PollOption {
    PollOption {
        id: PollOptionId(1),
        text: "X".to_owned(),
    }
}

#[actix_rt::test]
async fn test_voter_crud() {
    let metrics = Metrics::new();
    let voters = VoterService::new(memory_store());
    let mut app = test::init_service(
        App::new().configure(|cfg| server::configure_voter_api(cfg, voters, metrics.clone())),
    )
    .await;

    let empty: Vec<Voter> =
        test::read_response_json(&mut app, test::TestRequest::get().uri("/voters").to_request())
            .await;
    assert!(empty.is_empty());

    let body = json!({"VoterID": 1, "FirstName": "A", "LastName": "B"});
    let resp = request!(app, post, "/voters/1", body);
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = request!(app, post, "/voters/1", body);
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = request!(app, post, "/voters/2", body);
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = request!(app, get, "/voters/abc");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &mut app,
        test::TestRequest::post()
            .uri("/voters/3")
            .set_payload("not json")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = request!(app, put, "/voters/1", json!({"VoterID": 1, "LastName": "C"}));
    assert_eq!(resp.status(), StatusCode::OK);

    let voters: Vec<Voter> =
        test::read_response_json(&mut app, test::TestRequest::get().uri("/voters").to_request())
            .await;
    assert_json_snapshot!(voters, @r###"
    [
      {
        "VoterID": 1,
        "FirstName": "A",
        "LastName": "C",
        "VoteHistory": []
      }
    ]
    "###);

    let resp = request!(app, delete, "/voters/1");
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = request!(app, delete, "/voters/1");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = request!(app, get, "/voters/1");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let health: Value = test::read_response_json(
        &mut app,
        test::TestRequest::get().uri("/voters/health").to_request(),
    )
    .await;
    assert_eq!(health["TotalCalls"], 11);
    assert_eq!(health["TotalErrors"], 6);
    assert!(health["UpTime"].is_string());
}

#[actix_rt::test]
async fn test_voter_history() {
    let voters = VoterService::new(memory_store());
    voters.create(VoterId(1), sample_voter()).await.unwrap();
    let mut app = test::init_service(
        App::new().configure(|cfg| server::configure_voter_api(cfg, voters, Metrics::new())),
    )
    .await;

    let resp = request!(app, post, "/voters/1/polls/4", json!({"PollID": 4}));
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = request!(app, post, "/voters/1/polls/4", json!({"PollID": 4}));
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let resp = request!(app, post, "/voters/9/polls/4", json!({"PollID": 4}));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let history: Vec<Value> = test::read_response_json(
        &mut app,
        test::TestRequest::get().uri("/voters/1/polls").to_request(),
    )
    .await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["PollID"], 4);
    assert!(history[0]["VoteDate"].is_string());

    let resp = request!(app, delete, "/voters/1/polls/4");
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = request!(app, get, "/voters/1/polls/4");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_poll_options() {
    let mut app = test::init_service(App::new().configure(|cfg| {
        server::configure_poll_api(cfg, PollService::new(memory_store()), Metrics::new())
    }))
    .await;

    let resp = request!(
        app,
        post,
        "/polls/1",
        json!({"PollID": 1, "PollTitle": "T", "PollQuestion": "Q", "PollOptions": []})
    );
    assert_eq!(resp.status(), StatusCode::OK);

    let option = json!({"PollOptionID": 1, "PollOptionText": "X"});
    let resp = request!(app, post, "/polls/1/polloption/1", option);
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = request!(app, post, "/polls/1/polloption/1", option);
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let resp = request!(app, post, "/polls/1/polloption/2", option);
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let resp = request!(app, get, "/polls/2/polloption/1");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = request!(
        app,
        put,
        "/polls/1/polloption/1",
        json!({"PollOptionID": 1, "PollOptionText": ""})
    );
    assert_eq!(resp.status(), StatusCode::OK);

    let poll: Poll =
        test::read_response_json(&mut app, test::TestRequest::get().uri("/polls/1").to_request())
            .await;
    assert_eq!(poll.options, vec![sample_option()]);
}

/// Starts voter and poll services seeded with voter 1 and poll 1 holding option 1.
async fn start_dependencies() -> (test::TestServer, test::TestServer) {
    let voters = VoterService::new(memory_store());
    let polls = PollService::new(memory_store());
    voters.create(VoterId(1), sample_voter()).await.unwrap();
    polls.create(PollId(1), sample_poll()).await.unwrap();
    polls
        .add_option(PollId(1), PollOptionId(1), sample_option())
        .await
        .unwrap();

    let metrics = Metrics::new();
    let voter_srv = {
        let metrics = metrics.clone();
        test::start(move || {
            let (voters, metrics) = (voters.clone(), metrics.clone());
            App::new().configure(move |cfg| server::configure_voter_api(cfg, voters, metrics))
        })
    };
    let poll_srv = test::start(move || {
        let (polls, metrics) = (polls.clone(), metrics.clone());
        App::new().configure(move |cfg| server::configure_poll_api(cfg, polls, metrics))
    });
    (voter_srv, poll_srv)
}

fn dependencies(voter_srv: &test::TestServer, poll_srv: &test::TestServer) -> Dependencies {
    Dependencies::new(&voter_srv.addr().to_string(), &poll_srv.addr().to_string())
}

#[actix_rt::test]
async fn test_vote_detail() {
    let (voter_srv, poll_srv) = start_dependencies().await;
    let votes = VoteService::new(memory_store(), dependencies(&voter_srv, &poll_srv));
    let mut app = test::init_service(App::new().configure(|cfg| {
        server::configure_vote_api(cfg, votes, Metrics::new(), DETAIL_TIMEOUT)
    }))
    .await;

    let keys = json!({"VoteID": 1, "VoterID": 1, "PollID": 1, "PollOptionID": 1});
    let resp = request!(app, post, "/votes/1", keys);
    assert_eq!(resp.status(), StatusCode::OK);

    let vote: Vote = test::read_response_json(
        &mut app,
        test::TestRequest::get().uri("/votes/1?detail=false").to_request(),
    )
    .await;
    assert!(vote.voter.ends_with("/voters/1"));
    assert!(vote.poll_option.ends_with("/polls/1/polloption/1"));

    let detail: VoteDetail = test::read_response_json(
        &mut app,
        test::TestRequest::get().uri("/votes/1?detail=true").to_request(),
    )
    .await;
    let mut expected_poll = sample_poll();
    expected_poll.options = vec![sample_option()];
    assert_eq!(detail.id, VoteId(1));
    assert_eq!(detail.voter, sample_voter());
    assert_eq!(detail.poll, expected_poll);
    assert_eq!(detail.poll_option, sample_option());
    assert_eq!(detail.vote_date, vote.vote_date);
}

#[actix_rt::test]
async fn test_vote_detail_is_all_or_nothing() {
    let (voter_srv, poll_srv) = start_dependencies().await;
    let votes = VoteService::new(memory_store(), dependencies(&voter_srv, &poll_srv));
    let mut app = test::init_service(App::new().configure(|cfg| {
        server::configure_vote_api(cfg, votes, Metrics::new(), DETAIL_TIMEOUT)
    }))
    .await;

    // Poll and option resolve, the voter does not exist.
    let keys = json!({"VoteID": 2, "VoterID": 7, "PollID": 1, "PollOptionID": 1});
    let resp = request!(app, post, "/votes/2", keys);
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = request!(app, get, "/votes/2?detail=true");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let resp = request!(app, get, "/votes/2");
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = request!(app, get, "/votes/3?detail=true");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

/// Serves voter 1, poll 1 and its option 1, each after `delay`. The option
/// body is sent verbatim.
fn start_stub(delay: Duration, option_body: &'static str) -> test::TestServer {
    test::start(move || {
        App::new()
            .route(
                "/voters/1",
                web::get().to(move || async move {
                    actix_rt::time::delay_for(delay).await;
                    HttpResponse::Ok().json(sample_voter())
                }),
            )
            .route(
                "/polls/1",
                web::get().to(move || async move {
                    actix_rt::time::delay_for(delay).await;
                    let mut poll = sample_poll();
                    poll.options = vec![sample_option()];
                    HttpResponse::Ok().json(poll)
                }),
            )
            .route(
                "/polls/1/polloption/1",
                web::get().to(move || async move {
                    actix_rt::time::delay_for(delay).await;
                    HttpResponse::Ok()
                        .content_type("application/json")
                        .body(option_body)
                }),
            )
    })
}

fn vote_at(base: &str) -> Vote {
    Vote {
        id: VoteId(1),
        voter: format!("{}/voters/1", base),
        poll: format!("{}/polls/1", base),
        poll_option: format!("{}/polls/1/polloption/1", base),
        vote_date: chrono::Utc::now(),
    }
}

#[actix_rt::test]
async fn test_vote_detail_missing_poll_side() {
    let (voter_srv, poll_srv) = start_dependencies().await;
    let votes = VoteService::new(memory_store(), dependencies(&voter_srv, &poll_srv));
    let mut app = test::init_service(App::new().configure(|cfg| {
        server::configure_vote_api(cfg, votes, Metrics::new(), DETAIL_TIMEOUT)
    }))
    .await;

    // Voter and poll resolve, option 9 does not exist.
    let keys = json!({"VoteID": 4, "VoterID": 1, "PollID": 1, "PollOptionID": 9});
    let resp = request!(app, post, "/votes/4", keys);
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = request!(app, get, "/votes/4?detail=true");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Poll 5 does not exist, so neither does its option.
    let keys = json!({"VoteID": 5, "VoterID": 1, "PollID": 5, "PollOptionID": 1});
    let resp = request!(app, post, "/votes/5", keys);
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = request!(app, get, "/votes/5?detail=true");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_vote_detail_rejects_malformed_reference() {
    let stub = start_stub(Duration::from_millis(0), "not json");
    let base = format!("http://{}", stub.addr());

    let err = DetailResolver::new(DETAIL_TIMEOUT)
        .resolve(vote_at(&base))
        .await
        .unwrap_err();
    match err {
        DetailError::Decode { url, .. } => assert!(url.ends_with("/polls/1/polloption/1")),
        other => panic!("expected a decode error, got {:?}", other),
    }

    let address = stub.addr().to_string();
    let votes = VoteService::new(memory_store(), Dependencies::new(&address, &address));
    let mut app = test::init_service(App::new().configure(|cfg| {
        server::configure_vote_api(cfg, votes, Metrics::new(), DETAIL_TIMEOUT)
    }))
    .await;
    let keys = json!({"VoteID": 1, "VoterID": 1, "PollID": 1, "PollOptionID": 1});
    let resp = request!(app, post, "/votes/1", keys);
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = request!(app, get, "/votes/1?detail=true");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_vote_detail_fetches_in_parallel() {
    // Each reference takes 300ms; one after another would miss the deadline.
    let stub = start_stub(
        Duration::from_millis(300),
        r#"{"PollOptionID": 1, "PollOptionText": "X"}"#,
    );
    let base = format!("http://{}", stub.addr());

    let detail = DetailResolver::new(Duration::from_millis(700))
        .resolve(vote_at(&base))
        .await
        .unwrap();
    assert_eq!(detail.voter, sample_voter());
    assert_eq!(detail.poll.options, vec![sample_option()]);
    assert_eq!(detail.poll_option, sample_option());
}

#[actix_rt::test]
async fn test_vote_detail_times_out() {
    let slow = start_stub(Duration::from_secs(5), "{}");
    let base = format!("http://{}", slow.addr());

    // Requests alone would wait 10s, so only the shared deadline can fire.
    let started = Instant::now();
    let err = DetailResolver::with_timeouts(Duration::from_millis(200), Duration::from_secs(10))
        .resolve(vote_at(&base))
        .await
        .unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(matches!(err, DetailError::Timeout(_)));
}

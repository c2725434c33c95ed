use color_eyre::eyre::Report;
use voting_services::config::{Config, VOTE_API_PORT};
use voting_services::{log, server};

#[actix_rt::main]
async fn main() -> Result<(), Report> {
    dotenv::dotenv().ok();
    color_eyre::install()?;
    log::init()?;
    let config = Config::load(VOTE_API_PORT)?;
    server::run_vote_api(config).await
}

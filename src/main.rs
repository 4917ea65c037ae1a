mod api;
mod captcha;
mod config;
mod extract;
mod lookup;
mod results;
mod session;
mod submit;
#[cfg(test)]
mod testutil;
mod types;

use env_logger::Env;
use log::info;
use std::sync::Arc;

#[macro_use]
extern crate failure;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting violation-lookup");

    let config = config::Config::default();
    let port = config::listen_port();
    let lookup = Arc::new(lookup::Lookup::new(
        config.clone(),
        Box::new(session::HttpSessionProvider::new(&config)),
        Box::new(captcha::TesseractCli::new()),
        Box::new(extract::CsgtExtractor),
    ));
    api::run(lookup, port).await;
}

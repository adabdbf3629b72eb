use std::io;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;

use pow_ledger::Node;
use pow_ledger::api;
use pow_ledger::config::Config;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let (host, port) = (config.host.clone(), config.port);

    info!(
        "⛓️ Starting node {} at http://{host}:{port} (difficulty={})",
        config.node_id, config.difficulty
    );

    let node = web::Data::new(Node::new(&config));
    let app_node = node.clone();

    let result = HttpServer::new(move || {
        App::new()
            .app_data(app_node.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    node.shutdown();
    result
}

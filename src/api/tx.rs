use actix_web::{HttpResponse, Responder, get, post, web};
use log::debug;

use super::models::{MempoolResponse, NewTxRequest, NewTxResponse};
use crate::node::Node;

/// Submit a new transaction into the pending pool.
#[post("/transactions/new")]
pub async fn post_transaction(
    node: web::Data<Node>,
    body: web::Json<NewTxRequest>,
) -> impl Responder {
    let index = node.submit_transaction(&body.sender, &body.recipient, body.amount);
    debug!(
        "POST /transactions/new - {} -> {} ({}) queued for block #{}",
        body.sender, body.recipient, body.amount, index
    );

    HttpResponse::Created().json(NewTxResponse {
        message: format!("Transaction will be added to Block {index}"),
        index,
    })
}

/// List the pending pool.
#[get("/mempool")]
pub async fn get_mempool(node: web::Data<Node>) -> impl Responder {
    let transactions = node.pending_transactions();
    HttpResponse::Ok().json(MempoolResponse {
        size: transactions.len(),
        transactions,
    })
}

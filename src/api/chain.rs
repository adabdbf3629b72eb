use actix_web::{HttpResponse, Responder, get, web};
use log::{info, warn};

use super::models::{ChainResponse, MineResponse, ValidateResponse};
use crate::node::Node;

/// Get the full blockchain. Peers fetch this during conflict resolution.
#[get("/chain")]
pub async fn get_chain(node: web::Data<Node>) -> impl Responder {
    let (chain, length) = node.chain_snapshot();
    HttpResponse::Ok().json(ChainResponse {
        chain: &chain,
        length,
    })
}

/// Validate the whole chain.
#[get("/validate")]
pub async fn validate_chain(node: web::Data<Node>) -> impl Responder {
    let (chain, length) = node.chain_snapshot();
    HttpResponse::Ok().json(ValidateResponse {
        valid: node.is_valid_chain(&chain),
        length,
        difficulty: node.difficulty(),
    })
}

/// Mine a new block from the pending pool, rewarding this node.
#[get("/mine")]
pub async fn mine_block(node: web::Data<Node>) -> impl Responder {
    match node.mine(node.id()).await {
        Ok(block) => {
            info!(
                "MINER - forged block #{} (proof={}, txs={})",
                block.index,
                block.proof,
                block.transactions.len()
            );
            HttpResponse::Ok().json(MineResponse {
                message: "New Block Forged",
                index: block.index,
                transactions: block.transactions,
                proof: block.proof,
                previous_hash: block.previous_hash,
            })
        }
        Err(e) => {
            warn!("GET /mine - {e}");
            HttpResponse::ServiceUnavailable().body(e.to_string())
        }
    }
}

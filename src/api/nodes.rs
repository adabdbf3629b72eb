use actix_web::{HttpResponse, Responder, get, post, web};
use log::warn;

use super::models::{RegisterNodesRequest, RegisterNodesResponse, ResolveResponse};
use crate::node::Node;

/// Register one or more peers. The whole request is rejected if any
/// address cannot be parsed.
#[post("/nodes/register")]
pub async fn register_nodes(
    node: web::Data<Node>,
    body: web::Json<RegisterNodesRequest>,
) -> impl Responder {
    if body.nodes.is_empty() {
        return HttpResponse::BadRequest().body("Error: Please supply a valid list of nodes");
    }
    if let Err(e) = node.register_peers(&body.nodes) {
        warn!("POST /nodes/register - rejected: {e}");
        return HttpResponse::BadRequest().body(e.to_string());
    }

    HttpResponse::Created().json(RegisterNodesResponse {
        message: "New nodes have been added",
        total_nodes: node.peers(),
    })
}

/// Run longest-valid-chain consensus against every registered peer.
#[get("/nodes/resolve")]
pub async fn resolve_nodes(node: web::Data<Node>) -> impl Responder {
    let replaced = node.resolve_conflicts().await;
    let (chain, _) = node.chain_snapshot();
    HttpResponse::Ok().json(ResolveResponse {
        message: if replaced {
            "Our chain was replaced"
        } else {
            "Our chain is authoritative"
        },
        replaced,
        chain,
    })
}

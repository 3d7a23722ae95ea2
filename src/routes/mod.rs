use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

/// Health check
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "Hello World" }))
}

/// Configure the HTTP routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").route(web::get().to(crate::websocket::ws_index)))
        .service(web::resource("/").route(web::get().to(index)));
}

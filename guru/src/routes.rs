//! Centralized route configuration for the crowdguru daemon.
//!
//! This module provides a shared function to configure all application routes,
//! allowing both the main server and test servers to use the same routing setup.

use crate::handlers::{web_handlers, xmpp_handlers};
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").route("/health", web::get().to(web_handlers::health_check)))
        .service(
            web::scope("/xmpp")
                .route("/message/chat", web::post().to(xmpp_handlers::chat_message))
                .route("/presence/{status}", web::post().to(xmpp_handlers::presence)),
        )
        .route("/", web::get().to(web_handlers::latest_questions));
}

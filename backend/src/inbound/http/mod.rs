//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod categories;
pub mod comments;
pub mod cookies;
pub mod dto;
pub mod error;
pub mod health;
pub mod newsletter;
pub mod posts;
pub mod schemas;
pub mod search;
pub mod session;
pub mod session_config;
pub mod state;
pub mod stats;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::{Scope, web};

pub use error::ApiResult;

/// Prefix shared by every versioned endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// The versioned API with its extractor configuration.
///
/// Handlers expect `web::Data<HttpState>` to be registered on the app.
pub fn api_scope() -> Scope {
    web::scope(API_PREFIX)
        .app_data(validation::json_config())
        .app_data(validation::query_config())
        .app_data(validation::path_config())
        .service(auth::register)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::me)
        .service(posts::list_posts)
        .service(posts::create_post)
        .service(posts::get_post)
        .service(posts::update_post)
        .service(posts::delete_post)
        .service(posts::related_posts)
        .service(posts::toggle_like)
        .service(posts::record_view)
        .service(comments::list_comments)
        .service(comments::create_comment)
        .service(comments::update_comment)
        .service(comments::delete_comment)
        .service(categories::list_categories)
        .service(categories::create_category)
        .service(categories::get_category)
        .service(categories::update_category)
        .service(categories::delete_category)
        .service(newsletter::list_subscribers)
        .service(newsletter::subscribe)
        .service(newsletter::unsubscribe)
        .service(search::search)
        .service(stats::stats)
}

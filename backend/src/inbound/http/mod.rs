//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every handler resolves the session into an explicit [`crate::domain::UserId`]
//! before calling a driving port held in [`state::HttpState`].

use actix_web::web;

pub mod account;
mod body;
pub mod cards;
pub mod credits;
pub mod error;
pub mod grading;
pub mod health;
pub mod identify;
pub mod profile;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;
pub mod waitlist;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// Callers mount this under a scope and wrap the session middleware:
///
/// ```ignore
/// App::new().service(web::scope("/api/v1").wrap(session).configure(configure_api))
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::login)
        .service(users::logout)
        .service(cards::add_card)
        .service(cards::list_cards)
        .service(cards::get_card)
        .service(cards::delete_card)
        .service(cards::upload_image)
        .service(grading::grade_card)
        .service(identify::identify_card)
        .service(credits::get_credits)
        .service(profile::username_available)
        .service(profile::create_profile)
        .service(waitlist::join_waitlist)
        .service(account::delete_account);
}

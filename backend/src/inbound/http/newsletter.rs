//! Newsletter subscription endpoints.
//!
//! ```text
//! GET  /api/v1/newsletter?limit=50
//! POST /api/v1/newsletter             {"email":"reader@example.com","tags":["rust"]}
//! POST /api/v1/newsletter/unsubscribe {"email":"reader@example.com"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;
use crate::domain::newsletter::{SubscribeOutcome, Subscriber, Subscription};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionUser;
use crate::inbound::http::state::HttpState;

/// A newsletter subscriber.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberResponse {
    pub id: String,
    #[schema(example = "reader@example.com")]
    pub email: String,
    pub name: Option<String>,
    pub tags: Vec<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Subscriber> for SubscriberResponse {
    fn from(subscriber: Subscriber) -> Self {
        Self {
            id: subscriber.id.to_string(),
            email: subscriber.email.to_string(),
            name: subscriber.name,
            tags: subscriber.tags,
            confirmed_at: subscriber.confirmed_at,
            unsubscribed_at: subscriber.unsubscribed_at,
            created_at: subscriber.created_at,
        }
    }
}

/// Query string accepted by the subscriber listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriberListQuery {
    /// Number of subscribers, default 50, at most 200.
    pub limit: Option<String>,
}

/// Subscribe payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct SubscribeRequest {
    pub email: String,
    pub name: Option<String>,
    pub tags: Vec<String>,
    /// Mark the address confirmed immediately.
    pub confirmed: bool,
}

/// Unsubscribe payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct UnsubscribeRequest {
    pub email: String,
}

/// Latest subscribers, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/newsletter",
    params(SubscriberListQuery),
    responses(
        (status = 200, description = "Subscribers", body = [SubscriberResponse]),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["newsletter"],
    operation_id = "listSubscribers"
)]
#[get("/newsletter")]
pub async fn list_subscribers(
    state: web::Data<HttpState>,
    _user: SessionUser,
    query: web::Query<SubscriberListQuery>,
) -> ApiResult<web::Json<Vec<SubscriberResponse>>> {
    let subscribers = state.newsletter.latest(query.limit.as_deref()).await?;
    Ok(web::Json(
        subscribers
            .into_iter()
            .map(SubscriberResponse::from)
            .collect(),
    ))
}

/// Subscribe an address, reactivating it after an unsubscribe.
#[utoipa::path(
    post,
    path = "/api/v1/newsletter",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscribed", body = SubscriberResponse),
        (status = 200, description = "Subscription reactivated", body = SubscriberResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 409, description = "Already subscribed", body = Error)
    ),
    tags = ["newsletter"],
    operation_id = "subscribe",
    security([])
)]
#[post("/newsletter")]
pub async fn subscribe(
    state: web::Data<HttpState>,
    payload: web::Json<SubscribeRequest>,
) -> ApiResult<HttpResponse> {
    let subscription = Subscription::try_from_parts(
        &payload.email,
        payload.name.as_deref(),
        &payload.tags,
        payload.confirmed,
    )?;
    let response = match state.newsletter.subscribe(subscription).await? {
        SubscribeOutcome::Created(subscriber) => {
            HttpResponse::Created().json(SubscriberResponse::from(subscriber))
        }
        SubscribeOutcome::Reactivated(subscriber) => {
            HttpResponse::Ok().json(SubscriberResponse::from(subscriber))
        }
    };
    Ok(response)
}

/// Unsubscribe an address.
#[utoipa::path(
    post,
    path = "/api/v1/newsletter/unsubscribe",
    request_body = UnsubscribeRequest,
    responses(
        (status = 200, description = "Unsubscribed", body = SubscriberResponse),
        (status = 400, description = "Malformed email", body = Error),
        (status = 404, description = "Unknown address", body = Error)
    ),
    tags = ["newsletter"],
    operation_id = "unsubscribe",
    security([])
)]
#[post("/newsletter/unsubscribe")]
pub async fn unsubscribe(
    state: web::Data<HttpState>,
    payload: web::Json<UnsubscribeRequest>,
) -> ApiResult<web::Json<SubscriberResponse>> {
    let subscriber = state.newsletter.unsubscribe(&payload.email).await?;
    Ok(web::Json(subscriber.into()))
}

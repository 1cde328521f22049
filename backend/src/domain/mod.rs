//! Domain primitives, aggregates, services and driven ports.
//!
//! Purpose: Define strongly typed blog entities and the use-cases that
//! operate on them. Nothing here knows about HTTP or SQL; adapters reach the
//! domain through the services and implement the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error payload with stable codes.
//! - ResourceRef: route identifier classified as id or slug.
//! - Entity modules: `user`, `post`, `category`, `comment`, `newsletter`.
//! - Services in [`services`], one per resource family.

pub mod auth;
pub mod category;
pub mod comment;
pub mod error;
pub mod identifier;
pub mod ids;
pub mod newsletter;
pub mod ports;
pub mod post;
pub mod search;
pub mod services;
pub mod slug;
pub mod stats;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::auth::{
    IssuedSession, LoginCredentials, LoginValidationError, Registration, SessionSubject,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identifier::{EmptyIdentifier, ResourceRef};
pub use self::ids::{CategoryId, CommentId, IdValidationError, PostId, SubscriberId, UserId};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{AuthorSummary, Email, StoredCredentials, User, UserName, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use blog_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;

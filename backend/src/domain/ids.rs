//! Strongly typed UUID identifiers for blog entities.
//!
//! Each entity gets its own newtype so a comment id cannot be passed where a
//! post id is expected. The canonical textual form is the 36-character
//! hyphenated UUID.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when parsing an entity identifier fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// Input was empty.
    #[error("{entity} id must not be empty")]
    Empty {
        /// Entity label used in the message.
        entity: &'static str,
    },
    /// Input was not a hyphenated UUID.
    #[error("{entity} id must be a valid UUID")]
    Invalid {
        /// Entity label used in the message.
        entity: &'static str,
    },
}

/// Parse the canonical hyphenated UUID form, rejecting the simple, braced and
/// URN encodings `Uuid::parse_str` would otherwise accept.
pub(crate) fn parse_hyphenated(raw: &str) -> Option<Uuid> {
    if raw.len() != 36 {
        return None;
    }
    Uuid::try_parse(raw).ok()
}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Validate and construct an identifier from its textual form.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let raw = id.as_ref();
                if raw.is_empty() {
                    return Err(IdValidationError::Empty { entity: $label });
                }
                parse_hyphenated(raw)
                    .map(Self)
                    .ok_or(IdValidationError::Invalid { entity: $label })
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

define_entity_id!(
    /// Stable user identifier.
    UserId,
    "user"
);
define_entity_id!(
    /// Stable post identifier.
    PostId,
    "post"
);
define_entity_id!(
    /// Stable category identifier.
    CategoryId,
    "category"
);
define_entity_id!(
    /// Stable comment identifier.
    CommentId,
    "comment"
);
define_entity_id!(
    /// Stable newsletter subscriber identifier.
    SubscriberId,
    "subscriber"
);

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", true)]
    #[case("3FA85F64-5717-4562-B3FC-2C963F66AFA6", true)]
    #[case("3fa85f6457174562b3fc2c963f66afa6", false)]
    #[case("{3fa85f64-5717-4562-b3fc-2c963f66afa6}", false)]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afaz", false)]
    #[case("hello-world", false)]
    fn hyphenated_form_is_required(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(parse_hyphenated(raw).is_some(), valid);
    }

    #[rstest]
    fn empty_ids_are_rejected() {
        assert_eq!(
            PostId::new(""),
            Err(IdValidationError::Empty { entity: "post" })
        );
    }

    #[rstest]
    fn display_is_lowercase_hyphenated() {
        let id = CategoryId::new("3FA85F64-5717-4562-B3FC-2C963F66AFA6").expect("valid id");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    fn serde_uses_string_form() {
        let id = UserId::random();
        let json = serde_json::to_string(&id).expect("serialise");
        let back: UserId = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, id);
        assert!(serde_json::from_str::<UserId>("\"nope\"").is_err());
    }
}

//! Defines the token stored in the auth cookie and how it is serialized.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::UserID;

/// A token for authorization and authentication.
///
/// The expiry is formatted as RFC 3339 so that midnight round-trips with
/// two-digit hours.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::auth::{UserID, token::Token};

    #[test]
    fn serialise_token() {
        let token = Token {
            user_id: UserID::new(1),
            expires_at: datetime!(2025-12-21 03:54:00 UTC),
        };
        let expected = r#"{"user_id":1,"expires_at":"2025-12-21T03:54:00Z"}"#;

        let actual = serde_json::to_string(&token).unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn deserialise_token_with_midnight_expiry() {
        let expected = Token {
            user_id: UserID::new(1),
            expires_at: datetime!(2025-12-21 00:00:00 UTC),
        };
        let token_string = r#"{"user_id":1,"expires_at":"2025-12-21T00:00:00Z"}"#;

        let actual: Token = serde_json::from_str(token_string).unwrap();

        assert_eq!(expected, actual);
    }
}

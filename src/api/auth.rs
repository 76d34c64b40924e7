// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum Invalid {
    #[error("no authentication method provided")]
    Missing,

    #[error("an API key requires a username")]
    KeyWithoutUser,

    #[error("a password requires a username")]
    PasswordWithoutUser,
}

/// Credentials for both the `jfrog` CLI and the REST API
///
/// Selected once per run so that the CLI flags and the HTTP header always
/// agree on which credential is in use.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    Token(String),
    ApiKey { user: String, key: String },
    Password { user: String, password: String },
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(..) => f.write_str("Token(***)"),
            Self::ApiKey { user, .. } => write!(f, "ApiKey({}, ***)", user),
            Self::Password { user, .. } => write!(f, "Password({}, ***)", user),
        }
    }
}

impl Auth {
    /// Picks the access token, then username + API key, then username + password
    pub fn select(
        token: Option<&str>,
        user: Option<&str>,
        password: Option<&str>,
        key: Option<&str>,
    ) -> Result<Self, Invalid> {
        fn given(s: Option<&str>) -> Option<&str> {
            s.filter(|s| !s.is_empty())
        }

        if let Some(token) = given(token) {
            return Ok(Self::Token(token.into()));
        }

        match (given(user), given(key), given(password)) {
            (Some(user), Some(key), _) => Ok(Self::ApiKey {
                user: user.into(),
                key: key.into(),
            }),
            (Some(user), None, Some(password)) => Ok(Self::Password {
                user: user.into(),
                password: password.into(),
            }),
            (None, Some(..), _) => Err(Invalid::KeyWithoutUser),
            (None, None, Some(..)) => Err(Invalid::PasswordWithoutUser),
            _ => Err(Invalid::Missing),
        }
    }

    /// Flags understood by every `jfrog rt` sub-command
    pub fn cli_args(&self) -> Vec<String> {
        match self {
            Self::Token(token) => vec![format!("--access-token={}", token)],
            Self::ApiKey { user, key: secret } | Self::Password { user, password: secret } => {
                vec![format!("--user={}", user), format!("--password={}", secret)]
            }
        }
    }

    /// The value of the `Authorization` header
    pub fn header(&self) -> String {
        match self {
            Self::Token(token) => format!("Bearer {}", token),
            Self::ApiKey { user, key: secret } | Self::Password { user, password: secret } => {
                format!("Basic {}", STANDARD.encode(format!("{}:{}", user, secret)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_wins() {
        let auth = Auth::select(Some("tok"), Some("me"), Some("pw"), Some("key")).unwrap();
        assert_eq!(auth, Auth::Token("tok".into()));
        assert_eq!(auth.header(), "Bearer tok");
        assert_eq!(auth.cli_args(), vec!["--access-token=tok"]);
    }

    #[test]
    fn api_key_is_the_password() {
        let auth = Auth::select(None, Some("me"), None, Some("key")).unwrap();
        assert_eq!(auth.header(), format!("Basic {}", STANDARD.encode("me:key")));
        assert_eq!(auth.cli_args(), vec!["--user=me", "--password=key"]);

        // The API key takes precedence over a password.
        let auth = Auth::select(Some(""), Some("me"), Some("pw"), Some("key")).unwrap();
        assert!(matches!(auth, Auth::ApiKey { .. }));
    }

    #[test]
    fn password() {
        let auth = Auth::select(None, Some("me"), Some("pw"), None).unwrap();
        assert_eq!(auth.header(), "Basic bWU6cHc=");
        assert_eq!(auth.cli_args(), vec!["--user=me", "--password=pw"]);
    }

    #[test]
    fn incomplete() {
        assert_eq!(Auth::select(None, None, None, None), Err(Invalid::Missing));
        assert_eq!(Auth::select(Some(""), Some(""), None, None), Err(Invalid::Missing));
        assert_eq!(Auth::select(None, Some("me"), None, None), Err(Invalid::Missing));
        assert_eq!(
            Auth::select(None, None, None, Some("key")),
            Err(Invalid::KeyWithoutUser)
        );
        assert_eq!(
            Auth::select(None, None, Some("pw"), None),
            Err(Invalid::PasswordWithoutUser)
        );
    }

    #[test]
    fn debug_hides_secrets() {
        let auth = Auth::select(None, Some("me"), Some("hunter2"), None).unwrap();
        let shown = format!("{:?}", auth);
        assert!(shown.contains("me"));
        assert!(!shown.contains("hunter2"));
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use thiserror::Error;
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Invalid {
    #[error("invalid URL {0}: {1}")]
    Parse(String, url::ParseError),

    #[error("invalid URL (missing scheme or host): {0}")]
    Host(String),

    #[error("url does not contain '/artifactory': {0}")]
    NotArtifactory(String),
}

const ROOT: &str = "/artifactory";

/// Reduces a user-supplied URL to the Artifactory root: `<prefix>/artifactory/`
pub fn sanitize(input: &str) -> Result<Url, Invalid> {
    let mut url = Url::parse(input).map_err(|e| Invalid::Parse(input.into(), e))?;

    if url.scheme().is_empty() || url.host_str().map_or(true, str::is_empty) {
        return Err(Invalid::Host(input.into()));
    }

    let prefix = match url.path().find(ROOT) {
        Some(n) => url.path()[..n].to_owned(),
        None => return Err(Invalid::NotArtifactory(input.into())),
    };

    url.set_path(&format!("{}{}/", prefix, ROOT));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_after_root() {
        let url = sanitize("https://host/x/artifactory/y/z").unwrap();
        assert_eq!(url.as_str(), "https://host/x/artifactory/");

        let url = sanitize("https://jfrog.example.com/artifactory").unwrap();
        assert_eq!(url.as_str(), "https://jfrog.example.com/artifactory/");

        let url = sanitize("http://localhost:8082/artifactory/api/?x=1#frag").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8082/artifactory/");
    }

    #[test]
    fn requires_root() {
        assert!(matches!(
            sanitize("https://host/x/y"),
            Err(Invalid::NotArtifactory(..))
        ));
    }

    #[test]
    fn requires_scheme_and_host() {
        assert!(matches!(
            sanitize("host/artifactory"),
            Err(Invalid::Parse(..))
        ));
        assert!(matches!(
            sanitize("unix:/artifactory"),
            Err(Invalid::Host(..))
        ));
    }
}

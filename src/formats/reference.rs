// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::Digest;

use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Invalid {
    #[error("image reference has no tag: {0}")]
    Tag(String),

    #[error("image reference needs at least a repository and an image name: {0}")]
    Path(String),

    #[error("digest-pinned image references are not supported: {0}")]
    Pinned(String),
}

/// A docker image stored in an Artifactory docker repository
///
/// Parsed from `[registry/]repository/image[/...]:tag`. The registry host is
/// only recognized (and dropped) when it contains at least two dots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub repository: String,
    pub name: String,
    pub tag: String,
}

impl Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}:{}", self.repository, self.name, self.tag)
    }
}

impl FromStr for Reference {
    type Err = Invalid;

    fn from_str(reference: &str) -> Result<Self, Self::Err> {
        if reference.contains('@') {
            return Err(Invalid::Pinned(reference.into()));
        }

        // The tag follows the last colon, unless that colon belongs to a
        // registry port.
        let (path, tag) = match reference.rfind(':') {
            Some(n) => (&reference[..n], &reference[n + 1..]),
            None => return Err(Invalid::Tag(reference.into())),
        };
        if tag.is_empty() || tag.contains('/') {
            return Err(Invalid::Tag(reference.into()));
        }

        let mut parts: Vec<&str> = path.split('/').collect();
        if parts.len() < 2 {
            return Err(Invalid::Path(reference.into()));
        }

        if Self::is_domain(parts[0]) {
            parts.remove(0);
        }

        let name = parts[1..].join("/");
        if parts[0].is_empty() || name.is_empty() {
            return Err(Invalid::Path(reference.into()));
        }

        Ok(Self {
            repository: parts[0].into(),
            name,
            tag: tag.into(),
        })
    }
}

impl Reference {
    fn is_domain(segment: &str) -> bool {
        segment.matches('.').count() >= 2
    }

    /// The repository-relative folder holding this tag's manifest
    pub fn manifest_path(&self) -> String {
        format!("{}/{}", self.name, self.tag)
    }

    /// The `repo/image:tag@sha256:<hex>` line consumed by `build-docker-create`
    pub fn pinned(&self, digest: &Digest) -> String {
        format!("{}@{}:{}", self, digest.algorithm(), digest)
    }
}

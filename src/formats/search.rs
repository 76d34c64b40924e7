// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

//! Scraping `jfrog rt search` output
//!
//! The CLI mixes log lines and the JSON result array on one stream. The array
//! starts at the first line beginning with `[`; everything before it is noise.

use super::Digest;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Invalid {
    #[error("could not find JSON output in the command response")]
    NoJson,

    #[error("no artifacts found in JFrog output")]
    Empty,

    #[error("error parsing JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct Artifact {
    sha256: Digest,
}

/// Undoes the CLI escaping newlines inside its own output
pub fn unescape(output: &str) -> String {
    output.replace("\\n", "\n")
}

/// Returns the digest of the first search result
pub fn first_digest(output: &str) -> Result<Digest, Invalid> {
    let mut offset = 0;
    let mut start = None;
    for line in output.split_inclusive('\n') {
        if line.starts_with('[') {
            start = Some(offset);
            break;
        }
        offset += line.len();
    }

    let payload = &output[start.ok_or(Invalid::NoJson)?..];

    // Only the first value matters; log lines may trail the array.
    let artifacts = serde_json::Deserializer::from_str(payload)
        .into_iter::<Vec<Artifact>>()
        .next()
        .ok_or(Invalid::NoJson)??;

    artifacts
        .into_iter()
        .next()
        .map(|a| a.sha256)
        .ok_or(Invalid::Empty)
}

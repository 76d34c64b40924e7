// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{method} {url} failed with status {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("error reading response: {0}")]
    Io(#[from] std::io::Error),

    #[error("error parsing build info: {0}")]
    Json(#[from] serde_json::Error),

    #[error("buildInfo field not found or has unexpected format")]
    Shape,

    #[error("timeout after {0:?} waiting for build info to be available")]
    TimedOut(Duration),
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{Auth, Error};

use std::io::Read;
use std::time::Duration;

use serde_json::Value;

/// A status code and the full response body
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

/// Blocking HTTP round trips, each bounded by `timeout`
pub trait Transport {
    fn get(&self, url: &str, auth: &Auth, timeout: Duration) -> Result<Reply, Error>;

    fn put_json(&self, url: &str, auth: &Auth, body: &Value, timeout: Duration)
        -> Result<Reply, Error>;
}

#[derive(Clone, Debug)]
pub struct Agent(ureq::Agent);

impl Default for Agent {
    fn default() -> Self {
        Self(ureq::AgentBuilder::new().build())
    }
}

impl Agent {
    // ureq reports 4xx and 5xx as errors; callers want to see those statuses.
    fn reply(result: Result<ureq::Response, ureq::Error>) -> Result<Reply, Error> {
        let rep = match result {
            Ok(rep) => rep,
            Err(ureq::Error::Status(_, rep)) => rep,
            Err(e) => return Err(Error::Transport(e.to_string())),
        };

        // Read the whole body; `into_string` stops at 10 MB.
        let status = rep.status();
        let mut body = String::new();
        rep.into_reader().read_to_string(&mut body)?;

        Ok(Reply { status, body })
    }
}

impl Transport for Agent {
    fn get(&self, url: &str, auth: &Auth, timeout: Duration) -> Result<Reply, Error> {
        let req = self
            .0
            .get(url)
            .set("Authorization", &auth.header())
            .timeout(timeout);

        Self::reply(req.call())
    }

    fn put_json(
        &self,
        url: &str,
        auth: &Auth,
        body: &Value,
        timeout: Duration,
    ) -> Result<Reply, Error> {
        let req = self
            .0
            .put(url)
            .set("Authorization", &auth.header())
            .set("Content-Type", "application/json")
            .timeout(timeout);

        Self::reply(req.send_json(body))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_statuses_are_replies() {
        let rep = ureq::Response::new(404, "Not Found", "gone").unwrap();
        let reply = Agent::reply(Err(ureq::Error::Status(404, rep))).unwrap();

        assert_eq!(
            reply,
            Reply {
                status: 404,
                body: "gone".into(),
            }
        );
    }

    #[test]
    fn large_bodies_are_read_whole() {
        let body = "x".repeat(11 * 1024 * 1024);
        let rep = ureq::Response::new(200, "OK", &body).unwrap();

        let reply = Agent::reply(Ok(rep)).unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body.len(), body.len());
    }
}

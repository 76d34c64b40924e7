// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{Auth, Error, Reply, Transport};

use std::fmt::Display;
use std::time::Duration;

use serde_json::{Map, Value};
use url::{form_urlencoded::byte_serialize, Url};

/// Identifies one build-info record: `(build name, build number)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coordinate {
    pub name: String,
    pub number: String,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.number)
    }
}

// Artifactory wants spaces in path segments as `%20`, not `+`.
fn escape(segment: &str) -> String {
    byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// The `api/build` endpoints under one Artifactory root
pub struct Builds<'a, T: Transport> {
    transport: &'a T,
    auth: &'a Auth,
    base: String,
}

impl<'a, T: Transport> Builds<'a, T> {
    pub fn new(transport: &'a T, auth: &'a Auth, root: &Url) -> Self {
        Self {
            transport,
            auth,
            base: format!("{}/api/build", root.as_str().trim_end_matches('/')),
        }
    }

    pub fn record_url(&self, coord: &Coordinate) -> String {
        format!("{}/{}/{}", self.base, escape(&coord.name), escape(&coord.number))
    }

    pub fn get(&self, coord: &Coordinate, timeout: Duration) -> Result<Reply, Error> {
        self.transport.get(&self.record_url(coord), self.auth, timeout)
    }

    /// Fetches the `{"buildInfo": {...}}` envelope of a published build
    pub fn fetch(&self, coord: &Coordinate, timeout: Duration) -> Result<Value, Error> {
        let url = self.record_url(coord);
        let rep = self.transport.get(&url, self.auth, timeout)?;
        if rep.status != 200 {
            return Err(Error::Status {
                method: "GET",
                url,
                status: rep.status,
                body: rep.body,
            });
        }

        Ok(serde_json::from_str(&rep.body)?)
    }

    /// Replaces a build-info record; `info` is the bare record, not the envelope
    pub fn update(&self, info: &Map<String, Value>, timeout: Duration) -> Result<(), Error> {
        let body = Value::Object(info.clone());
        let rep = self.transport.put_json(&self.base, self.auth, &body, timeout)?;

        match rep.status {
            200 | 201 | 204 => Ok(()),
            status => Err(Error::Status {
                method: "PUT",
                url: self.base.clone(),
                status,
                body: rep.body,
            }),
        }
    }
}

/// The mutable `buildInfo` record inside a fetched envelope
pub fn record(envelope: &mut Value) -> Result<&mut Map<String, Value>, Error> {
    envelope
        .get_mut("buildInfo")
        .and_then(Value::as_object_mut)
        .ok_or(Error::Shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{sanitize, FakeTransport};

    use serde_json::json;

    const T: Duration = Duration::from_secs(30);

    fn coord(name: &str, number: &str) -> Coordinate {
        Coordinate {
            name: name.into(),
            number: number.into(),
        }
    }

    #[test]
    fn record_url_escapes_segments() {
        let transport = FakeTransport::new();
        let auth = Auth::Token("t".into());
        let root = sanitize("https://host/artifactory/ui/").unwrap();
        let builds = Builds::new(&transport, &auth, &root);

        assert_eq!(
            builds.record_url(&coord("my build", "1+2/3")),
            "https://host/artifactory/api/build/my%20build/1%2B2%2F3"
        );
    }

    #[test]
    fn fetch_requires_ok() {
        let transport = FakeTransport::new()
            .reply(404, "not found")
            .reply(200, r#"{"buildInfo": {"number": "7"}}"#);
        let auth = Auth::Token("t".into());
        let root = sanitize("https://host/artifactory/").unwrap();
        let builds = Builds::new(&transport, &auth, &root);

        match builds.fetch(&coord("b", "7"), T) {
            Err(Error::Status { status, body, .. }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "not found");
            }
            other => panic!("unexpected: {:?}", other),
        }

        let mut envelope = builds.fetch(&coord("b", "7"), T).unwrap();
        assert_eq!(record(&mut envelope).unwrap()["number"], "7");
    }

    #[test]
    fn update_puts_bare_record() {
        let transport = FakeTransport::new()
            .reply(204, "")
            .reply(500, "boom");
        let auth = Auth::Token("t".into());
        let root = sanitize("https://host/artifactory/").unwrap();
        let builds = Builds::new(&transport, &auth, &root);

        let mut envelope = json!({"buildInfo": {"name": "b", "number": "7"}});
        let info = record(&mut envelope).unwrap();
        builds.update(info, T).unwrap();

        let requests = transport.requests.borrow();
        assert_eq!(requests[0].method, "PUT");
        assert_eq!(requests[0].url, "https://host/artifactory/api/build");
        assert_eq!(requests[0].body, Some(json!({"name": "b", "number": "7"})));
        drop(requests);

        assert!(matches!(
            builds.update(info, T),
            Err(Error::Status { status: 500, .. })
        ));
    }

    #[test]
    fn record_shape() {
        assert!(matches!(record(&mut json!({})), Err(Error::Shape)));
        assert!(matches!(
            record(&mut json!({"buildInfo": "x"})),
            Err(Error::Shape)
        ));
    }
}

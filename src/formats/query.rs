// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use serde::Serialize;

/// A `jfrog rt search` file spec wrapping one AQL `items.find` clause
#[derive(Clone, Debug, Serialize)]
pub struct Query {
    files: Vec<File>,
}

#[derive(Clone, Debug, Serialize)]
struct File {
    aql: Aql,
}

#[derive(Clone, Debug, Serialize)]
struct Aql {
    #[serde(rename = "items.find")]
    find: Find,
}

#[derive(Clone, Debug, Serialize)]
struct Find {
    repo: String,
    path: String,
    name: String,
}

impl Query {
    const MANIFEST: &'static str = "manifest.json";

    /// Finds the `manifest.json` stored under `path` in repository `repo`
    pub fn manifest(repo: &str, path: &str) -> Self {
        Self {
            files: vec![File {
                aql: Aql {
                    find: Find {
                        repo: repo.into(),
                        path: path.into(),
                        name: Self::MANIFEST.into(),
                    },
                },
            }],
        }
    }
}

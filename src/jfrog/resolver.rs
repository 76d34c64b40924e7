// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{Jfrog, Runner};
use crate::formats::{search, Digest, Query};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

/// Finds the manifest digest of an image stored in Artifactory
pub trait Resolver {
    fn find_digest(&self, repo: &str, path: &str) -> Result<Digest>;
}

/// Resolves digests with `jfrog rt search` and an AQL file spec
pub struct Search<'a, R: Runner> {
    jfrog: &'a Jfrog<R>,
    spec: PathBuf,
}

impl<'a, R: Runner> Search<'a, R> {
    const SPEC: &'static str = "query.json";

    /// The file spec is written to `workdir`
    pub fn new(jfrog: &'a Jfrog<R>, workdir: &Path) -> Self {
        Self {
            jfrog,
            spec: workdir.join(Self::SPEC),
        }
    }

    fn write_spec(&self, query: &Query) -> Result<()> {
        info!("Creating query file: {}", self.spec.display());

        let file = File::create(&self.spec)
            .with_context(|| format!("error creating {}", self.spec.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, query)?;
        writer.write_all(b"\n")?;

        // The CLI reads the file as soon as it starts.
        writer.into_inner()?.sync_all()?;

        info!(
            "Query file contents:\n{}",
            serde_json::to_string_pretty(query)?
        );
        Ok(())
    }
}

impl<'a, R: Runner> Resolver for Search<'a, R> {
    fn find_digest(&self, repo: &str, path: &str) -> Result<Digest> {
        self.write_spec(&Query::manifest(repo, path))?;

        let output = self.jfrog.search(&self.spec)?;
        let digest = search::first_digest(&output)
            .with_context(|| format!("no manifest digest for {}/{}", repo, path))?;

        Ok(digest)
    }
}

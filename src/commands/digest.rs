// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{Command, Settings};
use crate::formats::Reference;
use crate::jfrog::{Jfrog, Resolver, Runner, Search};

use std::io::Write;

use anyhow::{Context, Result};
use structopt::StructOpt;

/// Prints the digest-pinned form of an image pushed to Artifactory
#[derive(StructOpt, Debug)]
pub struct Digest {
    #[structopt(flatten)]
    pub(super) settings: Settings,

    /// The pushed image (format: [registry/]repository/image:tag)
    #[structopt(long = "docker-image", env = "PLUGIN_DOCKER_IMAGE")]
    image: String,
}

impl Command for Digest {
    fn execute(self) -> Result<()> {
        let image: Reference = self
            .image
            .parse()
            .context("error parsing Docker image")?;
        let jfrog = self.settings.jfrog()?;

        self.print(&image, &jfrog, &mut std::io::stdout().lock())
    }
}

impl Digest {
    fn print<R: Runner>(
        &self,
        image: &Reference,
        jfrog: &Jfrog<R>,
        out: &mut impl Write,
    ) -> Result<()> {
        let digest = Search::new(jfrog, &self.settings.workdir)
            .find_digest(&image.repository, &image.manifest_path())?;

        writeln!(out, "{}", image.pinned(&digest))?;
        Ok(())
    }
}

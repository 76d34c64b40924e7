// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{given, given_path, Build, Command, Settings};
use crate::api::{Agent, Builds, Clock, Reconciler, SystemClock, Transport};
use crate::formats::Reference;
use crate::jfrog::{Jfrog, Resolver, Runner, Search};

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use structopt::StructOpt;

/// Publishes build info for a docker image already pushed to Artifactory
#[derive(StructOpt, Debug)]
pub struct Publish {
    #[structopt(flatten)]
    pub(super) settings: Settings,

    #[structopt(flatten)]
    build: Build,

    /// The pushed image (format: [registry/]repository/image:tag)
    #[structopt(long = "docker-image", env = "PLUGIN_DOCKER_IMAGE")]
    image: String,

    /// Link from the build-info record back to the CI build
    #[structopt(long, env = "PLUGIN_BUILD_URL")]
    build_url: Option<String>,

    /// The git checkout to collect VCS details from
    #[structopt(long, env = "PLUGIN_GIT_PATH", parse(from_os_str))]
    git_path: Option<PathBuf>,

    #[structopt(long, env = "DRONE_WORKSPACE", parse(from_os_str))]
    workspace: Option<PathBuf>,

    #[structopt(long, env = "DRONE_GIT_HTTP_URL")]
    repo_url: Option<String>,

    #[structopt(long, env = "DRONE_COMMIT_SHA")]
    commit_sha: Option<String>,

    #[structopt(long, env = "DRONE_REPO_BRANCH")]
    branch: Option<String>,

    #[structopt(long, env = "DRONE_TAG")]
    tag: Option<String>,

    /// Who triggered the build; recorded as the build-info principal
    #[structopt(long, env = "DRONE_BUILD_TRIGGER")]
    principal: Option<String>,
}

impl Command for Publish {
    fn execute(self) -> Result<()> {
        let image: Reference = self
            .image
            .parse()
            .context("error parsing Docker image")?;
        let jfrog = self.settings.jfrog()?;

        self.publish(&image, &jfrog, &Agent::default(), &SystemClock)
    }
}

impl Publish {
    const IMAGE_FILE: &'static str = "image_info.txt";

    fn has_vcs(&self) -> bool {
        given(&self.repo_url).is_some()
            && given(&self.commit_sha).is_some()
            && (given(&self.branch).is_some() || given(&self.tag).is_some())
    }

    fn git_path(&self) -> &Path {
        given_path(&self.git_path)
            .or_else(|| given_path(&self.workspace))
            .unwrap_or_else(|| Path::new("."))
    }

    fn write_image_file(&self, line: &str) -> Result<PathBuf> {
        let path = self.settings.workdir.join(Self::IMAGE_FILE);
        info!("Creating image info file: {}", path.display());

        let mut file = File::create(&path)
            .with_context(|| format!("error creating {}", path.display()))?;
        file.write_all(line.as_bytes())?;
        file.sync_all()?;

        info!("Image info file contents: {}", line);
        Ok(path)
    }

    fn publish<R: Runner, T: Transport, C: Clock>(
        &self,
        image: &Reference,
        jfrog: &Jfrog<R>,
        transport: &T,
        clock: &C,
    ) -> Result<()> {
        let coord = self.build.coordinate();

        let digest = Search::new(jfrog, &self.settings.workdir)
            .find_digest(&image.repository, &image.manifest_path())?;
        let image_file = self.write_image_file(&image.pinned(&digest))?;

        info!("Setting Build Properties to {}", self.image);
        jfrog.docker_create(&image.repository, &coord, &image_file)?;

        if self.has_vcs() {
            info!(
                "Adding VCS information: repo_url={} commit_sha={} branch_name={} tag_name={}",
                given(&self.repo_url).unwrap_or_default(),
                given(&self.commit_sha).unwrap_or_default(),
                given(&self.branch).unwrap_or_default(),
                given(&self.tag).unwrap_or_default(),
            );

            if let Err(e) = jfrog.add_git(&coord, self.git_path()) {
                warn!("error adding VCS information: {:#}", e);
            }
        }

        info!("Publishing Build Info");
        jfrog.publish(&coord, given(&self.build_url))?;

        if let Some(principal) = given(&self.principal) {
            info!("Adding Principal information via REST API: {}", principal);

            let builds = Builds::new(transport, jfrog.auth(), jfrog.url());
            if let Err(e) = Reconciler::new(&builds, clock).run(&coord, principal) {
                warn!("error adding principal to build info: {}", e);
            }
        }

        Ok(())
    }
}

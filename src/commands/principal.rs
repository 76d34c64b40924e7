// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{Build, Command, Settings};
use crate::api::{Agent, Builds, Clock, Reconciler, SystemClock, Transport};

use anyhow::{bail, Context, Result};
use structopt::StructOpt;

/// Records who triggered an already published build
#[derive(StructOpt, Debug)]
pub struct Principal {
    #[structopt(flatten)]
    pub(super) settings: Settings,

    #[structopt(flatten)]
    build: Build,

    /// The triggering user or service
    #[structopt(long, env = "DRONE_BUILD_TRIGGER")]
    principal: String,
}

impl Command for Principal {
    fn execute(self) -> Result<()> {
        self.attach(&Agent::default(), &SystemClock)
    }
}

impl Principal {
    fn attach<T: Transport, C: Clock>(&self, transport: &T, clock: &C) -> Result<()> {
        if self.principal.is_empty() {
            bail!("a principal is required");
        }

        let (url, auth) = self.settings.connection()?;
        let coord = self.build.coordinate();

        let builds = Builds::new(transport, &auth, &url);
        Reconciler::new(&builds, clock)
            .run(&coord, &self.principal)
            .with_context(|| format!("error adding principal to build {}", coord))?;

        Ok(())
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use crate::api::{sanitize, Auth, Coordinate};
use crate::jfrog::{Jfrog, System};

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use structopt::StructOpt;
use url::Url;

mod digest;
mod principal;
mod publish;

pub trait Command {
    fn execute(self) -> anyhow::Result<()>;
}

/// CI variables may be set but empty; treat those as unset.
fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn given_path(value: &Option<PathBuf>) -> Option<&Path> {
    value.as_deref().filter(|p| !p.as_os_str().is_empty())
}

/// Where Artifactory lives and how to log in
#[derive(StructOpt, Debug)]
pub struct Settings {
    /// The Artifactory URL (anything after `/artifactory` is ignored)
    #[structopt(long, env = "PLUGIN_URL")]
    url: String,

    #[structopt(long, env = "PLUGIN_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    #[structopt(long, env = "PLUGIN_USERNAME")]
    username: Option<String>,

    #[structopt(long, env = "PLUGIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Used as the password; requires a username
    #[structopt(long, env = "PLUGIN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// The jfrog CLI executable
    #[structopt(long, default_value = "jfrog", parse(from_os_str))]
    jfrog_cli: PathBuf,

    /// Directory for the files handed to the jfrog CLI
    #[structopt(long, default_value = ".", parse(from_os_str))]
    workdir: PathBuf,

    /// Log level (trace, debug, info, warn[ing], error, fatal or panic)
    #[structopt(long, env = "PLUGIN_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Settings {
    /// Validates the URL and the credentials before anything is run
    pub fn connection(&self) -> Result<(Url, Auth)> {
        let url = sanitize(&self.url)?;
        let auth = Auth::select(
            self.access_token.as_deref(),
            self.username.as_deref(),
            self.password.as_deref(),
            self.api_key.as_deref(),
        )
        .context("error setting auth parameters")?;

        Ok((url, auth))
    }

    pub fn jfrog(&self) -> Result<Jfrog<System>> {
        let (url, auth) = self.connection()?;
        Ok(Jfrog::new(System::new(&self.jfrog_cli), url, auth))
    }

    /// The `env_logger` filter for the configured level; `info` when unset
    pub fn log_level(&self) -> Result<&'static str> {
        let level = match given(&self.log_level) {
            Some(level) => level.to_ascii_lowercase(),
            None => return Ok("info"),
        };

        Ok(match level.as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" | "warning" => "warn",
            "error" | "fatal" | "panic" => "error",
            "off" => "off",
            _ => bail!("unknown log level: {}", level),
        })
    }
}

/// The build-info record to write to
#[derive(StructOpt, Debug)]
pub struct Build {
    #[structopt(long = "build-name", env = "PLUGIN_BUILD_NAME")]
    name: String,

    #[structopt(long = "build-number", env = "PLUGIN_BUILD_NUMBER")]
    number: String,
}

impl Build {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            name: self.name.clone(),
            number: self.number.clone(),
        }
    }
}

#[derive(StructOpt, Debug)]
#[structopt(about = "publishes Artifactory build info for pushed docker images")]
pub enum Main {
    Publish(publish::Publish),
    Digest(digest::Digest),
    Principal(principal::Principal),
}

impl Main {
    pub fn log_level(&self) -> Result<&'static str> {
        match self {
            Self::Publish(cmd) => cmd.settings.log_level(),
            Self::Digest(cmd) => cmd.settings.log_level(),
            Self::Principal(cmd) => cmd.settings.log_level(),
        }
    }
}

impl Command for Main {
    fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Publish(cmd) => cmd.execute(),
            Self::Digest(cmd) => cmd.execute(),
            Self::Principal(cmd) => cmd.execute(),
        }
    }
}

#[cfg(test)]
pub(crate) fn settings(url: &str, workdir: &Path) -> Settings {
    Settings {
        url: url.into(),
        access_token: None,
        username: Some("ci".into()),
        password: Some("".into()),
        api_key: Some("key".into()),
        jfrog_cli: "jfrog".into(),
        workdir: workdir.into(),
        log_level: None,
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

//! Driving the `jfrog` CLI

mod resolver;

pub use self::resolver::{Resolver, Search};

use crate::api::{Auth, Coordinate};
use crate::formats::search;

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use url::Url;

/// Runs one CLI invocation to completion and returns its combined output
pub trait Runner {
    fn run(&self, args: &[String]) -> Result<String>;
}

/// Hides credentials before a command line is logged
fn redact(args: &[String]) -> String {
    const SECRET: &[&str] = &["--password=", "--access-token="];

    args.iter()
        .map(|arg| match SECRET.iter().find(|s| arg.starts_with(*s)) {
            Some(flag) => format!("{}***", flag),
            None => arg.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Spawns the real executable
#[derive(Clone, Debug)]
pub struct System {
    program: PathBuf,
}

impl System {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Runner for System {
    fn run(&self, args: &[String]) -> Result<String> {
        let line = redact(args);
        info!("Executing command: {} {}", self.program.display(), line);

        let out = Command::new(&self.program)
            .args(args)
            .output()
            .with_context(|| format!("failed to spawn {}", self.program.display()))?;

        // The search results arrive on stdout, the CLI's own logging on stderr.
        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));
        info!("Command output:\n{}", output);

        if !out.status.success() {
            error!("Error executing command: {}", out.status);
            return Err(anyhow!("`{}` failed: {}", line, out.status));
        }

        Ok(output)
    }
}

/// The `jfrog rt` sub-commands used to assemble a docker build-info record
pub struct Jfrog<R: Runner> {
    runner: R,
    url: Url,
    auth: Auth,
}

impl<R: Runner> Jfrog<R> {
    pub fn new(runner: R, url: Url, auth: Auth) -> Self {
        Self { runner, url, auth }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    fn run(&self, mut args: Vec<String>, remote: bool) -> Result<String> {
        if remote {
            args.push(format!("--url={}", self.url));
            args.extend(self.auth.cli_args());
        }

        self.runner.run(&args)
    }

    /// Runs an AQL file spec and returns the raw, unescaped output
    pub fn search(&self, spec: &Path) -> Result<String> {
        let args = vec![
            "rt".into(),
            "s".into(),
            format!("--spec={}", spec.display()),
        ];

        let output = self.run(args, true).context("jfrog rt s")?;
        Ok(search::unescape(&output))
    }

    /// Registers the image named in `image_file` with a build
    pub fn docker_create(&self, repo: &str, coord: &Coordinate, image_file: &Path) -> Result<()> {
        let args = vec![
            "rt".into(),
            "build-docker-create".into(),
            repo.into(),
            format!("--build-name={}", coord.name),
            format!("--build-number={}", coord.number),
            format!("--image-file={}", image_file.display()),
        ];

        self.run(args, true).context("jfrog rt build-docker-create")?;
        Ok(())
    }

    /// Collects VCS details from the git checkout at `git_path`
    pub fn add_git(&self, coord: &Coordinate, git_path: &Path) -> Result<()> {
        let args = vec![
            "rt".into(),
            "build-add-git".into(),
            coord.name.clone(),
            coord.number.clone(),
            git_path.display().to_string(),
        ];

        self.run(args, false).context("jfrog rt build-add-git")?;
        Ok(())
    }

    pub fn publish(&self, coord: &Coordinate, build_url: Option<&str>) -> Result<()> {
        let mut args = vec!["rt".into(), "build-publish".into()];
        if let Some(build_url) = build_url {
            args.push(format!("--build-url={}", build_url));
        }
        args.push(coord.name.clone());
        args.push(coord.number.clone());

        self.run(args, true).context("jfrog rt build-publish")?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use anyhow::{anyhow, Result};

    /// Records every invocation; answers by sub-command (`args[1]`)
    #[derive(Debug, Default)]
    pub struct Runner {
        outputs: HashMap<String, String>,
        failing: Vec<String>,
        pub calls: RefCell<Vec<Vec<String>>>,
    }

    impl Runner {
        pub fn output(mut self, command: &str, output: &str) -> Self {
            self.outputs.insert(command.into(), output.into());
            self
        }

        pub fn failing(mut self, command: &str) -> Self {
            self.failing.push(command.into());
            self
        }

        pub fn commands(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|c| c[1].clone()).collect()
        }
    }

    impl super::Runner for &Runner {
        fn run(&self, args: &[String]) -> Result<String> {
            self.calls.borrow_mut().push(args.to_vec());

            let command = &args[1];
            if self.failing.contains(command) {
                return Err(anyhow!("{} exited with status 1", command));
            }

            Ok(self.outputs.get(command).cloned().unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::sanitize;

    fn jfrog(runner: &fake::Runner, auth: Auth) -> Jfrog<&fake::Runner> {
        let url = sanitize("https://jfrog.example.com/artifactory/").unwrap();
        Jfrog::new(runner, url, auth)
    }

    fn coord() -> Coordinate {
        Coordinate {
            name: "build-7".into(),
            number: "42".into(),
        }
    }

    #[test]
    fn redacts_secrets() {
        let args: Vec<String> = vec![
            "rt".into(),
            "s".into(),
            "--user=me".into(),
            "--password=hunter2".into(),
            "--access-token=tok".into(),
        ];

        assert_eq!(
            redact(&args),
            "rt s --user=me --password=*** --access-token=***"
        );
    }

    #[test]
    fn remote_commands_carry_url_and_auth() {
        let runner = fake::Runner::default();
        let jfrog = jfrog(&runner, Auth::Token("tok".into()));

        jfrog
            .docker_create("my-repo", &coord(), Path::new("image_info.txt"))
            .unwrap();
        jfrog.publish(&coord(), None).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(
            calls[0],
            vec![
                "rt",
                "build-docker-create",
                "my-repo",
                "--build-name=build-7",
                "--build-number=42",
                "--image-file=image_info.txt",
                "--url=https://jfrog.example.com/artifactory/",
                "--access-token=tok",
            ]
        );
        assert_eq!(
            calls[1],
            vec![
                "rt",
                "build-publish",
                "build-7",
                "42",
                "--url=https://jfrog.example.com/artifactory/",
                "--access-token=tok",
            ]
        );
    }

    #[test]
    fn add_git_is_local() {
        let runner = fake::Runner::default();
        let auth = Auth::Password {
            user: "me".into(),
            password: "pw".into(),
        };
        let jfrog = jfrog(&runner, auth);

        jfrog.add_git(&coord(), Path::new("/drone/src")).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls[0], vec!["rt", "build-add-git", "build-7", "42", "/drone/src"]);
    }

    #[test]
    fn publish_with_build_url() {
        let runner = fake::Runner::default();
        let jfrog = jfrog(&runner, Auth::Token("tok".into()));

        jfrog
            .publish(&coord(), Some("https://ci.example.com/7"))
            .unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls[0][2], "--build-url=https://ci.example.com/7");
    }

    #[test]
    fn search_unescapes_output() {
        let runner = fake::Runner::default().output("s", "banner\\n[]");
        let jfrog = jfrog(&runner, Auth::Token("tok".into()));

        let output = jfrog.search(Path::new("query.json")).unwrap();
        assert_eq!(output, "banner\n[]");
        assert_eq!(runner.calls.borrow()[0][2], "--spec=query.json");
    }

    #[test]
    fn failures_propagate() {
        let runner = fake::Runner::default().failing("build-publish");
        let jfrog = jfrog(&runner, Auth::Token("tok".into()));

        let err = jfrog.publish(&coord(), None).unwrap_err();
        assert!(format!("{:#}", err).contains("jfrog rt build-publish"));
    }
}

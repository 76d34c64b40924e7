// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

//! Attaching the triggering principal to a freshly published build
//!
//! `jfrog rt build-publish` returns before the record is visible through the
//! REST API, so the record is polled for with exponential backoff before it
//! is fetched, modified and written back. The whole exchange runs against a
//! single deadline.

use super::build::{record, Builds, Coordinate};
use super::{Error, Transport};

use std::time::{Duration, Instant};

use anyhow::anyhow;
use log::{debug, info};
use serde_json::Value;

pub const TIMEOUT: Duration = Duration::from_secs(30);
pub const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
pub const BACKOFF_MULTIPLIER: u32 = 2;
pub const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// A source of time that can also wait
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration)
    }
}

struct Deadline<'a, C: Clock> {
    clock: &'a C,
    at: Instant,
}

impl<'a, C: Clock> Deadline<'a, C> {
    fn new(clock: &'a C, timeout: Duration) -> Self {
        Self {
            clock,
            at: clock.now() + timeout,
        }
    }

    /// The time left, or `TimedOut` once none is
    fn remaining(&self) -> Result<Duration, Error> {
        match self.at.checked_duration_since(self.clock.now()) {
            Some(left) if !left.is_zero() => Ok(left),
            _ => Err(Error::TimedOut(TIMEOUT)),
        }
    }

    /// Sleeps for `duration`, or until the deadline if that comes first
    fn sleep(&self, duration: Duration) -> Result<(), Error> {
        let left = self.remaining()?;
        if duration >= left {
            self.clock.sleep(left);
            return Err(Error::TimedOut(TIMEOUT));
        }

        self.clock.sleep(duration);
        Ok(())
    }
}

#[derive(Copy, Clone, Debug)]
struct Backoff(Duration);

impl Default for Backoff {
    fn default() -> Self {
        Self(INITIAL_BACKOFF)
    }
}

impl Backoff {
    /// The current delay; the next one grows by `BACKOFF_MULTIPLIER` up to `MAX_BACKOFF`
    fn step(&mut self) -> Duration {
        let current = self.0;
        self.0 = (current * BACKOFF_MULTIPLIER).min(MAX_BACKOFF);
        current
    }
}

/// Whether `body` is the build-info envelope for build `number`
fn confirms(body: &str, number: &str) -> anyhow::Result<()> {
    let envelope: Value = serde_json::from_str(body)?;

    let found = envelope
        .get("buildInfo")
        .and_then(Value::as_object)
        .ok_or_else(|| anyhow!("buildInfo field not found or has unexpected format"))?
        .get("number")
        .and_then(Value::as_str);

    match found {
        Some(n) if n == number => Ok(()),
        found => Err(anyhow!(
            "build number mismatch or missing: expected {}, got {:?}",
            number,
            found
        )),
    }
}

pub struct Reconciler<'a, T: Transport, C: Clock> {
    builds: &'a Builds<'a, T>,
    clock: &'a C,
}

impl<'a, T: Transport, C: Clock> Reconciler<'a, T, C> {
    pub fn new(builds: &'a Builds<'a, T>, clock: &'a C) -> Self {
        Self { builds, clock }
    }

    /// Sets `principal` on the build-info record of `coord`
    pub fn run(&self, coord: &Coordinate, principal: &str) -> Result<(), Error> {
        let deadline = Deadline::new(self.clock, TIMEOUT);

        self.wait(coord, &deadline)?;

        info!("Fetching build info from: {}", self.builds.record_url(coord));
        let mut envelope = self.builds.fetch(coord, deadline.remaining()?)?;
        let info = record(&mut envelope)?;

        info!("Adding principal '{}' to build info", principal);
        info.insert("principal".into(), Value::String(principal.into()));

        debug!("Sending build info update to API");
        self.builds.update(info, deadline.remaining()?)?;

        info!("Successfully updated build info with principal");
        Ok(())
    }

    fn wait(&self, coord: &Coordinate, deadline: &Deadline<'_, C>) -> Result<(), Error> {
        info!("Polling for build info availability...");

        let mut backoff = Backoff::default();
        loop {
            let delay = backoff.step();
            let status = match self.builds.get(coord, deadline.remaining()?) {
                Ok(rep) if rep.status == 200 => confirms(&rep.body, &coord.number),
                Ok(rep) => Err(anyhow!("status code {}", rep.status)),
                Err(e) => Err(anyhow!("{}", e)),
            };

            match status {
                Ok(()) => {
                    info!("Build info is now available");
                    return Ok(());
                }

                Err(e) => debug!("Build info not yet available ({}), retrying in {:?}", e, delay),
            }

            deadline.sleep(delay)?;
        }
    }
}

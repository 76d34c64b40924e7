// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

//! The Artifactory REST API

mod auth;
mod base;
mod build;
mod error;
mod reconcile;
mod transport;

pub use self::auth::Auth;
pub use self::base::sanitize;
pub use self::build::{Builds, Coordinate};
pub use self::error::Error;
pub use self::reconcile::{Clock, Reconciler, SystemClock};
pub use self::transport::{Agent, Reply, Transport};

#[cfg(test)]
pub(crate) use self::reconcile::fake::Clock as FakeClock;
#[cfg(test)]
pub(crate) use self::transport::fake::Transport as FakeTransport;

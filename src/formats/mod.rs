// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

//! Data formats exchanged with the user, the registry and the `jfrog` CLI

mod digest;
mod query;
mod reference;
pub mod search;

pub use self::digest::Digest;
pub use self::query::Query;
pub use self::reference::Reference;

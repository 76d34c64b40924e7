// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

mod api;
mod commands;
mod formats;
mod jfrog;

use commands::Command;
use env_logger::{Builder, Env};
use structopt::StructOpt;

fn main() -> anyhow::Result<()> {
    let main = commands::Main::from_args();

    Builder::from_env(Env::default().default_filter_or(main.log_level()?))
        .format_timestamp(None)
        .init();

    main.execute()
}

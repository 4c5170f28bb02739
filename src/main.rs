// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[macro_use]
extern crate log;

use raft_bench_analysis::*;

fn main() {
    let config = Config::new();

    if let Err(e) = Logger::new()
        .label("raft_bench")
        .level(config.logging())
        .init()
    {
        println!("ERROR: failed to initialize logger: {}", e);
        std::process::exit(1);
    }

    info!("{} {} initializing...", NAME, VERSION);

    config.print();

    if let Err(e) = run(&config) {
        fatal!("{}", e);
    }
}

fn run(config: &Config) -> Result<()> {
    let analysis = Analysis::from_config(config)?;
    analysis.print();

    render(
        &analysis,
        config.output(),
        config.size(),
        config.delay_target(),
        config.jitter_ms(),
    )?;

    if let Some(path) = config.export() {
        export(&analysis, path)?;
    }

    Ok(())
}

// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[macro_use]
extern crate log;

use raft_bench_analysis::*;

fn main() {
    let config = Config::for_delay_chart();

    if let Err(e) = Logger::new()
        .label("delay_chart")
        .level(config.logging())
        .init()
    {
        println!("ERROR: failed to initialize logger: {}", e);
        std::process::exit(1);
    }

    debug!("{} {} delay-chart", NAME, VERSION);

    match render_delay_schedule(config.schedule()) {
        Ok(chart) => print!("{}", chart),
        Err(e) => fatal!("{}", e),
    }
}

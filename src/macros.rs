// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Log at error level and terminate the process with a non-zero status.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
        log::logger().flush();
        std::process::exit(1)
    }};
}

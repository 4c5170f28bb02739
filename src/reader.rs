// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};

use std::path::Path;

/// Load an entire log file.
pub fn read_log(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| Error::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("read {} bytes from {}", content.len(), path.display());
    Ok(content)
}

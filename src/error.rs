// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure is fatal to a run. There is no skip-and-continue path.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed {field}: {value:?} ({reason})")]
    Parse {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("no events found in {0}")]
    EmptyInput(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to render chart: {0}")]
    Render(String),
    #[error("failed to export report to {path}: {reason}")]
    Export { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn parse(field: &'static str, value: &str, reason: impl ToString) -> Self {
        Error::Parse {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn empty(what: impl Into<String>) -> Self {
        Error::EmptyInput(what.into())
    }
}

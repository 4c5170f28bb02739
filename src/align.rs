// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};

/// Cut both series to the shorter length by dropping trailing elements.
///
/// Pairs are matched by index position, not by timestamp.
pub fn truncate_to_equal_length<A, B>(mut a: Vec<A>, mut b: Vec<B>) -> (Vec<A>, Vec<B>) {
    let len = a.len().min(b.len());
    a.truncate(len);
    b.truncate(len);
    (a, b)
}

/// Combined min/max of both sequences, padded on each end by
/// `margin_fraction * (max - min)`.
pub fn shared_range(a: &[f64], b: &[f64], margin_fraction: f64) -> Result<(f64, f64)> {
    let mut values = a.iter().chain(b.iter()).copied();
    let first = values
        .next()
        .ok_or_else(|| Error::empty("shared range input"))?;
    let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let margin = margin_fraction * (max - min);
    Ok((min - margin, max + margin))
}

//! Area-weighted centroids used to anchor group labels.
//!
//! Each member pulls with weight `r²`, so larger dots draw the label more
//! strongly than small ones.

use std::collections::BTreeMap;

use super::Point;
use crate::error::LayoutError;

/// Centroid of `(position, radius)` pairs weighted by squared radius.
pub fn centroid<I>(members: I) -> Result<Point, LayoutError>
where
    I: IntoIterator<Item = (Point, f64)>,
{
    let (mut x, mut y, mut z) = (0.0, 0.0, 0.0);
    for (p, r) in members {
        let k = r * r;
        x += p.x * k;
        y += p.y * k;
        z += k;
    }
    if z > 0.0 {
        Ok(Point::new(x / z, y / z))
    } else {
        Err(LayoutError::EmptyGroup)
    }
}

/// Centroid for every group present in `members`.
///
/// Items are `(group key, position, radius)`. The returned keys are exactly
/// the distinct keys of the input.
pub fn group_centroids<'a, I>(members: I) -> Result<BTreeMap<String, Point>, LayoutError>
where
    I: IntoIterator<Item = (&'a str, Point, f64)>,
{
    let mut grouped: BTreeMap<&'a str, Vec<(Point, f64)>> = BTreeMap::new();
    for (key, p, r) in members {
        grouped.entry(key).or_default().push((p, r));
    }
    grouped
        .into_iter()
        .map(|(key, group)| Ok((key.to_string(), centroid(group)?)))
        .collect()
}

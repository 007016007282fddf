use std::cmp::Ordering;
use std::fmt;

use crate::types::Year;

/// Identifies one reporting partition of the accumulated results.
///
/// The global pair covers the whole run; each harvest year additionally gets its own
/// pair. The `Recycled` members restrict to material that has been through at least one
/// recycling generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccumulatorKey {
    GlobalAll,
    GlobalRecycled,
    YearAll(Year),
    YearRecycled(Year),
}

impl AccumulatorKey {
    /// Returns the harvest year of a per-year key.
    pub fn year(&self) -> Option<Year> {
        match self {
            AccumulatorKey::GlobalAll | AccumulatorKey::GlobalRecycled => None,
            AccumulatorKey::YearAll(year) | AccumulatorKey::YearRecycled(year) => Some(*year),
        }
    }

    /// Returns whether this key restricts to recycled material.
    pub fn is_recycled(&self) -> bool {
        matches!(
            self,
            AccumulatorKey::GlobalRecycled | AccumulatorKey::YearRecycled(_)
        )
    }
}

/// Orders keys the way archives are uploaded: the global pair first, then each harvest
/// year's pair.
impl Ord for AccumulatorKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.year(), self.is_recycled()).cmp(&(other.year(), other.is_recycled()))
    }
}

impl PartialOrd for AccumulatorKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AccumulatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccumulatorKey::GlobalAll => write!(f, "global-all"),
            AccumulatorKey::GlobalRecycled => write!(f, "global-recycled"),
            AccumulatorKey::YearAll(year) => write!(f, "{year}-all"),
            AccumulatorKey::YearRecycled(year) => write!(f, "{year}-recycled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_order_global_pair_first() {
        let mut keys = vec![
            AccumulatorKey::YearRecycled(2010),
            AccumulatorKey::GlobalRecycled,
            AccumulatorKey::YearAll(2011),
            AccumulatorKey::GlobalAll,
            AccumulatorKey::YearAll(2010),
        ];
        keys.sort();

        assert_eq!(
            keys,
            vec![
                AccumulatorKey::GlobalAll,
                AccumulatorKey::GlobalRecycled,
                AccumulatorKey::YearAll(2010),
                AccumulatorKey::YearRecycled(2010),
                AccumulatorKey::YearAll(2011),
            ]
        );
    }

    #[test]
    fn keys_render_partition_names() {
        assert_eq!(AccumulatorKey::GlobalAll.to_string(), "global-all");
        assert_eq!(AccumulatorKey::YearRecycled(2012).to_string(), "2012-recycled");
    }
}

//! Materialization of finished accumulators into uploadable archives.
//!
//! Each finalized accumulator turns into one zip archive holding the long-format raw
//! dataset, the fully summed `final` cross-section, and the fixed catalogue of derived
//! tables. Archives and their members are named by the partition's prefix, so every
//! partition of a run lands under a distinct storage key.

use std::fmt;

mod archive;
mod tables;

pub use archive::OutputBundle;
pub use tables::derive_tables;

use crate::aggregate::AccumulatorKey;
use crate::error::HwpcResult;
use crate::types::{Dataset, Year};

/// Naming prefix of one reporting partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPrefix {
    Global,
    GlobalRecycled,
    Year(Year),
    YearRecycled(Year),
}

impl From<&AccumulatorKey> for ReportPrefix {
    fn from(key: &AccumulatorKey) -> Self {
        match key {
            AccumulatorKey::GlobalAll => ReportPrefix::Global,
            AccumulatorKey::GlobalRecycled => ReportPrefix::GlobalRecycled,
            AccumulatorKey::YearAll(year) => ReportPrefix::Year(*year),
            AccumulatorKey::YearRecycled(year) => ReportPrefix::YearRecycled(*year),
        }
    }
}

impl fmt::Display for ReportPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportPrefix::Global => Ok(()),
            ReportPrefix::GlobalRecycled => write!(f, "rec_"),
            ReportPrefix::Year(year) => write!(f, "{year}_"),
            ReportPrefix::YearRecycled(year) => write!(f, "{year}_rec_"),
        }
    }
}

/// Builds the archive for one finalized accumulator.
///
/// The resulting bundle is keyed `"<prefix><run_name>.zip"`.
pub fn build_bundle(
    run_name: &str,
    prefix: ReportPrefix,
    ds: &Dataset,
) -> HwpcResult<OutputBundle> {
    let tables = derive_tables(ds)?;
    let member_prefix = prefix.to_string();
    let bytes = archive::build_archive(&member_prefix, ds, &tables)?;

    Ok(OutputBundle {
        key: format!("{prefix}{run_name}.zip"),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, FieldDims, Lineage};

    #[test]
    fn prefixes_render_partition_names() {
        assert_eq!(ReportPrefix::Global.to_string(), "");
        assert_eq!(ReportPrefix::GlobalRecycled.to_string(), "rec_");
        assert_eq!(ReportPrefix::Year(2011).to_string(), "2011_");
        assert_eq!(ReportPrefix::YearRecycled(2011).to_string(), "2011_rec_");
    }

    #[test]
    fn bundle_keys_combine_prefix_and_run_name() {
        let ds = Dataset::new(Lineage::for_year(2010), vec![2010], vec![1], vec![0])
            .unwrap()
            .with_field(Field::Emitted, FieldDims::Full, vec![1.0])
            .unwrap();

        let bundle = build_bundle("run42", ReportPrefix::YearRecycled(2010), &ds).unwrap();

        assert_eq!(bundle.key, "2010_rec_run42.zip");
        assert!(!bundle.bytes.is_empty());
    }
}

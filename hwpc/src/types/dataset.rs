use std::collections::BTreeMap;

use crate::bail;
use crate::error::{ErrorKind, HwpcResult};
use crate::types::Lineage;

/// Harvest year coordinate.
pub type Year = i32;

/// End-use product category coordinate.
pub type EndUseId = u32;

/// Discard destination coordinate.
pub type DestinationId = u32;

/// Discard destination codes shared between the simulation and the reporting slices.
pub mod disposition {
    use super::DestinationId;

    pub const BURNED: DestinationId = 0;
    pub const RECYCLED: DestinationId = 1;
    pub const COMPOSTED: DestinationId = 2;
    pub const LANDFILLS: DestinationId = 3;
    pub const DUMPS: DestinationId = 4;
}

/// Named numeric fields carried by a [`Dataset`].
///
/// The additive fields are the simulated quantities that sum under accumulation. `Fuel`
/// (a per-end-use flag) and `Ccf` (the input harvest-volume series) are carried along
/// unchanged instead of summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    EndUseProducts,
    EndUseSum,
    ProductsInUse,
    DiscardedProducts,
    DiscardDispositions,
    CanDecay,
    Fixed,
    DiscardRemaining,
    CouldDecay,
    Emitted,
    Present,
    Fuel,
    Ccf,
}

impl Field {
    /// Fields that sum elementwise under [`crate::aggregate::merge`].
    pub const ADDITIVE: [Field; 11] = [
        Field::EndUseProducts,
        Field::EndUseSum,
        Field::ProductsInUse,
        Field::DiscardedProducts,
        Field::DiscardDispositions,
        Field::CanDecay,
        Field::Fixed,
        Field::DiscardRemaining,
        Field::CouldDecay,
        Field::Emitted,
        Field::Present,
    ];

    /// Fields carried through merges without summation.
    pub const CARRIED: [Field; 2] = [Field::Fuel, Field::Ccf];

    /// Every field, in catalogue order.
    pub const ALL: [Field; 13] = [
        Field::EndUseProducts,
        Field::EndUseSum,
        Field::ProductsInUse,
        Field::DiscardedProducts,
        Field::DiscardDispositions,
        Field::CanDecay,
        Field::Fixed,
        Field::DiscardRemaining,
        Field::CouldDecay,
        Field::Emitted,
        Field::Present,
        Field::Fuel,
        Field::Ccf,
    ];

    /// Returns whether this field sums under accumulation.
    pub fn is_additive(&self) -> bool {
        !matches!(self, Field::Fuel | Field::Ccf)
    }

    /// Returns the column name used in serialized tables.
    pub fn name(&self) -> &'static str {
        match self {
            Field::EndUseProducts => "end_use_products",
            Field::EndUseSum => "end_use_sum",
            Field::ProductsInUse => "products_in_use",
            Field::DiscardedProducts => "discarded_products",
            Field::DiscardDispositions => "discard_dispositions",
            Field::CanDecay => "can_decay",
            Field::Fixed => "fixed",
            Field::DiscardRemaining => "discard_remaining",
            Field::CouldDecay => "could_decay",
            Field::Emitted => "emitted",
            Field::Present => "present",
            Field::Fuel => "fuel",
            Field::Ccf => "ccf",
        }
    }
}

/// Dimensionality of one field within a [`Dataset`].
///
/// Not every field spans every coordinate axis: the harvest-volume series is per-year,
/// the fuel flag is per-end-use, and the discard pipeline fields span all three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDims {
    Year,
    EndUse,
    YearEndUse,
    Full,
}

impl FieldDims {
    pub(crate) fn has_year(&self) -> bool {
        !matches!(self, FieldDims::EndUse)
    }

    pub(crate) fn has_end_use(&self) -> bool {
        !matches!(self, FieldDims::Year)
    }

    pub(crate) fn has_destination(&self) -> bool {
        matches!(self, FieldDims::Full)
    }

    /// Returns the axis-wise union of two dimensionalities.
    pub(crate) fn union(self, other: FieldDims) -> FieldDims {
        let year = self.has_year() || other.has_year();
        let end_use = self.has_end_use() || other.has_end_use();
        let destination = self.has_destination() || other.has_destination();

        match (year, end_use, destination) {
            (true, false, false) => FieldDims::Year,
            (false, true, false) => FieldDims::EndUse,
            (true, true, false) => FieldDims::YearEndUse,
            // A destination axis only ever appears together with the other two.
            _ => FieldDims::Full,
        }
    }
}

/// Dense values of one field, row-major over the dataset's sorted coordinate vectors.
#[derive(Debug, Clone)]
pub struct FieldValues {
    pub(crate) dims: FieldDims,
    pub(crate) values: Vec<f64>,
}

impl FieldValues {
    /// Returns the dimensionality of this field.
    pub fn dims(&self) -> FieldDims {
        self.dims
    }

    /// Returns the raw dense values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// A multi-dimensional numeric record over `{Year, EndUseID, DiscardDestinationID}`.
///
/// [`Dataset`] is both the partial result produced by one simulation task and the running
/// accumulator value maintained per reporting key. Coordinates are kept sorted and
/// deduplicated; each field stores its own dimensionality and a dense row-major array
/// over the coordinate vectors. Reads through [`Dataset::value`] broadcast over axes a
/// field does not span and return `0.0` outside the coordinate extent, which is what
/// makes the outer-join merge total.
#[derive(Debug, Clone)]
pub struct Dataset {
    lineage: Lineage,
    years: Vec<Year>,
    end_uses: Vec<EndUseId>,
    destinations: Vec<DestinationId>,
    fields: BTreeMap<Field, FieldValues>,
}

impl Dataset {
    /// Creates an empty dataset over the given coordinate extents.
    ///
    /// Coordinates are sorted and deduplicated. At least one year is required since every
    /// partial result describes at least its own harvest year.
    pub fn new(
        lineage: Lineage,
        years: Vec<Year>,
        end_uses: Vec<EndUseId>,
        destinations: Vec<DestinationId>,
    ) -> HwpcResult<Self> {
        let years = sorted_unique(years);
        let end_uses = sorted_unique(end_uses);
        let destinations = sorted_unique(destinations);

        if years.is_empty() {
            bail!(
                ErrorKind::InvalidData,
                "Dataset requires at least one year coordinate",
                format!("lineage {lineage}")
            );
        }

        Ok(Self {
            lineage,
            years,
            end_uses,
            destinations,
            fields: BTreeMap::new(),
        })
    }

    /// Sets the dense values of one field.
    ///
    /// The value count must match the product of the coordinate extents the field spans,
    /// otherwise [`ErrorKind::FieldShapeMismatch`] is returned.
    pub fn set_field(
        &mut self,
        field: Field,
        dims: FieldDims,
        values: Vec<f64>,
    ) -> HwpcResult<()> {
        let expected = self.dims_len(dims);
        if values.len() != expected {
            bail!(
                ErrorKind::FieldShapeMismatch,
                "Field values do not match the dataset coordinate extent",
                format!(
                    "field {} expects {} values, got {}",
                    field.name(),
                    expected,
                    values.len()
                )
            );
        }

        self.fields.insert(field, FieldValues { dims, values });

        Ok(())
    }

    /// Builder-style variant of [`Dataset::set_field`].
    pub fn with_field(
        mut self,
        field: Field,
        dims: FieldDims,
        values: Vec<f64>,
    ) -> HwpcResult<Self> {
        self.set_field(field, dims, values)?;
        Ok(self)
    }

    pub fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    pub fn years(&self) -> &[Year] {
        &self.years
    }

    pub fn end_uses(&self) -> &[EndUseId] {
        &self.end_uses
    }

    pub fn destinations(&self) -> &[DestinationId] {
        &self.destinations
    }

    /// Returns whether the dataset carries the given field.
    pub fn has_field(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    /// Returns the stored values of one field, if present.
    pub fn field(&self, field: Field) -> Option<&FieldValues> {
        self.fields.get(&field)
    }

    /// Iterates over the fields present in this dataset, in catalogue order.
    pub fn fields(&self) -> impl Iterator<Item = (Field, &FieldValues)> {
        self.fields.iter().map(|(field, values)| (*field, values))
    }

    /// Reads one value by coordinate.
    ///
    /// Axes the field does not span are ignored (broadcast); coordinates outside the
    /// dataset extent and missing fields read as `0.0`.
    pub fn value(
        &self,
        field: Field,
        year: Year,
        end_use: EndUseId,
        destination: DestinationId,
    ) -> f64 {
        let Some(stored) = self.fields.get(&field) else {
            return 0.0;
        };

        let mut offset = 0usize;

        if stored.dims.has_year() {
            let Ok(index) = self.years.binary_search(&year) else {
                return 0.0;
            };
            offset = index;
        }

        if stored.dims.has_end_use() {
            let Ok(index) = self.end_uses.binary_search(&end_use) else {
                return 0.0;
            };
            offset = offset * self.end_uses.len() + index;
        }

        if stored.dims.has_destination() {
            let Ok(index) = self.destinations.binary_search(&destination) else {
                return 0.0;
            };
            offset = offset * self.destinations.len() + index;
        }

        stored.values[offset]
    }

    /// Replaces the `ccf` field with the given per-year series.
    ///
    /// Years of this dataset absent from `years` are zero-filled; this is how the input
    /// harvest-volume series is attached to a finished accumulator.
    pub fn set_ccf_series(&mut self, years: &[Year], ccf: &[f64]) -> HwpcResult<()> {
        let values = self
            .years
            .iter()
            .map(|year| {
                years
                    .iter()
                    .position(|candidate| candidate == year)
                    .map(|index| ccf[index])
                    .unwrap_or(0.0)
            })
            .collect();

        self.set_field(Field::Ccf, FieldDims::Year, values)
    }

    /// Returns the dense value count a field of the given dimensionality must have.
    pub(crate) fn dims_len(&self, dims: FieldDims) -> usize {
        let mut len = 1usize;

        if dims.has_year() {
            len *= self.years.len();
        }
        if dims.has_end_use() {
            len *= self.end_uses.len();
        }
        if dims.has_destination() {
            len *= self.destinations.len();
        }

        len
    }
}

fn sorted_unique<T: Ord>(mut coords: Vec<T>) -> Vec<T> {
    coords.sort_unstable();
    coords.dedup();
    coords
}

/// The input harvest-volume series, indexed by harvest year.
///
/// This is an input to the simulation, never a simulated output; it is attached to the
/// global accumulator after the run drains instead of being summed from partial results.
#[derive(Debug, Clone)]
pub struct HarvestSeries {
    years: Vec<Year>,
    ccf: Vec<f64>,
}

impl HarvestSeries {
    /// Creates a harvest series from parallel year and volume vectors.
    pub fn new(years: Vec<Year>, ccf: Vec<f64>) -> HwpcResult<Self> {
        if years.is_empty() {
            bail!(
                ErrorKind::InvalidData,
                "Harvest series must cover at least one year"
            );
        }
        if years.len() != ccf.len() {
            bail!(
                ErrorKind::InvalidData,
                "Harvest series years and volumes must have equal length",
                format!("{} years, {} volumes", years.len(), ccf.len())
            );
        }

        Ok(Self { years, ccf })
    }

    pub fn years(&self) -> &[Year] {
        &self.years
    }

    pub fn ccf(&self) -> &[f64] {
        &self.ccf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::new(Lineage::for_year(2010), vec![2011, 2010], vec![1, 2], vec![0, 3])
            .unwrap()
            .with_field(
                Field::Emitted,
                FieldDims::Full,
                vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            )
            .unwrap()
            .with_field(Field::Fuel, FieldDims::EndUse, vec![1.0, 0.0])
            .unwrap()
            .with_field(Field::Ccf, FieldDims::Year, vec![10.0, 20.0])
            .unwrap()
    }

    #[test]
    fn coordinates_are_sorted_and_deduplicated() {
        let ds = Dataset::new(
            Lineage::for_year(2010),
            vec![2012, 2010, 2012],
            vec![2, 1],
            vec![],
        )
        .unwrap();

        assert_eq!(ds.years(), &[2010, 2012]);
        assert_eq!(ds.end_uses(), &[1, 2]);
    }

    #[test]
    fn field_shape_is_validated() {
        let mut ds = Dataset::new(Lineage::for_year(2010), vec![2010], vec![1], vec![0]).unwrap();
        let result = ds.set_field(Field::Emitted, FieldDims::Full, vec![1.0, 2.0]);

        assert_eq!(result.unwrap_err().kind(), ErrorKind::FieldShapeMismatch);
    }

    #[test]
    fn value_reads_row_major() {
        let ds = dataset();

        // Years sort to [2010, 2011]; (2011, end use 2, destination 3) is the last cell.
        assert_eq!(ds.value(Field::Emitted, 2011, 2, 3), 8.0);
        assert_eq!(ds.value(Field::Emitted, 2010, 1, 0), 1.0);
    }

    #[test]
    fn value_broadcasts_missing_axes() {
        let ds = dataset();

        // Fuel spans only the end-use axis; year and destination are ignored.
        assert_eq!(ds.value(Field::Fuel, 1999, 1, 42), 1.0);
        assert_eq!(ds.value(Field::Ccf, 2010, 7, 7), 10.0);
    }

    #[test]
    fn value_outside_extent_reads_zero() {
        let ds = dataset();

        assert_eq!(ds.value(Field::Emitted, 2012, 1, 0), 0.0);
        assert_eq!(ds.value(Field::Emitted, 2010, 9, 0), 0.0);
        assert_eq!(ds.value(Field::ProductsInUse, 2010, 1, 0), 0.0);
    }

    #[test]
    fn ccf_series_zero_fills_unknown_years() {
        let mut ds = dataset();
        ds.set_ccf_series(&[2010], &[99.0]).unwrap();

        assert_eq!(ds.value(Field::Ccf, 2010, 0, 0), 99.0);
        assert_eq!(ds.value(Field::Ccf, 2011, 0, 0), 0.0);
    }
}

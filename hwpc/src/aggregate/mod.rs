//! Commutative accumulation of partial simulation results.
//!
//! Partial results arrive in completion order, which is nondeterministic under the worker
//! pool. [`merge`] is therefore a commutative, associative operation with the empty
//! dataset as identity, so every accumulator converges to the same value regardless of
//! arrival order. [`ResultAggregator`] routes each partial result into the reporting
//! partitions it belongs to.

use std::collections::BTreeMap;

use crate::error::HwpcResult;
use crate::types::{Dataset, Field, FieldDims, HarvestSeries, Year};

mod key;

pub use key::AccumulatorKey;

/// Mass ratio converting carbon to carbon-dioxide equivalent.
pub const C_TO_CO2E: f64 = 44.0 / 12.0;

/// Converts a carbon quantity to its carbon-dioxide equivalent.
pub fn c_to_co2e(carbon: f64) -> f64 {
    carbon * C_TO_CO2E
}

/// Merges two partial results into one.
///
/// Coordinates are unioned per axis, additive fields sum elementwise with zero-fill
/// outside either operand's extent, and carried fields take the elementwise maximum.
/// Operands are normalized by the final lineage element first, so the result is
/// independent of argument order; the merged dataset keeps the normalized left operand's
/// lineage.
pub fn merge(a: Dataset, b: Dataset) -> HwpcResult<Dataset> {
    if a.lineage().last() > b.lineage().last() {
        return merge(b, a);
    }

    let years = union_coords(a.years(), b.years());
    let end_uses = union_coords(a.end_uses(), b.end_uses());
    let destinations = union_coords(a.destinations(), b.destinations());

    let mut merged = Dataset::new(a.lineage().clone(), years, end_uses, destinations)?;

    for field in Field::ALL {
        let dims = match (a.field(field), b.field(field)) {
            (Some(left), Some(right)) => left.dims().union(right.dims()),
            (Some(left), None) => left.dims(),
            (None, Some(right)) => right.dims(),
            (None, None) => continue,
        };

        let values = dense_values(&merged, dims, |year, end_use, destination| {
            let left = a.value(field, year, end_use, destination);
            let right = b.value(field, year, end_use, destination);

            if field.is_additive() {
                left + right
            } else {
                left.max(right)
            }
        });

        merged.set_field(field, dims, values)?;
    }

    Ok(merged)
}

fn union_coords<T: Ord + Copy>(a: &[T], b: &[T]) -> Vec<T> {
    let mut union = Vec::with_capacity(a.len() + b.len());
    union.extend_from_slice(a);
    union.extend_from_slice(b);
    union.sort_unstable();
    union.dedup();
    union
}

/// Materializes a dense row-major array over `target`'s coordinates for the given
/// dimensionality, reading each cell through `read`.
fn dense_values(
    target: &Dataset,
    dims: FieldDims,
    read: impl Fn(Year, u32, u32) -> f64,
) -> Vec<f64> {
    let years: &[Year] = if dims.has_year() {
        target.years()
    } else {
        &[0]
    };
    let end_uses: &[u32] = if dims.has_end_use() {
        target.end_uses()
    } else {
        &[0]
    };
    let destinations: &[u32] = if dims.has_destination() {
        target.destinations()
    } else {
        &[0]
    };

    let mut values = Vec::with_capacity(years.len() * end_uses.len() * destinations.len());
    for &year in years {
        for &end_use in end_uses {
            for &destination in destinations {
                values.push(read(year, end_use, destination));
            }
        }
    }

    values
}

/// Routes partial results into per-partition accumulators.
///
/// Every result lands in the global accumulator and in the accumulator of its harvest
/// year; recycled results additionally land in the recycled counterparts of both. The
/// input harvest-volume series is attached to the finished global accumulator via
/// [`ResultAggregator::attach_harvest`] once the run drains.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    accumulators: BTreeMap<AccumulatorKey, Dataset>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one partial result into every accumulator it routes to.
    pub fn absorb(&mut self, dataset: Dataset) -> HwpcResult<()> {
        for key in Self::routing(&dataset) {
            match self.accumulators.remove(&key) {
                Some(existing) => {
                    let merged = merge(existing, dataset.clone())?;
                    self.accumulators.insert(key, merged);
                }
                None => {
                    self.accumulators.insert(key, dataset.clone());
                }
            }
        }

        Ok(())
    }

    /// Attaches the input harvest-volume series to the global accumulator.
    pub fn attach_harvest(&mut self, harvest: &HarvestSeries) -> HwpcResult<()> {
        if let Some(global) = self.accumulators.get_mut(&AccumulatorKey::GlobalAll) {
            global.set_ccf_series(harvest.years(), harvest.ccf())?;
        }

        Ok(())
    }

    pub fn get(&self, key: &AccumulatorKey) -> Option<&Dataset> {
        self.accumulators.get(key)
    }

    pub fn len(&self) -> usize {
        self.accumulators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulators.is_empty()
    }

    /// Iterates over the accumulators in reporting order: the global pair first, then
    /// each harvest year's pair.
    pub fn iter(&self) -> impl Iterator<Item = (&AccumulatorKey, &Dataset)> {
        self.accumulators.iter()
    }

    /// Consumes the aggregator, yielding the accumulators in reporting order.
    pub fn into_accumulators(self) -> BTreeMap<AccumulatorKey, Dataset> {
        self.accumulators
    }

    fn routing(dataset: &Dataset) -> Vec<AccumulatorKey> {
        let year = dataset.lineage().harvest_year();
        let mut keys = vec![AccumulatorKey::GlobalAll, AccumulatorKey::YearAll(year)];

        if dataset.lineage().is_recycled() {
            keys.push(AccumulatorKey::GlobalRecycled);
            keys.push(AccumulatorKey::YearRecycled(year));
        }

        keys
    }
}

#[cfg(test)]
mod tests {
    use rand::seq::SliceRandom;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::types::Lineage;

    fn partial(lineage: Lineage, years: Vec<Year>, emitted: Vec<f64>) -> Dataset {
        let end_uses: Vec<u32> = (0..(emitted.len() / years.len())).map(|i| i as u32).collect();
        Dataset::new(lineage, years, end_uses, vec![0])
            .unwrap()
            .with_field(Field::Emitted, FieldDims::Full, emitted)
            .unwrap()
    }

    fn assert_datasets_equal(a: &Dataset, b: &Dataset) {
        assert_eq!(a.years(), b.years());
        assert_eq!(a.end_uses(), b.end_uses());
        assert_eq!(a.destinations(), b.destinations());
        for field in Field::ALL {
            assert_eq!(a.has_field(field), b.has_field(field), "{}", field.name());
            for &year in a.years() {
                for &end_use in a.end_uses() {
                    for &destination in a.destinations() {
                        let left = a.value(field, year, end_use, destination);
                        let right = b.value(field, year, end_use, destination);
                        assert!(
                            (left - right).abs() < 1e-9,
                            "{} at ({year}, {end_use}, {destination}): {left} != {right}",
                            field.name()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn merge_sums_additive_fields_with_zero_fill() {
        let a = partial(Lineage::for_year(2010), vec![2010], vec![1.0, 2.0]);
        let b = partial(Lineage::for_year(2011), vec![2011], vec![3.0, 4.0]);

        let merged = merge(a, b).unwrap();

        assert_eq!(merged.years(), &[2010, 2011]);
        assert_eq!(merged.value(Field::Emitted, 2010, 0, 0), 1.0);
        assert_eq!(merged.value(Field::Emitted, 2011, 1, 0), 4.0);
    }

    #[test]
    fn merge_carries_fuel_by_maximum() {
        let a = partial(Lineage::for_year(2010), vec![2010], vec![1.0, 1.0])
            .with_field(Field::Fuel, FieldDims::EndUse, vec![1.0, 0.0])
            .unwrap();
        let b = partial(Lineage::for_year(2010).child(1), vec![2010], vec![1.0, 1.0])
            .with_field(Field::Fuel, FieldDims::EndUse, vec![1.0, 0.0])
            .unwrap();

        let merged = merge(a, b).unwrap();

        assert_eq!(merged.value(Field::Fuel, 2010, 0, 0), 1.0);
        assert_eq!(merged.value(Field::Fuel, 2010, 1, 0), 0.0);
        assert_eq!(merged.value(Field::Emitted, 2010, 0, 0), 2.0);
    }

    #[test]
    fn merge_is_commutative() {
        let a = partial(Lineage::for_year(2010), vec![2010, 2011], vec![1.0, 2.0]);
        let b = partial(Lineage::for_year(2011), vec![2011, 2012], vec![3.0, 4.0]);

        let ab = merge(a.clone(), b.clone()).unwrap();
        let ba = merge(b, a).unwrap();

        assert_datasets_equal(&ab, &ba);
        assert_eq!(ab.lineage(), ba.lineage());
    }

    #[test]
    fn merge_is_associative() {
        let a = partial(Lineage::for_year(2010), vec![2010], vec![1.0]);
        let b = partial(Lineage::for_year(2011), vec![2011], vec![2.0]);
        let c = partial(Lineage::for_year(2012), vec![2012], vec![3.0]);

        let left = merge(merge(a.clone(), b.clone()).unwrap(), c.clone()).unwrap();
        let right = merge(a, merge(b, c).unwrap()).unwrap();

        assert_datasets_equal(&left, &right);
    }

    #[test]
    fn fieldless_dataset_is_a_merge_identity() {
        let a = partial(Lineage::for_year(2010), vec![2010, 2011], vec![5.0, 7.0]);
        let empty = Dataset::new(Lineage::for_year(2010), vec![2010], vec![], vec![]).unwrap();

        let merged = merge(a.clone(), empty).unwrap();

        assert_datasets_equal(&a, &merged);
    }

    #[test]
    fn zero_valued_dataset_is_a_merge_identity() {
        let mut a = Dataset::new(Lineage::for_year(2010), vec![2010, 2011], vec![1], vec![0])
            .unwrap();
        let mut zero =
            Dataset::new(Lineage::for_year(2010), vec![2010, 2011], vec![1], vec![0]).unwrap();
        for (index, field) in Field::ALL.into_iter().enumerate() {
            a.set_field(field, FieldDims::Full, vec![(index + 1) as f64, (index + 2) as f64])
                .unwrap();
            zero.set_field(field, FieldDims::Full, vec![0.0, 0.0]).unwrap();
        }

        let merged = merge(a.clone(), zero).unwrap();

        assert_datasets_equal(&a, &merged);
    }

    #[test]
    fn accumulators_are_order_independent() {
        let partials: Vec<Dataset> = (0..8)
            .map(|index| {
                let year = 2010 + (index % 4);
                let lineage = if index % 2 == 0 {
                    Lineage::for_year(year)
                } else {
                    Lineage::for_year(year).child(index)
                };
                partial(lineage, vec![year, year + 1], vec![index as f64, 1.0])
            })
            .collect();

        let mut baseline = ResultAggregator::new();
        for dataset in partials.clone() {
            baseline.absorb(dataset).unwrap();
        }

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..4 {
            let mut shuffled = partials.clone();
            shuffled.shuffle(&mut rng);

            let mut aggregator = ResultAggregator::new();
            for dataset in shuffled {
                aggregator.absorb(dataset).unwrap();
            }

            assert_eq!(aggregator.len(), baseline.len());
            for (key, dataset) in baseline.iter() {
                assert_datasets_equal(dataset, aggregator.get(key).unwrap());
            }
        }
    }

    #[test]
    fn absorb_routes_by_lineage() {
        let mut aggregator = ResultAggregator::new();
        aggregator
            .absorb(partial(Lineage::for_year(2010), vec![2010], vec![1.0]))
            .unwrap();
        aggregator
            .absorb(partial(
                Lineage::for_year(2010).child(1),
                vec![2010],
                vec![1.0],
            ))
            .unwrap();

        assert_eq!(aggregator.len(), 4);
        assert!(aggregator.get(&AccumulatorKey::GlobalAll).is_some());
        assert!(aggregator.get(&AccumulatorKey::GlobalRecycled).is_some());
        assert!(aggregator.get(&AccumulatorKey::YearAll(2010)).is_some());
        assert!(aggregator.get(&AccumulatorKey::YearRecycled(2010)).is_some());

        let global = aggregator.get(&AccumulatorKey::GlobalAll).unwrap();
        assert_eq!(global.value(Field::Emitted, 2010, 0, 0), 2.0);

        let recycled = aggregator.get(&AccumulatorKey::GlobalRecycled).unwrap();
        assert_eq!(recycled.value(Field::Emitted, 2010, 0, 0), 1.0);
    }

    #[test]
    fn harvest_series_attaches_to_global_only() {
        let mut aggregator = ResultAggregator::new();
        aggregator
            .absorb(partial(Lineage::for_year(2010), vec![2010], vec![1.0]))
            .unwrap();

        let harvest = HarvestSeries::new(vec![2010], vec![42.0]).unwrap();
        aggregator.attach_harvest(&harvest).unwrap();

        let global = aggregator.get(&AccumulatorKey::GlobalAll).unwrap();
        assert_eq!(global.value(Field::Ccf, 2010, 0, 0), 42.0);

        let yearly = aggregator.get(&AccumulatorKey::YearAll(2010)).unwrap();
        assert!(!yearly.has_field(Field::Ccf));
    }

    #[test]
    fn carbon_converts_to_co2e() {
        assert!((c_to_co2e(12.0) - 44.0).abs() < 1e-12);
    }
}

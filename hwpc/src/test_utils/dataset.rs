use crate::types::{Dataset, Field, FieldDims, Lineage, disposition};

/// Builds a deterministic partial result for the given lineage.
///
/// The dataset spans the harvest year and the following year, two end uses (the first
/// fuel-flagged), and the four reporting destinations, with every additive field filled
/// by a simple index ramp scaled by `magnitude`. Distinct lineages over the same year
/// produce identical shapes, so merged totals are easy to predict in tests.
pub fn scripted_dataset(lineage: Lineage, magnitude: f64) -> Dataset {
    let year = lineage.harvest_year();
    let years = vec![year, year + 1];
    let end_uses = vec![1, 2];
    let destinations = vec![
        disposition::BURNED,
        disposition::COMPOSTED,
        disposition::LANDFILLS,
        disposition::DUMPS,
    ];

    let ramp = |len: usize| -> Vec<f64> {
        (0..len).map(|index| (index + 1) as f64 * magnitude).collect()
    };

    let mut ds = Dataset::new(lineage, years, end_uses, destinations)
        .expect("scripted coordinates are valid");

    for field in [
        Field::EndUseProducts,
        Field::EndUseSum,
        Field::ProductsInUse,
        Field::DiscardedProducts,
    ] {
        ds.set_field(field, FieldDims::YearEndUse, ramp(4))
            .expect("scripted field shapes are valid");
    }

    for field in [
        Field::DiscardDispositions,
        Field::CanDecay,
        Field::Fixed,
        Field::DiscardRemaining,
        Field::CouldDecay,
        Field::Emitted,
        Field::Present,
    ] {
        ds.set_field(field, FieldDims::Full, ramp(16))
            .expect("scripted field shapes are valid");
    }

    ds.set_field(Field::Fuel, FieldDims::EndUse, vec![1.0, 0.0])
        .expect("scripted field shapes are valid");

    ds
}

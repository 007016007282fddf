//! A small first-order decay model for the example binary.
//!
//! Products enter use in their harvest year and decay exponentially; discards are split
//! across the standard dispositions, with a fraction recovered into a recycling child
//! task until the recovered volume becomes negligible.

use hwpc::error::HwpcResult;
use hwpc::model::{SimulationModel, TaskResolution};
use hwpc::types::{Dataset, Field, FieldDims, HarvestSeries, Lineage, Year, disposition};

/// Carbon fraction of harvested volume.
const CARBON_FRACTION: f64 = 0.5;

/// Share of each end use in the product mix. The first end use is fuelwood.
const END_USE_SHARES: [f64; 2] = [0.4, 0.6];

/// Per-year decay rate of products in use, per end use.
const DECAY_RATES: [f64; 2] = [0.30, 0.05];

/// Destination shares of the discarded flow, indexed like `DESTINATIONS`.
const DESTINATION_SHARES: [f64; 4] = [0.25, 0.10, 0.45, 0.20];

/// Share of each destination's material that can still decay (the rest is fixed).
const DECAYABLE_SHARES: [f64; 4] = [1.0, 0.9, 0.5, 0.7];

/// Per-year emission rate of decayable material in storage.
const EMISSION_RATE: f64 = 0.08;

/// Fraction of discards recovered into the next recycling generation.
const RECOVERY_FRACTION: f64 = 0.15;

/// Recovered volumes below this threshold stop spawning recycling children.
const RECOVERY_CUTOFF: f64 = 1.0;

const DESTINATIONS: [u32; 4] = [
    disposition::BURNED,
    disposition::COMPOSTED,
    disposition::LANDFILLS,
    disposition::DUMPS,
];

#[derive(Debug, Clone)]
pub struct DecayTask {
    lineage: Lineage,
    volume: f64,
}

#[derive(Debug, Clone)]
pub struct DecayModel {
    end_year: Year,
}

impl DecayModel {
    pub fn new(end_year: Year) -> Self {
        Self { end_year }
    }

    fn simulate(&self, task: &DecayTask) -> HwpcResult<(Dataset, f64)> {
        let harvest_year = task.lineage.harvest_year();
        let years: Vec<Year> = (harvest_year..=self.end_year).collect();
        let carbon = task.volume * CARBON_FRACTION;

        let mut ds = Dataset::new(
            task.lineage.clone(),
            years.clone(),
            vec![1, 2],
            DESTINATIONS.to_vec(),
        )?;

        let mut end_use_products = Vec::new();
        let mut end_use_sum = Vec::new();
        let mut products_in_use = Vec::new();
        let mut discarded_products = Vec::new();
        let mut full = vec![Vec::new(); 7];
        let mut recovered = 0.0;

        for &year in &years {
            let age = (year - harvest_year) as f64;
            for (end_use_index, share) in END_USE_SHARES.iter().enumerate() {
                let initial = carbon * share;
                let in_use = initial * (-DECAY_RATES[end_use_index] * age).exp();
                let discarded = initial - in_use;

                end_use_products.push(if age == 0.0 { initial } else { 0.0 });
                end_use_sum.push(initial);
                products_in_use.push(in_use);
                discarded_products.push(discarded);

                let to_dispositions = discarded * (1.0 - RECOVERY_FRACTION);
                if year == self.end_year {
                    recovered += discarded * RECOVERY_FRACTION;
                }

                for (dest_index, dest_share) in DESTINATION_SHARES.iter().enumerate() {
                    let disposed = to_dispositions * dest_share;
                    let can_decay = disposed * DECAYABLE_SHARES[dest_index];
                    let fixed = disposed - can_decay;
                    let emitted = can_decay * (1.0 - (-EMISSION_RATE * age).exp());
                    let remaining = can_decay - emitted;

                    full[0].push(disposed);
                    full[1].push(can_decay);
                    full[2].push(fixed);
                    full[3].push(remaining);
                    full[4].push(can_decay);
                    full[5].push(emitted);
                    full[6].push(fixed + remaining);
                }
            }
        }

        ds.set_field(Field::EndUseProducts, FieldDims::YearEndUse, end_use_products)?;
        ds.set_field(Field::EndUseSum, FieldDims::YearEndUse, end_use_sum)?;
        ds.set_field(Field::ProductsInUse, FieldDims::YearEndUse, products_in_use)?;
        ds.set_field(Field::DiscardedProducts, FieldDims::YearEndUse, discarded_products)?;

        let full_fields = [
            Field::DiscardDispositions,
            Field::CanDecay,
            Field::Fixed,
            Field::DiscardRemaining,
            Field::CouldDecay,
            Field::Emitted,
            Field::Present,
        ];
        for (field, values) in full_fields.into_iter().zip(full) {
            ds.set_field(field, FieldDims::Full, values)?;
        }

        ds.set_field(Field::Fuel, FieldDims::EndUse, vec![1.0, 0.0])?;

        Ok((ds, recovered))
    }
}

impl SimulationModel for DecayModel {
    type Task = DecayTask;

    fn initial_tasks(&self, harvest: &HarvestSeries) -> Vec<DecayTask> {
        harvest
            .years()
            .iter()
            .zip(harvest.ccf())
            .map(|(&year, &volume)| DecayTask {
                lineage: Lineage::for_year(year),
                volume,
            })
            .collect()
    }

    async fn resolve(&self, task: DecayTask) -> HwpcResult<TaskResolution<DecayTask>> {
        let (dataset, recovered) = self.simulate(&task)?;

        let mut children = Vec::new();
        if recovered >= RECOVERY_CUTOFF {
            let generation = task.lineage.elements().len() as i32;
            children.push(DecayTask {
                lineage: task.lineage.child(generation),
                volume: recovered,
            });
        }

        Ok(TaskResolution { dataset, children })
    }
}

use crate::error::HwpcResult;
use crate::types::{Column, Dataset, DestinationId, Field, Table, Year, disposition};

use crate::aggregate::c_to_co2e;

fn mgc(name: &str) -> String {
    format!("{name}_mgc")
}

fn co2(name: &str) -> String {
    format!("{name}_co2e")
}

fn present(name: &str) -> String {
    format!("{name}_present")
}

fn emitted(name: &str) -> String {
    format!("{name}_emitted")
}

fn change(name: &str) -> String {
    format!("{name}_change")
}

/// Sums a field over the end-use axis at one destination, per year.
fn destination_series(ds: &Dataset, field: Field, destination: DestinationId) -> Vec<f64> {
    ds.years()
        .iter()
        .map(|&year| {
            ds.end_uses()
                .iter()
                .map(|&end_use| ds.value(field, year, end_use, destination))
                .sum()
        })
        .collect()
}

/// Sums a per-end-use field over the end-use axis, per year.
fn end_use_series(ds: &Dataset, field: Field) -> Vec<f64> {
    destination_series(ds, field, 0)
}

/// Sums a field over both the end-use and destination axes, per year.
fn full_series(ds: &Dataset, field: Field) -> Vec<f64> {
    ds.years()
        .iter()
        .map(|&year| {
            ds.end_uses()
                .iter()
                .map(|&end_use| {
                    ds.destinations()
                        .iter()
                        .map(|&destination| ds.value(field, year, end_use, destination))
                        .sum::<f64>()
                })
                .sum()
        })
        .collect()
}

/// Emissions from fuelwood burned with energy capture: the burned slice restricted to
/// end uses flagged as fuel.
fn fuelwood_series(ds: &Dataset) -> Vec<f64> {
    ds.years()
        .iter()
        .map(|&year| {
            ds.end_uses()
                .iter()
                .filter(|&&end_use| ds.value(Field::Fuel, year, end_use, 0) == 1.0)
                .map(|&end_use| ds.value(Field::Emitted, year, end_use, disposition::BURNED))
                .sum()
        })
        .collect()
}

fn to_co2e(series: &[f64]) -> Vec<f64> {
    series.iter().copied().map(c_to_co2e).collect()
}

fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

/// First differences year over year; the first year has no prior year to difference
/// against and serializes as an empty cell.
fn diff(series: &[f64]) -> Vec<Option<f64>> {
    series
        .iter()
        .enumerate()
        .map(|(index, value)| {
            if index == 0 {
                None
            } else {
                Some(value - series[index - 1])
            }
        })
        .collect()
}

fn add_diffs(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(x + y),
            _ => None,
        })
        .collect()
}

fn selected(year: Year) -> bool {
    year % 5 == 0
}

/// Derives the fixed catalogue of year-indexed tables from one finalized accumulator.
///
/// The tables come in archive member order, starting with the `final` cross-section; the
/// long-format `results` member is serialized separately from the raw dataset.
pub fn derive_tables(ds: &Dataset) -> HwpcResult<Vec<Table>> {
    let years = ds.years().to_vec();

    let ccf: Vec<f64> = years.iter().map(|&year| ds.value(Field::Ccf, year, 0, 0)).collect();
    let timber = end_use_series(ds, Field::EndUseProducts);
    let products_in_use = end_use_series(ds, Field::ProductsInUse);
    let discarded = end_use_series(ds, Field::DiscardedProducts);

    let compost_emitted = to_co2e(&destination_series(
        ds,
        Field::Emitted,
        disposition::COMPOSTED,
    ));
    let landfills_present = destination_series(ds, Field::Present, disposition::LANDFILLS);
    let landfills_emitted = to_co2e(&destination_series(
        ds,
        Field::Emitted,
        disposition::LANDFILLS,
    ));
    let dumps_present = destination_series(ds, Field::Present, disposition::DUMPS);
    let dumps_emitted = to_co2e(&destination_series(ds, Field::Emitted, disposition::DUMPS));
    let burned_wo_ec = to_co2e(&destination_series(ds, Field::Emitted, disposition::BURNED));
    let fuelwood_emitted = to_co2e(&fuelwood_series(ds));

    let swds_present = add(&landfills_present, &dumps_present);
    let present_total = add(&products_in_use, &swds_present);

    let products_in_use_change = diff(&products_in_use);
    let swds_change = diff(&swds_present);
    let net_change = add_diffs(&products_in_use_change, &swds_change);

    // Burned-with-energy-capture is the fuelwood slice; the remaining emission paths
    // escape without capture.
    let emitted_w_ec = fuelwood_emitted.clone();
    let emitted_wo_ec = add(
        &add(&compost_emitted, &landfills_emitted),
        &add(&dumps_emitted, &burned_wo_ec),
    );

    let mut tables = Vec::new();

    let mut final_table = Table::new("final", years.clone());
    final_table.push_column(Column::dense(Field::EndUseProducts.name(), timber.clone()))?;
    final_table.push_column(Column::dense(
        Field::ProductsInUse.name(),
        products_in_use.clone(),
    ))?;
    final_table.push_column(Column::dense(Field::DiscardedProducts.name(), discarded))?;
    for field in [
        Field::DiscardDispositions,
        Field::CanDecay,
        Field::Fixed,
        Field::DiscardRemaining,
        Field::CouldDecay,
        Field::Emitted,
        Field::Present,
    ] {
        final_table.push_column(Column::dense(field.name(), full_series(ds, field)))?;
    }
    tables.push(final_table);

    tables.push(
        Table::new("annual_harvest_and_timber_product_output", years.clone())
            .with_column(Column::dense(Field::Ccf.name(), ccf))?
            .with_column(Column::dense(mgc(Field::EndUseProducts.name()), timber))?,
    );

    tables.push(
        Table::new("annual_net_change_carbon_stocks", years.clone())
            .with_column(Column::new(
                mgc(&change("products_in_use")),
                products_in_use_change.clone(),
            ))?
            .with_column(Column::new(mgc(&change("swds")), swds_change.clone()))?,
    );

    tables.push(
        Table::new("burned_wo_energy_capture_emit", years.clone()).with_column(Column::dense(
            co2(&emitted("burned_wo_energy_capture")),
            burned_wo_ec.clone(),
        ))?,
    );
    tables.push(
        Table::new("burned_w_energy_capture_emit", years.clone()).with_column(Column::dense(
            co2(&emitted("burned_w_energy_capture")),
            fuelwood_emitted.clone(),
        ))?,
    );

    tables.push(
        Table::new("total_composted_carbon_emitted", years.clone()).with_column(Column::dense(
            co2(&emitted("composted")),
            compost_emitted.clone(),
        ))?,
    );

    let cumulative_stocks = Table::new("total_cumulative_carbon_stocks", years.clone())
        .with_column(Column::dense(mgc("products_in_use"), products_in_use.clone()))?
        .with_column(Column::dense(mgc("swds"), swds_present.clone()))?;
    tables.push(cumulative_stocks);

    tables.push(
        Table::new("total_dumps_carbon_emitted", years.clone())
            .with_column(Column::dense(co2(&emitted("dumps")), dumps_emitted.clone()))?,
    );
    tables.push(
        Table::new("total_dumps_carbon", years.clone())
            .with_column(Column::dense(mgc(&present("dumps")), dumps_present.clone()))?,
    );

    tables.push(
        Table::new("total_end_use_products", years.clone()).with_column(Column::dense(
            mgc("products_in_use"),
            products_in_use.clone(),
        ))?,
    );

    tables.push(
        Table::new("total_fuelwood_carbon_emitted", years.clone()).with_column(Column::dense(
            co2(&emitted("fuelwood")),
            fuelwood_emitted.clone(),
        ))?,
    );

    tables.push(
        Table::new("total_landfills_carbon_emitted", years.clone()).with_column(Column::dense(
            co2(&emitted("landfills")),
            landfills_emitted.clone(),
        ))?,
    );
    tables.push(
        Table::new("total_landfills_carbon", years.clone()).with_column(Column::dense(
            mgc(&present("landfills")),
            landfills_present.clone(),
        ))?,
    );

    tables.push(
        Table::new("big_four", years.clone())
            .with_column(Column::dense(
                co2(&present("products_in_use")),
                to_co2e(&products_in_use),
            ))?
            .with_column(Column::dense(co2(&present("swds")), to_co2e(&swds_present)))?
            .with_column(Column::dense(
                co2(&emitted("emitted_w_energy_capture")),
                emitted_w_ec.clone(),
            ))?
            .with_column(Column::dense(
                co2(&emitted("emitted_wo_energy_capture")),
                emitted_wo_ec.clone(),
            ))?,
    );

    tables.push(
        Table::new("emitted_all", years.clone())
            .with_column(Column::dense(co2(&emitted("fuelwood")), fuelwood_emitted))?
            .with_column(Column::dense(co2(&emitted("composted")), compost_emitted))?
            .with_column(Column::dense(co2(&emitted("dumps")), dumps_emitted.clone()))?
            .with_column(Column::dense(
                co2(&emitted("landfills")),
                landfills_emitted.clone(),
            ))?,
    );

    tables.push(
        Table::new("carbon_present_distinct_swds", years.clone())
            .with_column(Column::dense(mgc(&present("dumps")), dumps_present))?
            .with_column(Column::dense(mgc(&present("landfills")), landfills_present))?,
    );
    tables.push(
        Table::new("carbon_emitted_distinct_swds", years.clone())
            .with_column(Column::dense(co2(&emitted("dumps")), dumps_emitted))?
            .with_column(Column::dense(co2(&emitted("landfills")), landfills_emitted))?,
    );

    tables.push(
        Table::new("total_yearly_net_change", years.clone())
            .with_column(Column::new(mgc(&change("present")), net_change.clone()))?,
    );

    let selected_net_change = Table::new("total_selected_net_change", years.clone())
        .with_column(Column::dense(mgc("products_in_use"), products_in_use.clone()))?
        .with_column(Column::dense(mgc("swds"), swds_present.clone()))?
        .with_column(Column::new(
            mgc(&change("products_in_use")),
            products_in_use_change.clone(),
        ))?
        .with_column(Column::new(mgc(&change("swds")), swds_change.clone()))?
        .select_years("total_selected_net_change", selected);
    tables.push(selected_net_change);

    let dispositions = Table::new("total_yearly_dispositions", years.clone())
        .with_column(Column::dense(
            co2("emitted_w_energy_capture"),
            emitted_w_ec.clone(),
        ))?
        .with_column(Column::new(
            co2(&change("emitted_w_energy_capture")),
            diff(&emitted_w_ec),
        ))?
        .with_column(Column::dense(
            co2("emitted_wo_energy_capture"),
            emitted_wo_ec.clone(),
        ))?
        .with_column(Column::new(
            co2(&change("emitted_wo_energy_capture")),
            diff(&emitted_wo_ec),
        ))?
        .with_column(Column::dense(mgc("products_in_use"), products_in_use))?
        .with_column(Column::new(
            mgc(&change("products_in_use")),
            products_in_use_change,
        ))?
        .with_column(Column::dense(mgc("swds"), swds_present))?
        .with_column(Column::new(mgc(&change("swds")), swds_change))?
        .with_column(Column::dense(mgc("present"), present_total))?
        .with_column(Column::new(mgc(&change("present")), net_change))?;
    let selected_dispositions = dispositions.select_years("total_selected_dispositions", selected);
    tables.push(dispositions);
    tables.push(selected_dispositions);

    Ok(tables)
}

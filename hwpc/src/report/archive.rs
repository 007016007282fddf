use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ErrorKind, HwpcResult};
use crate::hwpc_error;
use crate::types::{Dataset, Table};

/// One finished archive, ready for upload under its storage key.
#[derive(Debug, Clone)]
pub struct OutputBundle {
    pub key: String,
    pub bytes: Vec<u8>,
}

/// Serializes a year-indexed table to CSV, rendering absent cells as empty.
pub(crate) fn table_to_csv(table: &Table) -> HwpcResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Year".to_owned()];
    header.extend(table.columns().iter().map(|column| column.name().to_owned()));
    writer.write_record(&header)?;

    for (index, year) in table.years().iter().enumerate() {
        let mut record = vec![year.to_string()];
        for column in table.columns() {
            record.push(match column.values()[index] {
                Some(value) => value.to_string(),
                None => String::new(),
            });
        }
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|err| hwpc_error!(ErrorKind::SerializationError, "CSV writer flush failed", err))
}

/// Serializes the raw merged dataset in long format, one row per coordinate triple with
/// every present field as a column. Fields spanning fewer axes broadcast across the rows.
pub(crate) fn dataset_to_csv(ds: &Dataset) -> HwpcResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let fields: Vec<_> = ds.fields().map(|(field, _)| field).collect();

    let mut header = vec![
        "Year".to_owned(),
        "EndUseID".to_owned(),
        "DiscardDestinationID".to_owned(),
    ];
    header.extend(fields.iter().map(|field| field.name().to_owned()));
    writer.write_record(&header)?;

    for &year in ds.years() {
        for &end_use in ds.end_uses() {
            for &destination in ds.destinations() {
                let mut record = vec![
                    year.to_string(),
                    end_use.to_string(),
                    destination.to_string(),
                ];
                for &field in &fields {
                    record.push(ds.value(field, year, end_use, destination).to_string());
                }
                writer.write_record(&record)?;
            }
        }
    }

    writer
        .into_inner()
        .map_err(|err| hwpc_error!(ErrorKind::SerializationError, "CSV writer flush failed", err))
}

/// Assembles the archive for one accumulator: the long-format `results` member, then the
/// derived tables, all stored uncompressed. Member names carry the same prefix as the
/// archive key.
pub(crate) fn build_archive(
    member_prefix: &str,
    ds: &Dataset,
    tables: &[Table],
) -> HwpcResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file(format!("{member_prefix}results.csv"), options)?;
    zip.write_all(&dataset_to_csv(ds)?)?;

    for table in tables {
        zip.start_file(format!("{member_prefix}{}.csv", table.name()), options)?;
        zip.write_all(&table_to_csv(table)?)?;
    }

    let cursor = zip.finish()?;

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::derive_tables;
    use crate::types::{Column, Field, FieldDims, Lineage};

    fn dataset() -> Dataset {
        Dataset::new(Lineage::for_year(2010), vec![2010], vec![1], vec![0, 3])
            .unwrap()
            .with_field(Field::Emitted, FieldDims::Full, vec![1.0, 2.0])
            .unwrap()
            .with_field(Field::Ccf, FieldDims::Year, vec![5.0])
            .unwrap()
    }

    #[test]
    fn table_csv_renders_missing_cells_empty() {
        let table = Table::new("net_change", vec![2010, 2011])
            .with_column(Column::new("delta", vec![None, Some(1.5)]))
            .unwrap();

        let bytes = table_to_csv(&table).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(text, "Year,delta\n2010,\n2011,1.5\n");
    }

    #[test]
    fn dataset_csv_is_long_format() {
        let bytes = dataset_to_csv(&dataset()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Year,EndUseID,DiscardDestinationID,emitted,ccf");
        // One row per coordinate triple; ccf broadcasts over destinations.
        assert_eq!(lines[1], "2010,1,0,1,5");
        assert_eq!(lines[2], "2010,1,3,2,5");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn archive_members_are_stored_and_prefixed() {
        let ds = dataset();
        let tables = derive_tables(&ds).unwrap();

        let bytes = build_archive("2010_", &ds, &tables).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 22);

        let member = archive.by_name("2010_results.csv").unwrap();
        assert_eq!(member.compression(), CompressionMethod::Stored);
        drop(member);

        assert!(archive.by_name("2010_final.csv").is_ok());
        assert!(archive.by_name("2010_total_selected_dispositions.csv").is_ok());
    }
}

use crate::bail;
use crate::error::{ErrorKind, HwpcResult};
use crate::types::Year;

/// One named column of a [`Table`].
///
/// Cells are optional so that quantities undefined for a given year, like the first entry
/// of a differenced series, serialize as empty cells rather than zeros.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    values: Vec<Option<f64>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Creates a column where every cell is present.
    pub fn dense(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, values.into_iter().map(Some).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}

/// A year-indexed table of named numeric columns, the shape every derived report takes
/// before CSV serialization.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    years: Vec<Year>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, years: Vec<Year>) -> Self {
        Self {
            name: name.into(),
            years,
            columns: Vec::new(),
        }
    }

    /// Appends a column, which must have one cell per year.
    pub fn push_column(&mut self, column: Column) -> HwpcResult<()> {
        if column.values.len() != self.years.len() {
            bail!(
                ErrorKind::InvalidData,
                "Table column length does not match the year index",
                format!(
                    "table {}, column {}: {} years, {} cells",
                    self.name,
                    column.name,
                    self.years.len(),
                    column.values.len()
                )
            );
        }

        self.columns.push(column);

        Ok(())
    }

    /// Builder-style variant of [`Table::push_column`].
    pub fn with_column(mut self, column: Column) -> HwpcResult<Self> {
        self.push_column(column)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn years(&self) -> &[Year] {
        &self.years
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns a copy keeping only the years for which `keep` holds, under a new name.
    pub fn select_years(
        &self,
        name: impl Into<String>,
        keep: impl Fn(Year) -> bool,
    ) -> Self {
        let kept: Vec<usize> = self
            .years
            .iter()
            .enumerate()
            .filter(|(_, year)| keep(**year))
            .map(|(index, _)| index)
            .collect();

        Self {
            name: name.into(),
            years: kept.iter().map(|&index| self.years[index]).collect(),
            columns: self
                .columns
                .iter()
                .map(|column| Column {
                    name: column.name.clone(),
                    values: kept.iter().map(|&index| column.values[index]).collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_length_is_validated() {
        let mut table = Table::new("stocks", vec![2010, 2011]);
        let result = table.push_column(Column::dense("total", vec![1.0]));

        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn select_years_filters_all_columns() {
        let table = Table::new("stocks", vec![2010, 2011, 2015])
            .with_column(Column::dense("total", vec![1.0, 2.0, 3.0]))
            .unwrap();

        let selected = table.select_years("stocks_selected", |year| year % 5 == 0);

        assert_eq!(selected.years(), &[2010, 2015]);
        assert_eq!(selected.columns()[0].values(), &[Some(1.0), Some(3.0)]);
    }
}

use std::fmt;

use crate::error::{ErrorKind, HwpcResult};
use crate::{bail, types::Year};

/// Identifier chain tracing a unit of material from its harvest year through recycling
/// generations.
///
/// The first element is always the harvest year; any further elements identify successive
/// recycling generations. A lineage with a single element denotes primary material, a
/// longer one denotes recycled material. Lineages are immutable once assigned to a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lineage(Vec<i32>);

impl Lineage {
    /// Creates the lineage of primary material harvested in `year`.
    pub fn for_year(year: Year) -> Self {
        Self(vec![year])
    }

    /// Creates a lineage from raw elements.
    ///
    /// Fails with [`ErrorKind::InvalidLineage`] when `elements` is empty, since a lineage
    /// must at least name its harvest year.
    pub fn new(elements: Vec<i32>) -> HwpcResult<Self> {
        if elements.is_empty() {
            bail!(
                ErrorKind::InvalidLineage,
                "Lineage must contain at least the harvest year"
            );
        }

        Ok(Self(elements))
    }

    /// Returns the harvest year this material originates from.
    pub fn harvest_year(&self) -> Year {
        self.0[0]
    }

    /// Returns the final element of the chain, used by the merge tie-break.
    pub fn last(&self) -> i32 {
        *self.0.last().expect("lineage is never empty")
    }

    /// Returns whether this material has been through at least one recycling generation.
    pub fn is_recycled(&self) -> bool {
        self.0.len() > 1
    }

    /// Returns the lineage of a recycling child spawned from this material.
    pub fn child(&self, generation: i32) -> Self {
        let mut elements = self.0.clone();
        elements.push(generation);
        Self(elements)
    }

    /// Returns the raw elements of the chain.
    pub fn elements(&self) -> &[i32] {
        &self.0
    }
}

impl fmt::Display for Lineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, element) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ".")?;
            }
            write!(f, "{element}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_lineage_is_not_recycled() {
        let lineage = Lineage::for_year(2010);

        assert_eq!(lineage.harvest_year(), 2010);
        assert_eq!(lineage.last(), 2010);
        assert!(!lineage.is_recycled());
    }

    #[test]
    fn child_lineage_is_recycled() {
        let lineage = Lineage::for_year(2010).child(1).child(2);

        assert_eq!(lineage.harvest_year(), 2010);
        assert_eq!(lineage.last(), 2);
        assert!(lineage.is_recycled());
        assert_eq!(lineage.to_string(), "2010.1.2");
    }

    #[test]
    fn empty_lineage_is_rejected() {
        let result = Lineage::new(vec![]);

        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidLineage);
    }
}

// Dataset, date range and the range filter
use super::error::RangeError;
use super::record::{Record, Schema};
use chrono::NaiveDate;

/// Inclusive interval of calendar dates, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Loaded rows in input order. Never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    schema: Schema,
}

impl Dataset {
    pub fn new(records: Vec<Record>, schema: Schema) -> Self {
        Self { records, schema }
    }

    #[cfg(test)]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// [min date, max date], or `None` for an empty dataset
    pub fn span(&self) -> Option<DateRange> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some(DateRange { start: min, end: max })
    }

    /// Records whose date lies within `range`, in their original order
    pub fn filter(&self, range: &DateRange) -> FilteredRecords<'_> {
        let records = self
            .records
            .iter()
            .filter(|r| range.contains(r.date))
            .collect();

        FilteredRecords {
            schema: &self.schema,
            records,
        }
    }

    /// Every record, unfiltered
    #[cfg(test)]
    pub fn view(&self) -> FilteredRecords<'_> {
        FilteredRecords {
            schema: &self.schema,
            records: self.records.iter().collect(),
        }
    }
}

/// A borrowed, order-preserving subset of a dataset.
#[derive(Debug, Clone)]
pub struct FilteredRecords<'a> {
    schema: &'a Schema,
    records: Vec<&'a Record>,
}

impl<'a> FilteredRecords<'a> {
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

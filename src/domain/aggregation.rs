// Group-and-reduce over filtered records
use super::dataset::FilteredRecords;
use super::error::SchemaError;
use super::record::{CodeColumn, Column, Measure, Record};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Sum,
    Mean,
}

/// One output column of a derived table: a measure and how to reduce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregation {
    pub measure: Measure,
    pub reducer: Reducer,
}

impl Aggregation {
    pub const fn sum(measure: Measure) -> Self {
        Self {
            measure,
            reducer: Reducer::Sum,
        }
    }

    pub const fn mean(measure: Measure) -> Self {
        Self {
            measure,
            reducer: Reducer::Mean,
        }
    }
}

/// Key selector for a grouping pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Date,
    Code(CodeColumn),
    Pair(CodeColumn, CodeColumn),
}

impl GroupBy {
    pub fn columns(&self) -> Vec<Column> {
        match self {
            GroupBy::Date => vec![Column::Dteday],
            GroupBy::Code(c) => vec![c.column()],
            GroupBy::Pair(a, b) => vec![a.column(), b.column()],
        }
    }

    fn key(&self, record: &Record) -> GroupKey {
        match self {
            GroupBy::Date => GroupKey::Date(record.date),
            GroupBy::Code(c) => GroupKey::Code(record.code(*c)),
            GroupBy::Pair(a, b) => GroupKey::Pair(record.code(*a), record.code(*b)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Date(NaiveDate),
    Code(u8),
    Pair(u8, u8),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub key: GroupKey,
    /// One value per aggregation, in the table's aggregation order
    pub values: Vec<f64>,
}

/// Output of a grouping pass. Rows are sorted by ascending key unless the
/// table was produced by [`top_n`].
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    pub group_by: GroupBy,
    pub aggregations: Vec<Aggregation>,
    pub rows: Vec<DerivedRow>,
}

impl DerivedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position(&self, measure: Measure) -> Option<usize> {
        self.aggregations.iter().position(|a| a.measure == measure)
    }

    /// All values of one measure, in row order
    pub fn values(&self, measure: Measure) -> Option<Vec<f64>> {
        let idx = self.position(measure)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    #[cfg(test)]
    pub fn get(&self, key: &GroupKey, measure: Measure) -> Option<f64> {
        let idx = self.position(measure)?;
        self.rows
            .iter()
            .find(|r| &r.key == key)
            .map(|r| r.values[idx])
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn finish(&self, reducer: Reducer) -> Option<f64> {
        match reducer {
            Reducer::Sum => Some(self.sum),
            Reducer::Mean if self.count == 0 => None,
            Reducer::Mean => Some(self.sum / self.count as f64),
        }
    }
}

/// Check that the grouping and every measure are backed by loaded columns.
fn ensure_columns(
    records: &FilteredRecords<'_>,
    group_by: GroupBy,
    aggregations: &[Aggregation],
) -> Result<(), SchemaError> {
    let schema = records.schema();
    let required = group_by
        .columns()
        .into_iter()
        .chain(aggregations.iter().map(|a| a.measure.column()));

    for column in required {
        if !schema.contains(column) {
            return Err(SchemaError::MissingColumn(column));
        }
    }
    Ok(())
}

/// Group `records` by `group_by` and reduce each aggregation per group.
pub fn group_and_reduce(
    records: &FilteredRecords<'_>,
    group_by: GroupBy,
    aggregations: &[Aggregation],
) -> Result<DerivedTable, SchemaError> {
    ensure_columns(records, group_by, aggregations)?;

    let mut groups: BTreeMap<GroupKey, Vec<Accumulator>> = BTreeMap::new();
    for record in records.records() {
        let accumulators = groups
            .entry(group_by.key(record))
            .or_insert_with(|| vec![Accumulator::default(); aggregations.len()]);

        for (acc, agg) in accumulators.iter_mut().zip(aggregations) {
            acc.push(record.measure(agg.measure));
        }
    }

    let rows = groups
        .into_iter()
        .filter_map(|(key, accumulators)| {
            let values = accumulators
                .iter()
                .zip(aggregations)
                .map(|(acc, agg)| acc.finish(agg.reducer))
                .collect::<Option<Vec<f64>>>()?;
            Some(DerivedRow { key, values })
        })
        .collect();

    Ok(DerivedTable {
        group_by,
        aggregations: aggregations.to_vec(),
        rows,
    })
}

const RENTAL_SUMS: [Aggregation; 3] = [
    Aggregation::sum(Measure::CasualDay),
    Aggregation::sum(Measure::RegisteredDay),
    Aggregation::sum(Measure::CntDay),
];

pub fn daily_totals(records: &FilteredRecords<'_>) -> Result<DerivedTable, SchemaError> {
    group_and_reduce(records, GroupBy::Date, &RENTAL_SUMS)
}

pub fn hourly_means(records: &FilteredRecords<'_>) -> Result<DerivedTable, SchemaError> {
    group_and_reduce(
        records,
        GroupBy::Code(CodeColumn::Hour),
        &[
            Aggregation::mean(Measure::CasualHour),
            Aggregation::mean(Measure::RegisteredHour),
            Aggregation::mean(Measure::CntHour),
        ],
    )
}

pub fn weather_impact(records: &FilteredRecords<'_>) -> Result<DerivedTable, SchemaError> {
    group_and_reduce(
        records,
        GroupBy::Code(CodeColumn::Weather),
        &[
            Aggregation::mean(Measure::CntDay),
            Aggregation::mean(Measure::TempDay),
            Aggregation::mean(Measure::HumDay),
        ],
    )
}

pub fn seasonal_totals(records: &FilteredRecords<'_>) -> Result<DerivedTable, SchemaError> {
    group_and_reduce(records, GroupBy::Code(CodeColumn::Season), &RENTAL_SUMS)
}

/// Mean hourly rentals split by working day flag
pub fn workingday_hourly(records: &FilteredRecords<'_>) -> Result<DerivedTable, SchemaError> {
    group_and_reduce(
        records,
        GroupBy::Pair(CodeColumn::WorkingDay, CodeColumn::Hour),
        &[Aggregation::mean(Measure::CntHour)],
    )
}

/// Mean hourly rentals split by season
pub fn season_hourly(records: &FilteredRecords<'_>) -> Result<DerivedTable, SchemaError> {
    group_and_reduce(
        records,
        GroupBy::Pair(CodeColumn::Season, CodeColumn::Hour),
        &[Aggregation::mean(Measure::CntHour)],
    )
}

/// Mean hourly rentals and daily conditions split by weather severity
pub fn weather_hourly(records: &FilteredRecords<'_>) -> Result<DerivedTable, SchemaError> {
    group_and_reduce(
        records,
        GroupBy::Pair(CodeColumn::Weather, CodeColumn::Hour),
        &[
            Aggregation::mean(Measure::CntHour),
            Aggregation::mean(Measure::TempDay),
            Aggregation::mean(Measure::HumDay),
        ],
    )
}

/// The `n` rows with the largest `measure`, descending. Equal values keep
/// their original (ascending key) order.
pub fn top_n(table: &DerivedTable, measure: Measure, n: usize) -> DerivedTable {
    let Some(idx) = table.position(measure) else {
        return DerivedTable {
            rows: Vec::new(),
            ..table.clone()
        };
    };

    let mut rows = table.rows.clone();
    rows.sort_by(|a, b| b.values[idx].total_cmp(&a.values[idx]));
    rows.truncate(n);

    DerivedTable {
        group_by: table.group_by,
        aggregations: table.aggregations.clone(),
        rows,
    }
}

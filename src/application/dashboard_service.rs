// Dashboard service - Use case for building dashboards over a date range
use crate::domain::aggregation::{
    daily_totals, hourly_means, season_hourly, seasonal_totals, top_n, weather_hourly,
    weather_impact, workingday_hourly, DerivedTable,
};
use crate::domain::dashboard::{Dashboard, Summary, TableKind};
use crate::domain::dataset::{Dataset, DateRange, FilteredRecords};
use crate::domain::error::{RangeError, SchemaError};
use crate::domain::record::Measure;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

#[derive(Clone)]
pub struct DashboardService {
    dataset: Arc<Dataset>,
    peak_hours: usize,
}

impl DashboardService {
    pub fn new(dataset: Arc<Dataset>, peak_hours: usize) -> Self {
        Self {
            dataset,
            peak_hours,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Fill missing bounds from the dataset span
    pub fn resolve_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DateRange, RangeError> {
        let (start, end) = match (start, end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                let span = self.dataset.span().ok_or(RangeError::EmptyDataset)?;
                (start.unwrap_or(span.start()), end.unwrap_or(span.end()))
            }
        };
        DateRange::new(start, end)
    }

    /// Build every table and the summary for one date range. Either all
    /// tables are produced or an error is returned.
    pub fn build(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Dashboard, DashboardError> {
        let started = Instant::now();
        let range = self.resolve_range(start, end)?;
        let records = self.dataset.filter(&range);

        tracing::debug!(
            "Building dashboard for {}..={}: {} of {} records",
            range.start(),
            range.end(),
            records.len(),
            self.dataset.len()
        );

        let daily = daily_totals(&records)?;
        let hourly = hourly_means(&records)?;
        let summary = Summary::from_daily(&daily);
        let peak_hours = top_n(&hourly, Measure::CntHour, self.peak_hours);

        let tables = vec![
            (TableKind::Daily, daily),
            (TableKind::Hourly, hourly),
            (TableKind::Weather, weather_impact(&records)?),
            (TableKind::Seasonal, seasonal_totals(&records)?),
            (TableKind::WorkingdayHourly, workingday_hourly(&records)?),
            (TableKind::SeasonHourly, season_hourly(&records)?),
            (TableKind::WeatherHourly, weather_hourly(&records)?),
            (TableKind::PeakHours, peak_hours),
        ];

        tracing::info!(
            "Built dashboard ({} tables, {} records) in {:?}",
            tables.len(),
            records.len(),
            started.elapsed()
        );

        Ok(Dashboard::new(range, records.len(), summary, tables))
    }

    /// Build a single table for one date range
    pub fn table(
        &self,
        kind: TableKind,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<(DateRange, DerivedTable), DashboardError> {
        let range = self.resolve_range(start, end)?;
        let records = self.dataset.filter(&range);
        let table = self.compute(kind, &records)?;
        Ok((range, table))
    }

    fn compute(
        &self,
        kind: TableKind,
        records: &FilteredRecords<'_>,
    ) -> Result<DerivedTable, SchemaError> {
        match kind {
            TableKind::Daily => daily_totals(records),
            TableKind::Hourly => hourly_means(records),
            TableKind::Weather => weather_impact(records),
            TableKind::Seasonal => seasonal_totals(records),
            TableKind::WorkingdayHourly => workingday_hourly(records),
            TableKind::SeasonHourly => season_hourly(records),
            TableKind::WeatherHourly => weather_hourly(records),
            TableKind::PeakHours => {
                let hourly = hourly_means(records)?;
                Ok(top_n(&hourly, Measure::CntHour, self.peak_hours))
            }
        }
    }
}

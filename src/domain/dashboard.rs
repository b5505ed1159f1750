// Dashboard domain model
use super::aggregation::{DerivedTable, GroupKey};
use super::dataset::DateRange;
use super::record::Measure;
use chrono::NaiveDate;

/// The derived tables a dashboard is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Daily,
    Hourly,
    Weather,
    Seasonal,
    WorkingdayHourly,
    SeasonHourly,
    WeatherHourly,
    PeakHours,
}

impl TableKind {
    pub const ALL: [TableKind; 8] = [
        TableKind::Daily,
        TableKind::Hourly,
        TableKind::Weather,
        TableKind::Seasonal,
        TableKind::WorkingdayHourly,
        TableKind::SeasonHourly,
        TableKind::WeatherHourly,
        TableKind::PeakHours,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            TableKind::Daily => "daily",
            TableKind::Hourly => "hourly",
            TableKind::Weather => "weather",
            TableKind::Seasonal => "seasonal",
            TableKind::WorkingdayHourly => "workingday-hourly",
            TableKind::SeasonHourly => "season-hourly",
            TableKind::WeatherHourly => "weather-hourly",
            TableKind::PeakHours => "peak-hours",
        }
    }

    pub fn from_slug(slug: &str) -> Option<TableKind> {
        TableKind::ALL.into_iter().find(|k| k.slug() == slug)
    }

    pub fn title(&self) -> &'static str {
        match self {
            TableKind::Daily => "Daily Rentals Trend",
            TableKind::Hourly => "Average Hourly Rentals (Casual vs Registered)",
            TableKind::Weather => "Rentals by Weather Condition",
            TableKind::Seasonal => "Total Rentals per Season",
            TableKind::WorkingdayHourly => "Hourly Pattern: Workday vs Holiday",
            TableKind::SeasonHourly => "Hourly Pattern by Season",
            TableKind::WeatherHourly => "Hourly Rentals by Daily Weather Condition",
            TableKind::PeakHours => "Peak Rental Hours",
        }
    }
}

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_casual: f64,
    pub total_registered: f64,
    pub peak_day: Option<NaiveDate>,
}

impl Summary {
    /// Computed from a daily totals table. The peak day is the earliest
    /// date carrying the maximum `cnt_day`.
    pub fn from_daily(daily: &DerivedTable) -> Self {
        let total = |measure| {
            daily
                .values(measure)
                .map(|v| v.iter().sum::<f64>())
                .unwrap_or(0.0)
        };

        let mut peak: Option<(NaiveDate, f64)> = None;
        if let Some(idx) = daily.position(Measure::CntDay) {
            for row in &daily.rows {
                let GroupKey::Date(date) = row.key else {
                    continue;
                };
                let value = row.values[idx];
                if peak.is_none_or(|(_, best)| value > best) {
                    peak = Some((date, value));
                }
            }
        }

        Self {
            total_casual: total(Measure::CasualDay),
            total_registered: total(Measure::RegisteredDay),
            peak_day: peak.map(|(date, _)| date),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub range: DateRange,
    pub record_count: usize,
    pub summary: Summary,
    pub tables: Vec<(TableKind, DerivedTable)>,
}

impl Dashboard {
    pub fn new(
        range: DateRange,
        record_count: usize,
        summary: Summary,
        tables: Vec<(TableKind, DerivedTable)>,
    ) -> Self {
        Self {
            range,
            record_count,
            summary,
            tables,
        }
    }

    pub fn title(&self) -> String {
        format!(
            "Bike Sharing Analytics ({} to {})",
            self.range.start(),
            self.range.end()
        )
    }

    #[cfg(test)]
    pub fn table(&self, kind: TableKind) -> Option<&DerivedTable> {
        self.tables
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, table)| table)
    }
}

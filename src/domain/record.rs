// Rental record domain model
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;

/// Every column the dashboard knows how to read from the source table.
///
/// The source data merges a daily and an hourly table, so `_day` columns
/// repeat the same value on each of the 24 hourly rows of a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Dteday,
    Hr,
    SeasonDay,
    WeathersitDay,
    WorkingdayHour,
    CasualDay,
    RegisteredDay,
    CntDay,
    CasualHour,
    RegisteredHour,
    CntHour,
    TempDay,
    HumDay,
}

impl Column {
    pub const ALL: [Column; 13] = [
        Column::Dteday,
        Column::Hr,
        Column::SeasonDay,
        Column::WeathersitDay,
        Column::WorkingdayHour,
        Column::CasualDay,
        Column::RegisteredDay,
        Column::CntDay,
        Column::CasualHour,
        Column::RegisteredHour,
        Column::CntHour,
        Column::TempDay,
        Column::HumDay,
    ];

    /// Header name in the CSV file
    pub fn name(&self) -> &'static str {
        match self {
            Column::Dteday => "dteday",
            Column::Hr => "hr",
            Column::SeasonDay => "season_day",
            Column::WeathersitDay => "weathersit_day",
            Column::WorkingdayHour => "workingday_hour",
            Column::CasualDay => "casual_day",
            Column::RegisteredDay => "registered_day",
            Column::CntDay => "cnt_day",
            Column::CasualHour => "casual_hour",
            Column::RegisteredHour => "registered_hour",
            Column::CntHour => "cnt_hour",
            Column::TempDay => "temp_day",
            Column::HumDay => "hum_day",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric columns that can be reduced by an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    CasualDay,
    RegisteredDay,
    CntDay,
    CasualHour,
    RegisteredHour,
    CntHour,
    TempDay,
    HumDay,
}

impl Measure {
    pub fn column(&self) -> Column {
        match self {
            Measure::CasualDay => Column::CasualDay,
            Measure::RegisteredDay => Column::RegisteredDay,
            Measure::CntDay => Column::CntDay,
            Measure::CasualHour => Column::CasualHour,
            Measure::RegisteredHour => Column::RegisteredHour,
            Measure::CntHour => Column::CntHour,
            Measure::TempDay => Column::TempDay,
            Measure::HumDay => Column::HumDay,
        }
    }
}

/// Small categorical columns usable as group keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeColumn {
    Hour,
    Season,
    Weather,
    WorkingDay,
}

impl CodeColumn {
    pub fn column(&self) -> Column {
        match self {
            CodeColumn::Hour => Column::Hr,
            CodeColumn::Season => Column::SeasonDay,
            CodeColumn::Weather => Column::WeathersitDay,
            CodeColumn::WorkingDay => Column::WorkingdayHour,
        }
    }

    /// Human readable label for a code, where the dataset defines one.
    /// Weather severity and hours are shown as plain numbers.
    pub fn label(&self, code: u8) -> Option<&'static str> {
        match (self, code) {
            (CodeColumn::Season, 1) => Some("Spring"),
            (CodeColumn::Season, 2) => Some("Summer"),
            (CodeColumn::Season, 3) => Some("Fall"),
            (CodeColumn::Season, 4) => Some("Winter"),
            (CodeColumn::WorkingDay, 0) => Some("Holiday"),
            (CodeColumn::WorkingDay, 1) => Some("Workday"),
            _ => None,
        }
    }
}

/// One row of the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub hour: u8,
    pub season: u8,
    pub weather: u8,
    pub working_day: u8,
    pub casual_day: f64,
    pub registered_day: f64,
    pub cnt_day: f64,
    pub casual_hour: f64,
    pub registered_hour: f64,
    pub cnt_hour: f64,
    pub temp_day: f64,
    pub hum_day: f64,
}

impl Record {
    /// A record on `date` with every other field zeroed
    #[cfg(test)]
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            hour: 0,
            season: 0,
            weather: 0,
            working_day: 0,
            casual_day: 0.0,
            registered_day: 0.0,
            cnt_day: 0.0,
            casual_hour: 0.0,
            registered_hour: 0.0,
            cnt_hour: 0.0,
            temp_day: 0.0,
            hum_day: 0.0,
        }
    }

    pub fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::CasualDay => self.casual_day,
            Measure::RegisteredDay => self.registered_day,
            Measure::CntDay => self.cnt_day,
            Measure::CasualHour => self.casual_hour,
            Measure::RegisteredHour => self.registered_hour,
            Measure::CntHour => self.cnt_hour,
            Measure::TempDay => self.temp_day,
            Measure::HumDay => self.hum_day,
        }
    }

    pub fn code(&self, column: CodeColumn) -> u8 {
        match column {
            CodeColumn::Hour => self.hour,
            CodeColumn::Season => self.season,
            CodeColumn::Weather => self.weather,
            CodeColumn::WorkingDay => self.working_day,
        }
    }
}

/// The set of known columns present in a loaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    present: BTreeSet<Column>,
}

impl Schema {
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            present: columns.into_iter().collect(),
        }
    }

    /// Schema with all known columns
    #[cfg(test)]
    pub fn complete() -> Self {
        Self::new(Column::ALL)
    }

    pub fn contains(&self, column: Column) -> bool {
        self.present.contains(&column)
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.present.iter().copied()
    }

    pub fn missing(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| !self.contains(*c))
            .collect()
    }
}

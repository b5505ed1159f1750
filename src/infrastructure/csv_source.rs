// CSV dataset source
use crate::application::dataset_source::{DatasetSource, LoadError};
use crate::domain::dataset::Dataset;
use crate::domain::record::{Column, Record, Schema};
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CsvDatasetSource {
    path: PathBuf,
    strict_schema: bool,
}

impl CsvDatasetSource {
    pub fn new(path: impl Into<PathBuf>, strict_schema: bool) -> Self {
        Self {
            path: path.into(),
            strict_schema,
        }
    }
}

impl DatasetSource for CsvDatasetSource {
    fn load(&self) -> Result<Dataset, LoadError> {
        let file = File::open(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;

        let dataset = read_dataset(file, self.strict_schema)?;

        match dataset.span() {
            Some(span) => tracing::info!(
                "Loaded {} records from {} ({} to {})",
                dataset.len(),
                self.path.display(),
                span.start(),
                span.end()
            ),
            None => tracing::warn!("Loaded empty dataset from {}", self.path.display()),
        }

        let missing = dataset.schema().missing();
        if !missing.is_empty() {
            tracing::warn!(
                "Dataset is missing columns {:?}, tables that need them will fail",
                missing.iter().map(|c| c.name()).collect::<Vec<_>>()
            );
        }

        Ok(dataset)
    }
}

/// Parse a dataset from any CSV reader.
///
/// Only `dteday` is mandatory unless `strict_schema` is set. Known columns
/// that are absent load as zero and are left out of the schema; unknown
/// columns are ignored.
pub fn read_dataset<R: Read>(reader: R, strict_schema: bool) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().map_err(parse_error)?.clone();
    let positions = column_positions(&headers);
    let schema = Schema::new(positions.keys().copied());

    if !schema.contains(Column::Dteday) {
        return Err(LoadError::MissingDateColumn);
    }
    if strict_schema {
        let missing = schema.missing();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }
    }

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row.map_err(parse_error)?;
        let line = row.position().map(|p| p.line()).unwrap_or(idx as u64 + 2);
        let fields = RowFields {
            row: &row,
            positions: &positions,
            line,
        };
        records.push(fields.record()?);
    }

    Ok(Dataset::new(records, schema))
}

fn parse_error(err: csv::Error) -> LoadError {
    LoadError::Parse(Box::new(err))
}

/// Header index of every known column. The first occurrence wins.
fn column_positions(headers: &StringRecord) -> BTreeMap<Column, usize> {
    let mut positions = BTreeMap::new();
    for (idx, name) in headers.iter().enumerate() {
        if let Some(column) = Column::from_name(name) {
            positions.entry(column).or_insert(idx);
        }
    }
    positions
}

/// Accepts `2011-01-01` as well as `2011-01-01 00:00:00` / `2011-01-01T00:00:00`.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.split([' ', 'T']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

struct RowFields<'a> {
    row: &'a StringRecord,
    positions: &'a BTreeMap<Column, usize>,
    line: u64,
}

impl RowFields<'_> {
    fn raw(&self, column: Column) -> Option<&str> {
        self.positions.get(&column).and_then(|&idx| self.row.get(idx))
    }

    fn invalid(&self, column: Column, value: &str) -> LoadError {
        LoadError::InvalidValue {
            line: self.line,
            column,
            value: value.to_string(),
        }
    }

    fn number(&self, column: Column) -> Result<f64, LoadError> {
        let Some(raw) = self.raw(column) else {
            return Ok(0.0);
        };
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(self.invalid(column, raw)),
        }
    }

    /// Integral code in `0..=max`, written either as `3` or `3.0`
    fn code(&self, column: Column, max: u8) -> Result<u8, LoadError> {
        let value = self.number(column)?;
        if value.fract() == 0.0 && (0.0..=f64::from(max)).contains(&value) {
            Ok(value as u8)
        } else {
            Err(self.invalid(column, self.raw(column).unwrap_or_default()))
        }
    }

    fn record(&self) -> Result<Record, LoadError> {
        let raw_date = self.raw(Column::Dteday).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| self.invalid(Column::Dteday, raw_date))?;

        Ok(Record {
            date,
            hour: self.code(Column::Hr, 23)?,
            season: self.code(Column::SeasonDay, u8::MAX)?,
            weather: self.code(Column::WeathersitDay, u8::MAX)?,
            working_day: self.code(Column::WorkingdayHour, u8::MAX)?,
            casual_day: self.number(Column::CasualDay)?,
            registered_day: self.number(Column::RegisteredDay)?,
            cnt_day: self.number(Column::CntDay)?,
            casual_hour: self.number(Column::CasualHour)?,
            registered_hour: self.number(Column::RegisteredHour)?,
            cnt_hour: self.number(Column::CntHour)?,
            temp_day: self.number(Column::TempDay)?,
            hum_day: self.number(Column::HumDay)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "instant_day,dteday,season_day,weathersit_day,temp_day,hum_day,casual_day,registered_day,cnt_day,hr,workingday_hour,casual_hour,registered_hour,cnt_hour";

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    fn parse(content: &str) -> Result<Dataset, LoadError> {
        read_dataset(content.as_bytes(), false)
    }

    #[test]
    fn test_load_full_file() {
        let content = format!(
            "{HEADER}\n\
             1,2011-01-01,1,2,0.344167,0.805833,331,654,985,0,0,3,13,16\n\
             1,2011-01-01,1,2,0.344167,0.805833,331,654,985,1,0,8,32,40\n\
             2,2011-01-02 00:00:00,1,2,0.363478,0.696087,131,670,801,0,0,13,16,17\n"
        );
        let temp_file = create_temp_csv(&content);

        let dataset = CsvDatasetSource::new(temp_file.path(), true).load().unwrap();

        assert_eq!(dataset.len(), 3);
        assert!(dataset.schema().missing().is_empty());

        let first = &dataset.records()[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2011, 1, 1).unwrap());
        assert_eq!(first.season, 1);
        assert_eq!(first.weather, 2);
        assert_eq!(first.cnt_day, 985.0);
        assert_eq!(first.hum_day, 0.805833);

        assert_eq!(dataset.records()[1].hour, 1);
        assert_eq!(dataset.records()[1].cnt_hour, 40.0);
        assert_eq!(
            dataset.records()[2].date,
            NaiveDate::from_ymd_opt(2011, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_missing_file() {
        let err = CsvDatasetSource::new("/nonexistent/all_data.csv", false)
            .load()
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_missing_date_column() {
        let err = parse("hr,cnt_hour\n0,16\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingDateColumn));
    }

    #[test]
    fn test_partial_schema_loads_leniently() {
        let dataset = parse("dteday,hr,cnt_hour\n2011-01-01,3,16.0\n").unwrap();

        assert_eq!(dataset.len(), 1);
        assert!(dataset.schema().contains(Column::CntHour));
        assert!(!dataset.schema().contains(Column::CasualDay));
        assert_eq!(dataset.records()[0].casual_day, 0.0);
        assert_eq!(dataset.records()[0].hour, 3);
    }

    #[test]
    fn test_strict_schema_reports_missing_columns() {
        let err = read_dataset("dteday,hr,cnt_hour\n2011-01-01,3,16\n".as_bytes(), true)
            .unwrap_err();
        match err {
            LoadError::MissingColumns(missing) => {
                assert_eq!(missing.len(), 10);
                assert!(missing.contains(&Column::TempDay));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_values() {
        let err = parse("dteday,hr\n2011-13-01,0\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidValue { column: Column::Dteday, line: 2, .. }
        ));

        let err = parse("dteday,hr\n2011-01-01,0\n2011-01-01,24\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidValue { column: Column::Hr, line: 3, .. }
        ));

        let err = parse("dteday,cnt_day\n2011-01-01,lots\n").unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { column: Column::CntDay, .. }));

        let err = parse("dteday,season_day\n2011-01-01,1.5\n").unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { column: Column::SeasonDay, .. }));
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let err = parse("dteday,hr\n2011-01-01,0,99\n").unwrap_err();
        match err {
            LoadError::Parse(source) => {
                let csv_err = source.downcast_ref::<csv::Error>().unwrap();
                assert!(matches!(csv_err.kind(), csv::ErrorKind::UnequalLengths { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_only_file_is_empty_dataset() {
        let dataset = parse("dteday,hr\n").unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.span().is_none());
    }
}

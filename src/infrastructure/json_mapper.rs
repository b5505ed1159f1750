// Mapper to convert domain models to JSON response bodies
use crate::domain::aggregation::{DerivedTable, GroupBy, GroupKey, Reducer};
use crate::domain::dashboard::{Dashboard, Summary, TableKind};
use crate::domain::dataset::{Dataset, DateRange};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct JsonDashboard {
    pub title: String,
    pub range: JsonRange,
    pub record_count: usize,
    pub summary: JsonSummary,
    pub tables: Vec<JsonTable>,
}

#[derive(Debug, Serialize)]
pub struct JsonRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct JsonSummary {
    pub total_casual: f64,
    pub total_registered: f64,
    pub peak_day: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonTable {
    pub id: &'static str,
    pub title: &'static str,
    pub range: JsonRange,
    pub key_columns: Vec<&'static str>,
    pub value_columns: Vec<JsonValueColumn>,
    pub rows: Vec<JsonRow>,
}

#[derive(Debug, Serialize)]
pub struct JsonValueColumn {
    pub column: &'static str,
    pub reducer: &'static str,
}

#[derive(Debug, Serialize)]
pub struct JsonRow {
    pub key: JsonKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    pub values: Vec<f64>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonKey {
    Date(String),
    Code(u8),
    Pair([u8; 2]),
}

#[derive(Debug, Serialize)]
pub struct JsonDatasetInfo {
    pub records: usize,
    pub start: Option<String>,
    pub end: Option<String>,
    pub columns: Vec<&'static str>,
    pub missing_columns: Vec<&'static str>,
}

pub fn dashboard_to_json(dashboard: Dashboard) -> JsonDashboard {
    let title = dashboard.title();
    let range = dashboard.range;

    let tables = dashboard
        .tables
        .into_iter()
        .map(|(kind, table)| table_to_json(kind, range, table))
        .collect();

    JsonDashboard {
        title,
        range: range_to_json(range),
        record_count: dashboard.record_count,
        summary: summary_to_json(dashboard.summary),
        tables,
    }
}

pub fn table_to_json(kind: TableKind, range: DateRange, table: DerivedTable) -> JsonTable {
    let key_columns = table.group_by.columns().iter().map(|c| c.name()).collect();

    let value_columns = table
        .aggregations
        .iter()
        .map(|a| JsonValueColumn {
            column: a.measure.column().name(),
            reducer: match a.reducer {
                Reducer::Sum => "sum",
                Reducer::Mean => "mean",
            },
        })
        .collect();

    let group_by = table.group_by;
    let rows = table
        .rows
        .into_iter()
        .map(|row| JsonRow {
            key: key_to_json(row.key),
            label: label_for(group_by, row.key),
            values: row.values,
        })
        .collect();

    JsonTable {
        id: kind.slug(),
        title: kind.title(),
        range: range_to_json(range),
        key_columns,
        value_columns,
        rows,
    }
}

pub fn dataset_to_json(dataset: &Dataset) -> JsonDatasetInfo {
    let span = dataset.span();
    JsonDatasetInfo {
        records: dataset.len(),
        start: span.map(|s| s.start().to_string()),
        end: span.map(|s| s.end().to_string()),
        columns: dataset.schema().columns().map(|c| c.name()).collect(),
        missing_columns: dataset
            .schema()
            .missing()
            .into_iter()
            .map(|c| c.name())
            .collect(),
    }
}

fn range_to_json(range: DateRange) -> JsonRange {
    JsonRange {
        start: range.start().to_string(),
        end: range.end().to_string(),
    }
}

fn summary_to_json(summary: Summary) -> JsonSummary {
    JsonSummary {
        total_casual: summary.total_casual,
        total_registered: summary.total_registered,
        peak_day: summary.peak_day.map(|d| d.to_string()),
    }
}

fn key_to_json(key: GroupKey) -> JsonKey {
    match key {
        GroupKey::Date(date) => JsonKey::Date(date.to_string()),
        GroupKey::Code(code) => JsonKey::Code(code),
        GroupKey::Pair(a, b) => JsonKey::Pair([a, b]),
    }
}

/// Label of the outermost code of a key, e.g. the season of a season × hour row
fn label_for(group_by: GroupBy, key: GroupKey) -> Option<&'static str> {
    match (group_by, key) {
        (GroupBy::Code(column), GroupKey::Code(code)) => column.label(code),
        (GroupBy::Pair(column, _), GroupKey::Pair(code, _)) => column.label(code),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregation::{daily_totals, season_hourly, seasonal_totals};
    use crate::domain::record::{Column, Record, Schema};
    use chrono::NaiveDate;
    use serde_json::json;

    fn dataset() -> Dataset {
        let records = (1..=2u8)
            .map(|season| Record {
                season,
                hour: 7,
                casual_day: 1.0,
                registered_day: 2.0,
                cnt_day: 3.0,
                cnt_hour: f64::from(season),
                ..Record::on(NaiveDate::from_ymd_opt(2011, 4, u32::from(season)).unwrap())
            })
            .collect();
        Dataset::new(records, Schema::complete())
    }

    #[test]
    fn test_table_json_shape() {
        let dataset = dataset();
        let range = dataset.span().unwrap();
        let table = seasonal_totals(&dataset.view()).unwrap();

        let value = serde_json::to_value(table_to_json(TableKind::Seasonal, range, table)).unwrap();

        assert_eq!(value["id"], "seasonal");
        assert_eq!(value["key_columns"], json!(["season_day"]));
        assert_eq!(value["value_columns"][2], json!({"column": "cnt_day", "reducer": "sum"}));
        assert_eq!(
            value["rows"][0],
            json!({"key": 1, "label": "Spring", "values": [1.0, 2.0, 3.0]})
        );
        assert_eq!(value["range"], json!({"start": "2011-04-01", "end": "2011-04-02"}));
    }

    #[test]
    fn test_date_and_pair_keys() {
        let dataset = dataset();
        let range = dataset.span().unwrap();

        let daily = table_to_json(TableKind::Daily, range, daily_totals(&dataset.view()).unwrap());
        assert_eq!(daily.rows[0].key, JsonKey::Date("2011-04-01".to_string()));
        assert_eq!(daily.rows[0].label, None);

        let pairs = table_to_json(
            TableKind::SeasonHourly,
            range,
            season_hourly(&dataset.view()).unwrap(),
        );
        let row = serde_json::to_value(&pairs.rows[1]).unwrap();
        assert_eq!(row, json!({"key": [2, 7], "label": "Summer", "values": [2.0]}));
    }

    #[test]
    fn test_dataset_info() {
        let dataset = Dataset::new(Vec::new(), Schema::new([Column::Dteday, Column::Hr]));
        let info = dataset_to_json(&dataset);

        assert_eq!(info.records, 0);
        assert_eq!(info.start, None);
        assert_eq!(info.columns, vec!["dteday", "hr"]);
        assert_eq!(info.missing_columns.len(), 11);
    }
}

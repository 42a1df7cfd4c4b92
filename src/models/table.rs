//! Flat column view shared by the CSV, Parquet and dictionary writers.
//!
//! Typed tables stay the source of truth; `Tabular::to_table` renders them
//! into named, typed columns with explicit nulls.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::{
    AggregateTable, AnalysisTable, CleanMeasurement, Feature, Indicator, IndicatorRecord,
    IndicatorTable, MergedTable, Metric, Ordinal, Parameter, PollutionValues,
};
use crate::utils::constants::LOG_DATE_FORMAT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
    Category,
    Timestamp,
}

impl ColumnKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Boolean => "bool",
            ColumnKind::Text => "string",
            ColumnKind::Category => "category",
            ColumnKind::Timestamp => "datetime",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Cell {
    /// NaN and absent both become `Null`
    pub fn float(value: Option<f64>) -> Self {
        match value {
            Some(v) if !v.is_nan() => Cell::Float(v),
            _ => Cell::Null,
        }
    }

    pub fn int(value: Option<i64>) -> Self {
        value.map_or(Cell::Null, Cell::Int)
    }

    pub fn text(value: Option<&str>) -> Self {
        value.map_or(Cell::Null, |s| Cell::Text(s.to_string()))
    }

    pub fn label<C: Ordinal>(value: Option<C>) -> Self {
        value.map_or(Cell::Null, |c| Cell::Text(c.label().to_string()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Text form used in CSV output and distinct-value counting
    pub fn render(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Bool(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Timestamp(t) => t.format(LOG_DATE_FORMAT).to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Cell::Null => serde_json::Value::Null,
            Cell::Int(v) => serde_json::Value::from(*v),
            Cell::Float(v) => serde_json::Number::from_f64(*v)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Cell::Bool(v) => serde_json::Value::Bool(*v),
            Cell::Text(_) | Cell::Timestamp(_) => serde_json::Value::String(self.render()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: &str, columns: Vec<Column>) -> Self {
        Self {
            name: name.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch");
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_cells(&self, index: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |row| &row[index])
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

/// Anything that can be rendered as a flat table
pub trait Tabular {
    fn to_table(&self, name: &str) -> Table;
}

impl Tabular for [CleanMeasurement] {
    fn to_table(&self, name: &str) -> Table {
        let columns = vec![
            Column::new("parameter", ColumnKind::Category),
            Column::new("value", ColumnKind::Float),
            Column::new("location_id", ColumnKind::Integer),
            Column::new("location_name", ColumnKind::Text),
            Column::new("country_code", ColumnKind::Text),
            Column::new("country", ColumnKind::Text),
            Column::new("city", ColumnKind::Text),
            Column::new("latitude", ColumnKind::Float),
            Column::new("longitude", ColumnKind::Float),
            Column::new("datetime", ColumnKind::Timestamp),
            Column::new("sensors_id", ColumnKind::Integer),
            Column::new("measurement_year", ColumnKind::Integer),
            Column::new("measurement_month", ColumnKind::Integer),
            Column::new("measurement_hour", ColumnKind::Integer),
            Column::new("has_coordinates", ColumnKind::Boolean),
            Column::new("has_city", ColumnKind::Boolean),
        ];

        let mut table = Table::new(name, columns);
        for m in self {
            let r = &m.record;
            table.push_row(vec![
                Cell::Text(r.parameter.as_str().to_string()),
                Cell::float(Some(r.value)),
                Cell::int(r.location_id),
                Cell::text(r.location_name.as_deref()),
                Cell::Text(r.country_code.clone()),
                Cell::Text(r.country.clone()),
                Cell::text(r.city.as_deref()),
                Cell::float(r.latitude),
                Cell::float(r.longitude),
                m.observed_at.map_or(Cell::Null, Cell::Timestamp),
                Cell::int(r.sensor_id),
                Cell::int(m.measurement_year().map(i64::from)),
                Cell::int(m.measurement_month().map(i64::from)),
                Cell::int(m.measurement_hour().map(i64::from)),
                Cell::Bool(m.has_coordinates),
                Cell::Bool(m.has_city),
            ]);
        }
        table
    }
}

impl Tabular for IndicatorTable {
    fn to_table(&self, name: &str) -> Table {
        let mut columns = vec![
            Column::new("country_code", ColumnKind::Text),
            Column::new("country", ColumnKind::Text),
        ];
        columns.extend(indicator_columns(&self.columns));

        let mut table = Table::new(name, columns);
        for record in &self.records {
            let mut row = vec![
                Cell::Text(record.country_code.clone()),
                Cell::text(record.country.as_deref()),
            ];
            row.extend(indicator_cells(Some(record), &self.columns));
            table.push_row(row);
        }
        table
    }
}

impl Tabular for AggregateTable {
    fn to_table(&self, name: &str) -> Table {
        let pollution = self.pollution_columns();
        let mut columns = vec![
            Column::new("country", ColumnKind::Text),
            Column::new("country_code", ColumnKind::Text),
        ];
        columns.extend(pollution_column_defs(&pollution));

        let mut table = Table::new(name, columns);
        for aggregate in &self.rows {
            let mut row = vec![
                Cell::Text(aggregate.country.clone()),
                Cell::Text(aggregate.country_code.clone()),
            ];
            row.extend(pollution_cells(&aggregate.values, &pollution));
            table.push_row(row);
        }
        table
    }
}

impl Tabular for MergedTable {
    fn to_table(&self, name: &str) -> Table {
        let pollution = self.pollution_columns();
        let mut columns = vec![
            Column::new("country_code", ColumnKind::Text),
            Column::new("country_code_2", ColumnKind::Text),
            Column::new("country", ColumnKind::Text),
            Column::new("country_wb", ColumnKind::Text),
        ];
        columns.extend(pollution_column_defs(&pollution));
        columns.extend(indicator_columns(&self.indicator_columns));
        columns.push(Column::new("provenance", ColumnKind::Category));

        let mut table = Table::new(name, columns);
        for record in &self.rows {
            let mut row = vec![
                Cell::Text(record.country_code.clone()),
                Cell::text(record.country_code_2.as_deref()),
                Cell::text(record.country.as_deref()),
                Cell::text(record.indicator.as_ref().and_then(|i| i.country.as_deref())),
            ];
            row.extend(pollution_cells(&record.pollution, &pollution));
            row.extend(indicator_cells(
                record.indicator.as_ref(),
                &self.indicator_columns,
            ));
            row.push(Cell::Text(record.provenance.as_str().to_string()));
            table.push_row(row);
        }
        table
    }
}

impl Tabular for AnalysisTable {
    fn to_table(&self, name: &str) -> Table {
        let pollution = self.pollution_columns();
        let mut columns = vec![
            Column::new("country_code", ColumnKind::Text),
            Column::new("country", ColumnKind::Text),
        ];
        columns.extend(pollution_column_defs(&pollution));
        columns.extend(indicator_columns(&self.indicator_columns));

        let features: Vec<Feature> = Feature::ALL
            .into_iter()
            .filter(|f| self.features.contains(f))
            .collect();
        for feature in &features {
            let kind = match feature {
                Feature::AqiCategoryPm25 => ColumnKind::Category,
                _ => ColumnKind::Float,
            };
            columns.push(Column::new(feature.column_name(), kind));
        }

        let mut table = Table::new(name, columns);
        for record in &self.rows {
            let mut row = vec![
                Cell::Text(record.country_code.clone()),
                Cell::Text(record.country.clone()),
            ];
            row.extend(pollution_cells(&record.pollution, &pollution));
            row.extend(indicator_cells(
                Some(&record.indicator),
                &self.indicator_columns,
            ));
            for feature in &features {
                row.push(match feature {
                    Feature::AqiCategoryPm25 => Cell::label(record.features.aqi_category_pm25),
                    other => Cell::float(record.features.numeric(*other)),
                });
            }
            table.push_row(row);
        }
        table
    }
}

fn pollution_column_defs(pollution: &[(Metric, Parameter)]) -> Vec<Column> {
    pollution
        .iter()
        .map(|(metric, parameter)| {
            let kind = if metric.is_integral() {
                ColumnKind::Integer
            } else {
                ColumnKind::Float
            };
            Column::new(metric.column_name(*parameter), kind)
        })
        .collect()
}

fn pollution_cells(values: &PollutionValues, pollution: &[(Metric, Parameter)]) -> Vec<Cell> {
    pollution
        .iter()
        .map(|key| {
            let value = values.get(key).copied();
            if key.0.is_integral() {
                Cell::int(value.map(|v| v as i64))
            } else {
                Cell::float(value)
            }
        })
        .collect()
}

/// `year`, the indicator series present in the source, and their bins
fn indicator_columns(present: &BTreeSet<Indicator>) -> Vec<Column> {
    let mut columns = vec![Column::new("year", ColumnKind::Integer)];
    for indicator in Indicator::ALL.iter().filter(|i| present.contains(i)) {
        columns.push(Column::new(indicator.column_name(), ColumnKind::Float));
    }
    if present.contains(&Indicator::GdpPerCapita) {
        columns.push(Column::new("income_category", ColumnKind::Category));
    }
    if present.contains(&Indicator::UrbanPopulationPct) {
        columns.push(Column::new("urbanization_level", ColumnKind::Category));
    }
    columns
}

fn indicator_cells(record: Option<&IndicatorRecord>, present: &BTreeSet<Indicator>) -> Vec<Cell> {
    let mut cells = vec![Cell::int(record.and_then(|r| r.year).map(i64::from))];
    for indicator in Indicator::ALL.iter().filter(|i| present.contains(i)) {
        cells.push(Cell::float(record.and_then(|r| r.value(*indicator))));
    }
    if present.contains(&Indicator::GdpPerCapita) {
        cells.push(Cell::label(record.and_then(|r| r.income_category)));
    }
    if present.contains(&Indicator::UrbanPopulationPct) {
        cells.push(Cell::label(record.and_then(|r| r.urbanization_level)));
    }
    cells
}

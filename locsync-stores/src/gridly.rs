//! Gridly view client.
//!
//! Rows travel as `{"id": <record id>, "cells": [{"columnId": "column1", "value": ..}, ..]}`
//! with `column1`..`column6` holding the six text fields after the id.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ureq::Agent;

use locsync_core::{Config, Field, LogicalTable, Record, RecordId, RemoteError, RemoteStore};

use crate::http;

/// Column id of each non-id field in the view.
pub const COLUMNS: [(&str, Field); 6] = [
    ("column1", Field::Character),
    ("column2", Field::Russian),
    ("column3", Field::English),
    ("column4", Field::CharacterLimit),
    ("column5", Field::Version),
    ("column6", Field::NarrativeComment),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridlyRow {
    pub id: String,
    #[serde(default)]
    pub cells: Vec<GridlyCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridlyCell {
    #[serde(rename = "columnId")]
    pub column_id: String,
    #[serde(default)]
    pub value: Value,
}

impl From<&Record> for GridlyRow {
    fn from(record: &Record) -> Self {
        Self {
            id: record.record_id.to_string(),
            cells: COLUMNS
                .iter()
                .map(|(column_id, field)| GridlyCell {
                    column_id: (*column_id).to_string(),
                    value: Value::String(field.get(record).to_string()),
                })
                .collect(),
        }
    }
}

impl GridlyRow {
    /// `None` when the row has no id. Unknown columns are ignored; missing
    /// ones read as empty.
    pub fn into_record(self) -> Option<Record> {
        if self.id.trim().is_empty() {
            return None;
        }
        let mut record = Record {
            record_id: RecordId(self.id),
            character: String::new(),
            russian: String::new(),
            english: String::new(),
            character_limit: String::new(),
            version: String::new(),
            narrative_comment: String::new(),
        };
        for cell in self.cells {
            if let Some((_, field)) = COLUMNS.iter().find(|(id, _)| *id == cell.column_id) {
                record.set(*field, cell_text(cell.value));
            }
        }
        Some(record)
    }
}

/// Rows requested per page when listing a view.
pub const PAGE_SIZE: usize = 100;

/// Value of the `page` query parameter for the page starting at `offset`.
pub fn page_param(offset: usize) -> String {
    format!(r#"{{"offset":{offset},"limit":{PAGE_SIZE}}}"#)
}

/// Collect every row by calling `fetch(offset)` until a page comes back
/// short. Stops early if a page repeats the previous one, which is what a
/// server that ignores `page` returns.
fn read_all_pages<E>(
    mut fetch: impl FnMut(usize) -> Result<Vec<GridlyRow>, E>,
) -> Result<Vec<GridlyRow>, E> {
    let mut rows: Vec<GridlyRow> = Vec::new();
    let mut previous_first: Option<String> = None;
    loop {
        let page = fetch(rows.len())?;
        let first = page.first().map(|row| row.id.clone());
        if first.is_some() && first == previous_first {
            tracing::warn!("page at offset {} repeats the previous page, stopping", rows.len());
            return Ok(rows);
        }
        let short = page.len() < PAGE_SIZE;
        rows.extend(page);
        if short {
            return Ok(rows);
        }
        previous_first = first;
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Client for one Gridly view.
pub struct GridlyClient {
    agent: Agent,
    records_url: String,
    view: String,
    authorization: String,
    retries: u32,
}

impl GridlyClient {
    pub fn new(config: &Config, table: LogicalTable) -> Self {
        let view = config.gridly_view_id(table).to_string();
        Self {
            agent: http::agent(config.http_timeout),
            records_url: format!(
                "{}/views/{}/records",
                config.gridly_api_url.trim_end_matches('/'),
                view
            ),
            view,
            authorization: format!("ApiKey {}", config.gridly_api_key),
            retries: config.remote_retries,
        }
    }

    pub fn records_url(&self) -> &str {
        &self.records_url
    }

    fn request(&self, method: &str) -> ureq::Request {
        self.agent
            .request(method, &self.records_url)
            .set("Accept", "application/json")
            .set("Authorization", &self.authorization)
    }
}

impl RemoteStore for GridlyClient {
    fn view(&self) -> &str {
        &self.view
    }

    fn get_all(&self) -> Result<Vec<Record>, RemoteError> {
        let rows = read_all_pages(|offset| {
            let page = page_param(offset);
            let response = http::with_retries(self.retries, &self.view, || {
                self.request("GET").query("page", &page).call()
            })
            .map_err(|e| http::remote_error(&self.view, e))?;
            response
                .into_json::<Vec<GridlyRow>>()
                .map_err(|e| RemoteError::Decode {
                    view: self.view.clone(),
                    source: Box::new(e),
                })
        })?;

        let total = rows.len();
        let records: Vec<Record> = rows.into_iter().filter_map(GridlyRow::into_record).collect();
        if records.len() < total {
            tracing::warn!(
                "view '{}': skipped {} row(s) without an id",
                self.view,
                total - records.len()
            );
        }
        Ok(records)
    }

    // POST is not idempotent, so it is never retried.
    fn add_row(&self, record: &Record) -> Result<(), RemoteError> {
        let body = [GridlyRow::from(record)];
        self.request("POST")
            .send_json(&body)
            .map_err(|e| http::remote_error(&self.view, e))?;
        tracing::info!("record '{}' added to view '{}'", record.record_id, self.view);
        Ok(())
    }

    fn update_row(&self, record: &Record) -> Result<(), RemoteError> {
        let body = [GridlyRow::from(record)];
        http::with_retries(self.retries, &self.view, || {
            self.request("PATCH").send_json(&body)
        })
        .map_err(|e| http::remote_error(&self.view, e))?;
        tracing::info!("record '{}' updated in view '{}'", record.record_id, self.view);
        Ok(())
    }
}

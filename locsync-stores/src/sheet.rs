//! Spreadsheet source: each logical table is a tab exported as CSV.

use ureq::Agent;

use locsync_core::{
    error::BoxError, Config, LogicalTable, Record, RecordError, SourceError, SourceProvider,
};

use crate::http;

/// Reads tabs from `<sheet_url>gid=<gid>`.
pub struct SheetSource<'a> {
    config: &'a Config,
    agent: Agent,
}

impl<'a> SheetSource<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            agent: http::agent(config.http_timeout),
        }
    }

    pub fn table_url(&self, table: LogicalTable) -> String {
        format!("{}gid={}", self.config.sheet_url, self.config.sheet_gid(table))
    }
}

impl SourceProvider for SheetSource<'_> {
    fn fetch_table(&self, table: LogicalTable) -> Result<Vec<Record>, SourceError> {
        let url = self.table_url(table);
        tracing::debug!("{table}: fetching {url}");

        let fetch_err = |source: BoxError| SourceError::Fetch { table, source };
        let response = http::with_retries(self.config.remote_retries, "spreadsheet", || {
            self.agent.get(&url).call()
        })
        .map_err(|err| match err {
            ureq::Error::Status(status, _) => {
                fetch_err(format!("spreadsheet answered HTTP {status}").into())
            }
            ureq::Error::Transport(t) => fetch_err(Box::new(t)),
        })?;
        let body = response
            .into_string()
            .map_err(|e| fetch_err(Box::new(e)))?;

        parse_table(table, &body)
    }
}

/// Parse a CSV export into records.
///
/// Rows with no non-empty cell are skipped. The first remaining row is the
/// header. Every later row must have a record id in its first cell.
pub fn parse_table(table: LogicalTable, body: &str) -> Result<Vec<Record>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut records = Vec::new();
    let mut seen_header = false;
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| SourceError::Parse {
            table,
            source: Box::new(e),
        })?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        if !seen_header {
            seen_header = true;
            continue;
        }

        let line = row
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 1);
        let record = Record::from_cells(row.iter()).map_err(|e| match e {
            RecordError::EmptyId => SourceError::MissingRecordId { table, row: line },
        })?;
        records.push(record);
    }

    tracing::debug!("{table}: parsed {} row(s)", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_appends_gid() {
        let config = locsync_core::Config::from_sources(Default::default(), |key| {
            match key {
                "GOOGLE_SHEETS_URL" => Some("https://docs.example/d/abc/export?format=csv&".to_string()),
                "GOOGLE_SHEET_GAME_GID" => Some("777".to_string()),
                k if k.starts_with("LOCSYNC_") || k == "GRIDLY_API_URL" => None,
                _ => Some("x".to_string()),
            }
        })
        .unwrap();
        let source = SheetSource::new(&config);
        assert_eq!(
            source.table_url(LogicalTable::GameText),
            "https://docs.example/d/abc/export?format=csv&gid=777"
        );
    }
}

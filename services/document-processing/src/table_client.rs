//! Table Extraction Client
//!
//! ExtractTable job API: submit a page image, poll until the job settles, and
//! return the page's tables as rows of cell text.

use reqwest::{multipart, Client};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

use exview_models::PageNumber;
use exview_utils::{ExtractedTable, ExviewError, ExviewResult, TableExtractionConfig};

const API_KEY_HEADER: &str = "x-api-key";

/// Column keys at or above this are dropped; no parts list is this wide.
const MAX_TABLE_COLUMNS: usize = 256;

pub struct TableExtractionClient {
    client: Client,
    trigger_url: String,
    result_url: String,
    api_key: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl TableExtractionClient {
    pub fn new(config: &TableExtractionConfig) -> ExviewResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            trigger_url: config.trigger_url.clone(),
            result_url: config.result_url.clone(),
            api_key: config.api_key.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_polls: config.max_polls,
        })
    }

    pub async fn extract_tables(
        &self,
        page: PageNumber,
        image_data: Vec<u8>,
        file_name: String,
    ) -> ExviewResult<Vec<ExtractedTable>> {
        if self.api_key.is_empty() {
            return Err(ExviewError::configuration("table_extraction.api_key is not set"));
        }

        let form = multipart::Form::new().part("input", multipart::Part::bytes(image_data).file_name(file_name));
        let response = self
            .client
            .post(&self.trigger_url)
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let mut job = Self::read_job(response).await?;
        let mut polls = 0;

        while job.is_processing() {
            let Some(job_id) = job.job_id.clone() else {
                return Err(ExviewError::table_extraction("job is processing but has no JobId"));
            };
            if polls >= self.max_polls {
                return Err(ExviewError::table_extraction(format!(
                    "job {} still processing after {} polls",
                    job_id, polls
                )));
            }
            polls += 1;
            tokio::time::sleep(self.poll_interval).await;

            debug!(job_id = %job_id, poll = polls, "Polling table extraction job");
            let response = self
                .client
                .get(&self.result_url)
                .header(API_KEY_HEADER, &self.api_key)
                .query(&[("JobId", job_id.as_str())])
                .send()
                .await?;
            job = Self::read_job(response).await?;
        }

        tables_from_job(page, job)
    }

    async fn read_job(response: reqwest::Response) -> ExviewResult<JobResponse> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExviewError::table_extraction(format!(
                "ExtractTable returned {}: {}",
                status, error_text
            )));
        }
        Ok(response.json().await?)
    }
}

/// Tables from a settled job. Anything but `Success` is an error.
pub fn tables_from_job(page: PageNumber, job: JobResponse) -> ExviewResult<Vec<ExtractedTable>> {
    if !job.job_status.eq_ignore_ascii_case("success") {
        let reason = job.message.unwrap_or_else(|| format!("job status {}", job.job_status));
        return Err(ExviewError::table_extraction(reason));
    }

    Ok(job
        .tables
        .into_iter()
        .map(|table| ExtractedTable::new(page, rows_from_table_json(&table.table_json)))
        .collect())
}

/// `{"row": {"col": text}}` with stringified indices, ordered numerically.
/// Column gaps within a row become empty cells. Columns past
/// `MAX_TABLE_COLUMNS` are dropped.
pub fn rows_from_table_json(table_json: &BTreeMap<String, BTreeMap<String, serde_json::Value>>) -> Vec<Vec<String>> {
    let mut rows: Vec<(usize, Vec<String>)> = table_json
        .iter()
        .filter_map(|(row_key, cells)| {
            let Ok(row_index) = row_key.trim().parse::<usize>() else {
                warn!(key = %row_key, "Skipping table row with non-numeric key");
                return None;
            };

            let mut indexed: Vec<(usize, String)> = cells
                .iter()
                .filter_map(|(col_key, value)| {
                    let col = col_key.trim().parse::<usize>().ok()?;
                    if col >= MAX_TABLE_COLUMNS {
                        warn!(row = row_index, column = col, "Skipping table cell beyond column limit");
                        return None;
                    }
                    Some((col, cell_text(value)))
                })
                .collect();
            indexed.sort_by_key(|(col, _)| *col);

            let width = indexed.last().map(|(col, _)| col + 1).unwrap_or(0);
            let mut row = vec![String::new(); width];
            for (col, text) in indexed {
                row[col] = text;
            }
            Some((row_index, row))
        })
        .collect();

    rows.sort_by_key(|(index, _)| *index);
    rows.into_iter().map(|(_, row)| row).collect()
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobResponse {
    #[serde(default)]
    job_status: String,
    #[serde(default)]
    job_id: Option<String>,
    #[serde(default)]
    tables: Vec<JobTable>,
    #[serde(default)]
    message: Option<String>,
}

impl JobResponse {
    fn is_processing(&self) -> bool {
        matches!(self.job_status.to_ascii_lowercase().as_str(), "processing" | "incomplete")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JobTable {
    #[serde(default)]
    table_json: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

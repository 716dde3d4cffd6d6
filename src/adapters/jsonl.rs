use crate::domain::model::UserRecord;
use crate::domain::ports::RecordSource;
use crate::utils::error::{ExportError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

/// One user as stored in a JSON Lines export file.
///
/// The identifier may be stored under `user_id` or `id`, as a string or a number.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserRow {
    #[serde(default, alias = "id")]
    pub user_id: Option<serde_json::Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl UserRow {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            user_id: Some(serde_json::Value::String(id.into())),
            ..Self::default()
        }
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }
}

impl UserRecord for UserRow {
    fn user_id(&self) -> Option<String> {
        match self.user_id.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn email(&self) -> Option<String> {
        self.email.clone()
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }
}

/// Reads users sequentially from a `.jsonl` file, one JSON object per line.
///
/// The file is opened on the first page request, so constructing the source
/// touches nothing on disk.
pub struct JsonLinesSource {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    line_number: usize,
    position: usize,
}

impl JsonLinesSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: None,
            line_number: 0,
            position: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn next_row(&mut self) -> Result<Option<UserRow>> {
        if self.lines.is_none() {
            let file = File::open(&self.path).await?;
            tracing::info!("📁 Reading records from {}", self.path.display());
            self.lines = Some(BufReader::new(file).lines());
        }
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };

        while let Some(line) = lines.next_line().await? {
            self.line_number += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let row = serde_json::from_str(trimmed).map_err(|e| ExportError::SourceError {
                line: self.line_number,
                message: e.to_string(),
            })?;
            return Ok(Some(row));
        }
        Ok(None)
    }
}

#[async_trait]
impl RecordSource for JsonLinesSource {
    type Record = UserRow;

    async fn fetch_page(&mut self, offset: usize, limit: usize) -> Result<Vec<UserRow>> {
        // 檔案只能順序讀取
        if offset != self.position {
            return Err(ExportError::SourceError {
                line: self.line_number,
                message: format!(
                    "non-sequential page request: offset {} but {} records already read",
                    offset, self.position
                ),
            });
        }

        let mut page = Vec::with_capacity(limit);
        while page.len() < limit {
            match self.next_row().await? {
                Some(row) => page.push(row),
                None => break,
            }
        }

        self.position += page.len();
        Ok(page)
    }
}

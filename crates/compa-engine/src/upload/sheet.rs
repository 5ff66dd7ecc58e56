use serde::{Deserialize, Serialize};

/// A grid of optional text cells. Row 0 is the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sheet {
    rows: Vec<Vec<Option<String>>>,
}

impl Sheet {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Build from plain strings. Empty strings become blank cells.
    pub fn from_text<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let cell: String = cell.into();
                        if cell.is_empty() {
                            None
                        } else {
                            Some(cell)
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn header(&self) -> Option<&[Option<String>]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Rows after the header.
    pub fn data_rows(&self) -> &[Vec<Option<String>>] {
        self.rows.get(1..).unwrap_or_default()
    }

    pub fn push_row(&mut self, row: Vec<Option<String>>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

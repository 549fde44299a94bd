//! Puts human-readable labels back onto a service response.

use std::io::Write;

use census_query_models::{LabelMode, LabeledTable, RawTable};
use census_query_table_models::ColumnLabels;

use crate::AssembleError;

/// Relabels raw result tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAssembler {
    mode: LabelMode,
}

impl ResultAssembler {
    /// Creates an assembler for the given label mode.
    #[must_use]
    pub const fn new(mode: LabelMode) -> Self {
        Self { mode }
    }

    /// The label mode in use.
    #[must_use]
    pub const fn mode(&self) -> LabelMode {
        self.mode
    }

    /// Labels every requested column of `raw` from `labels`.
    ///
    /// Geography columns are carried through as-is.
    ///
    /// # Errors
    ///
    /// Returns [`AssembleError::UnlabeledColumn`] if the response holds a
    /// column missing from `labels`, and [`AssembleError::RowWidth`] if a
    /// row does not line up with the header.
    pub fn label(
        &self,
        raw: RawTable,
        labels: &ColumnLabels,
    ) -> Result<LabeledTable, AssembleError> {
        let column_labels = raw
            .columns
            .iter()
            .map(|id| {
                labels
                    .get(id)
                    .map(str::to_string)
                    .ok_or_else(|| AssembleError::UnlabeledColumn { column: id.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let expected = raw.geography_columns.len() + raw.columns.len();
        for (row, values) in raw.rows.iter().enumerate() {
            let found = values.geography.len() + values.values.len();
            if found != expected || values.values.len() != raw.columns.len() {
                return Err(AssembleError::RowWidth {
                    row,
                    expected,
                    found,
                });
            }
        }

        log::debug!(
            "Labeled {} columns across {} rows ({})",
            column_labels.len(),
            raw.rows.len(),
            self.mode
        );

        let (header, label_row) = match self.mode {
            LabelMode::Rename => (column_labels, None),
            LabelMode::HeaderRow => (raw.columns, Some(column_labels)),
        };

        Ok(LabeledTable {
            geography_columns: raw.geography_columns,
            header,
            label_row,
            rows: raw.rows,
        })
    }
}

/// Writes a labeled table as CSV: header, optional label row, then data.
///
/// # Errors
///
/// Returns [`AssembleError`] if writing fails.
pub fn write_csv<W: Write>(table: &LabeledTable, writer: W) -> Result<(), AssembleError> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(table.full_header())?;

    if let Some(labels) = &table.label_row {
        let padding = std::iter::repeat_n("", table.geography_columns.len());
        writer.write_record(padding.chain(labels.iter().map(String::as_str)))?;
    }

    for row in &table.rows {
        writer.write_record(row.geography.iter().chain(&row.values))?;
    }

    writer.flush()?;
    Ok(())
}

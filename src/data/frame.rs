//! Column-oriented table with named columns.

use super::DataError;

/// A single named column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric values (one per row). NaN marks a missing value.
    Numeric { name: String, values: Vec<f32> },
    /// Categorical string values (one per row).
    Categorical { name: String, values: Vec<String> },
}

impl Column {
    /// Column name.
    pub fn name(&self) -> &str {
        match self {
            Column::Numeric { name, .. } => name,
            Column::Categorical { name, .. } => name,
        }
    }

    /// Number of rows in this column.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric { values, .. } => values.len(),
            Column::Categorical { values, .. } => values.len(),
        }
    }

    /// Returns true if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A column-oriented table.
///
/// All columns share the same row count, and column names are unique.
/// Column order is preserved and significant: downstream feature
/// derivation walks columns in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    /// Create a frame from columns, validating shape and name uniqueness.
    pub fn new(columns: Vec<Column>) -> Result<Self, DataError> {
        let n_rows = columns.first().map_or(0, Column::len);

        for (i, col) in columns.iter().enumerate() {
            if col.len() != n_rows {
                return Err(DataError::InconsistentRows {
                    name: col.name().to_string(),
                    expected: n_rows,
                    got: col.len(),
                });
            }
            if columns[..i].iter().any(|c| c.name() == col.name()) {
                return Err(DataError::DuplicateColumn {
                    name: col.name().to_string(),
                });
            }
        }

        Ok(Self { columns, n_rows })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// All columns, in table order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names, in table order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Returns true if a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Numeric values of a column, or an error if absent or categorical.
    pub fn numeric(&self, name: &str) -> Result<&[f32], DataError> {
        match self.column(name) {
            Some(Column::Numeric { values, .. }) => Ok(values),
            Some(Column::Categorical { .. }) => Err(DataError::NotNumeric {
                name: name.to_string(),
            }),
            None => Err(DataError::MissingColumn {
                name: name.to_string(),
            }),
        }
    }

    /// Mutable numeric values of a column, or an error if absent or categorical.
    pub fn numeric_mut(&mut self, name: &str) -> Result<&mut [f32], DataError> {
        match self.columns.iter_mut().find(|c| c.name() == name) {
            Some(Column::Numeric { values, .. }) => Ok(values),
            Some(Column::Categorical { .. }) => Err(DataError::NotNumeric {
                name: name.to_string(),
            }),
            None => Err(DataError::MissingColumn {
                name: name.to_string(),
            }),
        }
    }

    /// Select rows by index, in the given order.
    ///
    /// # Panics
    /// Panics if any index is out of bounds.
    pub fn take(&self, indices: &[usize]) -> Frame {
        let columns = self
            .columns
            .iter()
            .map(|col| match col {
                Column::Numeric { name, values } => Column::Numeric {
                    name: name.clone(),
                    values: indices.iter().map(|&i| values[i]).collect(),
                },
                Column::Categorical { name, values } => Column::Categorical {
                    name: name.clone(),
                    values: indices.iter().map(|&i| values[i].clone()).collect(),
                },
            })
            .collect();

        Frame {
            columns,
            n_rows: indices.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_column_frame() -> Frame {
        Frame::new(vec![
            Column::Numeric {
                name: "x".into(),
                values: vec![1.0, 2.0, 3.0],
            },
            Column::Categorical {
                name: "kind".into(),
                values: vec!["a".into(), "b".into(), "a".into()],
            },
        ])
        .unwrap()
    }

    #[test]
    fn new_validates_row_counts() {
        let err = Frame::new(vec![
            Column::Numeric {
                name: "x".into(),
                values: vec![1.0, 2.0],
            },
            Column::Numeric {
                name: "y".into(),
                values: vec![1.0],
            },
        ])
        .unwrap_err();

        assert!(matches!(err, DataError::InconsistentRows { .. }));
    }

    #[test]
    fn new_rejects_duplicate_names() {
        let err = Frame::new(vec![
            Column::Numeric {
                name: "x".into(),
                values: vec![1.0],
            },
            Column::Numeric {
                name: "x".into(),
                values: vec![2.0],
            },
        ])
        .unwrap_err();

        assert!(matches!(err, DataError::DuplicateColumn { .. }));
    }

    #[test]
    fn numeric_accessor_distinguishes_missing_from_wrong_type() {
        let frame = two_column_frame();
        assert_eq!(frame.numeric("x").unwrap(), &[1.0, 2.0, 3.0]);
        assert!(matches!(
            frame.numeric("kind"),
            Err(DataError::NotNumeric { .. })
        ));
        assert!(matches!(
            frame.numeric("nope"),
            Err(DataError::MissingColumn { .. })
        ));
    }

    #[test]
    fn take_preserves_index_order() {
        let frame = two_column_frame();
        let taken = frame.take(&[2, 0]);

        assert_eq!(taken.n_rows(), 2);
        assert_eq!(taken.numeric("x").unwrap(), &[3.0, 1.0]);
        match taken.column("kind").unwrap() {
            Column::Categorical { values, .. } => {
                assert_eq!(values, &["a".to_string(), "a".to_string()]);
            }
            _ => panic!("expected categorical column"),
        }
    }

    #[test]
    fn empty_frame_has_zero_rows() {
        let frame = Frame::new(vec![]).unwrap();
        assert_eq!(frame.n_rows(), 0);
        assert_eq!(frame.n_cols(), 0);
    }
}

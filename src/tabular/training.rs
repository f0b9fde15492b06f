use anyhow::{bail, Context, Result};
use std::path::Path;

use super::AttributeTable;

/// Labeled training subset of the image objects.
///
/// Wraps an [`AttributeTable`] whose records additionally carry a
/// categorical class label, digitized by hand in an external GIS tool.
/// Class slugs are collected into a sorted, de-duplicated set; records
/// reference classes by index into that set.
pub struct TrainingTable {
    table: AttributeTable,
    label_column: String,
    /// Class slug per record
    labels: Vec<String>,
    /// Sorted, unique class slugs
    classes: Vec<String>,
    /// Index into `classes` per record
    class_indices: Vec<usize>,
}

impl TrainingTable {
    /// Read a training table from a CSV file.
    ///
    /// Requires at least two distinct classes; a single-class training set
    /// cannot drive a classification.
    pub fn from_csv(path: &Path, id_column: &str, label_column: &str) -> Result<Self> {
        let table = AttributeTable::from_csv(path, id_column)?;
        if table.is_empty() {
            bail!("Training table {:?} contains no records", path);
        }

        let raw_labels = table.column_values(label_column).context(format!(
            "Label column '{}' not found in {:?}",
            label_column, path
        ))?;

        let mut labels = Vec::with_capacity(raw_labels.len());
        for (label, id) in raw_labels.iter().zip(table.ids()) {
            if label.is_empty() {
                bail!("Training object '{}' has an empty '{}' label", id, label_column);
            }
            labels.push(label.to_string());
        }

        let mut classes = labels.clone();
        classes.sort();
        classes.dedup();
        if classes.len() < 2 {
            bail!(
                "Training data must cover at least 2 classes, found {} in {:?}",
                classes.len(),
                path
            );
        }

        let class_indices = labels
            .iter()
            .map(|label| {
                classes
                    .binary_search(label)
                    .map_err(|_| anyhow::anyhow!("Label '{}' missing from class set", label))
            })
            .collect::<Result<Vec<usize>>>()?;

        Ok(TrainingTable {
            table,
            label_column: label_column.to_string(),
            labels,
            classes,
            class_indices,
        })
    }

    /// The underlying attribute table
    pub fn table(&self) -> &AttributeTable {
        &self.table
    }

    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// Sorted, unique class slugs
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Class slug per record, in record order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Class index per record, indexing into [`classes`](Self::classes)
    pub fn class_indices(&self) -> &[usize] {
        &self.class_indices
    }
}

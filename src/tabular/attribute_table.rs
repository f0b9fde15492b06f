use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::path::Path;

use crate::commons::normalize_id_str;

/// Attribute table of segmented image objects.
///
/// Holds one record per image object, read from a CSV file with a header
/// row. Each object carries a unique identifier plus a set of precomputed
/// spectral features (brightness, per-band statistics, NDVI/NDWI and
/// similar indices). Cells are kept as strings; feature extraction parses
/// the requested columns on demand.
#[derive(Debug)]
pub struct AttributeTable {
    /// Column names, in file order
    columns: Vec<String>,
    /// Raw records, one per object
    records: Vec<Vec<String>>,
    /// Name of the identifier column
    id_column: String,
    /// Normalized identifier per record
    ids: Vec<String>,
}

impl AttributeTable {
    /// Read an attribute table from a CSV file.
    ///
    /// Identifiers must be unique; a duplicate is an error.
    pub fn from_csv(path: &Path, id_column: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .context(format!("Failed to open attribute table: {:?}", path))?;

        let columns: Vec<String> = reader
            .headers()
            .context(format!("Failed to read CSV header of {:?}", path))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let id_index = match columns.iter().position(|c| c == id_column) {
            Some(index) => index,
            None => bail!(
                "Identifier column '{}' not found in {:?} (columns: {:?})",
                id_column,
                path,
                columns
            ),
        };

        let mut records: Vec<Vec<String>> = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record =
                record.context(format!("Failed to read record {} of {:?}", row + 1, path))?;
            if record.len() != columns.len() {
                bail!(
                    "Record {} of {:?} has {} fields, expected {}",
                    row + 1,
                    path,
                    record.len(),
                    columns.len()
                );
            }
            records.push(record.iter().map(|cell| cell.trim().to_string()).collect());
        }

        let ids: Vec<String> = records
            .iter()
            .map(|record| normalize_id_str(&record[id_index]))
            .collect();

        let mut seen = HashSet::new();
        for id in &ids {
            if id.is_empty() {
                bail!("Empty identifier in column '{}' of {:?}", id_column, path);
            }
            if !seen.insert(id.as_str()) {
                bail!("Duplicate identifier '{}' in {:?}", id, path);
            }
        }

        Ok(AttributeTable {
            columns,
            records,
            id_column: id_column.to_string(),
            ids,
        })
    }

    /// Number of objects in the table
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names, in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Normalized identifiers, in record order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Name of the identifier column
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Raw cell values of one column, in record order
    pub fn column_values(&self, name: &str) -> Result<Vec<&str>> {
        let index = self
            .column_index(name)
            .context(format!("Column '{}' not found (columns: {:?})", name, self.columns))?;
        Ok(self.records.iter().map(|record| record[index].as_str()).collect())
    }

    /// Columns whose cells all parse as `f64`, excluding the identifier
    /// column and any column named in `exclude`.
    ///
    /// These are the candidate classification features.
    pub fn numeric_columns(&self, exclude: &[&str]) -> Vec<String> {
        if self.records.is_empty() {
            return Vec::new();
        }
        self.columns
            .iter()
            .enumerate()
            .filter(|(index, name)| {
                name.as_str() != self.id_column
                    && !exclude.contains(&name.as_str())
                    && self
                        .records
                        .iter()
                        .all(|record| record[*index].parse::<f64>().is_ok())
            })
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Parse the named columns into a row-major feature matrix.
    ///
    /// A cell that fails to parse is an error naming the object and the
    /// column.
    pub fn feature_matrix(&self, feature_columns: &[String]) -> Result<Vec<Vec<f64>>> {
        let mut indices = Vec::with_capacity(feature_columns.len());
        for name in feature_columns {
            let index = self.column_index(name).context(format!(
                "Feature column '{}' not found (columns: {:?})",
                name, self.columns
            ))?;
            indices.push(index);
        }

        let mut matrix = Vec::with_capacity(self.records.len());
        for (row, record) in self.records.iter().enumerate() {
            let mut values = Vec::with_capacity(indices.len());
            for (&index, name) in indices.iter().zip(feature_columns) {
                let value: f64 = record[index].parse().context(format!(
                    "Object '{}': column '{}' value '{}' is not numeric",
                    self.ids[row], name, record[index]
                ))?;
                values.push(value);
            }
            matrix.push(values);
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "objects.csv",
            "object_id,ndvi,brightness,note\n1,0.8,120.5,a\n2,-0.2,80.0,b\n",
        );
        let table = AttributeTable::from_csv(&path, "object_id").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.ids(), &["1".to_string(), "2".to_string()]);
        assert_eq!(table.numeric_columns(&[]), vec!["ndvi", "brightness"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "dup.csv", "object_id,ndvi\n1,0.5\n1,0.6\n");
        assert!(AttributeTable::from_csv(&path, "object_id").is_err());
    }

    #[test]
    fn test_missing_id_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "noid.csv", "oid,ndvi\n1,0.5\n");
        let err = AttributeTable::from_csv(&path, "object_id").unwrap_err();
        assert!(err.to_string().contains("object_id"));
    }

    #[test]
    fn test_feature_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "m.csv", "object_id,ndvi,ndwi\n1,0.8,-0.1\n2,-0.2,0.6\n");
        let table = AttributeTable::from_csv(&path, "object_id").unwrap();
        let matrix = table
            .feature_matrix(&["ndvi".to_string(), "ndwi".to_string()])
            .unwrap();
        assert_eq!(matrix, vec![vec![0.8, -0.1], vec![-0.2, 0.6]]);
    }

    #[test]
    fn test_feature_matrix_bad_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "bad.csv", "object_id,ndvi\n1,n/a\n");
        let table = AttributeTable::from_csv(&path, "object_id").unwrap();
        let err = table.feature_matrix(&["ndvi".to_string()]).unwrap_err();
        assert!(err.to_string().contains("ndvi"));
    }
}

use anyhow::{bail, Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::classifier::{ConfusionMatrix, OobScore, RandomForest, RandomForestConfig};
use crate::commons::TEMP_PATH;
use crate::geo_core::GeoCore;
use crate::geometric::{ClassifiedMap, ImageObjects};
use crate::render::map::render_classified_map;
use crate::tabular::{AttributeTable, TrainingTable};

/// Level 1 land-cover classification of segmented image objects.
///
/// Wires the whole step together: load the object and training tables,
/// train a Random Forest on the shared numeric feature columns, predict a
/// class for every object, and join the predictions back onto the polygon
/// geometry. Inputs are produced by external GIS tools; this struct only
/// consumes their files.
#[derive(Debug)]
pub struct Level1Classification {
    /// CSV with one record per image object
    objects_table_path: PathBuf,
    /// CSV with the labeled training subset
    training_table_path: PathBuf,
    /// GeoJSON FeatureCollection of object polygons
    geometry_path: PathBuf,
    /// Output path for processed data
    output_path: PathBuf,
    /// Shared identifier column (tables and geometry properties)
    id_column: String,
    /// Class label column of the training table
    label_column: String,
    config: RandomForestConfig,
    /// Write the classified GeoJSON after run()
    write_file: bool,
    /// GeoCore for CRS handling
    pub geo_core: GeoCore,

    // results of run()
    feature_columns: Vec<String>,
    classes: Vec<String>,
    classified: Option<ClassifiedMap>,
    oob: Option<OobScore>,
    importances: Vec<(String, f64)>,
    confusion: Option<ConfusionMatrix>,
}

impl Level1Classification {
    /// Create a new Level1Classification instance
    pub fn new(
        objects_table_path: impl Into<PathBuf>,
        training_table_path: impl Into<PathBuf>,
        geometry_path: impl Into<PathBuf>,
        output_path: Option<String>,
        write_file: bool,
    ) -> Result<Self> {
        let output_path_buf = PathBuf::from(
            output_path
                .as_ref()
                .map(|s| s.as_str())
                .unwrap_or(TEMP_PATH),
        );

        Ok(Level1Classification {
            objects_table_path: objects_table_path.into(),
            training_table_path: training_table_path.into(),
            geometry_path: geometry_path.into(),
            output_path: output_path_buf,
            id_column: "object_id".to_string(),
            label_column: "class".to_string(),
            config: RandomForestConfig::default(),
            write_file,
            geo_core: GeoCore::default(),
            feature_columns: Vec::new(),
            classes: Vec::new(),
            classified: None,
            oob: None,
            importances: Vec::new(),
            confusion: None,
        })
    }

    /// Set the shared identifier column name
    pub fn set_id_column(&mut self, id_column: &str) {
        self.id_column = id_column.to_string();
    }

    /// Set the training label column name
    pub fn set_label_column(&mut self, label_column: &str) {
        self.label_column = label_column.to_string();
    }

    /// Set Random Forest training parameters
    pub fn set_forest_config(&mut self, config: RandomForestConfig) {
        self.config = config;
    }

    /// Set CRS
    pub fn set_crs(&mut self, epsg: i32) {
        self.geo_core.set_epsg(epsg);
    }

    /// Run the classification: load, train, predict, join
    pub fn run(mut self) -> Result<Self> {
        self.run_internal()?;
        Ok(self)
    }

    /// Internal run method that can be called mutably
    pub fn run_internal(&mut self) -> Result<()> {
        let objects = AttributeTable::from_csv(&self.objects_table_path, &self.id_column)?;
        let training =
            TrainingTable::from_csv(&self.training_table_path, &self.id_column, &self.label_column)?;

        // training objects must be a subset of the full object set
        let object_ids: HashSet<&str> = objects.ids().iter().map(|id| id.as_str()).collect();
        for id in training.table().ids() {
            if !object_ids.contains(id.as_str()) {
                bail!(
                    "Training object '{}' is missing from the object table {:?}",
                    id,
                    self.objects_table_path
                );
            }
        }

        // classify on the numeric columns both tables share
        let object_numeric = objects.numeric_columns(&[self.label_column.as_str()]);
        let feature_columns: Vec<String> = training
            .table()
            .numeric_columns(&[self.label_column.as_str()])
            .into_iter()
            .filter(|column| object_numeric.contains(column))
            .collect();
        if feature_columns.is_empty() {
            bail!(
                "Object and training tables share no numeric feature columns (object columns: {:?})",
                objects.columns()
            );
        }

        let x_train = training.table().feature_matrix(&feature_columns)?;
        let forest = RandomForest::fit(
            &x_train,
            training.class_indices(),
            training.classes().len(),
            &self.config,
        )
        .context("Random Forest training failed")?;

        let oob = forest.oob();
        println!(
            "Trained {} trees on {} objects x {} features, OOB error {:.1}%",
            forest.n_trees(),
            x_train.len(),
            feature_columns.len(),
            oob.error_rate * 100.0
        );

        let x_all = objects.feature_matrix(&feature_columns)?;
        let predicted = forest
            .predict_batch(&x_all)
            .context("Prediction over the full object table failed")?;

        let predictions: HashMap<String, String> = objects
            .ids()
            .iter()
            .zip(&predicted)
            .map(|(id, &class)| (id.clone(), training.classes()[class].clone()))
            .collect();

        let image_objects = ImageObjects::from_geojson_file(&self.geometry_path, &self.id_column)?;
        let classified = ClassifiedMap::from_predictions(&image_objects, &predictions)?;

        if self.write_file {
            classified.to_geojson(&self.output_path, "level1_classification")?;
        }

        let mut importances: Vec<(String, f64)> = feature_columns
            .iter()
            .cloned()
            .zip(forest.feature_importances().iter().copied())
            .collect();
        importances.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        self.feature_columns = feature_columns;
        self.classes = training.classes().to_vec();
        self.classified = Some(classified);
        self.oob = Some(oob);
        self.importances = importances;
        self.confusion = Some(forest.confusion().clone());

        Ok(())
    }

    /// Render the classified polygons as a PNG of the given pixel width,
    /// written under the output path.
    pub fn render_map(&self, file_name: &str, width: u32) -> Result<PathBuf> {
        let classified = self
            .classified
            .as_ref()
            .context("No classification available. Call run() first.")?;
        let path = self.output_path.join(file_name);
        render_classified_map(classified, &path, width)?;
        Ok(path)
    }

    /// The classified map (available after run())
    pub fn get_classified(&self) -> Option<&ClassifiedMap> {
        self.classified.as_ref()
    }

    /// Out-of-bag error estimate of the trained forest
    pub fn oob_score(&self) -> Option<OobScore> {
        self.oob
    }

    /// Feature importances, highest first
    pub fn feature_importances(&self) -> &[(String, f64)] {
        &self.importances
    }

    /// Confusion matrix over out-of-bag votes
    pub fn confusion_matrix(&self) -> Option<&ConfusionMatrix> {
        self.confusion.as_ref()
    }

    /// Class slugs seen in the training data, sorted
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Feature columns used for training and prediction
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Get output path
    pub fn get_output_path(&self) -> &Path {
        &self.output_path
    }
}

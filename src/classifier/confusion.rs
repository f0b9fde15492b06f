/// Confusion matrix over actual vs predicted class indices.
///
/// Filled from out-of-bag votes during training. Rows are actual classes,
/// columns predicted classes.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    n_classes: usize,
    counts: Vec<usize>,
}

impl ConfusionMatrix {
    pub fn new(n_classes: usize) -> Self {
        ConfusionMatrix {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn record(&mut self, actual: usize, predicted: usize) {
        self.counts[actual * self.n_classes + predicted] += 1;
    }

    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.counts[actual * self.n_classes + predicted]
    }

    /// Total number of recorded samples
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Overall fraction of correctly classified samples
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes).map(|c| self.get(c, c)).sum();
        correct as f64 / total as f64
    }

    /// Producer's accuracy (recall) of one class, `None` if the class has
    /// no actual samples
    pub fn producer_accuracy(&self, class: usize) -> Option<f64> {
        let row: usize = (0..self.n_classes).map(|p| self.get(class, p)).sum();
        if row == 0 {
            None
        } else {
            Some(self.get(class, class) as f64 / row as f64)
        }
    }

    /// User's accuracy (precision) of one class, `None` if the class was
    /// never predicted
    pub fn user_accuracy(&self, class: usize) -> Option<f64> {
        let column: usize = (0..self.n_classes).map(|a| self.get(a, class)).sum();
        if column == 0 {
            None
        } else {
            Some(self.get(class, class) as f64 / column as f64)
        }
    }

    /// Render the matrix with class names, one actual class per line.
    pub fn summary(&self, class_names: &[String]) -> String {
        let mut out = String::new();
        for actual in 0..self.n_classes {
            let name = class_names
                .get(actual)
                .map(|n| n.as_str())
                .unwrap_or("<unknown>");
            let row: Vec<String> = (0..self.n_classes)
                .map(|predicted| self.get(actual, predicted).to_string())
                .collect();
            out.push_str(&format!("{:<20} {}\n", name, row.join(" ")));
        }
        out
    }
}

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use ndarray::Axis;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{Matrix, Vector};

pub const N_FEATURES: usize = 5;

/// Feature columns in model order; also the CSV header order.
pub const FEATURE_NAMES: [&str; N_FEATURES] =
    ["funding", "revenue", "users", "burn_rate", "growth_rate"];

pub const LABEL_NAME: &str = "valuation";

/// One comparable startup: its metrics and its observed valuation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    /// Total funding received, ₹ crores.
    pub funding: f64,
    /// Annual revenue, ₹ crores.
    pub revenue: f64,
    /// Active users, thousands.
    pub users: f64,
    /// Monthly burn rate, ₹ lakhs.
    pub burn_rate: f64,
    /// Monthly user growth, percent.
    pub growth_rate: f64,
    /// Valuation, ₹ crores.
    pub valuation: f64,
}

impl TrainingSample {
    pub const fn new(
        funding: f64,
        revenue: f64,
        users: f64,
        burn_rate: f64,
        growth_rate: f64,
        valuation: f64,
    ) -> Self {
        Self {
            funding,
            revenue,
            users,
            burn_rate,
            growth_rate,
            valuation,
        }
    }

    pub fn features(&self) -> [f64; N_FEATURES] {
        [
            self.funding,
            self.revenue,
            self.users,
            self.burn_rate,
            self.growth_rate,
        ]
    }

    fn validate(&self, row: usize) -> Result<()> {
        for (name, value) in FEATURE_NAMES.into_iter().zip(self.features()) {
            if !value.is_finite() {
                return Err(Error::invalid_input(
                    name,
                    format!("must be finite in sample {row}, got {value}"),
                ));
            }
            if name != "growth_rate" && value < 0.0 {
                return Err(Error::invalid_input(
                    name,
                    format!("must be non-negative in sample {row}, got {value}"),
                ));
            }
        }

        if !self.valuation.is_finite() || self.valuation < 0.0 {
            return Err(Error::invalid_input(
                LABEL_NAME,
                format!(
                    "must be finite and non-negative in sample {row}, got {}",
                    self.valuation
                ),
            ));
        }

        Ok(())
    }
}

/// The embedded comparables every fit uses unless a replacement is configured.
pub const COMPARABLES: [TrainingSample; 5] = [
    TrainingSample::new(2.0, 1.0, 500.0, 10.0, 15.0, 20.0),
    TrainingSample::new(5.0, 6.0, 4000.0, 20.0, 30.0, 80.0),
    TrainingSample::new(7.0, 5.0, 3500.0, 15.0, 40.0, 75.0),
    TrainingSample::new(3.0, 2.0, 1000.0, 12.0, 18.0, 30.0),
    TrainingSample::new(9.0, 8.0, 6000.0, 25.0, 50.0, 120.0),
];

#[derive(Clone, Debug)]
pub struct Dataset {
    pub features: Matrix,
    pub labels: Vector,
}

impl Dataset {
    pub fn new(features: Matrix, labels: Vector) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(Error::ShapeMismatch {
                what: "labels",
                got: labels.len(),
                expected: features.nrows(),
            });
        }

        if features.ncols() != N_FEATURES {
            return Err(Error::ShapeMismatch {
                what: "feature columns",
                got: features.ncols(),
                expected: N_FEATURES,
            });
        }

        if features.nrows() == 0 {
            return Err(Error::EmptyDataset);
        }

        Ok(Self { features, labels })
    }

    pub fn from_samples(samples: &[TrainingSample]) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::EmptyDataset);
        }

        for (row, sample) in samples.iter().enumerate() {
            sample.validate(row)?;
        }

        let mut features = Matrix::zeros((samples.len(), N_FEATURES));
        for (mut row, sample) in features.axis_iter_mut(Axis(0)).zip(samples) {
            row.assign(&Vector::from(sample.features().to_vec()));
        }
        let labels = samples.iter().map(|s| s.valuation).collect::<Vector>();

        Self::new(features, labels)
    }

    pub fn comparables() -> Self {
        let features = Matrix::from_shape_fn((COMPARABLES.len(), N_FEATURES), |(i, j)| {
            COMPARABLES[i].features()[j]
        });
        let labels = COMPARABLES.iter().map(|s| s.valuation).collect::<Vector>();
        Self { features, labels }
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn samples(&self) -> Vec<TrainingSample> {
        self.features
            .axis_iter(Axis(0))
            .zip(self.labels.iter())
            .map(|(row, &valuation)| {
                TrainingSample::new(row[0], row[1], row[2], row[3], row[4], valuation)
            })
            .collect()
    }

    /// Per-feature `(min, max)` over all samples.
    pub fn feature_ranges(&self) -> [(f64, f64); N_FEATURES] {
        let mut ranges = [(f64::INFINITY, f64::NEG_INFINITY); N_FEATURES];
        for (range, column) in ranges.iter_mut().zip(self.features.axis_iter(Axis(1))) {
            for &value in column.iter() {
                range.0 = range.0.min(value);
                range.1 = range.1.max(value);
            }
        }
        ranges
    }

    /// Writes a header row and one row per sample, comma separated.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for sample in self.samples() {
            csv_writer.serialize(sample)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        utf8_output(buffer)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let samples = csv_reader
            .deserialize::<TrainingSample>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        log::debug!("read {} training samples from CSV", samples.len());
        Self::from_samples(&samples)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        log::info!("loading training samples from {}", path.as_ref().display());
        Self::from_csv_reader(file)
    }
}

fn utf8_output(buffer: Vec<u8>) -> Result<String> {
    String::from_utf8(buffer).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

impl Default for Dataset {
    fn default() -> Self {
        Self::comparables()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_comparables_dataset() {
        let dataset = Dataset::comparables();
        assert_eq!(dataset.n_samples(), 5);
        assert_eq!(dataset.n_features(), 5);
        assert_eq!(dataset.labels, array![20.0, 80.0, 75.0, 30.0, 120.0]);
        assert_eq!(dataset.features.row(2).to_vec(), vec![7.0, 5.0, 3500.0, 15.0, 40.0]);
    }

    #[test]
    fn test_from_samples_matches_comparables() {
        let built = Dataset::from_samples(&COMPARABLES).unwrap();
        let constant = Dataset::comparables();
        assert_eq!(built.features, constant.features);
        assert_eq!(built.labels, constant.labels);
        assert_eq!(built.samples(), COMPARABLES.to_vec());
    }

    #[test]
    fn test_dataset_shape_mismatch() {
        let features = Matrix::zeros((3, N_FEATURES));
        let labels = Vector::zeros(2);
        assert!(matches!(
            Dataset::new(features, labels),
            Err(Error::ShapeMismatch { what: "labels", .. })
        ));
    }

    #[test]
    fn test_dataset_wrong_feature_count() {
        let features = array![[1.0, 2.0], [3.0, 4.0]];
        let labels = array![1.0, 2.0];
        assert!(matches!(
            Dataset::new(features, labels),
            Err(Error::ShapeMismatch { what: "feature columns", got: 2, .. })
        ));
    }

    #[test]
    fn test_empty_samples_rejected() {
        assert!(matches!(Dataset::from_samples(&[]), Err(Error::EmptyDataset)));
    }

    #[test]
    fn test_negative_sample_rejected() {
        let mut samples = COMPARABLES.to_vec();
        samples[3].burn_rate = -1.0;
        assert!(matches!(
            Dataset::from_samples(&samples),
            Err(Error::InvalidInput { field: "burn_rate", .. })
        ));
    }

    #[test]
    fn test_feature_ranges() {
        let ranges = Dataset::comparables().feature_ranges();
        assert_eq!(ranges[0], (2.0, 9.0));
        assert_eq!(ranges[2], (500.0, 6000.0));
        assert_eq!(ranges[4], (15.0, 50.0));
    }

    #[test]
    fn test_csv_export_layout() {
        let csv = Dataset::comparables().to_csv_string().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "funding,revenue,users,burn_rate,growth_rate,valuation");
        assert_eq!(lines[1], "2.0,1.0,500.0,10.0,15.0,20.0");
        assert_eq!(lines[5], "9.0,8.0,6000.0,25.0,50.0,120.0");
    }

    #[test]
    fn test_invalid_utf8_output_is_io_error() {
        match utf8_output(vec![b'1', 0xff, b'2']) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::InvalidData),
            other => panic!("expected Io error, got {other:?}"),
        }
        assert_eq!(utf8_output(b"a,b".to_vec()).unwrap(), "a,b");
    }

    #[test]
    fn test_csv_import_reads_exported_rows() {
        let input = "funding,revenue,users,burn_rate,growth_rate,valuation\n\
                     1, 2, 300, 8, 12, 15\n\
                     4, 3, 2000, 14, 25, 50\n";
        let dataset = Dataset::from_csv_reader(input.as_bytes()).unwrap();

        assert_eq!(dataset.n_samples(), 2);
        assert_eq!(dataset.labels, array![15.0, 50.0]);
        assert_eq!(dataset.features.row(1).to_vec(), vec![4.0, 3.0, 2000.0, 14.0, 25.0]);
    }

    #[test]
    fn test_csv_import_rejects_bad_number() {
        let input = "funding,revenue,users,burn_rate,growth_rate,valuation\n\
                     1,2,lots,8,12,15\n";
        assert!(matches!(
            Dataset::from_csv_reader(input.as_bytes()),
            Err(Error::Csv(_))
        ));
    }
}

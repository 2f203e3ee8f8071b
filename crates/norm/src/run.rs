//! Module for per-run experiment metadata

// external crates
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything about a single run needed to normalise it
///
/// Several runs may be normalised into the same grid, each with its own
/// incident energy, orientation, and logged values.
///
/// Matrices are written row by row when serialised:
///
/// ```json
/// {
///   "name": "run_0041",
///   "incident_energy": 20.0,
///   "goniometer": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
///   "ub_matrix": [[0.16, 0.0, 0.0], [0.0, 0.16, 0.0], [0.0, 0.0, 0.16]],
///   "proton_charge": 12.5,
///   "logs": { "temperature": 5.2 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Run name, used in messages
    pub name: String,
    /// Incident energy (meV)
    #[serde(default)]
    pub incident_energy: Option<f64>,
    /// Goniometer rotation, identity if not given
    #[serde(default = "identity", with = "row_major")]
    pub goniometer: Matrix3<f64>,
    /// Lattice orientation (UB) matrix
    #[serde(default, with = "optional_row_major")]
    pub ub_matrix: Option<Matrix3<f64>>,
    /// Projection onto the output axes, identity if not given
    #[serde(default, with = "optional_row_major")]
    pub projection: Option<Matrix3<f64>>,
    /// Accumulated proton charge
    #[serde(default = "unit_charge")]
    pub proton_charge: f64,
    /// Scalar logged values, e.g. sample temperature
    #[serde(default)]
    pub logs: BTreeMap<String, f64>,
}

fn identity() -> Matrix3<f64> {
    Matrix3::identity()
}

fn unit_charge() -> f64 {
    1.0
}

impl RunMetadata {
    /// New run with unit proton charge and an identity goniometer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            incident_energy: None,
            goniometer: identity(),
            ub_matrix: None,
            projection: None,
            proton_charge: unit_charge(),
            logs: BTreeMap::new(),
        }
    }

    /// Set the incident energy (meV)
    pub fn with_incident_energy(mut self, ei: f64) -> Self {
        self.incident_energy = Some(ei);
        self
    }

    /// Set the goniometer rotation
    pub fn with_goniometer(mut self, rotation: Matrix3<f64>) -> Self {
        self.goniometer = rotation;
        self
    }

    /// Set the lattice orientation (UB) matrix
    pub fn with_ub_matrix(mut self, ub: Matrix3<f64>) -> Self {
        self.ub_matrix = Some(ub);
        self
    }

    /// Set the projection matrix
    pub fn with_projection(mut self, w: Matrix3<f64>) -> Self {
        self.projection = Some(w);
        self
    }

    /// Set the accumulated proton charge
    pub fn with_proton_charge(mut self, charge: f64) -> Self {
        self.proton_charge = charge;
        self
    }

    /// Add a scalar log value
    pub fn with_log(mut self, name: impl Into<String>, value: f64) -> Self {
        self.logs.insert(name.into(), value);
        self
    }

    /// Look up a scalar log value
    pub fn log(&self, name: &str) -> Option<f64> {
        self.logs.get(name).copied()
    }
}

mod row_major {
    use nalgebra::Matrix3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn to_rows(m: &Matrix3<f64>) -> [[f64; 3]; 3] {
        [0, 1, 2].map(|r| [m[(r, 0)], m[(r, 1)], m[(r, 2)]])
    }

    pub fn from_rows(rows: [[f64; 3]; 3]) -> Matrix3<f64> {
        Matrix3::from_fn(|r, c| rows[r][c])
    }

    pub fn serialize<S: Serializer>(m: &Matrix3<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        to_rows(m).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Matrix3<f64>, D::Error> {
        <[[f64; 3]; 3]>::deserialize(deserializer).map(from_rows)
    }
}

mod optional_row_major {
    use super::row_major::{from_rows, to_rows};
    use nalgebra::Matrix3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(m: &Option<Matrix3<f64>>, serializer: S) -> Result<S::Ok, S::Error> {
        m.as_ref().map(to_rows).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Matrix3<f64>>, D::Error> {
        Option::<[[f64; 3]; 3]>::deserialize(deserializer).map(|rows| rows.map(from_rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_missing() {
        let run: RunMetadata = serde_json::from_str(r#"{"name":"r1"}"#).unwrap();
        assert_eq!(run, RunMetadata::new("r1"));
        assert_eq!(run.goniometer, Matrix3::identity());
        assert_eq!(run.proton_charge, 1.0);
    }

    #[test]
    fn matrices_are_row_major() {
        let text = r#"{
            "name": "r2",
            "incident_energy": 12.0,
            "ub_matrix": [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]],
            "logs": {"temperature": 4.5}
        }"#;
        let run: RunMetadata = serde_json::from_str(text).unwrap();
        let ub = run.ub_matrix.unwrap();
        assert_eq!(ub[(0, 2)], 3.0);
        assert_eq!(ub[(2, 0)], 7.0);
        assert_eq!(run.log("temperature"), Some(4.5));
        assert_eq!(run.log("field"), None);
        assert!(run.projection.is_none());

        // and back out the same way
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["ub_matrix"][1][0], 4.0);
    }
}

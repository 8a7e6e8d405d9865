//! Inbound data contract: a generic JSON object handed over by the computation backend.
//!
//! Coordinates arrive as JSON arrays. `null` entries (what a NaN becomes on the wire) are
//! read back as NaN and break lines instead of failing the call.

use serde_json::{Map, Value};

use crate::error::{PlotError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(Map<String, Value>);

/// Which axis a coordinate vector belongs to; decides how a 2D meshgrid is collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; anything but an object is rejected.
    pub fn from_value(value: Value) -> Result<Payload> {
        match value {
            Value::Object(map) => Ok(Payload(map)),
            Value::Null => Err(PlotError::MissingData("no payload".into())),
            other => Err(PlotError::MissingData(format!(
                "payload is not an object (got {})",
                type_name(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// First present key among `keys`.
    pub fn get_any(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|k| self.get(k))
    }

    pub fn require(&self, key: &str) -> Result<&Value> {
        self.get(key)
            .ok_or_else(|| PlotError::MissingData(format!("payload has no `{key}`")))
    }

    pub fn require_any(&self, keys: &[&str]) -> Result<&Value> {
        self.get_any(keys)
            .ok_or_else(|| PlotError::MissingData(format!("payload has none of {keys:?}")))
    }

    /// Required numeric vector.
    pub fn numbers(&self, key: &str) -> Result<Vec<f64>> {
        numeric_array(key, self.require(key)?)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Length of an array field, `0` when absent or not an array.
    pub fn array_len(&self, key: &str) -> usize {
        self.get(key).and_then(Value::as_array).map_or(0, Vec::len)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Payload(map)
    }
}

/// Read a flat numeric array.
pub fn numeric_array(name: &str, value: &Value) -> Result<Vec<f64>> {
    let items = value.as_array().ok_or_else(|| {
        PlotError::malformed(name, format!("expected an array, got {}", type_name(value)))
    })?;
    items
        .iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| PlotError::malformed(name, format!("element {i} is not finite"))),
            Value::Null => Ok(f64::NAN),
            other => Err(PlotError::malformed(
                name,
                format!("element {i} is {}", type_name(other)),
            )),
        })
        .collect()
}

/// Read a rectangular 2D numeric grid (rows of equal length).
pub fn numeric_grid(name: &str, value: &Value) -> Result<Vec<Vec<f64>>> {
    let rows = value.as_array().ok_or_else(|| {
        PlotError::malformed(name, format!("expected a 2D array, got {}", type_name(value)))
    })?;
    let grid = rows
        .iter()
        .map(|row| numeric_array(name, row))
        .collect::<Result<Vec<_>>>()?;
    if let Some(first) = grid.first()
        && grid.iter().any(|row| row.len() != first.len())
    {
        return Err(PlotError::malformed(name, "rows have different lengths"));
    }
    Ok(grid)
}

/// Read a coordinate vector that may also be given as a meshgrid: a 2D `X` contributes
/// its first row, a 2D `Y` its first column.
pub fn axis_coords(name: &str, value: &Value, axis: Axis) -> Result<Vec<f64>> {
    let is_mesh = value
        .as_array()
        .and_then(|rows| rows.first())
        .is_some_and(Value::is_array);
    if !is_mesh {
        return numeric_array(name, value);
    }
    let grid = numeric_grid(name, value)?;
    Ok(match axis {
        Axis::X => grid.into_iter().next().unwrap_or_default(),
        Axis::Y => grid
            .iter()
            .map(|row| row.first().copied().unwrap_or(f64::NAN))
            .collect(),
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nulls_become_gaps() {
        let v = numeric_array("x", &json!([1, null, 2.5])).unwrap();
        assert_eq!(v[0], 1.0);
        assert!(v[1].is_nan());
        assert_eq!(v[2], 2.5);
    }

    #[test]
    fn non_arrays_and_strings_are_malformed() {
        assert!(matches!(
            numeric_array("x", &json!("not-an-array")),
            Err(PlotError::MalformedSeries { .. })
        ));
        assert!(matches!(
            numeric_array("x", &json!([1, "two"])),
            Err(PlotError::MalformedSeries { .. })
        ));
        assert!(matches!(
            numeric_grid("Z", &json!([[1, 2], [3]])),
            Err(PlotError::MalformedSeries { .. })
        ));
    }

    #[test]
    fn meshgrids_collapse_to_axis_vectors() {
        let mesh_x = json!([[0, 1, 2], [0, 1, 2]]);
        let mesh_y = json!([[5, 5, 5], [6, 6, 6]]);
        assert_eq!(axis_coords("X", &mesh_x, Axis::X).unwrap(), vec![0.0, 1.0, 2.0]);
        assert_eq!(axis_coords("Y", &mesh_y, Axis::Y).unwrap(), vec![5.0, 6.0]);
        assert_eq!(axis_coords("X", &json!([3, 4]), Axis::X).unwrap(), vec![3.0, 4.0]);
    }

    #[test]
    fn missing_fields_are_reported() {
        let p = Payload::from_value(json!({"x": [1], "y": null})).unwrap();
        assert!(p.get("y").is_none());
        assert!(matches!(p.numbers("y"), Err(PlotError::MissingData(_))));
        assert_eq!(p.require_any(&["X", "x"]).unwrap(), &json!([1]));
        assert!(Payload::from_value(json!([1, 2])).is_err());
        assert_eq!(p.array_len("x"), 1);
    }
}

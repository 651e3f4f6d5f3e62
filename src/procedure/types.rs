use crate::error::CasError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One (key, expected version) pair of a request, in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CasPair {
    pub key: i64,
    pub expected_version: i64,
}

/// How the payload of a matched row changes alongside its version bump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PayloadUpdate {
    /// Only the version moves.
    #[default]
    Keep,
    Replace(Value),
    /// Shallow merge of object fields into the current payload.
    Merge(Map<String, Value>),
}

impl PayloadUpdate {
    pub fn apply_to(&self, payload: &mut Value) {
        match self {
            PayloadUpdate::Keep => {}
            PayloadUpdate::Replace(value) => *payload = value.clone(),
            PayloadUpdate::Merge(fields) => {
                if !payload.is_object() {
                    *payload = Value::Object(Map::new());
                }
                if let Value::Object(current) = payload {
                    for (name, value) in fields {
                        current.insert(name.clone(), value.clone());
                    }
                }
            }
        }
    }
}

/// A conditional update request: two parallel sequences plus the payload change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CasRequest {
    pub keys: Vec<i64>,
    pub expected_versions: Vec<i64>,
    #[serde(default)]
    pub update: PayloadUpdate,
}

impl CasRequest {
    pub fn new(keys: Vec<i64>, expected_versions: Vec<i64>) -> Self {
        Self {
            keys,
            expected_versions,
            update: PayloadUpdate::Keep,
        }
    }

    pub fn from_pairs(pairs: &[(i64, i64)]) -> Self {
        Self::new(
            pairs.iter().map(|(key, _)| *key).collect(),
            pairs.iter().map(|(_, version)| *version).collect(),
        )
    }

    pub fn with_update(mut self, update: PayloadUpdate) -> Self {
        self.update = update;
        self
    }

    pub fn validate(&self) -> Result<(), CasError> {
        if self.keys.len() != self.expected_versions.len() {
            return Err(CasError::invalid(format!(
                "{} keys but {} expected versions",
                self.keys.len(),
                self.expected_versions.len()
            )));
        }
        Ok(())
    }

    /// Zips the two sequences, rejecting a length mismatch.
    pub fn pairs(&self) -> Result<Vec<CasPair>, CasError> {
        self.validate()?;
        Ok(self
            .keys
            .iter()
            .zip(self.expected_versions.iter())
            .map(|(key, expected_version)| CasPair {
                key: *key,
                expected_version: *expected_version,
            })
            .collect())
    }
}

/// What happened to a single pair that did not abort the invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    /// Key is owned by another partition.
    NotFound,
    Applied { affected: u64 },
}

/// Local read/write capability the procedure runs against.
pub trait RowAccess {
    fn read_version(&self, key: i64) -> Option<i64>;

    /// Bumps the version by one and applies `update`. Returns the number of rows affected,
    /// 0 when the row is missing or its version cannot grow.
    fn conditional_update(&mut self, key: i64, update: &PayloadUpdate) -> u64;
}

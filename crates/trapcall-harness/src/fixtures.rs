//! Fixture loading and management.

use std::path::Path;

use serde::{Deserialize, Serialize};
use trapcall_core::ErrnoBand;
use trapcall_core::syscall::DEFAULT_REQUEST;

use crate::error::HarnessError;

/// Errno band as spelled in fixture files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureBand {
    #[default]
    Legacy,
    Linux,
}

impl From<FixtureBand> for ErrnoBand {
    fn from(band: FixtureBand) -> Self {
        match band {
            FixtureBand::Legacy => ErrnoBand::Legacy,
            FixtureBand::Linux => ErrnoBand::Linux,
        }
    }
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Raw result the scripted mechanism hands back.
    pub raw: i32,
    #[serde(default)]
    pub band: FixtureBand,
    #[serde(default)]
    pub arg1: i32,
    #[serde(default)]
    pub arg2: i32,
    #[serde(default)]
    pub arg3: i32,
    /// Value the request stores through `arg2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg2_write: Option<i32>,
    /// Slot contents before the call.
    #[serde(default)]
    pub prior_errno: i32,
    pub expected_return: i32,
    /// Slot contents after the call.
    pub expected_errno: i32,
}

/// A collection of fixture cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Case family name.
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    /// Request id the wrapper is configured with.
    #[serde(default = "default_request")]
    pub request: u32,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

fn default_request() -> u32 {
    DEFAULT_REQUEST
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
        Self::from_json(&content).map_err(|source| HarnessError::Fixture {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_case_uses_defaults() {
        let set = FixtureSet::from_json(
            r#"{
                "version": "v1",
                "family": "errno_translation",
                "captured_at": "2026-01-01T00:00:00Z",
                "cases": [
                    {"name": "enoent", "raw": -2, "expected_return": -1, "expected_errno": 2}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(set.request, 128);
        let case = &set.cases[0];
        assert_eq!(case.band, FixtureBand::Legacy);
        assert_eq!((case.arg1, case.arg2, case.arg3), (0, 0, 0));
        assert_eq!(case.arg2_write, None);
        assert_eq!(case.prior_errno, 0);
    }

    #[test]
    fn band_names_are_lowercase() {
        let case: FixtureCase = serde_json::from_str(
            r#"{"name": "x", "raw": -126, "band": "linux",
                "expected_return": -1, "expected_errno": 126}"#,
        )
        .unwrap();
        assert_eq!(ErrnoBand::from(case.band), ErrnoBand::Linux);
        assert!(serde_json::from_str::<FixtureBand>(r#""Linux""#).is_err());
    }

    #[test]
    fn json_roundtrip_preserves_cases() {
        let set = FixtureSet {
            version: "v1".into(),
            family: "f".into(),
            captured_at: "t".into(),
            request: 20,
            cases: vec![FixtureCase {
                name: "write".into(),
                raw: 0,
                band: FixtureBand::Legacy,
                arg1: 1,
                arg2: 2,
                arg3: 3,
                arg2_write: Some(9),
                prior_errno: 4,
                expected_return: 0,
                expected_errno: 4,
            }],
        };
        let back = FixtureSet::from_json(&set.to_json().unwrap()).unwrap();
        assert_eq!(back.request, 20);
        assert_eq!(back.cases[0].arg2_write, Some(9));
        assert_eq!(back.cases[0].prior_errno, 4);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FixtureSet::from_file(Path::new("/nonexistent/trapcall.json")).unwrap_err();
        assert!(matches!(err, HarnessError::Io { .. }), "{err}");
    }
}

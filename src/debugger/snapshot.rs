use super::frame::{DebugFrame, VariableDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("frame `{0}` is no longer valid: the debuggee has resumed")]
    FrameResumed(String),
}

/// One variable as recorded in a snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotVariable {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<SnapshotVariable>,
}

impl SnapshotVariable {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            value: value.into(),
            members: Vec::new(),
        }
    }

    pub fn with_members(mut self, members: Vec<SnapshotVariable>) -> Self {
        self.members = members;
        self
    }

    fn descriptor(&self) -> VariableDescriptor<SnapshotValue> {
        VariableDescriptor::new(
            self.name.clone(),
            SnapshotValue {
                type_name: self.type_name.clone(),
                value: self.value.clone(),
                members: self.members.clone(),
            },
        )
    }
}

/// Recorded state of one paused call frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    #[serde(default)]
    pub function: String,
    #[serde(default)]
    pub locals: Vec<SnapshotVariable>,
}

/// Value handle handed out by [`SnapshotFrame`].
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotValue {
    pub type_name: String,
    pub value: String,
    pub members: Vec<SnapshotVariable>,
}

impl SnapshotValue {
    pub fn is_aggregate(&self) -> bool {
        !self.members.is_empty()
    }
}

impl fmt::Display for SnapshotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.type_name.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} = {}", self.type_name, self.value)
        }
    }
}

/// A [`DebugFrame`] served from a recorded snapshot.
///
/// The frame stays paused until [`SnapshotFrame::resume`]; after that every
/// query fails the way a live debugger does once its debuggee runs again.
#[derive(Debug, Clone)]
pub struct SnapshotFrame {
    snapshot: FrameSnapshot,
    resumed: bool,
}

impl SnapshotFrame {
    pub fn new(snapshot: FrameSnapshot) -> Self {
        Self {
            snapshot,
            resumed: false,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: FrameSnapshot = serde_json::from_str(json)?;
        Ok(Self::new(snapshot))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let frame = Self::from_json(&contents)?;
        info!(
            path = %path.display(),
            function = %frame.snapshot.function,
            locals = frame.snapshot.locals.len(),
            "loaded frame snapshot"
        );
        Ok(frame)
    }

    pub fn function(&self) -> &str {
        &self.snapshot.function
    }

    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    pub fn resume(&mut self) {
        debug!(function = %self.snapshot.function, "resuming frame");
        self.resumed = true;
    }

    fn ensure_paused(&self) -> Result<(), SnapshotError> {
        if self.resumed {
            return Err(SnapshotError::FrameResumed(self.snapshot.function.clone()));
        }
        Ok(())
    }
}

impl DebugFrame for SnapshotFrame {
    type Value = SnapshotValue;
    type Error = SnapshotError;

    fn locals(&self) -> Result<Vec<VariableDescriptor<SnapshotValue>>, SnapshotError> {
        self.ensure_paused()?;
        Ok(self
            .snapshot
            .locals
            .iter()
            .map(SnapshotVariable::descriptor)
            .collect())
    }

    fn data_members(
        &self,
        variable: &VariableDescriptor<SnapshotValue>,
    ) -> Result<Vec<VariableDescriptor<SnapshotValue>>, SnapshotError> {
        self.ensure_paused()?;
        Ok(variable
            .value()
            .members
            .iter()
            .map(SnapshotVariable::descriptor)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let frame = SnapshotFrame::from_json(r#"{"locals": [{"name": "x"}]}"#).unwrap();
        let locals = frame.locals().unwrap();

        assert_eq!(frame.function(), "");
        assert_eq!(locals.len(), 1);
        assert_eq!(locals[0].name(), "x");
        assert_eq!(locals[0].value().to_string(), "");
        assert!(!locals[0].value().is_aggregate());
    }

    #[test]
    fn test_value_display_includes_type() {
        let value = SnapshotValue {
            type_name: "i32".to_string(),
            value: "41".to_string(),
            members: Vec::new(),
        };
        assert_eq!(value.to_string(), "i32 = 41");
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = SnapshotFrame::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SnapshotError::Parse(_)));
    }

    #[test]
    fn test_resume_invalidates_members_too() {
        let mut frame = SnapshotFrame::new(FrameSnapshot {
            function: "main".to_string(),
            locals: vec![SnapshotVariable::new("p", "Point", "{..}")
                .with_members(vec![SnapshotVariable::new("x", "i32", "1")])],
        });
        let p = frame.locals().unwrap().remove(0);
        frame.resume();

        assert!(matches!(
            frame.data_members(&p),
            Err(SnapshotError::FrameResumed(ref f)) if f == "main"
        ));
    }
}

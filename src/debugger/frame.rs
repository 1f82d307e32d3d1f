use serde::{Deserialize, Serialize};

/// Name of the synthetic local that carries the frame's receiver.
pub const RECEIVER_NAME: &str = "this";

/// Which variable set a lookup searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Locals of the current frame.
    #[default]
    Local,
    /// Direct data members of the `this` local.
    Member,
}

/// One inspectable variable: its name plus the debugger's handle to its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDescriptor<V> {
    name: String,
    value: V,
}

impl<V> VariableDescriptor<V> {
    pub fn new(name: impl Into<String>, value: V) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn is_receiver(&self) -> bool {
        self.name == RECEIVER_NAME
    }
}

/// A paused call frame of a debugged process.
///
/// Implementors sit on the external debugger boundary. Both collections are
/// read fresh on every call and handed back in the debugger's own enumeration
/// order. Once the debuggee resumes, calls are expected to fail with
/// `Self::Error`; callers above this trait never intercept that failure.
pub trait DebugFrame {
    /// Opaque handle to a variable's live value.
    type Value: Clone;
    type Error;

    /// Every variable the debugger reports as a local of this frame.
    fn locals(&self) -> Result<Vec<VariableDescriptor<Self::Value>>, Self::Error>;

    /// Direct data members of `variable`, not recursively expanded.
    fn data_members(
        &self,
        variable: &VariableDescriptor<Self::Value>,
    ) -> Result<Vec<VariableDescriptor<Self::Value>>, Self::Error>;
}

impl<F: DebugFrame + ?Sized> DebugFrame for &F {
    type Value = F::Value;
    type Error = F::Error;

    fn locals(&self) -> Result<Vec<VariableDescriptor<Self::Value>>, Self::Error> {
        (**self).locals()
    }

    fn data_members(
        &self,
        variable: &VariableDescriptor<Self::Value>,
    ) -> Result<Vec<VariableDescriptor<Self::Value>>, Self::Error> {
        (**self).data_members(variable)
    }
}

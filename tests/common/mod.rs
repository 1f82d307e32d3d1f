// Shared fake frame for integration tests.
#![allow(dead_code)]

use frame_inspector::debugger::{DebugFrame, VariableDescriptor};
use std::cell::Cell;
use std::collections::HashMap;

/// Value handle carrying an identity so tests can tell same-named variables apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggeeResumed {
    pub run_id: u32,
}

/// An in-memory frame whose locals and members are keyed by handle.
#[derive(Debug, Default)]
pub struct FakeFrame {
    locals: Vec<(String, Handle)>,
    members: HashMap<Handle, Vec<(String, Handle)>>,
    resumed: Option<u32>,
    next_id: u32,
    pub local_reads: Cell<usize>,
}

impl FakeFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locals(names: &[&str]) -> Self {
        let mut frame = Self::new();
        for name in names {
            frame.push_local(name);
        }
        frame
    }

    pub fn push_local(&mut self, name: &str) -> Handle {
        let handle = self.fresh();
        self.locals.push((name.to_string(), handle));
        handle
    }

    pub fn push_member(&mut self, owner: Handle, name: &str) -> Handle {
        let handle = self.fresh();
        self.members
            .entry(owner)
            .or_default()
            .push((name.to_string(), handle));
        handle
    }

    /// Handle of the first local with `name`.
    pub fn local(&self, name: &str) -> Handle {
        self.locals
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, h)| *h)
            .expect("no such local")
    }

    pub fn resume(&mut self, run_id: u32) {
        self.resumed = Some(run_id);
    }

    fn fresh(&mut self) -> Handle {
        self.next_id += 1;
        Handle(self.next_id)
    }

    fn check(&self) -> Result<(), DebuggeeResumed> {
        match self.resumed {
            Some(run_id) => Err(DebuggeeResumed { run_id }),
            None => Ok(()),
        }
    }
}

impl DebugFrame for FakeFrame {
    type Value = Handle;
    type Error = DebuggeeResumed;

    fn locals(&self) -> Result<Vec<VariableDescriptor<Handle>>, DebuggeeResumed> {
        self.check()?;
        self.local_reads.set(self.local_reads.get() + 1);
        Ok(self
            .locals
            .iter()
            .map(|(name, handle)| VariableDescriptor::new(name.clone(), *handle))
            .collect())
    }

    fn data_members(
        &self,
        variable: &VariableDescriptor<Handle>,
    ) -> Result<Vec<VariableDescriptor<Handle>>, DebuggeeResumed> {
        self.check()?;
        Ok(self
            .members
            .get(variable.value())
            .map(|members| {
                members
                    .iter()
                    .map(|(name, handle)| VariableDescriptor::new(name.clone(), *handle))
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn names<V>(variables: &[VariableDescriptor<V>]) -> Vec<&str> {
    variables.iter().map(|v| v.name()).collect()
}

pub fn handles(variables: &[VariableDescriptor<Handle>]) -> Vec<Handle> {
    variables.iter().map(|v| *v.value()).collect()
}

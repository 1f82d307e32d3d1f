use super::frame::{DebugFrame, Scope, VariableDescriptor, RECEIVER_NAME};
use tracing::trace;

type Variables<F> = Vec<VariableDescriptor<<F as DebugFrame>::Value>>;
type Lookup<F> =
    Result<Option<VariableDescriptor<<F as DebugFrame>::Value>>, <F as DebugFrame>::Error>;

/// Locals of a frame plus its receiver, read once per inspection call.
#[derive(Debug, Clone)]
pub struct FrameScope<V> {
    locals: Vec<VariableDescriptor<V>>,
    receiver: Option<VariableDescriptor<V>>,
}

impl<V: Clone> FrameScope<V> {
    pub fn capture<F>(frame: &F) -> Result<Self, F::Error>
    where
        F: DebugFrame<Value = V> + ?Sized,
    {
        let locals = frame.locals()?;
        let receiver = locals.iter().find(|v| v.is_receiver()).cloned();
        Ok(Self { locals, receiver })
    }

    pub fn locals(&self) -> &[VariableDescriptor<V>] {
        &self.locals
    }

    pub fn receiver(&self) -> Option<&VariableDescriptor<V>> {
        self.receiver.as_ref()
    }

    pub fn into_locals(self) -> Vec<VariableDescriptor<V>> {
        self.locals
    }

    /// Direct data members of the receiver, or nothing in a receiver-less frame.
    pub fn members<F>(&self, frame: &F) -> Result<Vec<VariableDescriptor<V>>, F::Error>
    where
        F: DebugFrame<Value = V> + ?Sized,
    {
        match &self.receiver {
            Some(receiver) => frame.data_members(receiver),
            None => Ok(Vec::new()),
        }
    }
}

/// Variable enumeration and lookup over one borrowed frame.
///
/// Nothing is cached: every call goes back to the frame, so results always
/// reflect its current state and a resumed frame fails every call.
pub struct FrameInspector<'f, F> {
    frame: &'f F,
}

impl<'f, F: DebugFrame> FrameInspector<'f, F> {
    pub fn new(frame: &'f F) -> Self {
        Self { frame }
    }

    pub fn scope(&self) -> Result<FrameScope<F::Value>, F::Error> {
        FrameScope::capture(self.frame)
    }

    /// Locals followed by the receiver's members. `this` shows up once as a
    /// local; nothing is deduplicated across the two scopes.
    pub fn all_variables(&self) -> Result<Variables<F>, F::Error> {
        let scope = self.scope()?;
        let members = scope.members(self.frame)?;
        let mut variables = scope.into_locals();
        trace!(
            locals = variables.len(),
            members = members.len(),
            "enumerated frame variables"
        );
        variables.extend(members);
        Ok(variables)
    }

    /// Locals in the debugger's enumeration order.
    ///
    /// Not O(1): the debugger materializes every local, which gets slow once a
    /// frame holds hundreds of them. Avoid calling this at interactive rates.
    pub fn all_local_variables(&self) -> Result<Variables<F>, F::Error> {
        let locals = self.frame.locals()?;
        trace!(locals = locals.len(), "enumerated frame locals");
        Ok(locals)
    }

    /// Direct data members of the `this` local; empty when the frame has none.
    ///
    /// Same cost caveat as [`Self::all_local_variables`].
    pub fn all_non_local_variables(&self) -> Result<Variables<F>, F::Error> {
        let scope = self.scope()?;
        if scope.receiver().is_none() {
            trace!("frame has no receiver");
        }
        scope.members(self.frame)
    }

    /// Exact, case-sensitive name lookup. On duplicate names the first one in
    /// enumeration order wins.
    pub fn get_variable(&self, name: &str, scope: Scope) -> Lookup<F> {
        let candidates = match scope {
            Scope::Local => self.frame.locals()?,
            Scope::Member => match self.get_variable(RECEIVER_NAME, Scope::Local)? {
                Some(receiver) => self.frame.data_members(&receiver)?,
                None => return Ok(None),
            },
        };
        Ok(take_first(candidates, name))
    }

    /// [`Self::get_variable`] as a presence pair.
    pub fn try_get_variable(
        &self,
        name: &str,
        scope: Scope,
    ) -> Result<(bool, Option<VariableDescriptor<F::Value>>), F::Error> {
        let found = self.get_variable(name, scope)?;
        Ok((found.is_some(), found))
    }

    pub fn members_of(
        &self,
        variable: &VariableDescriptor<F::Value>,
    ) -> Result<Variables<F>, F::Error> {
        self.frame.data_members(variable)
    }

    /// Resolve a dotted path such as `this.count` or `node.next.value`.
    ///
    /// The head is a local; each following segment is looked up among the
    /// previous variable's direct data members.
    pub fn resolve_path(&self, path: &str) -> Lookup<F> {
        let mut segments = path.split('.');
        let head = match segments.next() {
            Some(head) if !head.is_empty() => head,
            _ => return Ok(None),
        };

        let mut current = match self.get_variable(head, Scope::Local)? {
            Some(variable) => variable,
            None => return Ok(None),
        };

        for segment in segments {
            if segment.is_empty() {
                return Ok(None);
            }
            let members = self.frame.data_members(&current)?;
            current = match take_first(members, segment) {
                Some(member) => member,
                None => return Ok(None),
            };
        }

        Ok(Some(current))
    }
}

fn take_first<V>(
    variables: Vec<VariableDescriptor<V>>,
    name: &str,
) -> Option<VariableDescriptor<V>> {
    variables.into_iter().find(|v| v.name() == name)
}

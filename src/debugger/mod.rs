mod context;
mod frame;
mod inspector;
mod snapshot;

pub use context::{format_variable, WatchCommand, WatchContext};
pub use frame::{DebugFrame, Scope, VariableDescriptor, RECEIVER_NAME};
pub use inspector::{FrameInspector, FrameScope};
pub use snapshot::{FrameSnapshot, SnapshotError, SnapshotFrame, SnapshotValue, SnapshotVariable};

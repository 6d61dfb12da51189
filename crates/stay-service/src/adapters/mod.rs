//! Implementations of outbound collaborator ports

mod notifier;
mod storage;

pub use notifier::TracingNotifier;
pub use storage::LocalMediaStorage;

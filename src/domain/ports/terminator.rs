//! Process termination port

/// Ends the process after a FATAL record has been written.
///
/// The production adapter exits; tests substitute one that records the call.
pub trait Terminator: Send + Sync {
    /// End the process with `code`
    fn terminate(&self, code: i32);
}

use faultline_signature::MethodSignature;

/// Per-call snapshot handed to the engine by the interception mechanism.
///
/// Borrowed rather than owned: a context lives for exactly one dispatch on
/// the interception hot path, so nothing is cloned to build it.
/// `called_times` is the 1-based count of calls to the target signature,
/// shared across every rule matching that signature.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeContext<'a> {
    target: &'a MethodSignature,
    caller: Option<&'a MethodSignature>,
    call_stack: &'a [MethodSignature],
    called_times: u64,
}

impl<'a> RuntimeContext<'a> {
    pub fn new(
        target: &'a MethodSignature,
        caller: Option<&'a MethodSignature>,
        called_times: u64,
    ) -> Self {
        Self {
            target,
            caller,
            call_stack: &[],
            called_times,
        }
    }

    /// Build a context from a captured call stack. Frame 0 is the faulted
    /// method itself, so the caller is frame 1 (absent for entry points).
    pub fn from_stack(
        target: &'a MethodSignature,
        call_stack: &'a [MethodSignature],
        called_times: u64,
    ) -> Self {
        Self {
            target,
            caller: call_stack.get(1),
            call_stack,
            called_times,
        }
    }

    pub fn target(&self) -> &MethodSignature {
        self.target
    }

    /// Signature of the method that called the target, when known.
    pub fn caller(&self) -> Option<&MethodSignature> {
        self.caller
    }

    /// Captured stack frames, outermost last. Empty when the interception
    /// mechanism did not capture a stack.
    pub fn call_stack(&self) -> &[MethodSignature] {
        self.call_stack
    }

    pub fn called_times(&self) -> u64 {
        self.called_times
    }
}

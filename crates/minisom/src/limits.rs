//! Resource limits enforced during evaluation.

/// Default cap on method/block activation depth.
///
/// Deep enough for any reasonable program; unbounded recursion surfaces as
/// a `StackOverflow` error well before the host stack is at risk.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Default cap on live heap objects.
pub const DEFAULT_MAX_HEAP_OBJECTS: usize = 1 << 22;

/// Limits a universe enforces while running code.
///
/// Exceeding the heap cap surfaces `AllocationFailed`; exceeding the call
/// depth surfaces `StackOverflow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    pub max_heap_objects: usize,
    pub max_call_depth: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_heap_objects: DEFAULT_MAX_HEAP_OBJECTS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

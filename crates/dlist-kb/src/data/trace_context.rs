//! Trace context for request tracking

use uuid::Uuid;

/// Identifies one inbound request across gateway and store log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: String,
    pub parent_id: Option<String>,
}

impl TraceContext {
    /// Creates a new root trace context with a new trace_id and span_id.
    pub fn new_root() -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
            span_id: Uuid::new_v4().to_string(),
            parent_id: None,
        }
    }

    /// Creates a child context for one query of a multi-query request.
    pub fn new_child(&self) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            span_id: Uuid::new_v4().to_string(),
            parent_id: Some(self.span_id.clone()),
        }
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new_root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_root() {
        let root = TraceContext::new_root();
        assert_ne!(root.trace_id, Uuid::nil().to_string());
        assert_ne!(root.trace_id, root.span_id);
        assert!(root.parent_id.is_none());
    }

    #[test]
    fn test_new_child() {
        let root = TraceContext::new_root();
        let child = root.new_child();

        assert_eq!(root.trace_id, child.trace_id);
        assert_ne!(root.span_id, child.span_id);
        assert_eq!(child.parent_id.as_deref(), Some(root.span_id.as_str()));
    }
}

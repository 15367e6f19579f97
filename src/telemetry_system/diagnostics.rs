use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    InputCorrected,
    // level flight needs more than the cruise rating
    EnvelopeExceeded,
    CeilingReached,
    // unreachable target or depleted battery
    SegmentInterrupted,
    UnknownConfiguration,
    StepClimb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics {
            entries: Vec::new(),
        }
    }

    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        warn!(?kind, "{}", message);
        self.entries.push(Diagnostic { kind, message });
    }

    pub fn note(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        info!(?kind, "{}", message);
        self.entries.push(Diagnostic { kind, message });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|d| d.kind == kind)
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_and_queries() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn(DiagnosticKind::InputCorrected, "ROCD sign flipped");
        diagnostics.note(DiagnosticKind::StepClimb, "climbed to 11000 m");

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.has(DiagnosticKind::StepClimb));
        assert!(!diagnostics.has(DiagnosticKind::CeilingReached));
        assert_eq!(diagnostics.count(DiagnosticKind::InputCorrected), 1);
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut first = Diagnostics::new();
        first.warn(DiagnosticKind::EnvelopeExceeded, "a");
        let mut second = Diagnostics::new();
        second.warn(DiagnosticKind::CeilingReached, "b");

        first.extend(second);
        let kinds: Vec<_> = first.entries().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::EnvelopeExceeded, DiagnosticKind::CeilingReached]
        );
    }
}

//! Diagnostic accumulator shared by every pass of a run.

use crate::code::Category;
use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Number of warning-or-error diagnostics per category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    /// Structural problems.
    pub structure: usize,
    /// Writes to bits that do not exist.
    pub missing_bit: usize,
    /// Precedence conflicts.
    pub precedence: usize,
    /// Unresolvable references.
    pub unresolved: usize,
    /// File access problems.
    pub io: usize,
}

impl CategoryCounts {
    fn bump(&mut self, category: Category) {
        match category {
            Category::Structure => self.structure += 1,
            Category::MissingBit => self.missing_bit += 1,
            Category::Precedence => self.precedence += 1,
            Category::Unresolved => self.unresolved += 1,
            Category::Io => self.io += 1,
        }
    }

    /// Returns the total over all categories.
    pub fn total(&self) -> usize {
        self.structure + self.missing_bit + self.precedence + self.unresolved + self.io
    }
}

/// An accumulator for diagnostics emitted during a run.
///
/// Passes report into the sink through a shared reference. The error count is
/// tracked atomically for cheap `has_errors` checks; `emit_once` suppresses
/// repeats of the same key so a conflicting bit is reported a single time no
/// matter how many writers touch it.
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    seen: Mutex<HashSet<String>>,
    counts: Mutex<CategoryCounts>,
    error_count: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates a new empty diagnostic sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            seen: Mutex::new(HashSet::new()),
            counts: Mutex::new(CategoryCounts::default()),
            error_count: AtomicUsize::new(0),
        }
    }

    /// Emits a diagnostic into the sink.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.severity == Severity::Error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        if diag.severity >= Severity::Warning {
            if let Ok(mut counts) = self.counts.lock() {
                counts.bump(diag.code.category);
            }
        }
        if let Ok(mut diagnostics) = self.diagnostics.lock() {
            diagnostics.push(diag);
        }
    }

    /// Emits `diag` unless a diagnostic with the same `key` was already
    /// emitted through this method. Returns `true` if it was emitted.
    pub fn emit_once(&self, key: impl Into<String>, diag: Diagnostic) -> bool {
        let fresh = match self.seen.lock() {
            Ok(mut seen) => seen.insert(key.into()),
            Err(_) => true,
        };
        if fresh {
            self.emit(diag);
        }
        fresh
    }

    /// Returns `true` if any error-severity diagnostics have been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Returns the number of error-severity diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Returns per-category counts of warnings and errors.
    pub fn counts(&self) -> CategoryCounts {
        self.counts.lock().map(|c| *c).unwrap_or_default()
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        match self.diagnostics.lock() {
            Ok(mut diagnostics) => std::mem::take(&mut *diagnostics),
            Err(_) => Vec::new(),
        }
    }

    /// Returns a snapshot of all accumulated diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::DiagnosticCode;
    use crate::origin::Origin;

    fn make_error() -> Diagnostic {
        Diagnostic::error(
            DiagnosticCode::new(Category::Structure, 101),
            "test error",
            Origin::NONE,
        )
    }

    fn make_warning(category: Category) -> Diagnostic {
        Diagnostic::warning(DiagnosticCode::new(category, 201), "test warning", Origin::NONE)
    }

    #[test]
    fn empty_sink() {
        let sink = DiagnosticSink::new();
        assert!(!sink.has_errors());
        assert_eq!(sink.error_count(), 0);
        assert_eq!(sink.counts().total(), 0);
        assert!(sink.take_all().is_empty());
    }

    #[test]
    fn emit_error() {
        let sink = DiagnosticSink::new();
        sink.emit(make_error());
        assert!(sink.has_errors());
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.counts().structure, 1);
    }

    #[test]
    fn warnings_are_counted_by_category() {
        let sink = DiagnosticSink::new();
        sink.emit(make_warning(Category::MissingBit));
        sink.emit(make_warning(Category::MissingBit));
        sink.emit(make_warning(Category::Precedence));
        let counts = sink.counts();
        assert_eq!(counts.missing_bit, 2);
        assert_eq!(counts.precedence, 1);
        assert!(!sink.has_errors());
    }

    #[test]
    fn notes_are_not_counted() {
        let sink = DiagnosticSink::new();
        sink.emit(Diagnostic::note(
            DiagnosticCode::new(Category::Unresolved, 1),
            "fyi",
            Origin::NONE,
        ));
        assert_eq!(sink.counts().total(), 0);
        assert_eq!(sink.diagnostics().len(), 1);
    }

    #[test]
    fn emit_once_suppresses_repeats() {
        let sink = DiagnosticSink::new();
        assert!(sink.emit_once("a.mem_out[0]", make_warning(Category::Precedence)));
        assert!(!sink.emit_once("a.mem_out[0]", make_warning(Category::Precedence)));
        assert!(sink.emit_once("a.mem_out[1]", make_warning(Category::Precedence)));
        assert_eq!(sink.diagnostics().len(), 2);
    }

    #[test]
    fn take_all_drains() {
        let sink = DiagnosticSink::new();
        sink.emit(make_error());
        sink.emit(make_warning(Category::Io));
        assert_eq!(sink.take_all().len(), 2);
        assert!(sink.take_all().is_empty());
        assert_eq!(sink.error_count(), 1);
    }
}

//! Field-level diffing between two versions of a record.
//!
//! [`compute_field_diff`] is the single definition of "what changed"; the
//! reconciler uses it to scope cache writes and `locsync diff` renders it
//! with [`render_record_diff`].

use similar::TextDiff;

use locsync_core::{Field, FieldDiff, Record};

use crate::reconcile::RecordUpdate;

/// Every field where `a` differs from `b`, mapped to `a`'s value.
///
/// Empty iff `a == b`.
pub fn compute_field_diff(a: &Record, b: &Record) -> FieldDiff {
    Field::ALL
        .iter()
        .filter(|field| field.get(a) != field.get(b))
        .map(|field| (*field, field.get(a).to_string()))
        .collect()
}

/// Unified diff of the changed fields of one record, cached (`a/`) against
/// source (`b/`). One line per field; embedded newlines are escaped.
pub fn render_record_diff(update: &RecordUpdate) -> String {
    let id = &update.source.record_id;
    let old = field_lines(&update.cached, &update.diff);
    let new = field_lines(&update.source, &update.diff);

    let old_header = format!("a/{id}");
    let new_header = format!("b/{id}");
    TextDiff::from_lines(&old, &new)
        .unified_diff()
        .context_radius(0)
        .header(&old_header, &new_header)
        .to_string()
}

fn field_lines(record: &Record, diff: &FieldDiff) -> String {
    diff.keys()
        .map(|field| format!("{field}: {}\n", escape_newlines(field.get(record))))
        .collect()
}

fn escape_newlines(value: &str) -> String {
    value.replace("\r\n", "\\n").replace('\n', "\\n")
}

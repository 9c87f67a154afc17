use crate::core::UniqueConflict;

/// How a uniqueness conflict is traced back to the fields that caused it.
///
/// Message-only reports are read in two steps. When the message names
/// columns in single quotes (`Column 'email' already contains value ...`),
/// only those names count. Otherwise any field whose name occurs in the text
/// is implicated, which can misattribute: `id` inside `order_id`, or a name
/// inside the duplicated value. Stores that report key names avoid that; use
/// [`AttributionMode::StructuredKeyOnly`] to refuse message-only reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttributionMode {
    /// Use the reported key names, or search the message when there are none.
    #[default]
    PreferStructuredKey,
    /// Only reported key names count; message-only conflicts are unattributed.
    StructuredKeyOnly,
}

impl AttributionMode {
    /// Returns the `candidates` implicated by `conflict`, in candidate order.
    pub fn implicated<'a>(
        self,
        conflict: &UniqueConflict<'_>,
        candidates: impl IntoIterator<Item = &'a str>,
    ) -> Vec<String> {
        let quoted = quoted_names(conflict.message);
        let is_implicated = |field: &str| {
            if conflict.has_structured_keys() {
                conflict.keys.iter().any(|key| key == field)
            } else if self == Self::StructuredKeyOnly {
                false
            } else if !quoted.is_empty() {
                quoted.contains(&field)
            } else {
                conflict.message.contains(field)
            }
        };

        candidates
            .into_iter()
            .filter(|field| is_implicated(field))
            .map(str::to_string)
            .collect()
    }
}

/// Names enclosed in single quotes, e.g. `'_id'` in a constraint message.
fn quoted_names(message: &str) -> Vec<&str> {
    message
        .split('\'')
        .skip(1)
        .step_by(2)
        .filter(|name| !name.is_empty())
        .collect()
}

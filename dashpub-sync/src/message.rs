//! Aggregated commit message for a publish run.

// ---------------------------------------------------------------------------
// Change entries
// ---------------------------------------------------------------------------

/// One dashboard written during a run: its title and the change note taken
/// from the published version's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    pub title: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// commit_message
// ---------------------------------------------------------------------------

/// Build the single commit message covering every dashboard written in one
/// run.
///
/// The subject names the dashboard when only one changed, or the count
/// otherwise. The body lists one `title: message` line per dashboard, with a
/// blank line between entries:
///
/// ```text
/// Published updates to 2 dashboards.
///
/// Sales: new revenue panel
///
/// Fleet: Updated
/// ```
pub fn commit_message(changes: &[ChangeEntry]) -> String {
    let summary = match changes {
        [single] => single.title.clone(),
        _ => format!("{} dashboards", changes.len()),
    };
    let entries: Vec<String> = changes
        .iter()
        .map(|change| format!("{}: {}\n", change.title, change.message))
        .collect();
    format!("Published updates to {}.\n\n{}", summary, entries.join("\n"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Output formatting utilities

use crate::models::{FeedbackEvent, TaskList};
use crate::utils::format_local;
use crate::view::{AuxContent, DetailsView, RowDisplay};
use chrono_tz::Tz;
use std::io::IsTerminal;

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_RESET: &str = "\x1b[0m";

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate for reliable detection, with fallback to
/// COLUMNS environment variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 { // Sanity check
                return width;
            }
        }
    }

    120
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowColumn {
    Number,
    Title,
    List,
    Date,
    Priority,
}

fn column_label(column: RowColumn) -> &'static str {
    match column {
        RowColumn::Number => "#",
        RowColumn::Title => "Title",
        RowColumn::List => "List",
        RowColumn::Date => "Date",
        RowColumn::Priority => "Priority",
    }
}

fn column_min_width(column: RowColumn) -> usize {
    match column {
        RowColumn::Title => 12,
        RowColumn::List => 8,
        _ => 1,
    }
}

fn cell_value(row: &RowDisplay, number: usize, column: RowColumn) -> String {
    match column {
        RowColumn::Number => number.to_string(),
        RowColumn::Title => row.title.clone(),
        RowColumn::List => row.task_list_name.clone(),
        RowColumn::Date => row
            .active_date
            .as_ref()
            .map(|d| format!("{} {}", row.date_label, d))
            .unwrap_or_default(),
        RowColumn::Priority => row.priority.clone(),
    }
}

/// Truncate by character count to avoid cutting multi-byte chars
fn fit(value: &str, width: usize) -> String {
    if value.chars().count() > width {
        let truncated: String = value.chars().take(width.saturating_sub(2)).collect();
        format!("{}..", truncated)
    } else {
        value.to_string()
    }
}

fn total_width(widths: &[(RowColumn, usize)]) -> usize {
    widths.iter().map(|(_, w)| w).sum::<usize>() + widths.len().saturating_sub(1)
}

/// Render visible rows as a table sized to `terminal_width`
pub fn format_rows_table(rows: &[RowDisplay], terminal_width: usize) -> String {
    if rows.is_empty() {
        return "No tasks found.\n".to_string();
    }

    let columns = [
        RowColumn::Number,
        RowColumn::Title,
        RowColumn::List,
        RowColumn::Date,
        RowColumn::Priority,
    ];
    let mut widths: Vec<(RowColumn, usize)> = columns
        .iter()
        .map(|&column| {
            let content = rows
                .iter()
                .enumerate()
                .map(|(idx, row)| cell_value(row, idx + 1, column).chars().count())
                .max()
                .unwrap_or(0);
            (column, content.max(column_label(column).chars().count()))
        })
        .collect();

    // Shrink Title then List before dropping Priority
    for shrinkable in [RowColumn::Title, RowColumn::List] {
        let excess = total_width(&widths).saturating_sub(terminal_width);
        if excess == 0 {
            break;
        }
        if let Some((_, width)) = widths.iter_mut().find(|(c, _)| *c == shrinkable) {
            let floor = column_min_width(shrinkable).min(*width);
            *width = (*width).saturating_sub(excess).max(floor);
        }
    }
    if total_width(&widths) > terminal_width {
        widths.retain(|(c, _)| *c != RowColumn::Priority);
    }

    let tty_mode = is_tty();
    let mut output = String::new();

    let header: Vec<String> = widths
        .iter()
        .map(|(column, width)| format!("{:<width$}", column_label(*column), width = *width))
        .collect();
    let header_line = header.join(" ");
    if tty_mode {
        output.push_str(&format!("{}{}{}\n", ANSI_BOLD, header_line.trim_end(), ANSI_RESET));
    } else {
        output.push_str(header_line.trim_end());
        output.push('\n');
    }
    let separator: Vec<String> = widths.iter().map(|(_, width)| "─".repeat(*width)).collect();
    output.push_str(&separator.join(" "));
    output.push('\n');

    for (idx, row) in rows.iter().enumerate() {
        let cells: Vec<String> = widths
            .iter()
            .map(|(column, width)| {
                let value = fit(&cell_value(row, idx + 1, *column), *width);
                format!("{:<width$}", value, width = *width)
            })
            .collect();
        let line = cells.join(" ");
        let line = line.trim_end();
        if tty_mode && row.status == "completed" {
            output.push_str(&format!("{}{}{}\n", ANSI_DIM, line, ANSI_RESET));
        } else {
            output.push_str(line);
            output.push('\n');
        }
    }

    output
}

pub fn format_lists(lists: &[TaskList]) -> String {
    if lists.is_empty() {
        return "No task lists found.\n".to_string();
    }
    let id_width = lists.iter().map(|l| l.id.chars().count()).max().unwrap_or(2).max(2);
    let mut output = format!("{:<id_width$} Title\n", "ID", id_width = id_width);
    for list in lists {
        output.push_str(&format!("{:<id_width$} {}\n", list.id, list.title, id_width = id_width));
    }
    output
}

/// Details panel as plain text
pub fn format_details(view: &DetailsView) -> String {
    let mut output = String::new();

    let header = format!("Task {}: {}", view.key, view.title);
    output.push_str(&header);
    output.push('\n');
    output.push_str(&"=".repeat(header.chars().count().max(60)));
    output.push_str("\n\n");

    output.push_str(&format!("  List:        {}\n", view.task_list_name));
    output.push_str(&format!("  Updated:     {}\n", view.updated));
    let label = format!("{}:", view.date_label);
    output.push_str(&format!(
        "  {:<12} {}\n",
        label,
        view.active_date.as_deref().unwrap_or("(none)")
    ));
    output.push_str(&format!("  Priority:    {}\n", view.priority));
    output.push_str(&format!(
        "  Link:        {}\n",
        view.web_view_link.as_deref().unwrap_or("(none)")
    ));

    output.push_str("\nNotes:\n");
    match view.notes.as_deref() {
        Some(notes) if !notes.trim().is_empty() => {
            for line in notes.lines() {
                output.push_str(&format!("  {}\n", line));
            }
        }
        _ => output.push_str("  (none)\n"),
    }

    match &view.aux {
        Some(AuxContent::Video { video_id, url }) => {
            output.push_str(&format!("\nVideo: {} ({})\n", url, video_id));
        }
        Some(AuxContent::WebPage { url }) => {
            output.push_str(&format!("\nPage: {}\n", url));
        }
        None => {}
    }

    let mut actions = Vec::new();
    if view.can_complete {
        actions.push("complete");
    }
    if view.can_delete {
        actions.push("delete");
    }
    if view.can_open_link {
        actions.push("open");
    }
    output.push_str(&format!("\nActions: {}\n", actions.join(", ")));

    output
}

pub fn format_feedback_log(events: &[FeedbackEvent], tz: &Tz) -> String {
    if events.is_empty() {
        return "No feedback recorded.\n".to_string();
    }
    let mut output = format!("{:<5} {:<19} {:<19} {}\n", "ID", "Start", "End", "Feeling");
    for event in events {
        output.push_str(&format!(
            "{:<5} {:<19} {:<19} {}\n",
            event.id.map(|id| id.to_string()).unwrap_or_default(),
            event.start.map(|s| format_local(s, tz)).unwrap_or_default(),
            format_local(event.end, tz),
            event.feeling.as_str()
        ));
    }
    output
}

//! Task export
//!
//! Exports consume the filter engine's ordered output read-only.

use crate::error::XbitoError;
use crate::models::Task;
use crate::utils::format_local;
use anyhow::Result;
use chrono_tz::Tz;
use rust_xlsxwriter::{Format, Workbook};
use std::io::Write;

/// Spreadsheet header, in column order
pub const EXPORT_HEADER: [&str; 9] = [
    "Number", "Task List", "ID", "Title", "Updated", "Due", "Status", "Notes", "Web Link",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Excel,
    Sheet,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "excel",
            ExportFormat::Sheet => "sheet",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            "excel" | "xlsx" => Some(ExportFormat::Excel),
            "sheet" | "sheets" | "gsheet" => Some(ExportFormat::Sheet),
            _ => None,
        }
    }
}

fn export_row(number: usize, task: &Task, tz: &Tz) -> [String; 9] {
    [
        number.to_string(),
        task.task_list_name.clone(),
        task.id.clone(),
        task.title.clone(),
        format_local(task.updated, tz),
        task.due_date().map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
        task.status.as_str().to_string(),
        task.notes.clone().unwrap_or_default(),
        task.web_view_link.clone().unwrap_or_default(),
    ]
}

fn write_csv<W: Write>(tasks: &[&Task], tz: &Tz, out: &mut W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(EXPORT_HEADER)?;
    for (index, task) in tasks.iter().enumerate() {
        writer.write_record(&export_row(index + 1, task, tz))?;
    }
    writer.flush()?;
    Ok(())
}

/// Single-sheet workbook with the header in the first row
fn write_excel<W: Write>(tasks: &[&Task], tz: &Tz, out: &mut W) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Tasks")?;

    let bold = Format::new().set_bold();
    for (col, title) in EXPORT_HEADER.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }
    for (index, task) in tasks.iter().enumerate() {
        let row = (index + 1) as u32;
        let values = export_row(index + 1, task, tz);
        worksheet.write_number(row, 0, (index + 1) as f64)?;
        for (col, value) in values.iter().enumerate().skip(1) {
            worksheet.write_string(row, col as u16, value)?;
        }
    }

    out.write_all(&workbook.save_to_buffer()?)?;
    Ok(())
}

/// Write `tasks` to `out` in the requested format
pub fn export_tasks<W: Write>(tasks: &[&Task], format: ExportFormat, tz: &Tz, mut out: W) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(tasks, tz, &mut out)?,
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut out, tasks)?;
            writeln!(out)?;
        }
        ExportFormat::Excel => write_excel(tasks, tz, &mut out)?,
        // Needs the spreadsheet API collaborator
        ExportFormat::Sheet => {
            return Err(XbitoError::UnsupportedExport(format.as_str()).into());
        }
    }
    out.flush()?;
    log::info!("Exported {} tasks as {}", tasks.len(), format.as_str());
    Ok(())
}

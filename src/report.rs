// src/report.rs

use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::attendance::DailyAttendance;
use crate::tracker_client::{Employee, LatenessRecord, MaterialLog, MaterialType, TimeRecordFilter};

/// Placeholder shown for punch slots with no event, matching what the admin
/// screens render for missing times.
pub const EMPTY_SLOT: &str = "-";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("CSV write error")]
    Csv(#[from] csv::Error),

    #[error("File I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
}

fn io_context<S: Into<String>>(source: std::io::Error, context: S) -> ReportError {
    ReportError::Io {
        source,
        context: context.into(),
    }
}

fn slot(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(EMPTY_SLOT)
}

// --- Table rendering ---

/// Renders a fixed-width text table. Column widths follow the widest cell,
/// header included.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if len > widths[i] {
                widths[i] = len;
            }
        }
    }

    let mut out = String::new();
    let format_row = |cells: &[String], widths: &[usize]| -> String {
        let columns: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        format!("{}\n", columns.join("  ").trim_end())
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    out.push_str(&format_row(&header_cells, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("{}\n", rule.join("  ")));
    for row in rows {
        out.push_str(&format_row(row, &widths));
    }
    out
}

pub fn attendance_table(rows: &[DailyAttendance]) -> String {
    if rows.is_empty() {
        return "No time records found for the selected filters.\n".to_string();
    }
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.employee_name.clone(),
                row.date.clone(),
                slot(&row.arrival).to_string(),
                slot(&row.lunch_start).to_string(),
                slot(&row.lunch_end).to_string(),
                slot(&row.departure).to_string(),
            ]
        })
        .collect();
    render_table(
        &["Employee", "Date", "Arrival", "Lunch start", "Lunch end", "Departure"],
        &cells,
    )
}

pub fn employee_table(employees: &[Employee]) -> String {
    if employees.is_empty() {
        return "No employees found.\n".to_string();
    }
    let cells: Vec<Vec<String>> = employees
        .iter()
        .map(|emp| {
            vec![
                emp.id.to_string(),
                emp.name.clone(),
                emp.email.clone(),
                emp.cpf.clone().unwrap_or_else(|| EMPTY_SLOT.to_string()),
                emp.role.clone(),
            ]
        })
        .collect();
    render_table(&["Id", "Name", "Email", "CPF", "Role"], &cells)
}

/// Key/value dump of a single employee record, for `employees show`.
pub fn employee_details(emp: &Employee) -> String {
    let opt = |value: &Option<String>| -> String {
        value.clone().unwrap_or_else(|| EMPTY_SLOT.to_string())
    };
    let mut out = String::new();
    out.push_str(&format!("Id:                  {}\n", emp.id));
    out.push_str(&format!("Name:                {}\n", emp.name));
    out.push_str(&format!("Email:               {}\n", emp.email));
    out.push_str(&format!("Role:                {}\n", emp.role));
    out.push_str(&format!("CPF:                 {}\n", opt(&emp.cpf)));
    out.push_str(&format!("RG:                  {}\n", opt(&emp.rg)));
    out.push_str(&format!("Phone:               {}\n", opt(&emp.phone_number)));
    out.push_str(&format!("Address:             {}\n", opt(&emp.address)));
    out.push_str(&format!("Birth date:          {}\n", opt(&emp.birth_date)));
    out.push_str(&format!("Admission date:      {}\n", opt(&emp.admission_date)));
    let salary = emp
        .base_salary
        .map(|value| format!("{:.2}", value))
        .unwrap_or_else(|| EMPTY_SLOT.to_string());
    out.push_str(&format!("Base salary:         {}\n", salary));
    out.push_str(&format!("Expected arrival:    {}\n", opt(&emp.expected_arrival_time)));
    out.push_str(&format!("Expected departure:  {}\n", opt(&emp.expected_departure_time)));
    out.push_str(&format!("Created at:          {}\n", opt(&emp.created_at)));
    out.push_str(&format!("Updated at:          {}\n", opt(&emp.updated_at)));
    out
}

pub fn lateness_table(records: &[LatenessRecord]) -> String {
    if records.is_empty() {
        return "No lateness found for the selected period.\n".to_string();
    }
    let cells: Vec<Vec<String>> = records
        .iter()
        .map(|rec| {
            vec![
                rec.employee_name.clone(),
                rec.date.clone(),
                rec.check_in_time.clone(),
                rec.expected_check_in.clone(),
                rec.lateness_duration.clone(),
            ]
        })
        .collect();
    render_table(
        &["Employee", "Date", "Check-in", "Expected", "Late by"],
        &cells,
    )
}

pub fn material_type_table(types: &[MaterialType]) -> String {
    if types.is_empty() {
        return "No material types found.\n".to_string();
    }
    let cells: Vec<Vec<String>> = types
        .iter()
        .map(|mat| {
            vec![
                mat.id.to_string(),
                mat.name.clone(),
                mat.category.clone().unwrap_or_else(|| EMPTY_SLOT.to_string()),
                mat.expected_duration_days
                    .map(|days| days.to_string())
                    .unwrap_or_else(|| EMPTY_SLOT.to_string()),
                mat.description.clone().unwrap_or_else(|| EMPTY_SLOT.to_string()),
            ]
        })
        .collect();
    render_table(
        &["Id", "Name", "Category", "Duration (days)", "Description"],
        &cells,
    )
}

pub fn material_log_table(logs: &[MaterialLog]) -> String {
    if logs.is_empty() {
        return "No material deliveries found for the selected filters.\n".to_string();
    }
    let cells: Vec<Vec<String>> = logs
        .iter()
        .map(|log| {
            vec![
                log.id.to_string(),
                log.employee_name.clone(),
                log.material_type_name.clone(),
                log.delivery_date.clone(),
                log.quantity.to_string(),
                log.expected_replacement_date
                    .clone()
                    .unwrap_or_else(|| EMPTY_SLOT.to_string()),
                log.notes.clone().unwrap_or_else(|| EMPTY_SLOT.to_string()),
            ]
        })
        .collect();
    render_table(
        &["Id", "Employee", "Material", "Delivered", "Qty", "Replace by", "Notes"],
        &cells,
    )
}

// --- CSV export ---

pub fn write_attendance_csv(path: &Path, rows: &[DailyAttendance]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "date",
        "employee_id",
        "employee_name",
        "arrival",
        "lunch_start",
        "lunch_end",
        "departure",
    ])?;
    for row in rows {
        let employee_id = row.employee_id.to_string();
        writer.write_record([
            row.date.as_str(),
            employee_id.as_str(),
            row.employee_name.as_str(),
            slot(&row.arrival),
            slot(&row.lunch_start),
            slot(&row.lunch_end),
            slot(&row.departure),
        ])?;
    }
    writer
        .flush()
        .map_err(|e| io_context(e, format!("Failed to flush CSV file: {:?}", path)))?;
    info!("Wrote {} attendance rows to {:?}", rows.len(), path);
    Ok(())
}

pub fn write_lateness_csv(path: &Path, records: &[LatenessRecord]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "date",
        "employee_id",
        "employee_name",
        "check_in_time",
        "expected_check_in",
        "lateness_duration",
    ])?;
    for rec in records {
        let employee_id = rec.employee_id.to_string();
        writer.write_record([
            rec.date.as_str(),
            employee_id.as_str(),
            rec.employee_name.as_str(),
            rec.check_in_time.as_str(),
            rec.expected_check_in.as_str(),
            rec.lateness_duration.as_str(),
        ])?;
    }
    writer
        .flush()
        .map_err(|e| io_context(e, format!("Failed to flush CSV file: {:?}", path)))?;
    info!("Wrote {} lateness rows to {:?}", records.len(), path);
    Ok(())
}

// --- PDF save ---

/// Filename the admin screen synthesizes when downloading the lateness PDF.
/// Unset filter dates render as empty segments, matching that screen.
pub fn default_lateness_pdf_filename(filter: &TimeRecordFilter) -> String {
    let fmt = |date: &Option<chrono::NaiveDate>| -> String {
        date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
    };
    format!(
        "relatorio_atrasos_{}_a_{}.pdf",
        fmt(&filter.start_date),
        fmt(&filter.end_date)
    )
}

pub fn save_pdf(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                io_context(e, format!("Failed to create directory for PDF: {:?}", parent))
            })?;
        }
    }
    fs::write(path, bytes)
        .map_err(|e| io_context(e, format!("Failed to write PDF file: {:?}", path)))?;
    info!("Saved lateness PDF to {:?} ({} bytes)", path, bytes.len());
    Ok(())
}

// src/report_tests.rs

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use std::fs;
    use std::path::PathBuf;

    use crate::attendance::DailyAttendance;
    use crate::report::{
        attendance_table, default_lateness_pdf_filename, lateness_table, save_pdf,
        write_attendance_csv, EMPTY_SLOT,
    };
    use crate::tracker_client::{LatenessRecord, TimeRecordFilter};

    // Per-test output paths, cleaned before and after
    fn test_path(test_name: &str, extension: &str) -> PathBuf {
        PathBuf::from(format!("./test_report_{}.{}", test_name, extension))
    }

    fn teardown(path: &PathBuf) {
        let _ = fs::remove_file(path);
    }

    fn sample_row() -> DailyAttendance {
        DailyAttendance {
            date: "2024-05-01".to_string(),
            employee_id: 1,
            employee_name: "Ana".to_string(),
            arrival: Some("08:00:00".to_string()),
            lunch_start: Some("12:00:00".to_string()),
            lunch_end: None,
            departure: None,
        }
    }

    #[test]
    fn test_attendance_table_uses_placeholder_for_empty_slots() {
        let table = attendance_table(&[sample_row()]);
        assert!(table.contains("Ana"), "Row should carry the employee name");
        assert!(table.contains("08:00:00"));
        assert!(
            table.contains(EMPTY_SLOT),
            "Missing slots render the placeholder at the presentation boundary"
        );
    }

    #[test]
    fn test_attendance_table_empty_message() {
        let table = attendance_table(&[]);
        assert_eq!(table, "No time records found for the selected filters.\n");
    }

    #[test]
    fn test_lateness_table_renders_rows() {
        let records = vec![LatenessRecord {
            employee_id: 2,
            employee_name: "Carla".to_string(),
            date: "2024-05-03".to_string(),
            check_in_time: "08:27:10".to_string(),
            expected_check_in: "08:00:00".to_string(),
            lateness_duration: "00:27:10".to_string(),
        }];
        let table = lateness_table(&records);
        assert!(table.contains("Carla"));
        assert!(table.contains("00:27:10"));
    }

    #[test]
    fn test_attendance_csv_round_trip() {
        let path = test_path("attendance_round_trip", "csv");
        teardown(&path);

        write_attendance_csv(&path, &[sample_row()]).expect("CSV write should succeed");

        let mut reader = csv::Reader::from_path(&path).expect("CSV should be readable");
        let headers = reader.headers().expect("CSV should have headers").clone();
        assert_eq!(&headers[0], "date");
        assert_eq!(&headers[3], "arrival");

        let rows: Vec<csv::StringRecord> = reader
            .records()
            .collect::<Result<_, _>>()
            .expect("CSV rows should parse");
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][2], "Ana");
        assert_eq!(&rows[0][3], "08:00:00");
        assert_eq!(&rows[0][5], EMPTY_SLOT, "Empty slot exports as placeholder");

        teardown(&path);
    }

    #[test]
    fn test_save_pdf_writes_bytes() {
        let path = test_path("save_pdf", "pdf");
        teardown(&path);

        let bytes = b"%PDF-1.4 fake";
        save_pdf(&path, bytes).expect("PDF save should succeed");
        let written = fs::read(&path).expect("PDF file should exist");
        assert_eq!(written, bytes);

        teardown(&path);
    }

    #[test]
    fn test_default_pdf_filename_with_dates() {
        let filter = TimeRecordFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 31),
            employee_id: None,
        };
        assert_eq!(
            default_lateness_pdf_filename(&filter),
            "relatorio_atrasos_2024-05-01_a_2024-05-31.pdf"
        );
    }

    #[test]
    fn test_default_pdf_filename_without_dates() {
        let filter = TimeRecordFilter::default();
        assert_eq!(
            default_lateness_pdf_filename(&filter),
            "relatorio_atrasos__a_.pdf",
            "Unset dates leave empty segments, matching the admin screen"
        );
    }
}

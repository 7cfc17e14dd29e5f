// src/tracker_tests.rs

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::tracker_client::{
        extract_error_message, Employee, EmployeeUpdate, LatenessRecord, MaterialLog,
        MaterialLogFilter, NewEmployee, PunchRequest, RecordType, TimeRecord, TimeRecordFilter,
        TrackerClient, TrackerConfig, TrackerError,
    };

    fn create_test_config() -> TrackerConfig {
        TrackerConfig {
            base_url: "http://localhost:5004".to_string(),
            token: "test_token".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_client_creation_with_valid_config() {
        let client = TrackerClient::new(create_test_config());
        assert!(client.is_ok(), "Valid config should build a client");
        assert_eq!(client.unwrap().base_url(), "http://localhost:5004");
    }

    #[test]
    fn test_client_requires_token() {
        let config = TrackerConfig {
            token: "   ".to_string(),
            ..create_test_config()
        };
        let result = TrackerClient::new(config);
        assert!(
            matches!(result, Err(TrackerError::MissingToken)),
            "A blank token must be rejected before any request is made"
        );
    }

    #[test]
    fn test_client_rejects_invalid_base_url() {
        let config = TrackerConfig {
            base_url: "not a url".to_string(),
            ..create_test_config()
        };
        let result = TrackerClient::new(config);
        assert!(
            matches!(result, Err(TrackerError::UrlParse(_))),
            "A malformed base URL must fail at construction"
        );
    }

    #[test]
    fn test_time_record_filter_full_query() {
        let filter = TimeRecordFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 31),
            employee_id: Some(7),
        };
        let query = filter.to_query();
        assert_eq!(
            query,
            vec![
                ("start_date".to_string(), "2024-05-01".to_string()),
                ("end_date".to_string(), "2024-05-31".to_string()),
                ("employee_id".to_string(), "7".to_string()),
            ]
        );
    }

    #[test]
    fn test_time_record_filter_empty_query() {
        let filter = TimeRecordFilter::default();
        assert!(filter.to_query().is_empty(), "No filters, no query pairs");
    }

    #[test]
    fn test_material_log_filter_query() {
        let filter = MaterialLogFilter {
            employee_id: Some(3),
            material_type_id: None,
            start_date: NaiveDate::from_ymd_opt(2024, 4, 1),
            end_date: None,
        };
        let query = filter.to_query();
        assert_eq!(
            query,
            vec![
                ("employee_id".to_string(), "3".to_string()),
                ("start_date".to_string(), "2024-04-01".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_error_message_error_shape() {
        let body = r#"{"error": "Funcionário não encontrado"}"#;
        assert_eq!(extract_error_message(body), "Funcionário não encontrado");
    }

    #[test]
    fn test_extract_error_message_message_shape() {
        let body = r#"{"message": "Check-in já realizado hoje."}"#;
        assert_eq!(extract_error_message(body), "Check-in já realizado hoje.");
    }

    #[test]
    fn test_extract_error_message_falls_back_to_raw_body() {
        let body = "<html>502 Bad Gateway</html>";
        assert_eq!(extract_error_message(body), body);
    }

    #[test]
    fn test_time_record_list_deserialization() {
        let body = r#"[
            {
                "id": 10,
                "employee_id": 1,
                "employee_name": "Ana",
                "timestamp": "2024-05-01T08:00:00",
                "record_type": "arrival",
                "latitude": -23.55,
                "longitude": -46.63,
                "photo_url": null
            },
            {
                "id": 11,
                "employee_id": 1,
                "employee_name": "Ana",
                "timestamp": "2024-05-01T12:00:00",
                "record_type": "lunch_start"
            }
        ]"#;

        let records: Vec<TimeRecord> = serde_json::from_str(body).expect("Fixture should parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_type, RecordType::Arrival);
        assert_eq!(records[0].latitude, Some(-23.55));
        assert_eq!(records[1].record_type, RecordType::LunchStart);
        assert_eq!(records[1].photo_url, None);
    }

    #[test]
    fn test_employee_deserialization_tolerates_nulls_and_extras() {
        // The backend sends more fields than we model; unknown keys are ignored
        let body = r#"{
            "id": 4,
            "name": "Bruno Souza",
            "email": "bruno@example.com",
            "role": "employee",
            "cpf": null,
            "expected_arrival_time": "08:00",
            "marital_status": "single",
            "vacation_balance_days": 12
        }"#;

        let employee: Employee = serde_json::from_str(body).expect("Fixture should parse");
        assert_eq!(employee.id, 4);
        assert_eq!(employee.cpf, None);
        assert_eq!(employee.expected_arrival_time.as_deref(), Some("08:00"));
        assert_eq!(employee.admission_date, None);
    }

    #[test]
    fn test_lateness_record_deserialization() {
        let body = r#"[{
            "employee_id": 2,
            "employee_name": "Carla",
            "date": "2024-05-03",
            "check_in_time": "08:27:10",
            "expected_check_in": "08:00:00",
            "lateness_duration": "00:27:10"
        }]"#;

        let records: Vec<LatenessRecord> = serde_json::from_str(body).expect("Fixture should parse");
        assert_eq!(records[0].lateness_duration, "00:27:10");
    }

    #[test]
    fn test_material_log_deserialization() {
        let body = r#"[{
            "id": 8,
            "material_type_id": 2,
            "material_type_name": "Safety gloves",
            "employee_id": 5,
            "employee_name": "Diego",
            "delivery_date": "2024-04-20T00:00:00",
            "quantity": 2,
            "photo_url": null,
            "notes": null,
            "expected_replacement_date": "2024-05-20T00:00:00"
        }]"#;

        let logs: Vec<MaterialLog> = serde_json::from_str(body).expect("Fixture should parse");
        assert_eq!(logs[0].quantity, 2);
        assert_eq!(
            logs[0].expected_replacement_date.as_deref(),
            Some("2024-05-20T00:00:00")
        );
    }

    #[test]
    fn test_new_employee_serialization_skips_absent_fields() {
        let employee = NewEmployee {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "secret".to_string(),
            role: "employee".to_string(),
            cpf: None,
            rg: None,
            phone_number: None,
            address: None,
            admission_date: Some("2024-01-15".to_string()),
            base_salary: None,
            expected_arrival_time: Some("08:00".to_string()),
            expected_departure_time: None,
        };

        let value = serde_json::to_value(&employee).expect("Serialization should succeed");
        let object = value.as_object().expect("Body should be a JSON object");
        assert_eq!(object["name"], "Ana");
        assert_eq!(object["admission_date"], "2024-01-15");
        assert!(
            !object.contains_key("cpf"),
            "Absent optional fields must not be sent"
        );
        assert!(!object.contains_key("base_salary"));
    }

    #[test]
    fn test_employee_update_serializes_to_empty_object_by_default() {
        let value = serde_json::to_value(EmployeeUpdate::default())
            .expect("Serialization should succeed");
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn test_punch_request_serialization() {
        let punch = PunchRequest {
            employee_id: 9,
            record_type: RecordType::LunchEnd,
            latitude: Some(-23.5),
            longitude: Some(-46.6),
            photo_data: None,
        };

        let value = serde_json::to_value(&punch).expect("Serialization should succeed");
        assert_eq!(value["employee_id"], 9);
        assert_eq!(value["record_type"], "lunch_end");
        assert!(
            !value.as_object().unwrap().contains_key("photo_data"),
            "Missing photo must be omitted, not sent as null"
        );
    }

    #[test]
    fn test_record_type_wire_names() {
        assert_eq!(RecordType::Arrival.as_str(), "arrival");
        assert_eq!(RecordType::LunchStart.as_str(), "lunch_start");
        assert_eq!(RecordType::LunchEnd.as_str(), "lunch_end");
        assert_eq!(RecordType::Departure.as_str(), "departure");
        assert_eq!(RecordType::Departure.to_string(), "departure");
    }
}

//! CSV ingestion end to end: loader, column heuristics and timestamp formats.

use hexdemand::core::{DemandEvent, SupplyRecord};
use hexdemand::parsing::{load_rows_from_path, read_demand_csv, read_supply_csv, RowParser};
use hexdemand::Error;
use std::fs;

const JAN_1_2024_10AM: u64 = 1_704_103_200_000;
const JAN_1_2024_NOON: u64 = 1_704_110_400_000;

#[test]
fn test_demand_csv_with_mixed_timestamp_formats() {
    let parser = RowParser::new().unwrap();
    let csv = "timestamp,latitude,longitude\n\
               2024-01-01T10:00:00Z,40.7128,-74.0060\n\
               2024-01-01 10:00,40.7130,-74.0050\n\
               1/1/24 10:00,40.7140,-74.0040\n\
               45292.5,40.7150,-74.0030\n";

    let events = read_demand_csv(&parser, csv.as_bytes()).unwrap();

    assert_eq!(
        events,
        vec![
            DemandEvent::new(JAN_1_2024_10AM, 40.7128, -74.006),
            DemandEvent::new(JAN_1_2024_10AM, 40.713, -74.005),
            DemandEvent::new(JAN_1_2024_10AM, 40.714, -74.004),
            DemandEvent::new(JAN_1_2024_NOON, 40.715, -74.003),
        ]
    );
}

#[test]
fn test_demand_csv_with_descriptive_headers() {
    let parser = RowParser::new().unwrap();
    let csv = "trip_id,pickup_datetime,pickup_lon,pickup_lat\n\
               17,2024-01-01T10:00:00Z,-73.98,40.75\n";

    let events = read_demand_csv(&parser, csv.as_bytes()).unwrap();

    assert_eq!(events, vec![DemandEvent::new(JAN_1_2024_10AM, 40.75, -73.98)]);
}

#[test]
fn test_malformed_rows_are_dropped_silently() {
    let parser = RowParser::new().unwrap();
    let csv = "timestamp,latitude,longitude\n\
               not a time,40.7,-74.0\n\
               2024-01-01T10:00:00Z,,-74.0\n\
               2024-01-01T10:00:00Z,north,-74.0\n\
               2024-01-01T10:00:00Z,40.7,-74.0\n";

    let events = read_demand_csv(&parser, csv.as_bytes()).unwrap();

    assert_eq!(events.len(), 1);
}

#[test]
fn test_no_valid_rows_is_an_ingest_error() {
    let parser = RowParser::new().unwrap();
    let csv = "timestamp,latitude,longitude\nnot a time,40.7,-74.0\n";

    let err = read_demand_csv(&parser, csv.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Ingest(_)));
    assert_eq!(err.to_string(), "Ingest error: No valid demand events found");

    let err = read_supply_csv(&parser, "start_time,end_time,lat,lng\n".as_bytes()).unwrap_err();
    assert_eq!(err.to_string(), "Ingest error: No valid supply vehicles found");
}

#[test]
fn test_supply_csv() {
    let parser = RowParser::new().unwrap();
    let csv = "vehicle,start_time,end_time,latitude,longitude\n\
               a,2024-01-01T10:00:00Z,2024-01-01T12:00:00Z,40.71,-74.01\n\
               b,2024-01-01T10:00:00Z,0,40.71,-74.01\n\
               c,2024-01-01T10:00:00Z,,40.71,-74.01\n";

    let records = read_supply_csv(&parser, csv.as_bytes()).unwrap();

    assert_eq!(records, vec![SupplyRecord::new(JAN_1_2024_10AM, JAN_1_2024_NOON, 40.71, -74.01)]);
}

#[test]
fn test_supply_positional_columns() {
    let parser = RowParser::new().unwrap();
    let csv = "from,to,y,x\n45292.41666666667,45292.5,40.71,-74.01\n";

    let records = read_supply_csv(&parser, csv.as_bytes()).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].end_time, JAN_1_2024_NOON);
    assert!(records[0].start_time.abs_diff(JAN_1_2024_10AM) <= 1);
    assert_eq!((records[0].latitude, records[0].longitude), (40.71, -74.01));
}

#[test]
fn test_load_rows_from_file() {
    let path = std::env::temp_dir().join(format!("hexdemand_ingest_{}.csv", std::process::id()));
    fs::write(&path, "timestamp,latitude,longitude\n2024-01-01T10:00:00Z,40.7,-74.0\n").unwrap();

    let rows = load_rows_from_path(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), 3);
}

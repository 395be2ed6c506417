//! CSV export parsing for spreadsheet tabs.

use locsync_core::{LogicalTable, RecordId, SourceError};
use locsync_stores::sheet::parse_table;
use rstest::rstest;

const TABLE: LogicalTable = LogicalTable::GameText;

#[test]
fn header_is_skipped_and_rows_become_records() {
    let body = "Record ID,Character,Russian,English,Limit,Version,Comment\n\
                R1,Bob,Привет,Hi,10,1,\n\
                R2,Ann,Пока,Bye,12,1,sad\n";

    let records = parse_table(TABLE, body).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].record_id, RecordId::from("R1"));
    assert_eq!(records[0].russian, "Привет");
    assert_eq!(records[1].narrative_comment, "sad");
}

#[test]
fn blank_rows_are_skipped_anywhere() {
    let body = ",,,,,,\n\
                Record ID,Character,Russian,English,Limit,Version,Comment\n\
                ,,,,,,\n\
                R1,Bob,Привет,Hi,10,1,\n\
                \n\
                ,,,,,,\n\
                R2,Ann,Пока,Bye,12,1,\n";

    let ids: Vec<_> = parse_table(TABLE, body)
        .unwrap()
        .into_iter()
        .map(|r| r.record_id)
        .collect();

    assert_eq!(ids, vec![RecordId::from("R1"), RecordId::from("R2")]);
}

#[test]
fn quoted_cells_keep_commas_and_newlines() {
    let body = "id,c,ru,en,l,v,n\nR1,Bob,\"Привет, мир\",\"Hello,\nworld\",10,1,\n";

    let records = parse_table(TABLE, body).unwrap();

    assert_eq!(records[0].russian, "Привет, мир");
    assert_eq!(records[0].english, "Hello,\nworld");
}

#[rstest]
#[case::short_row("id,c\nR1,Bob\n", "")]
#[case::long_row("id\nR1,a,b,c,d,e,f,extra\n", "f")]
fn ragged_rows_are_normalized(#[case] body: &str, #[case] comment: &str) {
    let records = parse_table(TABLE, body).unwrap();
    assert_eq!(records[0].narrative_comment, comment);
}

#[test]
fn missing_record_id_fails_the_whole_table() {
    let body = "id,c,ru,en,l,v,n\nR1,Bob,a,b,1,1,\n,Ann,a,b,1,1,\n";

    let err = parse_table(TABLE, body).unwrap_err();

    assert!(
        matches!(err, SourceError::MissingRecordId { row: 3, .. }),
        "got: {err}"
    );
    assert!(err.to_string().contains("record id"));
}

#[test]
fn header_only_yields_no_records() {
    assert!(parse_table(TABLE, "id,c,ru,en,l,v,n\n").unwrap().is_empty());
    assert!(parse_table(TABLE, "").unwrap().is_empty());
}

use mpesa_core::{Amount, Cell};
use mpesa_ingest::parsers::parse_tabula_json;
use mpesa_ingest::{BuildError, HeaderMatch, LedgerBuilder, build_ledger};

/// Six tables the way tabula reads a one-month statement: cover, summary,
/// detail page 1, disclaimer, detail page 2, disclaimer.
const STATEMENT: &str = r#"[
  {"data":[[{"text":"Customer Name"},{"text":"JANE WANJIKU"}],[{"text":"Mobile Number"},{"text":"0712345678"}]]},
  {"data":[[{"text":"TRANSACTION TYPE"},{"text":"PAID IN"},{"text":"PAID OUT"}],[{"text":"SEND MONEY"},{"text":"0.00"},{"text":"1,000.00"}]]},
  {"data":[
    [{"text":""},{"text":"Receipt No."},{"text":"Completion\rTime"},{"text":"Details"},{"text":"Transaction\rStatus"},{"text":"Paid In"},{"text":"Withdrawn"},{"text":"Balance"}],
    [{"text":"0"},{"text":"SAB1"},{"text":"2024-01-05 10:00:00"},{"text":"Pay Bill"},{"text":"Completed"},{"text":""},{"text":"1,000.00"},{"text":"4,000.00"}],
    [{"text":"1"},{"text":"SAB2"},{"text":"garbled"},{"text":"Airtime"},{"text":"Completed"},{"text":""},{"text":"N/A"},{"text":"3,900.00"}]
  ]},
  {"data":[[{"text":"Disclaimer: this statement is computer generated"}]]},
  {"data":[
    [{"text":""},{"text":"Receipt No."},{"text":"Completion Time"},{"text":"Details"},{"text":"Transaction Status"},{"text":"Paid In"},{"text":"Withdrawn"},{"text":"Balance"}],
    [{"text":""},{"text":"Receipt No."},{"text":"Completion Time"},{"text":"Details"},{"text":"Transaction Status"},{"text":"Paid In"},{"text":"Withdrawn"},{"text":"Balance"}],
    [{"text":"0"},{"text":"SAB3"},{"text":"2024-01-10 09:30:00"},{"text":"Salary"},{"text":"Completed"},{"text":"5,000.00"},{"text":""},{"text":"8,900.00"}]
  ]},
  {"data":[[{"text":"Disclaimer: this statement is computer generated"}]]}
]"#;

#[test]
fn test_statement_builds_in_extraction_order() {
    let tables = parse_tabula_json(STATEMENT).unwrap();
    let ledger = build_ledger(&tables).unwrap();

    assert_eq!(ledger.len(), 3);
    let details: Vec<_> = ledger.iter().map(|r| r.details.as_str()).collect();
    assert_eq!(details, vec!["Pay Bill", "Airtime", "Salary"]);

    assert_eq!(ledger.records()[0].source_table, 2);
    assert_eq!(ledger.records()[2].source_table, 4);
    assert_eq!(
        ledger.records()[0].extra_value("Transaction Status"),
        Some(&Cell::text("Completed"))
    );

    // Cell-level anomalies stay in the ledger
    let airtime = &ledger.records()[1];
    assert!(!airtime.completion_time.is_parsed());
    assert_eq!(airtime.withdrawn, Amount::Unparsed("N/A".to_string()));

    assert_eq!(ledger.total_withdrawn(), 1000.0);
    assert_eq!(ledger.total_paid_in(), 5000.0);
    assert!(ledger.validate().is_empty());

    let anomalies = ledger.anomalies();
    assert_eq!(anomalies.unparsed_times, 1);
    assert_eq!(anomalies.unparsed_amounts, 1);
}

#[test]
fn test_header_match_agrees_with_positional_layout() {
    let tables = parse_tabula_json(STATEMENT).unwrap();
    let positional = build_ledger(&tables).unwrap();
    let by_content = LedgerBuilder::new()
        .with_policy(HeaderMatch::new(["Completion Time", "Details"]))
        .build(&tables)
        .unwrap();
    assert_eq!(positional, by_content);
}

#[test]
fn test_cover_pages_only() {
    let tables = parse_tabula_json(STATEMENT).unwrap();
    let err = build_ledger(&tables[..2]).unwrap_err();
    assert_eq!(err, BuildError::InsufficientTables { found: 2, required: 3 });
}

#[test]
fn test_layout_shift_fails_loudly() {
    // One extra leading table moves filler into the detail slots
    let mut tables = parse_tabula_json(STATEMENT).unwrap();
    let extra = tables[0].clone();
    tables.insert(0, extra);
    let err = build_ledger(&tables).unwrap_err();
    assert!(matches!(err, BuildError::MissingColumn { .. }));
}

//! Table rendering: number formatting, blank cells, and file output.

use minwage_core::{
    error::SurveyError,
    report::{
        blank_if_recoverable, format_number, format_pair, format_percent, proportion_cell,
        stat_cell, write_json, write_report, yes_no, Table,
    },
    stats::{proportion_of, StatResult},
};

fn sample_table() -> Table {
    let mut table = Table::new(
        "Table 0: Example",
        vec!["Variable".into(), "PA".into(), "NJ".into()],
    );
    table.push_row("1. FTE before", vec!["23.33 (1.35)".into(), "20.44 (0.51)".into()]);
    table.push_row("2. FTE after", vec!["21.17 (0.94)".into()]);
    table.footnote("Standard errors in parentheses.");
    table
}

/// Fixed decimals, blank for missing, and no negative zero.
#[test]
fn number_formatting() {
    assert_eq!(format_number(Some(2.346), 2), "2.35");
    assert_eq!(format_number(Some(-0.7), 2), "-0.70");
    assert_eq!(format_number(Some(-0.001), 2), "0.00");
    assert_eq!(format_number(None, 2), "");
    assert_eq!(format_number(Some(f64::NAN), 2), "", "NaN never reaches a table");
    assert_eq!(format_number(Some(0.0344), 3), "0.034");
}

#[test]
fn pair_and_percent_formatting() {
    assert_eq!(format_pair(Some(2.76), Some(1.36), 2), "2.76 (1.36)");
    assert_eq!(format_pair(Some(2.76), None, 2), "");
    assert_eq!(format_percent(Some(32.5), 1), "32.5%");
    assert_eq!(format_percent(None, 1), "");
}

#[test]
fn cell_helpers() {
    let stat = StatResult { estimate: 17.0, std_error: 0.5, n: 10 };
    assert_eq!(stat_cell(Some(&stat), 2), "17.00 (0.50)");
    assert_eq!(stat_cell(None, 2), "");
    assert_eq!(proportion_cell(&proportion_of(1, 4), 1), "25.0 (21.7)");
    assert_eq!(proportion_cell(&proportion_of(0, 0), 1), "0.0");
    assert_eq!(yes_no(true), "yes");
    assert_eq!(yes_no(false), "no");
}

/// Insufficient data becomes a blank; configuration errors still abort.
#[test]
fn recoverable_errors_become_blank() {
    let insufficient: Result<f64, _> = Err(SurveyError::insufficient("mean", 2, 1));
    assert_eq!(blank_if_recoverable(insufficient).unwrap(), None);

    let rank: Result<f64, _> = Err(SurveyError::RankDeficiency { dropped: vec!["nj".into()] });
    assert_eq!(blank_if_recoverable(rank).unwrap(), None);

    let fatal: Result<f64, _> = Err(SurveyError::Configuration("bad".into()));
    assert!(blank_if_recoverable(fatal).is_err());

    assert_eq!(blank_if_recoverable(Ok(1.5)).unwrap(), Some(1.5));
}

/// Short rows are padded so every row has one cell per data column.
#[test]
fn short_rows_are_padded() {
    let table = sample_table();
    assert_eq!(table.rows[1].cells, vec!["21.17 (0.94)".to_string(), String::new()]);
}

/// Title, header, rule, body, then footnotes; columns line up.
#[test]
fn render_layout() {
    let text = sample_table().render();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "Table 0: Example");
    assert_eq!(lines[1], "");
    assert!(lines[2].starts_with("| Variable"));
    assert!(lines[3].starts_with("|---"));
    assert!(lines[4].contains("23.33 (1.35)"));
    assert!(lines[5].contains("21.17 (0.94)"));
    assert_eq!(lines.last().copied(), Some("Standard errors in parentheses."));

    let widths: Vec<usize> = lines[2..=5].iter().map(|l| l.chars().count()).collect();
    assert!(widths.iter().all(|&w| w == widths[0]), "ragged rows: {widths:?}");
}

/// Rendering is a pure function of the table.
#[test]
fn render_is_stable() {
    let table = sample_table();
    assert_eq!(table.render(), table.clone().render());
}

/// Reports land on disk with the rendered text; JSON parses back.
#[test]
fn write_report_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let table = sample_table();

    let txt = dir.path().join("table_0.txt");
    write_report(&txt, &table).unwrap();
    assert_eq!(std::fs::read_to_string(&txt).unwrap(), table.render());

    let json = dir.path().join("table_0.json");
    write_json(&json, &table).unwrap();
    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(value["title"], "Table 0: Example");
    assert_eq!(value["rows"].as_array().unwrap().len(), 2);
}

/// Writing into a missing directory is an I/O error naming the path.
#[test]
fn write_report_to_missing_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("table.txt");
    let err = write_report(&path, &sample_table()).unwrap_err();
    assert!(matches!(err, SurveyError::Io(_)));
    assert!(err.to_string().contains("no_such_dir"));
}

//! Flat-file reader: both input modes, missing-value sentinels, and the
//! skip/abort policy for malformed lines.

use minwage_core::{
    codebook::{Codebook, FieldKind, FieldSpec},
    dataset::Dataset,
    derived::DerivationConfig,
    error::SurveyError,
    reader::{parse_line, read_dataset, read_dataset_file, BadRecordPolicy, InputMode},
    record::{Chain, Closure, Region, SecondWaveStatus, State},
    variable::Variable,
};
use chrono::NaiveDate;
use std::io::Cursor;

/// Store 46 from the public file: a Pennsylvania Burger King.
const STORE_46: [(&str, &str); 46] = [
    ("SHEET", "46"),
    ("CHAINr", "1"),
    ("CO_OWNED", "0"),
    ("STATEr", "0"),
    ("SOUTHJ", "0"),
    ("CENTRALJ", "0"),
    ("NORTHJ", "0"),
    ("PA1", "1"),
    ("PA2", "0"),
    ("SHORE", "0"),
    ("NCALLS", "0"),
    ("EMPFT", "30.00"),
    ("EMPPT", "15.00"),
    ("NMGRS", "3.00"),
    ("WAGE_ST", "."),
    ("INCTIME", "19.00"),
    ("FIRSTINC", "."),
    ("BONUS", "1"),
    ("PCTAFF", "."),
    ("MEAL", "2"),
    ("OPEN", "6.50"),
    ("HRSOPEN", "16.50"),
    ("PSODA", "1.03"),
    ("PFRY", "1.03"),
    ("PENTREE", "0.52"),
    ("NREGS", "3"),
    ("NREGS11", "3"),
    ("TYPE2", "1"),
    ("STATUS2", "1"),
    ("DATE2", "111792"),
    ("NCALLS2", "1"),
    ("EMPFT2", "3.50"),
    ("EMPPT2", "35.00"),
    ("NMGRS2", "3.00"),
    ("WAGE_ST2", "4.30"),
    ("INCTIME2", "26.00"),
    ("FIRSTIN2", "0.08"),
    ("SPECIAL2", "1"),
    ("MEALS2", "2"),
    ("OPEN2R", "6.50"),
    ("HRSOPEN2", "16.50"),
    ("PSODA2", "1.03"),
    ("PFRY2", "."),
    ("PENTREE2", "0.94"),
    ("NREGS2", "4"),
    ("NREGS112", "4"),
];

fn value_of(name: &str, overrides: &[(&str, &'static str)]) -> &'static str {
    overrides
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
        .or_else(|| STORE_46.iter().find(|(n, _)| *n == name).map(|(_, v)| *v))
        .unwrap()
}

fn whitespace_line(overrides: &[(&str, &'static str)]) -> String {
    STORE_46
        .iter()
        .map(|(name, _)| value_of(name, overrides))
        .collect::<Vec<_>>()
        .join(" ")
}

fn fixed_line(codebook: &Codebook, overrides: &[(&str, &'static str)]) -> String {
    let width = codebook.fields.last().unwrap().end;
    let mut line = vec![b' '; width];
    for field in &codebook.fields {
        let value = value_of(&field.name, overrides);
        assert!(value.len() <= field.width(), "{} too wide for {}", value, field.name);
        let start = field.end - value.len();
        line[start..field.end].copy_from_slice(value.as_bytes());
    }
    String::from_utf8(line).unwrap()
}

/// A whitespace-tokenised line decodes into the typed record.
#[test]
fn whitespace_line_parses_into_record() {
    let codebook = Codebook::standard();
    let record = parse_line(&whitespace_line(&[]), 1, &codebook, InputMode::Whitespace).unwrap();

    assert_eq!(record.sheet, 46);
    assert_eq!(record.chain, Chain::BurgerKing);
    assert_eq!(record.state, State::Pennsylvania);
    assert_eq!(record.region, Some(Region::Pennsylvania1));
    assert_eq!(record.first.full_time, Some(30.0));
    assert_eq!(record.first.part_time, Some(15.0));
    assert_eq!(record.second.starting_wage, Some(4.30));
    assert_eq!(record.second_status, SecondWaveStatus::Interviewed);
    assert_eq!(record.second_interview, NaiveDate::from_ymd_opt(1992, 11, 17));
    assert_eq!(record.bonus, Some(true));
}

/// The fixed-column representation of the same store yields the same record.
#[test]
fn fixed_width_matches_whitespace() {
    let codebook = Codebook::standard();
    let tokens = parse_line(&whitespace_line(&[]), 1, &codebook, InputMode::Whitespace).unwrap();
    let fixed = parse_line(&fixed_line(&codebook, &[]), 1, &codebook, InputMode::FixedWidth).unwrap();
    assert_eq!(tokens, fixed, "both input modes must decode identically");
}

/// The missing-value sentinel becomes an explicit missing marker, not zero.
#[test]
fn sentinel_is_missing_not_zero() {
    let codebook = Codebook::standard();
    let record = parse_line(&whitespace_line(&[]), 1, &codebook, InputMode::Whitespace).unwrap();
    assert_eq!(record.first.starting_wage, None, "'.' must decode as missing");
    assert_eq!(record.second.fries, None);
    assert_eq!(record.pct_affected, None);
}

/// Unrecorded region and shore codes stay missing all the way to the
/// dummies, instead of reading as the omitted region.
#[test]
fn unrecorded_location_stays_missing() {
    let codebook = Codebook::standard();
    let line = whitespace_line(&[
        ("STATEr", "1"),
        ("SOUTHJ", "."),
        ("CENTRALJ", "."),
        ("NORTHJ", "."),
        ("PA1", "."),
        ("PA2", "."),
        ("SHORE", "."),
    ]);
    let record = parse_line(&line, 1, &codebook, InputMode::Whitespace).unwrap();
    assert_eq!(record.region, None);
    assert_eq!(record.shore, None);

    let dataset = Dataset::new(vec![record], DerivationConfig::default()).unwrap();
    for variable in [
        Variable::SouthJersey,
        Variable::CentralJersey,
        Variable::NorthJersey,
        Variable::Pennsylvania1,
        Variable::Pennsylvania2,
        Variable::Shore,
    ] {
        assert_eq!(dataset.value(0, variable), None, "{variable}");
    }
    assert_eq!(dataset.value(0, Variable::NewJersey), Some(1.0));
}

/// Blank columns in fixed-width mode are missing as well.
#[test]
fn blank_fixed_columns_are_missing() {
    let codebook = Codebook::standard();
    let mut line = fixed_line(&codebook, &[]);
    // Blank out EMPFT2 (columns 121..126).
    line.replace_range(121..126, "     ");
    let record = parse_line(&line, 3, &codebook, InputMode::FixedWidth).unwrap();
    assert_eq!(record.second.full_time, None);
}

/// A field can carry its own sentinel.
#[test]
fn per_field_sentinel_overrides_default() {
    let mut codebook = Codebook::standard();
    let idx = codebook.position("PCTAFF").unwrap();
    codebook.fields[idx].missing = Some("-9".into());

    let record = parse_line(
        &whitespace_line(&[("PCTAFF", "-9")]),
        1,
        &codebook,
        InputMode::Whitespace,
    )
    .unwrap();
    assert_eq!(record.pct_affected, None);
}

/// A short line names the first field it could not fill, and the line number.
#[test]
fn short_line_reports_field_and_line() {
    let codebook = Codebook::standard();
    let line = whitespace_line(&[]);
    let truncated: Vec<&str> = line.split_whitespace().take(10).collect();

    let err = parse_line(&truncated.join(" "), 17, &codebook, InputMode::Whitespace).unwrap_err();
    match err {
        SurveyError::Parse { line, field, .. } => {
            assert_eq!(line, 17);
            assert_eq!(field, "NCALLS");
        }
        other => panic!("expected a parse error, got {other}"),
    }
}

/// Out-of-domain codes are rejected at load time.
#[test]
fn unknown_chain_code_is_parse_error() {
    let codebook = Codebook::standard();
    let err = parse_line(&whitespace_line(&[("CHAINr", "9")]), 5, &codebook, InputMode::Whitespace)
        .unwrap_err();
    assert!(
        matches!(&err, SurveyError::Parse { field, line: 5, .. } if field == "CHAINr"),
        "got {err}"
    );
}

/// Text in a numeric column is a parse error, not a silent zero.
#[test]
fn non_numeric_value_is_parse_error() {
    let codebook = Codebook::standard();
    let err = parse_line(&whitespace_line(&[("EMPFT", "abc")]), 2, &codebook, InputMode::Whitespace)
        .unwrap_err();
    assert!(matches!(&err, SurveyError::Parse { field, .. } if field == "EMPFT"), "got {err}");
}

/// A store flagged in two regions is inconsistent.
#[test]
fn two_regions_is_parse_error() {
    let codebook = Codebook::standard();
    let err = parse_line(&whitespace_line(&[("PA2", "1")]), 4, &codebook, InputMode::Whitespace)
        .unwrap_err();
    assert!(matches!(&err, SurveyError::Parse { field, .. } if field == "PA2"), "got {err}");
}

/// Closure codes 2, 4, and 5 are temporary; 3 is permanent.
#[test]
fn closure_codes_decode() {
    let codebook = Codebook::standard();
    let parse = |code: &'static str| {
        parse_line(&whitespace_line(&[("STATUS2", code)]), 1, &codebook, InputMode::Whitespace)
            .unwrap()
            .second_status
    };
    assert_eq!(parse("2"), SecondWaveStatus::TemporarilyClosed(Closure::Renovation));
    assert_eq!(parse("3"), SecondWaveStatus::PermanentlyClosed);
    assert_eq!(parse("4"), SecondWaveStatus::TemporarilyClosed(Closure::HighwayConstruction));
    assert_eq!(parse("5"), SecondWaveStatus::TemporarilyClosed(Closure::MallFire));
    assert!(parse("5").is_temporarily_closed());
}

/// Under the skip policy a bad line is reported and the rest still load.
#[test]
fn skip_policy_keeps_good_lines() {
    let codebook = Codebook::standard();
    let input = format!(
        "{}\n\n{}\n{}\n",
        whitespace_line(&[]),
        whitespace_line(&[("STATEr", "7")]),
        whitespace_line(&[("SHEET", "47")]),
    );

    let report = read_dataset(Cursor::new(input), &codebook, InputMode::Whitespace, BadRecordPolicy::Skip)
        .unwrap();
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.rejected.len(), 1);
    assert!(
        matches!(&report.rejected[0], SurveyError::Parse { line: 3, .. }),
        "blank lines still count toward line numbers"
    );
}

/// Under the abort policy the first bad line fails the load.
#[test]
fn abort_policy_fails_load() {
    let codebook = Codebook::standard();
    let input = format!("{}\n{}\n", whitespace_line(&[]), whitespace_line(&[("STATEr", "7")]));
    let result = read_dataset(Cursor::new(input), &codebook, InputMode::Whitespace, BadRecordPolicy::Abort);
    assert!(matches!(result, Err(SurveyError::Parse { line: 2, .. })));
}

/// A missing data file surfaces as an I/O error naming the path.
#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.dat");
    let err = read_dataset_file(&path, &Codebook::standard(), InputMode::Whitespace, BadRecordPolicy::Skip)
        .unwrap_err();
    assert!(matches!(err, SurveyError::Io(_)));
    assert!(err.to_string().contains("absent.dat"));
}

/// Reading from disk gives the same result as reading from memory.
#[test]
fn file_round_trip() {
    let codebook = Codebook::standard();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("public.dat");
    std::fs::write(&path, format!("{}\n", fixed_line(&codebook, &[]))).unwrap();

    let report = read_dataset_file(&path, &codebook, InputMode::FixedWidth, BadRecordPolicy::Abort).unwrap();
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].sheet, 46);
}

/// Overlapping columns are a configuration error raised before parsing.
#[test]
fn overlapping_layout_rejected() {
    let mut codebook = Codebook::standard();
    codebook.fields[1].start = 2;
    assert!(matches!(
        codebook.validate(InputMode::FixedWidth),
        Err(SurveyError::Configuration(_))
    ));
    assert!(matches!(
        parse_line(&fixed_line(&Codebook::standard(), &[]), 1, &codebook, InputMode::FixedWidth),
        Err(SurveyError::Configuration(_))
    ));
}

/// Whitespace mode reads fields by order, so a layout without real column
/// positions is accepted there and rejected for fixed-width input.
#[test]
fn whitespace_layout_ignores_offsets() {
    let mut codebook = Codebook::standard();
    for field in &mut codebook.fields {
        field.start = 0;
        field.end = 1;
    }
    assert!(codebook.validate(InputMode::Whitespace).is_ok());
    let record = parse_line(&whitespace_line(&[]), 1, &codebook, InputMode::Whitespace).unwrap();
    assert_eq!(record.sheet, 46);

    assert!(matches!(
        codebook.validate(InputMode::FixedWidth),
        Err(SurveyError::Configuration(_))
    ));
}

/// A JSON layout for whitespace input may list field names and kinds only.
#[test]
fn whitespace_layout_loads_without_offsets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("names_only.json");
    let fields: Vec<_> = Codebook::standard()
        .fields
        .iter()
        .map(|f| serde_json::json!({ "name": f.name, "kind": f.kind }))
        .collect();
    std::fs::write(&path, serde_json::json!({ "fields": fields }).to_string()).unwrap();

    let codebook = Codebook::load(path.to_str().unwrap(), InputMode::Whitespace).unwrap();
    assert_eq!(codebook.len(), 46);
    assert!(Codebook::load(path.to_str().unwrap(), InputMode::FixedWidth).is_err());
}

/// A layout without a field the record needs is rejected up front.
#[test]
fn layout_missing_required_field_rejected() {
    let mut codebook = Codebook::standard();
    codebook.fields.retain(|f| f.name != "EMPFT2");
    let err = codebook.validate(InputMode::Whitespace).unwrap_err();
    assert!(err.to_string().contains("EMPFT2"), "got {err}");
}

/// Layouts load from JSON, with the sentinel defaulting to ".".
#[test]
fn codebook_loads_from_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    let mut fields = Codebook::standard().fields;
    fields.push(FieldSpec::new("EXTRA", 200, 202, FieldKind::Integer));
    let json = serde_json::json!({ "fields": fields });
    std::fs::write(&path, json.to_string()).unwrap();

    let codebook = Codebook::load(path.to_str().unwrap(), InputMode::FixedWidth).unwrap();
    assert_eq!(codebook.missing, ".");
    assert_eq!(codebook.len(), 47);
}

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use traffic_report::aggregate::{group_count, mode, rate};
use traffic_report::config::DataConfig;
use traffic_report::filter::{apply, domains, GLOBAL_FILTERS};
use traffic_report::loader::load;
use traffic_report::output::to_csv_string;
use traffic_report::{Attribute, Dimension, LoadError, Measure, Selection, Session};

const HEADER: &str = "accident_date,weekday,num_of_injuries,num_of_pedestrians,num_of_vehicle,lat,long,location_type_id,Classificationid,impactid,road_conditionid,environmentid,lightid,trafficid,injuryid";

const ROWS: [&str; 10] = [
    "2017-01-02,Monday,1,0,2,45.41,-75.70,1,1,1,1,1,1,1,1",
    "2017-01-03,Tuesday,0,0,1,45.42,-75.71,2,2,2,2,2,2,2,2",
    "2018-03-05,Monday,2,1,2,,,1,1,2,1,1,2,1,2",
    "2018-03-06,Tuesday,0,0,2,45.43,-75.72,2,2,1,2,2,1,2,1",
    "2019-07-12,Friday,0,0,1,45.44,-75.73,1,2,1,1,1,1,1,1",
    "2019-07-13,Saturday,3,2,1,45.45,-75.74,2,1,2,2,2,2,2,2",
    "2020-11-20,Friday,0,0,3,45.46,-75.75,1,2,1,1,1,1,1,1",
    "2020-11-21,Saturday,1,0,2,45.47,-75.76,2,1,1,2,2,2,2,1",
    "2021-05-01,Saturday,0,0,1,45.48,-75.77,9,2,1,1,1,1,1,1",
    "2022-06-02,Thursday,0,0,2,45.49,-75.78,,2,1,1,1,1,1,1",
];

struct Fixture {
    _dir: TempDir,
    fact: PathBuf,
    lookups: PathBuf,
}

fn write_lookups(dir: &Path, skip: Option<Dimension>) {
    fs::create_dir_all(dir).unwrap();
    for dim in Dimension::ALL {
        if Some(dim) == skip {
            continue;
        }
        let (one, two) = match dim {
            Dimension::LocationType => ("Intersection", "Mid-Block"),
            Dimension::ClassificationOfAccident => ("Non-fatal injury", "P.D. only"),
            Dimension::InitialImpactType => ("Rear end", "Angle"),
            Dimension::RoadSurfaceCondition => ("Dry", "Wet"),
            Dimension::EnvironmentCondition => ("Clear", "Snow"),
            Dimension::Light => ("Daylight", "Dark"),
            Dimension::TrafficControl => ("Traffic signal", "Stop sign"),
            Dimension::MaxInjury => ("None", "Minor"),
        };
        let body = format!(
            "{},{}\n1,{}\n2,{}\n",
            dim.key_column(),
            dim.label_column(),
            one,
            two
        );
        fs::write(dir.join(format!("{}.csv", dim.sheet_name())), body).unwrap();
    }
}

fn fixture_with(rows: &[&str], skip: Option<Dimension>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let fact = dir.path().join("facts.csv");
    let mut body = format!("{HEADER}\n");
    for r in rows {
        body.push_str(r);
        body.push('\n');
    }
    fs::write(&fact, body).unwrap();
    let lookups = dir.path().join("lookups");
    write_lookups(&lookups, skip);
    Fixture {
        _dir: dir,
        fact,
        lookups,
    }
}

fn fixture() -> Fixture {
    fixture_with(&ROWS, None)
}

#[test]
fn left_join_preserves_rows_and_resolves_labels() {
    let f = fixture();
    let (records, lookups) = load(&f.fact, &f.lookups).unwrap();
    assert_eq!(records.len(), ROWS.len());
    assert_eq!(lookups.len(), 8);

    for r in &records {
        for dim in Dimension::ALL {
            let expected = r
                .foreign_key(dim)
                .and_then(|k| lookups.get(dim).unwrap().label(k));
            assert_eq!(r.label(dim), expected);
        }
    }
    // key 9 has no lookup entry, the last row has no key at all
    assert_eq!(records[8].location_type, None);
    assert_eq!(records[9].location_type_id, None);
    assert_eq!(records[9].location_type, None);
    assert_eq!(records[0].location_type.as_deref(), Some("Intersection"));
    assert_eq!(records[1].light.as_deref(), Some("Dark"));
}

#[test]
fn missing_sheet_fails_the_whole_load() {
    let f = fixture_with(&ROWS, Some(Dimension::MaxInjury));
    let err = load(&f.fact, &f.lookups).unwrap_err();
    assert!(matches!(err, LoadError::MissingSheet { sheet } if sheet == "Dimmax_injury"));
}

#[test]
fn empty_fact_table_is_a_load_error() {
    let f = fixture_with(&[], None);
    assert!(matches!(
        load(&f.fact, &f.lookups),
        Err(LoadError::Empty(_))
    ));
}

#[test]
fn filter_keeps_matching_rows_in_order() {
    let f = fixture();
    let (records, _) = load(&f.fact, &f.lookups).unwrap();
    let s = Selection::new()
        .with(Attribute::LocationType, ["Intersection"])
        .unwrap();
    let rows = apply(&records, &s);
    assert_eq!(rows.len(), 4);
    let dates: Vec<String> = rows
        .iter()
        .map(|r| r.accident_date.unwrap().to_string())
        .collect();
    assert_eq!(
        dates,
        vec!["2017-01-02", "2018-03-05", "2019-07-12", "2020-11-20"]
    );
}

#[test]
fn filter_is_idempotent_and_monotonic() {
    let f = fixture();
    let (records, _) = load(&f.fact, &f.lookups).unwrap();
    let narrow = Selection::new()
        .with(Attribute::Weekday, ["Saturday"])
        .unwrap()
        .with(Attribute::Light, ["Dark"])
        .unwrap();
    let once = apply(&records, &narrow);
    assert_eq!(apply(&once, &narrow), once);

    let wider = narrow.clone().with(Attribute::Weekday, ["Monday"]).unwrap();
    let more = apply(&records, &wider);
    assert!(more.len() >= once.len());
    assert!(once.iter().all(|r| more.contains(r)));

    assert_eq!(apply(&records, &Selection::new()), records);
}

#[test]
fn global_and_map_selections_are_independent() {
    let f = fixture();
    let (records, _) = load(&f.fact, &f.lookups).unwrap();
    let global = Selection::new().with(Attribute::Year, ["2017"]).unwrap();
    let map = Selection::new().with(Attribute::Year, ["2019", "2020"]).unwrap();
    assert_eq!(apply(&records, &global).len(), 2);
    assert_eq!(apply(&records, &map).len(), 4);
    assert_eq!(apply(&records, &global).len(), 2);
}

#[test]
fn domains_cover_every_global_filter() {
    let f = fixture();
    let (records, _) = load(&f.fact, &f.lookups).unwrap();
    let d = domains(&records, &GLOBAL_FILTERS);
    assert_eq!(d.len(), GLOBAL_FILTERS.len());
    assert_eq!(
        d[&Attribute::Year],
        vec!["2017", "2018", "2019", "2020", "2021", "2022"]
    );
    assert_eq!(d[&Attribute::LocationType], vec!["Intersection", "Mid-Block"]);
    assert_eq!(d[&Attribute::Light], vec!["Dark", "Daylight"]);
}

#[test]
fn aggregates_over_loaded_table() {
    let f = fixture();
    let (records, _) = load(&f.fact, &f.lookups).unwrap();
    assert_eq!(mode(&records, Attribute::Weekday), "Saturday");
    let weekdays = group_count(&records, Attribute::Weekday);
    assert_eq!(weekdays.len(), 7);
    assert_eq!(weekdays[6].label, "Sunday");
    assert_eq!(weekdays[6].count, 0);
    assert!((rate(&records, Measure::NumOfInjuries) - 0.7).abs() < 1e-9);
}

#[test]
fn session_serves_the_loaded_table() {
    let f = fixture();
    let session = Session::new(&DataConfig {
        fact_table: f.fact.clone(),
        lookup_workbook: f.lookups.clone(),
    });
    let first = session.dataset().unwrap();
    let second = session.dataset().unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.records.len(), ROWS.len());
}

#[test]
fn filtered_rows_export_as_csv() {
    let f = fixture();
    let (records, _) = load(&f.fact, &f.lookups).unwrap();
    let s = Selection::new().with(Attribute::Year, ["2022"]).unwrap();
    let csv = to_csv_string(&apply(&records, &s)).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.lines().nth(1).unwrap().starts_with("2022-06-02,Thursday"));
}

#[test]
fn empty_selection_exports_header_only() {
    let f = fixture();
    let (records, _) = load(&f.fact, &f.lookups).unwrap();
    let s = Selection::new().with(Attribute::Year, ["1999"]).unwrap();
    let csv = to_csv_string(&apply(&records, &s)).unwrap();
    assert_eq!(csv.lines().count(), 1);
    assert!(csv.starts_with("accident_date,weekday"));
}

// tests/catalog_load.rs
use esg_stock_ranker::catalog::Attribute;
use esg_stock_ranker::{load_catalog_file, load_catalog_str, EngineHandle, RankingEngine};
use std::fs;

const SAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/sample_catalog.json");

#[test]
fn sample_catalog_loads_despite_trailing_comma() {
    let recs = load_catalog_file(SAMPLE).unwrap();
    assert_eq!(recs.len(), 6);
    let newco = recs.iter().find(|r| r.symbol == "NEWCO").unwrap();
    assert_eq!(newco.get(Attribute::MarketCap), Some(1_200_000_000.0));
    assert_eq!(newco.sector, None);
}

#[test]
fn missing_file_is_an_error_with_path() {
    let err = load_catalog_file("/nope/missing.json").unwrap_err();
    assert!(format!("{err:#}").contains("/nope/missing.json"));
}

#[test]
fn missing_closing_bracket_with_trailing_comma() {
    let recs = load_catalog_str(r#"[{"Symbol":"A","Full Name":"Alpha"},"#);
    assert_eq!(recs.len(), 1);
}

#[test]
fn handle_reloads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    fs::write(
        &path,
        r#"[{"Symbol":"A","Full Name":"Alpha","environmentScore":1},{"Symbol":"B","Full Name":"Bravo","environmentScore":2}]"#,
    )
    .unwrap();

    let handle = EngineHandle::new(RankingEngine::with_catalog(Vec::new()));
    assert!(handle.rank("green").is_empty());

    let n = handle.reload_from(&path).unwrap();
    assert_eq!(n, 2);
    let out = handle.rank("green");
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].symbol, "B");
}

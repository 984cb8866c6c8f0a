//! JSON/Excel出力の統合テスト

use calamine::{open_workbook_auto, Data, Reader};
use catalog_gap_common::{analyze, GapIndex, MarketRow, MatchConfig, ReferenceProduct};
use catalog_gap_rust::cli::ExportFormat;
use catalog_gap_rust::export::{self, excel};
use tempfile::tempdir;

fn create_report() -> catalog_gap_common::GapReport {
    let rows = vec![
        MarketRow {
            brand_name: "Truper".into(),
            code: "T-999".into(),
            description: "MACHETE CON MANGO 680 MM".into(),
            category: "HERRAMIENTAS".into(),
            status: "OFERTADA".into(),
            ..Default::default()
        },
        MarketRow {
            brand_name: "Stanley".into(),
            code: "S-1".into(),
            description: "ALICATE UNIVERSAL 8 PULG".into(),
            category: "HERRAMIENTAS".into(),
            ..Default::default()
        },
    ];
    let references = vec![ReferenceProduct {
        id: "p1".into(),
        code: "T-100".into(),
        brand_name: "Truper".into(),
        description: "MACHETE CON MANGO 680 MM".into(),
    }];
    let mut index = GapIndex::new();
    index.insert_brand("b1", "Truper");
    index.insert_product("b1", "T-100");

    analyze(&rows, &references, &index, &MatchConfig::default()).unwrap()
}

#[test]
fn test_json_export_and_reload() {
    let dir = tempdir().expect("Failed to create temp dir");
    let report = create_report();
    let path = dir.path().join("report.json");

    export::write_json(&report, &path).expect("JSON出力失敗");
    let loaded = export::read_json(&path).expect("JSON読み込み失敗");
    assert_eq!(loaded, report);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["totalMissingInSystem"], 1);
    assert_eq!(raw["marketProducts"][0]["matchStatus"], "missing");
}

#[test]
fn test_excel_generation() {
    let dir = tempdir().expect("Failed to create temp dir");
    let report = create_report();
    let path = dir.path().join("report.xlsx");

    let result = excel::generate_excel(&report, &path, "Brechas");
    assert!(result.is_ok(), "Excel生成に失敗: {:?}", result.err());
    assert!(path.exists(), "Excelファイルが作成されていない");

    let mut workbook = open_workbook_auto(&path).expect("Excelを開けない");
    assert_eq!(workbook.sheet_names(), vec!["Resumen".to_string(), "Productos".to_string()]);

    let products = workbook.worksheet_range("Productos").expect("シートがない");
    let rows: Vec<&[Data]> = products.rows().collect();
    // ヘッダー + 2行
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][1], Data::String("T-999".into()));
    assert_eq!(rows[1][5], Data::String("T-100".into()));
}

#[test]
fn test_excel_generation_oversized_cells() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut report = create_report();
    report.market_products[0].description = "A".repeat(40_000);
    report.market_products[0].search_url = format!("https://www.google.com/search?q={}", "x".repeat(3_000));
    let path = dir.path().join("oversized.xlsx");

    let result = excel::generate_excel(&report, &path, "Brechas");
    assert!(result.is_ok(), "長いセルでExcel生成に失敗: {:?}", result.err());

    let mut workbook = open_workbook_auto(&path).expect("Excelを開けない");
    let products = workbook.worksheet_range("Productos").expect("シートがない");
    let rows: Vec<&[Data]> = products.rows().collect();
    match &rows[1][2] {
        Data::String(s) => assert_eq!(s.chars().count(), 32_767),
        other => panic!("説明セルが文字列でない: {:?}", other),
    }
    assert_eq!(rows[1][9], Data::Empty);
}

#[test]
fn test_excel_generation_empty_report() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut report = create_report();
    report.market_products.clear();
    let path = dir.path().join("empty.xlsx");

    let result = excel::generate_excel(&report, &path, "Vacío");
    assert!(result.is_ok(), "空レポートのExcel生成に失敗: {:?}", result.err());
}

#[test]
fn test_export_both_to_directory() {
    let dir = tempdir().expect("Failed to create temp dir");
    let report = create_report();

    let written = export::export_report(&report, &ExportFormat::Both, dir.path(), "gap")
        .expect("エクスポート失敗");
    assert_eq!(written.len(), 2);
    assert!(dir.path().join("gap.json").exists());
    assert!(dir.path().join("gap.xlsx").exists());
}

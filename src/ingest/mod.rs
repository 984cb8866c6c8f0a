//! 市場カタログ（xlsx）の読み込み
//!
//! 先頭シートの1行目をヘッダーとして、列名で `MarketRow` に割り当てる。

use crate::error::{GapError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use catalog_gap_common::MarketRow;
use std::path::Path;

pub const COL_BRAND: &str = "Marca";
pub const COL_CODE: &str = "Nro. Parte o Código Único de Identificación";
pub const COL_DESCRIPTION: &str = "Descripción Ficha-Producto";
pub const COL_CATEGORY: &str = "Categoría";
pub const COL_STATUS: &str = "Estado Ficha - Producto";
pub const COL_IMAGE: &str = "Imagen";
pub const COL_TECHNICAL_SHEET: &str = "Ficha Técnica";
pub const COL_AGREEMENT: &str = "Acuerdo Marco";
pub const COL_CATALOG: &str = "Catálogo";

/// 列名→列番号の対応
#[derive(Debug, Clone, Default)]
struct ColumnMap {
    brand: Option<usize>,
    code: Option<usize>,
    description: Option<usize>,
    category: Option<usize>,
    status: Option<usize>,
    image: Option<usize>,
    technical_sheet: Option<usize>,
    agreement: Option<usize>,
    catalog: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        Self {
            brand: find(COL_BRAND),
            code: find(COL_CODE),
            description: find(COL_DESCRIPTION),
            category: find(COL_CATEGORY),
            status: find(COL_STATUS),
            image: find(COL_IMAGE),
            technical_sheet: find(COL_TECHNICAL_SHEET),
            agreement: find(COL_AGREEMENT),
            catalog: find(COL_CATALOG),
        }
    }
}

/// xlsx ファイルから市場カタログを読み込む
pub fn read_market_rows(path: &Path) -> Result<Vec<MarketRow>> {
    if !path.exists() {
        return Err(GapError::FileNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| GapError::Spreadsheet(format!("ファイルを開けません: {}", e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| GapError::Spreadsheet("シートがありません".into()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| GapError::Spreadsheet(format!("シート '{}' の読み込み失敗: {}", sheet_name, e)))?;

    let records: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    let rows = rows_from_records(&records);
    tracing::debug!(sheet = %sheet_name, rows = rows.len(), "市場カタログを読み込み");
    Ok(rows)
}

/// ヘッダー行＋データ行から `MarketRow` を組み立てる
///
/// 全セルが空の行は捨てる。欠けたセルは空文字 / None になる。
pub fn rows_from_records(records: &[Vec<String>]) -> Vec<MarketRow> {
    let Some((headers, data)) = records.split_first() else {
        return Vec::new();
    };
    let columns = ColumnMap::from_headers(headers);

    data.iter()
        .filter(|record| record.iter().any(|cell| !cell.trim().is_empty()))
        .map(|record| {
            let text = |col: Option<usize>| {
                col.and_then(|i| record.get(i))
                    .cloned()
                    .unwrap_or_default()
            };
            let optional = |col: Option<usize>| {
                let value = text(col);
                if value.is_empty() { None } else { Some(value) }
            };

            MarketRow {
                brand_name: text(columns.brand),
                code: text(columns.code),
                description: text(columns.description),
                category: text(columns.category),
                status: text(columns.status),
                image: optional(columns.image),
                technical_sheet: optional(columns.technical_sheet),
                agreement: optional(columns.agreement),
                catalog: optional(columns.catalog),
            }
        })
        .collect()
}

/// セル値を文字列化（整数値の小数は `.0` を付けない）
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

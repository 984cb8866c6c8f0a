//! 解析パイプライン
//!
//! 市場カタログ読み込み → カテゴリ判定 → 自社マスタ絞り込み → 分類。

use crate::catalog::ReferenceCatalog;
use crate::error::Result;
use crate::ingest;
use catalog_gap_common::{analyze, detect_category, GapReport, MarketRow, MatchConfig};
use std::path::Path;

/// 読み込み済みの行と自社マスタから解析する
pub fn analyze_rows(
    rows: &[MarketRow],
    catalog: &ReferenceCatalog,
    config: &MatchConfig,
) -> Result<GapReport> {
    let category = detect_category(rows)?;
    let index = catalog.build_index();
    let references = catalog.products_for_category(&category);

    tracing::debug!(
        category = %category,
        brands = index.brand_count(),
        products = index.product_count(),
        candidates = references.len(),
        "自社マスタを準備"
    );

    let report = analyze(rows, &references, &index, config)?;
    Ok(report)
}

/// xlsx と自社マスタJSONのパスから解析する
pub fn run_analysis(input: &Path, catalog_path: &Path, config: &MatchConfig) -> Result<GapReport> {
    let rows = ingest::read_market_rows(input)?;
    let catalog = ReferenceCatalog::load(catalog_path)?;
    analyze_rows(&rows, &catalog, config)
}

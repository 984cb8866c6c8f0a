//! ギャップ分析
//!
//! 市場カタログの各行を自社マスタと照合して分類する。
//!
//! ## 処理フロー
//! 1. ブランド・コード欠損行のスキップ
//! 2. 自社ブランド判定と完全一致チェック（found / missing / competitor_only）
//! 3. found 以外は自社商品から最も類似した商品を検索
//! 4. Web検証用の検索クエリ生成
//! 5. 類似スコア降順 → 状態順で並び替え

use crate::error::{Error, Result};
use crate::query;
use crate::similarity::{similarity_with_tolerance, DEFAULT_SPEC_TOLERANCE};
use crate::types::{
    ClassifiedRow, GapReport, MarketRow, MatchStatus, ReferenceProduct, SimilarProduct,
    VerificationStatus,
};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// 類似商品として採用する最低スコア（これを超える必要がある）
pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 0.45;

/// 並び替えで同点とみなすスコア差
pub const SCORE_TIE_BAND: f64 = 0.001;

/// 照合の調整値
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    /// 数値一致の相対誤差
    pub spec_tolerance: f64,
    /// 類似商品の採用閾値
    pub relevance_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            spec_tolerance: DEFAULT_SPEC_TOLERANCE,
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
        }
    }
}

/// 自社ブランドと登録済み商品の索引
///
/// ブランド名（小文字）→ブランドID と `brandId:code` の集合を持つ。
#[derive(Debug, Clone, Default)]
pub struct GapIndex {
    brands: HashMap<String, String>,
    exact_keys: HashSet<String>,
}

impl GapIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// ブランドを登録（名前は前後空白除去・小文字化）
    pub fn insert_brand(&mut self, id: &str, name: &str) {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        self.brands.insert(key, id.to_string());
    }

    /// 登録済み商品を追加
    pub fn insert_product(&mut self, brand_id: &str, code: &str) {
        if brand_id.is_empty() || code.trim().is_empty() {
            return;
        }
        self.exact_keys.insert(exact_key(brand_id, code));
    }

    /// 小文字化済みのブランド名からIDを取得
    pub fn brand_id(&self, lower_name: &str) -> Option<&str> {
        self.brands.get(lower_name).map(|s| s.as_str())
    }

    pub fn is_known_brand(&self, lower_name: &str) -> bool {
        self.brands.contains_key(lower_name)
    }

    pub fn contains(&self, brand_id: &str, code: &str) -> bool {
        self.exact_keys.contains(&exact_key(brand_id, code))
    }

    pub fn brand_count(&self) -> usize {
        self.brands.len()
    }

    pub fn product_count(&self) -> usize {
        self.exact_keys.len()
    }
}

/// 完全一致キー `brandId:code`（コードは前後空白除去・小文字化）
pub fn exact_key(brand_id: &str, code: &str) -> String {
    format!("{}:{}", brand_id, code.trim().to_lowercase())
}

/// 先頭行からカテゴリを取得
///
/// 途中でカテゴリが変わっても再判定しない。
pub fn detect_category(rows: &[MarketRow]) -> Result<String> {
    let first = rows.first().ok_or(Error::EmptyInput)?;
    let category = first.category.trim();
    if category.is_empty() {
        return Err(Error::MissingCategory);
    }
    Ok(category.to_string())
}

/// 1行を分類する（ブランドかコードが空なら None）
pub fn classify_row(
    row: &MarketRow,
    category: &str,
    catalog: &[ReferenceProduct],
    index: &GapIndex,
    config: &MatchConfig,
) -> Option<ClassifiedRow> {
    let brand_name = row.brand_name.trim();
    let code = row.code.trim();
    if brand_name.is_empty() || code.is_empty() {
        tracing::debug!(brand = brand_name, code, "ブランドまたはコードが空の行をスキップ");
        return None;
    }

    let lower_brand = brand_name.to_lowercase();
    let brand_id = index.brand_id(&lower_brand);
    let is_known_brand = brand_id.is_some();

    let match_status = match brand_id {
        Some(id) if index.contains(id, code) => MatchStatus::Found,
        Some(_) => MatchStatus::Missing,
        None => MatchStatus::CompetitorOnly,
    };

    let similar_product = if match_status == MatchStatus::Found {
        None
    } else {
        find_similar(&row.description, &lower_brand, code, catalog, config)
    };

    let search_query = query::build_search_query(&row.description, brand_name);
    let search_url = query::search_url(&search_query);

    Some(ClassifiedRow {
        brand_name: brand_name.to_string(),
        code: code.to_string(),
        description: row.description.clone(),
        category: category.to_string(),
        status: row.status.clone(),
        image: row.image.clone(),
        technical_sheet: row.technical_sheet.clone(),
        agreement: row.agreement.clone(),
        catalog: row.catalog.clone(),
        is_known_brand,
        match_status,
        similar_product,
        search_query,
        search_url,
        verification_status: VerificationStatus::Pending,
        scraped_data: None,
    })
}

/// 自社商品から最も類似した商品を探す
///
/// 同じブランド・コードの商品は自分自身とみなして除外する。
/// 最高スコアが閾値を超えた場合のみ返す（同点は先に見つかった方）。
pub fn find_similar(
    description: &str,
    lower_brand: &str,
    code: &str,
    catalog: &[ReferenceProduct],
    config: &MatchConfig,
) -> Option<SimilarProduct> {
    let lower_code = code.to_lowercase();
    let mut max_score = 0.0;
    let mut best: Option<&ReferenceProduct> = None;

    for candidate in catalog {
        if candidate.brand_name.to_lowercase() == lower_brand
            && candidate.code.to_lowercase() == lower_code
        {
            continue;
        }

        let score =
            similarity_with_tolerance(description, &candidate.description, config.spec_tolerance);
        if score > max_score {
            max_score = score;
            best = Some(candidate);
        }
    }

    let best = best?;
    if max_score > config.relevance_threshold {
        tracing::debug!(code, similar = %best.code, score = max_score, "類似商品を検出");
        Some(SimilarProduct::from_reference(best, max_score))
    } else {
        None
    }
}

/// 表示順の比較
///
/// 類似スコア降順（差が0.001以内は同点）、同点なら missing → competitor_only → found。
pub fn compare_rows(a: &ClassifiedRow, b: &ClassifiedRow) -> Ordering {
    let score_a = a.similarity_score();
    let score_b = b.similarity_score();

    if (score_a - score_b).abs() > SCORE_TIE_BAND {
        return score_b.partial_cmp(&score_a).unwrap_or(Ordering::Equal);
    }

    a.match_status.sort_rank().cmp(&b.match_status.sort_rank())
}

/// 安定な挿入ソートで並び替え
///
/// 同点幅を持つ比較は推移的でないため、全順序を前提とする
/// `slice::sort_by` は使わない。
pub fn sort_rows(rows: &mut [ClassifiedRow]) {
    for i in 1..rows.len() {
        let mut j = i;
        while j > 0 && compare_rows(&rows[j - 1], &rows[j]) == Ordering::Greater {
            rows.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// 分類結果を行順のまま返す（並び替え前）
///
/// 行ごとの計算は独立しているため並列に処理する。
pub fn classify_rows(
    rows: &[MarketRow],
    category: &str,
    catalog: &[ReferenceProduct],
    index: &GapIndex,
    config: &MatchConfig,
) -> Vec<ClassifiedRow> {
    rows.par_iter()
        .filter_map(|row| classify_row(row, category, catalog, index, config))
        .collect()
}

/// 市場カタログ全体を分類して並び替える
///
/// # Arguments
/// * `rows` - 市場カタログの行（先頭行のカテゴリを解析対象とする）
/// * `catalog` - 解析対象カテゴリで絞り込み済みの自社商品
/// * `index` - 自社ブランドと登録済み商品の索引
/// * `config` - 照合の調整値
///
/// # Errors
/// 行が空、または先頭行にカテゴリがない場合
pub fn analyze(
    rows: &[MarketRow],
    catalog: &[ReferenceProduct],
    index: &GapIndex,
    config: &MatchConfig,
) -> Result<GapReport> {
    let category = detect_category(rows)?;

    let mut market_products = classify_rows(rows, &category, catalog, index, config);
    sort_rows(&mut market_products);

    let total_missing_in_system = market_products
        .iter()
        .filter(|r| r.match_status == MatchStatus::Missing)
        .count();

    tracing::info!(
        category = %category,
        rows = rows.len(),
        classified = market_products.len(),
        missing = total_missing_in_system,
        "ギャップ分析完了"
    );

    Ok(GapReport {
        total_rows_processed: rows.len(),
        total_missing_in_system,
        category_processed: category,
        market_products,
    })
}

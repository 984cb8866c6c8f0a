//! ギャップ分析の型定義
//!
//! CLIと解析コアで共有される値オブジェクト:
//! - MarketRow: 市場カタログ（スプレッドシート）の1行
//! - ReferenceProduct: 自社マスタの商品
//! - ClassifiedRow: 分類済みの行（最終出力）
//! - GapReport: 1回の解析の集計結果

use serde::{Deserialize, Serialize};

/// 市場カタログの1行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketRow {
    pub brand_name: String,
    pub code: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub image: Option<String>,
    pub technical_sheet: Option<String>,
    /// 枠組み協定（Acuerdo Marco）
    pub agreement: Option<String>,
    /// 掲載カタログ名
    pub catalog: Option<String>,
}

/// 自社マスタの商品（類似検索の候補）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceProduct {
    pub id: String,
    pub code: String,
    pub brand_name: String,
    pub description: String,
}

/// 最も類似した自社商品とそのスコア（0〜1）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarProduct {
    pub id: String,
    pub code: String,
    pub brand_name: String,
    pub description: String,
    pub similarity_score: f64,
}

impl SimilarProduct {
    pub fn from_reference(product: &ReferenceProduct, score: f64) -> Self {
        Self {
            id: product.id.clone(),
            code: product.code.clone(),
            brand_name: product.brand_name.clone(),
            description: product.description.clone(),
            similarity_score: score,
        }
    }
}

/// 自社マスタとの照合状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// 自社ブランドかつマスタに登録済み
    Found,
    /// 自社ブランドだがマスタに未登録（ギャップ）
    Missing,
    /// 他社ブランド
    CompetitorOnly,
}

impl MatchStatus {
    /// 並び替えの優先度（小さいほど上位）
    pub fn sort_rank(&self) -> u8 {
        match self {
            MatchStatus::Missing => 0,
            MatchStatus::CompetitorOnly => 1,
            MatchStatus::Found => 2,
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Found => write!(f, "found"),
            MatchStatus::Missing => write!(f, "missing"),
            MatchStatus::CompetitorOnly => write!(f, "competitor_only"),
        }
    }
}

/// Web検証の状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Pending,
    VerifiedReal,
    Suspicious,
    NotFound,
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationStatus::Pending => write!(f, "pending"),
            VerificationStatus::VerifiedReal => write!(f, "verified_real"),
            VerificationStatus::Suspicious => write!(f, "suspicious"),
            VerificationStatus::NotFound => write!(f, "not_found"),
        }
    }
}

/// 市場スキャンAPIが返す掲載情報
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedProduct {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub similarity_score: f64,
}

/// スキャン結果を「関連あり」とみなすスコア
pub const RELEVANT_SCRAPE_SCORE: f64 = 0.5;

impl ScrapedProduct {
    pub fn is_relevant(&self) -> bool {
        self.similarity_score > RELEVANT_SCRAPE_SCORE
    }
}

/// 分類済みの行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedRow {
    pub brand_name: String,
    pub code: String,
    pub description: String,
    /// 解析対象カテゴリ（先頭行から検出したもの）
    pub category: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_sheet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    pub is_known_brand: bool,
    pub match_status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similar_product: Option<SimilarProduct>,
    pub search_query: String,
    pub search_url: String,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_data: Option<Vec<ScrapedProduct>>,
}

impl ClassifiedRow {
    /// 並び替えに使う類似スコア（類似商品なしは0）
    pub fn similarity_score(&self) -> f64 {
        self.similar_product
            .as_ref()
            .map(|p| p.similarity_score)
            .unwrap_or(0.0)
    }

    /// 市場スキャンの対象か（類似商品なし、またはスコアが閾値未満）
    pub fn needs_market_scan(&self, scan_threshold: f64) -> bool {
        match &self.similar_product {
            None => true,
            Some(p) => p.similarity_score < scan_threshold,
        }
    }

    /// スキャン結果を反映して検証状態を更新
    pub fn apply_scan(&mut self, results: Vec<ScrapedProduct>) {
        self.verification_status = if results.is_empty() {
            VerificationStatus::NotFound
        } else if results.iter().any(ScrapedProduct::is_relevant) {
            VerificationStatus::VerifiedReal
        } else {
            VerificationStatus::Suspicious
        };
        self.scraped_data = Some(results);
    }
}

/// 1回の解析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapReport {
    /// 入力行数（スキップした行を含む）
    pub total_rows_processed: usize,
    /// 自社ブランドでマスタ未登録の件数
    pub total_missing_in_system: usize,
    pub category_processed: String,
    pub market_products: Vec<ClassifiedRow>,
}

impl GapReport {
    pub fn count_by_status(&self, status: MatchStatus) -> usize {
        self.market_products
            .iter()
            .filter(|r| r.match_status == status)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with(similar: Option<f64>) -> ClassifiedRow {
        ClassifiedRow {
            brand_name: "Truper".into(),
            code: "T-1".into(),
            description: "MARTILLO".into(),
            category: "HERRAMIENTAS".into(),
            status: String::new(),
            image: None,
            technical_sheet: None,
            agreement: None,
            catalog: None,
            is_known_brand: false,
            match_status: MatchStatus::CompetitorOnly,
            similar_product: similar.map(|s| SimilarProduct {
                id: "p1".into(),
                code: "X".into(),
                brand_name: "Acme".into(),
                description: "MARTILLO".into(),
                similarity_score: s,
            }),
            search_query: String::new(),
            search_url: String::new(),
            verification_status: VerificationStatus::Pending,
            scraped_data: None,
        }
    }

    #[test]
    fn test_match_status_serde_names() {
        let json = serde_json::to_string(&MatchStatus::CompetitorOnly).unwrap();
        assert_eq!(json, "\"competitor_only\"");
        let status: MatchStatus = serde_json::from_str("\"missing\"").unwrap();
        assert_eq!(status, MatchStatus::Missing);
    }

    #[test]
    fn test_sort_rank_order() {
        assert!(MatchStatus::Missing.sort_rank() < MatchStatus::CompetitorOnly.sort_rank());
        assert!(MatchStatus::CompetitorOnly.sort_rank() < MatchStatus::Found.sort_rank());
    }

    #[test]
    fn test_needs_market_scan() {
        assert!(row_with(None).needs_market_scan(0.6));
        assert!(row_with(Some(0.5)).needs_market_scan(0.6));
        assert!(!row_with(Some(0.6)).needs_market_scan(0.6));
    }

    #[test]
    fn test_apply_scan_statuses() {
        let mut row = row_with(None);
        row.apply_scan(vec![]);
        assert_eq!(row.verification_status, VerificationStatus::NotFound);

        let weak = ScrapedProduct { similarity_score: 0.3, ..Default::default() };
        row.apply_scan(vec![weak.clone()]);
        assert_eq!(row.verification_status, VerificationStatus::Suspicious);

        let strong = ScrapedProduct { similarity_score: 0.8, ..Default::default() };
        row.apply_scan(vec![weak, strong]);
        assert_eq!(row.verification_status, VerificationStatus::VerifiedReal);
        assert_eq!(row.scraped_data.as_ref().map(|d| d.len()), Some(2));
    }

    #[test]
    fn test_scraped_product_missing_score_defaults_to_zero() {
        let json = r#"{"source":"Sodimac","title":"Martillo","price":"S/ 20","link":"https://x"}"#;
        let product: ScrapedProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.similarity_score, 0.0);
        assert!(!product.is_relevant());
    }

    #[test]
    fn test_classified_row_camel_case() {
        let json = serde_json::to_value(row_with(Some(0.7))).unwrap();
        assert_eq!(json["matchStatus"], "competitor_only");
        assert_eq!(json["verificationStatus"], "pending");
        assert!(json["similarProduct"]["similarityScore"].is_number());
        assert!(json.get("scrapedData").is_none());
        assert!(json.get("agreement").is_none());
    }
}

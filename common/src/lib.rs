//! Catalog Gap Common Library
//!
//! 市場カタログと自社商品マスタのギャップ分析コア。
//! I/Oを持たない純粋な計算のみを提供する。

pub mod error;
pub mod gap;
pub mod query;
pub mod similarity;
pub mod specs;
pub mod types;

pub use error::{Error, Result};
pub use gap::{analyze, classify_row, detect_category, sort_rows, GapIndex, MatchConfig};
pub use query::{brand_agnostic_name, build_search_query, search_url};
pub use similarity::{similarity, similarity_with_tolerance};
pub use specs::{extract_specs, MeasurementSet, Unit};
pub use types::{
    ClassifiedRow, GapReport, MarketRow, MatchStatus, ReferenceProduct, ScrapedProduct,
    SimilarProduct, VerificationStatus,
};

//! Web検証用の検索クエリ生成
//!
//! ブランド名を含まない商品の「核となる名称」を取り出し、
//! 信頼できる販売サイトに絞った検索クエリを組み立てる。
//! ここではクエリ文字列とURLを作るだけで、リクエストは発行しない。

use regex::{Regex, RegexBuilder};

/// 検索対象とする販売サイト
pub const TRUSTED_SITES: &[&str] = &[
    "truper-peru.com",
    "sodimac.com.pe",
    "promart.pe",
    "maquicasaperu.com",
    "gyasolution.pe",
    "tramontina.com.pe",
    "uysa.com.pe",
    "bellota.com",
    "mercadolibre.com.pe",
];

/// 検索エンジンのURL
pub const SEARCH_ENGINE_URL: &str = "https://www.google.com/search?q=";

/// 核となる名称に残す最大語数
pub const CORE_NAME_MAX_WORDS: usize = 4;

lazy_static::lazy_static! {
    // 区切り記号、または空白の直後の数字で打ち切る
    static ref CORE_BOUNDARY_RE: Regex = Regex::new(r"[:;,\-]|\s[0-9]").unwrap();
}

/// 説明文から先頭の名称部分を取り出す（最大4語）
///
/// 例: `"MACHETE CON MANGO 680 MM: acero"` → `"MACHETE CON MANGO"`
pub fn core_name(description: &str) -> String {
    let head = CORE_BOUNDARY_RE.split(description).next().unwrap_or("");
    head.split_whitespace()
        .take(CORE_NAME_MAX_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// 名称からブランド名を除去（大文字小文字を区別しない）
///
/// ブランド名は正規表現としてエスケープしてから埋め込む。
pub fn strip_brand(name: &str, brand: &str) -> String {
    if brand.is_empty() {
        return name.trim().to_string();
    }

    let pattern = RegexBuilder::new(&regex::escape(brand))
        .case_insensitive(true)
        .build();

    match pattern {
        Ok(re) => re.replace_all(name, "").trim().to_string(),
        Err(e) => {
            tracing::debug!(brand, error = %e, "ブランド名のパターン生成に失敗");
            name.trim().to_string()
        }
    }
}

/// ブランドに依存しない商品名（市場スキャンにも使う）
pub fn brand_agnostic_name(description: &str, brand: &str) -> String {
    strip_brand(&core_name(description), brand)
}

/// `site:` フィルタ句（OR区切り）
pub fn site_filter() -> String {
    TRUSTED_SITES
        .iter()
        .map(|s| format!("site:{}", s))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// 検索クエリ `(site:a OR site:b ...) <名称>`
pub fn build_search_query(description: &str, brand: &str) -> String {
    let name = brand_agnostic_name(description, brand);
    format!("({}) {}", site_filter(), name).trim().to_string()
}

/// 検索クエリをURLに変換
pub fn search_url(query: &str) -> String {
    format!("{}{}", SEARCH_ENGINE_URL, urlencoding::encode(query.trim()))
}

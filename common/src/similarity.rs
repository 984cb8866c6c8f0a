//! 商品説明の類似度計算
//!
//! 仕様スコア（数値＋単位の許容誤差つき照合）とテキストスコア
//! （トークン集合のJaccard係数）を組み合わせて0〜1のスコアを返す。
//!
//! 許容誤差は第1引数側の値を基準にするため、`similarity(a, b)` と
//! `similarity(b, a)` は一致しないことがある。

use crate::specs::{extract_specs, MeasurementSet};
use regex::Regex;
use std::collections::HashSet;

/// 数値一致とみなす相対誤差（基準値の10%）
pub const DEFAULT_SPEC_TOLERANCE: f64 = 0.10;

/// 仕様がある場合の仕様スコアの重み
pub const SPEC_WEIGHT: f64 = 0.75;

/// 仕様がある場合のテキストスコアの重み
pub const TEXT_WEIGHT: f64 = 0.25;

/// 両方とも計測値を持たない場合の仕様スコア
pub const NEUTRAL_SPEC_SCORE: f64 = 0.5;

/// スコアの内訳
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityBreakdown {
    pub spec_score: f64,
    pub text_score: f64,
    /// どちらかに計測値があるか
    pub has_specs: bool,
    pub score: f64,
}

/// 類似度（許容誤差はデフォルト値）
pub fn similarity(a: &str, b: &str) -> f64 {
    similarity_with_tolerance(a, b, DEFAULT_SPEC_TOLERANCE)
}

pub fn similarity_with_tolerance(a: &str, b: &str, tolerance: f64) -> f64 {
    breakdown(a, b, tolerance).score
}

/// 類似度を内訳つきで計算
pub fn breakdown(a: &str, b: &str, tolerance: f64) -> SimilarityBreakdown {
    if a.is_empty() || b.is_empty() {
        return SimilarityBreakdown {
            spec_score: 0.0,
            text_score: 0.0,
            has_specs: false,
            score: 0.0,
        };
    }

    let specs_a = extract_specs(a);
    let specs_b = extract_specs(b);
    let spec = spec_score(&specs_a, &specs_b, tolerance);

    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    let text = jaccard(&tokens_a, &tokens_b);

    let has_specs = specs_a.total() > 0 || specs_b.total() > 0;
    let score = if !has_specs {
        text
    } else if tokens_a.is_empty() && tokens_b.is_empty() {
        // 比較できる語がなければ仕様だけで判定
        spec
    } else {
        spec * SPEC_WEIGHT + text * TEXT_WEIGHT
    };

    SimilarityBreakdown {
        spec_score: spec,
        text_score: text,
        has_specs,
        score,
    }
}

/// 仕様スコア（許容誤差つきの Jaccard 係数）
///
/// `a` の各値について、同じ単位の `b` の残り候補から
/// `|v1 - v2| <= v1 * tolerance` を満たす最も近い値を1つ消費する。
/// `a` の出現順に貪欲に割り当てる。
pub fn spec_score(a: &MeasurementSet, b: &MeasurementSet, tolerance: f64) -> f64 {
    let mut match_count = 0usize;

    for (unit, values_a) in a.iter() {
        let Some(values_b) = b.get(unit) else {
            continue;
        };
        let mut pool: Vec<f64> = values_b.to_vec();

        for &v1 in values_a {
            let limit = v1 * tolerance;
            let mut best: Option<(usize, f64)> = None;

            for (idx, &v2) in pool.iter().enumerate() {
                let diff = (v1 - v2).abs();
                let closer = best.map(|(_, min)| diff < min).unwrap_or(true);
                if diff <= limit && closer {
                    best = Some((idx, diff));
                }
            }

            if let Some((idx, _)) = best {
                match_count += 1;
                pool.remove(idx);
            }
        }
    }

    let total_a = a.total();
    let total_b = b.total();
    let union = total_a + total_b - match_count;

    if union > 0 {
        match_count as f64 / union as f64
    } else if total_a == 0 && total_b == 0 {
        NEUTRAL_SPEC_SCORE
    } else {
        0.0
    }
}

lazy_static::lazy_static! {
    static ref NON_WORD_RE: Regex = Regex::new(r"[^A-Za-z0-9_\s]").unwrap();
    // 指数表記や 0x / 0b / 0o 付きの数値も数値トークンとして扱う
    static ref NUMERIC_RE: Regex = Regex::new(
        r"^(?:[0-9]+(?:e[0-9]+)?|0x[0-9a-f]+|0b[01]+|0o[0-7]+)$"
    ).unwrap();
}

/// テキストをトークン集合に分解
///
/// 小文字化し英数字以外を除去、2文字以下と数値のみのトークンは捨てる
/// （数値は仕様スコア側で扱う）。
pub fn tokenize(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD_RE.replace_all(&lowered, "");

    cleaned
        .split_whitespace()
        .filter(|t| t.len() > 2 && !NUMERIC_RE.is_match(t))
        .map(|t| t.to_string())
        .collect()
}

/// 2つのトークン集合の Jaccard 係数（両方空なら0）
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_similarity_empty() {
        assert_eq!(similarity("", ""), 0.0);
        assert_eq!(similarity("MARTILLO 16 OZ", ""), 0.0);
    }

    #[test]
    fn test_similarity_identical_spec_only() {
        assert!(approx(similarity("680 MM", "680 MM"), 1.0));
    }

    #[test]
    fn test_tolerance_edge() {
        let a = extract_specs("100 MM");
        assert!(approx(spec_score(&a, &extract_specs("110 MM"), DEFAULT_SPEC_TOLERANCE), 1.0));
        assert!(approx(spec_score(&a, &extract_specs("111 MM"), DEFAULT_SPEC_TOLERANCE), 0.0));
        assert!(approx(similarity("100 MM", "110 MM"), 1.0));
        assert!(approx(similarity("100 MM", "111 MM"), 0.0));
    }

    #[test]
    fn test_similarity_is_asymmetric() {
        // 100の10%は10、90.5の10%は9.05なので差9.5は片方向だけ一致
        assert!(approx(similarity("100 MM", "90.5 MM"), 1.0));
        assert!(approx(similarity("90.5 MM", "100 MM"), 0.0));
    }

    #[test]
    fn test_spec_score_neutral_without_specs() {
        let empty = MeasurementSet::default();
        assert!(approx(spec_score(&empty, &empty, DEFAULT_SPEC_TOLERANCE), NEUTRAL_SPEC_SCORE));
    }

    #[test]
    fn test_spec_score_one_side_only() {
        let a = extract_specs("680 MM");
        let empty = MeasurementSet::default();
        assert!(approx(spec_score(&a, &empty, DEFAULT_SPEC_TOLERANCE), 0.0));
        assert!(approx(spec_score(&empty, &a, DEFAULT_SPEC_TOLERANCE), 0.0));
    }

    #[test]
    fn test_spec_score_consumes_matches() {
        // 2つの100は候補の102を1回しか使えない
        let a = extract_specs("100 MM 100 MM");
        let b = extract_specs("102 MM");
        // match 1, union 2 + 1 - 1 = 2
        assert!(approx(spec_score(&a, &b, DEFAULT_SPEC_TOLERANCE), 0.5));
    }

    #[test]
    fn test_spec_score_prefers_closest_candidate() {
        // 100 は 95 ではなく 99 と組み、95 は 96 と組める
        let a = extract_specs("100 MM 96 MM");
        let b = extract_specs("95 MM 99 MM");
        assert!(approx(spec_score(&a, &b, DEFAULT_SPEC_TOLERANCE), 1.0));
    }

    #[test]
    fn test_spec_score_greedy_in_order() {
        // 先に出現した 100 が 105 を取り、110 には候補が残らない
        let a = extract_specs("100 MM 110 MM");
        let b = extract_specs("105 MM");
        assert!(approx(spec_score(&a, &b, DEFAULT_SPEC_TOLERANCE), 0.5));
    }

    #[test]
    fn test_spec_score_units_do_not_cross() {
        let a = extract_specs("100 MM");
        let b = extract_specs("100 CM");
        assert!(approx(spec_score(&a, &b, DEFAULT_SPEC_TOLERANCE), 0.0));
    }

    #[test]
    fn test_tokenize_filters() {
        let tokens = tokenize("Martillo de uña 16 OZ, mango-fibra 2024");
        assert!(tokens.contains("martillo"));
        assert!(tokens.contains("mangofibra"));
        assert!(!tokens.contains("de"));
        assert!(!tokens.contains("2024"));
        assert!(!tokens.contains("oz"));
        // 非ASCII文字を落とした結果 "ua" になり、短いので捨てられる
        assert!(!tokens.contains("ua"));
        assert!(!tokens.contains("uña"));
    }

    #[test]
    fn test_tokenize_numeric_literals() {
        let tokens = tokenize("1e5 0x1f abc123 123abc");
        assert!(!tokens.contains("1e5"));
        assert!(!tokens.contains("0x1f"));
        assert!(tokens.contains("abc123"));
        assert!(tokens.contains("123abc"));
    }

    #[test]
    fn test_text_only_similarity() {
        // tokens: {martillo, acero} vs {martillo, madera}
        let score = similarity("MARTILLO ACERO", "martillo madera");
        assert!(approx(score, 1.0 / 3.0));
    }

    #[test]
    fn test_weighted_combination() {
        // spec: 680 vs 680 -> 1.0 / text: {machete, mango} vs {machete, acero} -> 1/3
        let b = breakdown("MACHETE MANGO 680 MM", "MACHETE ACERO 680 MM", DEFAULT_SPEC_TOLERANCE);
        assert!(b.has_specs);
        assert!(approx(b.spec_score, 1.0));
        assert!(approx(b.text_score, 1.0 / 3.0));
        assert!(approx(b.score, 0.75 + 0.25 / 3.0));
    }

    #[test]
    fn test_similarity_deterministic() {
        let a = "SIERRA CIRCULAR 1400 W 7 1/4\"";
        let b = "Sierra circular 1500W 7.25 PULG";
        assert_eq!(similarity(a, b), similarity(a, b));
    }
}

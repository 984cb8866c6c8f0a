//! 技術仕様（数値＋単位）の抽出
//!
//! 商品説明の自由記述から「680 MM」「1,5 KG」「3/4"」のような
//! 計測値を単位ごとに集める。

use regex::Regex;
use std::collections::BTreeMap;

/// 認識する単位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Unit {
    Mm,
    Cm,
    M,
    Gr,
    Kg,
    Kw,
    Hp,
    V,
    W,
    Lt,
    Gal,
    /// インチ（`"` もこれに正規化）
    Pulg,
}

impl Unit {
    /// 単位記号から変換（大文字小文字を区別しない）
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let unit = match symbol.to_uppercase().as_str() {
            "MM" => Unit::Mm,
            "CM" => Unit::Cm,
            "M" => Unit::M,
            "GR" => Unit::Gr,
            "KG" => Unit::Kg,
            "KW" => Unit::Kw,
            "HP" => Unit::Hp,
            "V" => Unit::V,
            "W" => Unit::W,
            "LT" => Unit::Lt,
            "GAL" => Unit::Gal,
            "PULG" | "\"" => Unit::Pulg,
            _ => return None,
        };
        Some(unit)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Mm => "MM",
            Unit::Cm => "CM",
            Unit::M => "M",
            Unit::Gr => "GR",
            Unit::Kg => "KG",
            Unit::Kw => "KW",
            Unit::Hp => "HP",
            Unit::V => "V",
            Unit::W => "W",
            Unit::Lt => "LT",
            Unit::Gal => "GAL",
            Unit::Pulg => "PULG",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.symbol())
    }
}

lazy_static::lazy_static! {
    // 長い単位を先に並べる（MM を M より先に試す）
    static ref SPEC_RE: Regex = Regex::new(
        r#"(?i)([0-9]+(?:[.,][0-9]+)?)\s*(MM|CM|M|GR|KG|KW|HP|V|W|LT|GAL|PULG|")"#
    ).unwrap();
}

/// 単位ごとの計測値（出現順を保持、重複も保持）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementSet {
    values: BTreeMap<Unit, Vec<f64>>,
}

impl MeasurementSet {
    pub fn get(&self, unit: Unit) -> Option<&[f64]> {
        self.values.get(&unit).map(|v| v.as_slice())
    }

    /// 全単位の計測値の合計個数
    pub fn total(&self) -> usize {
        self.values.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn units(&self) -> impl Iterator<Item = Unit> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Unit, &[f64])> + '_ {
        self.values.iter().map(|(u, v)| (*u, v.as_slice()))
    }

    fn push(&mut self, unit: Unit, value: f64) {
        self.values.entry(unit).or_default().push(value);
    }
}

impl std::fmt::Display for MeasurementSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(unit, values)| {
                let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                format!("{}: [{}]", unit, values.join(", "))
            })
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// テキストから計測値を抽出
///
/// 小数点はカンマ・ピリオドのどちらも可（ピリオドに正規化）。
/// 単位にマッチしない数値は無視する。
pub fn extract_specs(text: &str) -> MeasurementSet {
    let mut specs = MeasurementSet::default();
    if text.is_empty() {
        return specs;
    }

    for cap in SPEC_RE.captures_iter(text) {
        let Some(unit) = Unit::from_symbol(&cap[2]) else {
            continue;
        };
        if let Ok(value) = cap[1].replace(',', ".").parse::<f64>() {
            specs.push(unit, value);
        }
    }

    specs
}

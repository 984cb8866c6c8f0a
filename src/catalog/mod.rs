//! 自社商品マスタ（JSON）の読み込み
//!
//! ブランド一覧と商品一覧から、完全一致用の索引と
//! カテゴリで絞り込んだ類似検索用の商品リストを作る。

use crate::error::{GapError, Result};
use catalog_gap_common::{GapIndex, ReferenceProduct};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// ブランド名が引けない商品に付ける名前
const UNKNOWN_BRAND: &str = "Unknown";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductEntry {
    pub id: String,
    pub code: String,
    /// 商品カテゴリ（市場カタログの「Categoría」と照合）
    pub category: String,
    pub description: String,
    pub brand_id: Option<String>,
    pub brand_name: Option<String>,
}

/// 自社商品マスタ
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceCatalog {
    pub brands: Vec<BrandEntry>,
    pub products: Vec<ProductEntry>,
}

impl ReferenceCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GapError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| GapError::InvalidCatalog(format!("JSONパースエラー: {}", e)))
    }

    /// 全ブランド・全商品から索引を作る（カテゴリは問わない）
    pub fn build_index(&self) -> GapIndex {
        let mut index = GapIndex::new();
        for brand in &self.brands {
            index.insert_brand(&brand.id, &brand.name);
        }
        for product in &self.products {
            if let Some(brand_id) = &product.brand_id {
                index.insert_product(brand_id, &product.code);
            }
        }
        index
    }

    /// 指定カテゴリの類似検索候補（説明文が空の商品は除く）
    pub fn products_for_category(&self, category: &str) -> Vec<ReferenceProduct> {
        let brand_names: HashMap<&str, &str> = self
            .brands
            .iter()
            .map(|b| (b.id.as_str(), b.name.as_str()))
            .collect();

        self.products
            .iter()
            .filter(|p| p.category == category && !p.description.is_empty())
            .map(|p| {
                let brand_name = p
                    .brand_name
                    .clone()
                    .filter(|name| !name.is_empty())
                    .or_else(|| {
                        p.brand_id
                            .as_deref()
                            .and_then(|id| brand_names.get(id))
                            .map(|name| name.trim().to_string())
                    })
                    .unwrap_or_else(|| UNKNOWN_BRAND.to_string());

                ReferenceProduct {
                    id: p.id.clone(),
                    code: p.code.clone(),
                    brand_name,
                    description: p.description.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_JSON: &str = r#"{
        "brands": [
            {"id": "b1", "name": " Truper "},
            {"id": "b2", "name": "Bellota"}
        ],
        "products": [
            {"id": "p1", "code": " T-100 ", "category": "HERRAMIENTAS", "description": "MACHETE 680 MM", "brandId": "b1"},
            {"id": "p2", "code": "B-7", "category": "HERRAMIENTAS", "description": "", "brandId": "b2"},
            {"id": "p3", "code": "B-8", "category": "LIMPIEZA", "description": "ESCOBA", "brandId": "b2"},
            {"id": "p4", "code": "X-1", "category": "HERRAMIENTAS", "description": "ALICATE", "brandName": "Stanley"},
            {"id": "p5", "code": "X-2", "category": "HERRAMIENTAS", "description": "LIMA"}
        ]
    }"#;

    #[test]
    fn test_build_index() {
        let catalog = ReferenceCatalog::from_json(CATALOG_JSON).unwrap();
        let index = catalog.build_index();
        assert_eq!(index.brand_count(), 2);
        assert_eq!(index.brand_id("truper"), Some("b1"));
        assert!(index.contains("b1", "t-100"));
        // 説明文なし・他カテゴリの商品も完全一致の対象
        assert!(index.contains("b2", "B-7"));
        assert!(index.contains("b2", "b-8"));
        assert_eq!(index.product_count(), 3);
    }

    #[test]
    fn test_products_for_category() {
        let catalog = ReferenceCatalog::from_json(CATALOG_JSON).unwrap();
        let products = catalog.products_for_category("HERRAMIENTAS");
        let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p4", "p5"]);
        assert_eq!(products[0].brand_name, "Truper");
        assert_eq!(products[1].brand_name, "Stanley");
        assert_eq!(products[2].brand_name, UNKNOWN_BRAND);
    }

    #[test]
    fn test_invalid_json() {
        let result = ReferenceCatalog::from_json("{ brands: ");
        assert!(matches!(result, Err(GapError::InvalidCatalog(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ReferenceCatalog::load(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(result, Err(GapError::FileNotFound(_))));
    }
}

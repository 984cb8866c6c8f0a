//! 市場スキャン（Web検証）クライアント
//!
//! 外部のスクレイピングサービスに商品名を渡し、販売サイトの掲載情報を取得する。
//! 通信に失敗しても解析結果はそのまま使えるため、失敗は空の結果として扱う。

use crate::config::Config;
use crate::error::{GapError, Result};
use catalog_gap_common::{brand_agnostic_name, ClassifiedRow, GapReport, ScrapedProduct};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const CHECK_MARKET_PATH: &str = "/check-market";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarketCheckRequest {
    pub product_name: String,
    pub extra_keywords: String,
}

impl MarketCheckRequest {
    /// ブランド名を除いた商品名でリクエストを作る
    pub fn for_row(row: &ClassifiedRow, extra_keywords: &str) -> Self {
        Self {
            product_name: brand_agnostic_name(&row.description, &row.brand_name),
            extra_keywords: extra_keywords.trim().to_string(),
        }
    }
}

pub struct MarketScanClient {
    client: Client,
    endpoint: String,
}

impl MarketScanClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("catalog-gap/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GapError::Verification(format!("HTTPクライアント生成エラー: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", config.scraper_url.trim_end_matches('/'), CHECK_MARKET_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 市場スキャンAPIを呼ぶ（失敗はエラーとして返す）
    pub async fn check_market(&self, request: &MarketCheckRequest) -> Result<Vec<ScrapedProduct>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| GapError::Verification(format!("接続エラー: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GapError::Verification(format!("APIエラー: {}", status)));
        }

        response
            .json::<Vec<ScrapedProduct>>()
            .await
            .map_err(|e| GapError::Verification(format!("レスポンス解析エラー: {}", e)))
    }

    /// 1行をスキャンする（失敗時は警告ログを出して空を返す）
    pub async fn scan_row(&self, row: &ClassifiedRow, extra_keywords: &str) -> Vec<ScrapedProduct> {
        let request = MarketCheckRequest::for_row(row, extra_keywords);
        match self.check_market(&request).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(code = %row.code, error = %e, "市場スキャンに失敗");
                Vec::new()
            }
        }
    }
}

/// スキャン対象の行番号を選ぶ
///
/// コード指定があればその行のみ（大文字小文字を区別しない）、
/// なければ類似スコアが閾値未満の行。
pub fn select_rows(report: &GapReport, code: Option<&str>, scan_threshold: f64) -> Vec<usize> {
    report
        .market_products
        .iter()
        .enumerate()
        .filter(|(_, row)| match code {
            Some(code) => row.code.eq_ignore_ascii_case(code.trim()),
            None => row.needs_market_scan(scan_threshold),
        })
        .map(|(i, _)| i)
        .collect()
}

/// 選んだ行を順にスキャンして検証状態を更新する
///
/// スキャン件数を返す。
pub async fn verify_report(
    report: &mut GapReport,
    client: &MarketScanClient,
    targets: &[usize],
    extra_keywords: &str,
    progress: &indicatif::ProgressBar,
) -> usize {
    let mut scanned = 0;

    for &idx in targets {
        let Some(row) = report.market_products.get_mut(idx) else {
            continue;
        };
        progress.set_message(row.code.clone());

        let results = client.scan_row(row, extra_keywords).await;
        tracing::debug!(code = %row.code, results = results.len(), "市場スキャン完了");
        row.apply_scan(results);

        scanned += 1;
        progress.inc(1);
    }

    scanned
}

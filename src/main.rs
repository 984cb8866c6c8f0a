use catalog_gap_common::{similarity, specs, query, MatchStatus};
use catalog_gap_rust::{cli, config, error, export, logging, pipeline, verify};
use clap::Parser;
use cli::{Cli, Commands, ExportFormat};
use config::Config;
use error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Analyze { input, catalog, output, format, threshold } => {
            println!("📊 catalog-gap - ギャップ分析\n");

            let match_config = config.match_config(threshold)?;

            println!("[1/2] 照合中...");
            let spinner = ProgressBar::new_spinner();
            spinner.set_message(input.display().to_string());
            spinner.enable_steady_tick(Duration::from_millis(120));
            let result = pipeline::run_analysis(&input, &catalog, &match_config);
            spinner.finish_and_clear();
            let report = result?;

            println!("✔ カテゴリ: {}", report.category_processed);
            println!("  処理行数: {}", report.total_rows_processed);
            println!("  分類件数: {}", report.market_products.len());
            println!("  未登録（自社ブランド）: {}", report.total_missing_in_system);
            println!("  競合のみ: {}", report.count_by_status(MatchStatus::CompetitorOnly));
            println!("  登録済み: {}\n", report.count_by_status(MatchStatus::Found));

            println!("[2/2] 結果を保存中...");
            let title = input
                .file_stem()
                .map(|s| format!("{}-gap", s.to_string_lossy()))
                .unwrap_or_else(|| "analisis-brechas".into());
            // 入力のxlsxを上書きしないよう別名で出力
            let output = output.unwrap_or_else(|| {
                let extension = match format {
                    ExportFormat::Excel => "xlsx",
                    _ => "json",
                };
                input.with_file_name(format!("{}.{}", title, extension))
            });
            export::export_report(&report, &format, &output, &title)?;

            println!("\n✅ 解析完了");
        }

        Commands::Export { input, format, output, title } => {
            println!("📄 catalog-gap - エクスポート\n");

            let report = export::read_json(&input)?;
            let output_dir = output.unwrap_or_else(|| std::path::PathBuf::from("."));
            export::export_report(&report, &format, &output_dir, &title)?;

            println!("\n✅ エクスポート完了");
        }

        Commands::Similarity { a, b } => {
            let match_config = config.match_config(None)?;
            let result = similarity::breakdown(&a, &b, match_config.spec_tolerance);
            println!("仕様スコア:     {:.4}", result.spec_score);
            println!("テキストスコア: {:.4}", result.text_score);
            println!("仕様あり:       {}", if result.has_specs { "はい" } else { "いいえ" });
            println!("類似度:         {:.4}", result.score);
        }

        Commands::Specs { text } => {
            let set = specs::extract_specs(&text);
            if set.is_empty() {
                println!("仕様が見つかりません");
            } else {
                for (unit, values) in set.iter() {
                    let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                    println!("{:>5}: {}", unit, values.join(", "));
                }
            }
        }

        Commands::Query { description, brand } => {
            let search = query::build_search_query(&description, &brand);
            println!("名称: {}", query::brand_agnostic_name(&description, &brand));
            println!("クエリ: {}", search);
            println!("URL: {}", query::search_url(&search));
        }

        Commands::Verify { input, code, keywords, output } => {
            println!("🔎 catalog-gap - 市場スキャン\n");

            let mut report = export::read_json(&input)?;
            let targets = verify::select_rows(&report, code.as_deref(), config.scan_threshold);
            if targets.is_empty() {
                println!("スキャン対象の行がありません");
                return Ok(());
            }

            let client = verify::MarketScanClient::new(&config)?;
            println!("- {} 件をスキャン中... ({})", targets.len(), client.endpoint());

            let progress = ProgressBar::new(targets.len() as u64);
            if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}") {
                progress.set_style(style);
            }
            let scanned =
                verify::verify_report(&mut report, &client, &targets, &keywords, &progress).await;
            progress.finish_and_clear();

            let output = output.unwrap_or(input);
            export::write_json(&report, &output)?;
            println!("✔ {} 件をスキャン: {}", scanned, output.display());
        }

        Commands::Config { set_scraper_url, set_threshold, set_tolerance, show } => {
            let mut config = config;
            let changed =
                set_scraper_url.is_some() || set_threshold.is_some() || set_tolerance.is_some();

            if let Some(url) = set_scraper_url {
                config.set_scraper_url(url)?;
            }
            if let Some(value) = set_threshold {
                config.set_relevance_threshold(value)?;
            }
            if let Some(value) = set_tolerance {
                config.set_spec_tolerance(value)?;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!("  市場スキャンAPI: {}", config.scraper_url);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  類似商品の閾値: {}", config.relevance_threshold);
                println!("  数値の許容誤差: {}", config.spec_tolerance);
                println!("  スキャン推奨の上限: {}", config.scan_threshold);
            }
        }
    }

    Ok(())
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog-gap")]
#[command(about = "市場カタログと自社商品マスタのギャップ分析ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 市場カタログ（xlsx）を自社マスタと照合
    Analyze {
        /// 市場カタログのxlsxファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 自社商品マスタ（JSON）
        #[arg(short, long, required = true)]
        catalog: PathBuf,

        /// 出力ファイル/ディレクトリ（デフォルト: 入力と同じ場所）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (json/excel/both)
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// 類似商品の採用閾値（0.0-1.0、省略時は設定値）
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// 解析結果JSONからExcel/JSONを生成
    Export {
        /// 解析結果JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力形式 (json/excel/both)
        #[arg(short, long, default_value = "excel")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// レポートタイトル
        #[arg(short, long, default_value = "analisis-brechas")]
        title: String,
    },

    /// 2つの説明文の類似度を表示
    Similarity {
        /// 基準となる説明文
        a: String,

        /// 比較対象の説明文
        b: String,
    },

    /// 説明文から抽出される仕様を表示
    Specs {
        /// 商品説明
        text: String,
    },

    /// Web検証用の検索クエリを表示
    Query {
        /// 商品説明
        description: String,

        /// ブランド名（クエリから除去）
        #[arg(short, long, default_value = "")]
        brand: String,
    },

    /// 市場スキャンAPIで販売状況を検証
    Verify {
        /// 解析結果JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 対象のコード（省略時は類似度が低い行すべて）
        #[arg(long)]
        code: Option<String>,

        /// 追加キーワード（例: "14 dientes"）
        #[arg(short, long, default_value = "")]
        keywords: String,

        /// 出力先（省略時は上書き）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 市場スキャンAPIのURLを設定
        #[arg(long)]
        set_scraper_url: Option<String>,

        /// 類似商品の採用閾値を設定
        #[arg(long)]
        set_threshold: Option<f64>,

        /// 数値一致の許容誤差を設定
        #[arg(long)]
        set_tolerance: Option<f64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum ExportFormat {
    #[default]
    Json,
    Excel,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use json, excel, or both", s)),
        }
    }
}

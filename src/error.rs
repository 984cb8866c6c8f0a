use thiserror::Error;

#[derive(Error, Debug)]
pub enum GapError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("スプレッドシート読み込みエラー: {0}")]
    Spreadsheet(String),

    #[error("カタログファイルが不正: {0}")]
    InvalidCatalog(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("市場スキャンエラー: {0}")]
    Verification(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] catalog_gap_common::Error),
}

pub type Result<T> = std::result::Result<T, GapError>;

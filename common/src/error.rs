//! エラー型定義

use thiserror::Error;

/// 共通エラー型
///
/// 解析を中断するのは入力全体が使えない場合のみ。
/// 行単位の欠損やマスタ不一致は結果データ側で表現する。
#[derive(Error, Debug)]
pub enum Error {
    #[error("入力ファイルが空です")]
    EmptyInput,

    #[error("先頭行からカテゴリを特定できません")]
    MissingCategory,
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_empty_input() {
        let display = format!("{}", Error::EmptyInput);
        assert_eq!(display, "入力ファイルが空です");
    }

    #[test]
    fn test_error_display_missing_category() {
        let display = format!("{}", Error::MissingCategory);
        assert!(display.contains("カテゴリ"));
    }
}

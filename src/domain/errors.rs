use rust_decimal::Decimal;
use thiserror::Error;

/// 書籍データのバリデーションエラー
///
/// 永続化や外部呼び出しなどの副作用が発生する前に検出される。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookValidationError {
    /// 必須の文字列が空（または空白のみ）
    #[error("{0} must not be blank")]
    Blank(&'static str),

    /// 必須項目が指定されていない
    #[error("{0} is required")]
    Missing(&'static str),

    /// ランクが1〜10の範囲外
    #[error("rank must be between 1 and 10, got {0}")]
    RankOutOfRange(i32),

    /// 文字列が長すぎる
    #[error("{field} must be at most {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// 価格の整数部が保存できる桁数を超えている
    #[error("price must be less than {max} in absolute value")]
    PriceOutOfRange { max: Decimal },
}

impl BookValidationError {
    /// 文字数が上限以下であることを確認する
    pub fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), Self> {
        let actual = value.chars().count();
        if actual > max {
            return Err(Self::TooLong { field, max, actual });
        }
        Ok(())
    }
}

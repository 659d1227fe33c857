/// 永続化対象のレコード
///
/// `id`をキーとしてテーブルに書き込まれる単一のエンティティ。
/// 同じ`id`で再度書き込まれた場合は上書きされる（upsert）。
use std::fmt;

use serde_json::Number;
use uuid::Uuid;

/// ペイロードなしリクエスト時に使用するデフォルトの公開年
pub const DEFAULT_YEAR: i64 = 2012;

/// ペイロードなしリクエスト時に使用するデフォルトのタイトル
pub const DEFAULT_TITLE: &str = "The Amazing Spider-Man 2";

/// 整数値の公開年
///
/// 検証済みの10進整数表記を保持する。i64の範囲を超える値も切り捨てずに
/// そのまま数値属性(N)として保存できる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Year(String);

impl Year {
    /// JSONの数値から作成
    ///
    /// `1999.0`や`2e3`のような整数値の浮動小数点数も受け付ける。
    /// 小数部を持つ値、有限でない値は`None`。
    pub fn from_number(n: &Number) -> Option<Self> {
        if let Some(i) = n.as_i64() {
            return Some(Self(i.to_string()));
        }
        if let Some(u) = n.as_u64() {
            return Some(Self(u.to_string()));
        }

        let f = n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0)?;
        if f == 0.0 {
            // -0.0を"0"に正規化
            return Some(Self("0".to_string()));
        }
        Some(Self(format!("{:.0}", f)))
    }

    /// 数値を表す文字列から作成（前後の空白は無視）
    pub fn parse(s: &str) -> Option<Self> {
        let number: Number = s.trim().parse().ok()?;
        Self::from_number(&number)
    }

    /// 10進整数表記を取得
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for Year {
    fn from(year: i64) -> Self {
        Self(year.to_string())
    }
}

impl From<i32> for Year {
    fn from(year: i32) -> Self {
        Self(year.to_string())
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// テーブルに書き込むレコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// パーティションキー（空文字列不可）
    pub id: String,
    /// 公開年（数値属性として保存）
    pub year: Year,
    /// タイトル
    pub title: String,
}

impl Record {
    /// 新しいRecordを作成
    ///
    /// `id`が空でないことは呼び出し元（ペイロード検証）が保証する。
    pub fn new(id: impl Into<String>, year: impl Into<Year>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            year: year.into(),
            title: title.into(),
        }
    }

    /// デフォルト値とランダムなUUID v4のIDでレコードを作成
    pub fn with_generated_id() -> Self {
        Self::new(Uuid::new_v4().to_string(), DEFAULT_YEAR, DEFAULT_TITLE)
    }
}

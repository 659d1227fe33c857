/// リクエストボディのパーサー
///
/// JSONボディをオブジェクトとしてパースし、`year`・`title`・`id`を
/// 検証済みの`Record`に変換する。
use serde_json::{Map, Value};
use thiserror::Error;

use super::{Record, Year};

/// ペイロードのパース・検証エラー
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PayloadError {
    /// ボディがJSONオブジェクトとしてパースできない
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// 必須フィールドが欠落（nullや空のIDを含む）
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// フィールドの型または値が不正
    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// リクエストボディのパーサー
pub struct RecordPayload;

impl RecordPayload {
    /// ボディ文字列をJSONオブジェクトとしてパース
    ///
    /// # 例
    /// ```
    /// use apigw_handler::domain::RecordPayload;
    ///
    /// let body = r#"{"year": 1999, "title": "The Matrix", "id": "abc123"}"#;
    /// assert!(RecordPayload::parse(body).is_ok());
    /// ```
    pub fn parse(body: &str) -> Result<Map<String, Value>, PayloadError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| PayloadError::Malformed(e.to_string()))?;

        match value {
            Value::Object(map) => Ok(map),
            _ => Err(PayloadError::Malformed(
                "payload must be a JSON object".to_string(),
            )),
        }
    }

    /// パース済みのオブジェクトからRecordを取り出す
    ///
    /// `year`, `title`, `id`の順に検証し、最初に失敗したフィールドのエラーを返す。
    /// それ以外のキーは無視する。
    pub fn to_record(payload: &Map<String, Value>) -> Result<Record, PayloadError> {
        let year = Self::extract_year(payload)?;
        let title = Self::extract_title(payload)?;
        let id = Self::extract_id(payload)?;

        Ok(Record::new(id, year, title))
    }

    /// 存在しないキーとnullはどちらも欠落扱い
    fn present<'a>(
        payload: &'a Map<String, Value>,
        field: &'static str,
    ) -> Result<&'a Value, PayloadError> {
        match payload.get(field) {
            None | Some(Value::Null) => Err(PayloadError::MissingField(field)),
            Some(value) => Ok(value),
        }
    }

    /// 整数値であれば`1999.0`や`2e3`、数値文字列も受け付ける
    fn extract_year(payload: &Map<String, Value>) -> Result<Year, PayloadError> {
        let invalid = |reason: &str| PayloadError::InvalidField {
            field: "year",
            reason: reason.to_string(),
        };

        match Self::present(payload, "year")? {
            Value::Number(n) => {
                Year::from_number(n).ok_or_else(|| invalid("must be an integer"))
            }
            Value::String(s) => Year::parse(s).ok_or_else(|| invalid("must be an integer")),
            _ => Err(invalid("must be a number")),
        }
    }

    fn extract_title(payload: &Map<String, Value>) -> Result<String, PayloadError> {
        match Self::present(payload, "title")? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(PayloadError::InvalidField {
                field: "title",
                reason: "must be a string".to_string(),
            }),
        }
    }

    fn extract_id(payload: &Map<String, Value>) -> Result<String, PayloadError> {
        let id = match Self::present(payload, "id")? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => {
                return Err(PayloadError::InvalidField {
                    field: "id",
                    reason: "must be a string".to_string(),
                });
            }
        };

        // パーティションキーは空にできない
        if id.trim().is_empty() {
            return Err(PayloadError::MissingField("id"));
        }

        Ok(id)
    }
}

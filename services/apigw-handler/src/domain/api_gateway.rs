/// API Gatewayプロキシ統合のイベント・レスポンス型
///
/// Lambdaが受け取るイベントのうち、ハンドラーが参照するフィールドのみを定義する。
/// それ以外のフィールドはデシリアライズ時に無視される。
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 成功時のレスポンスメッセージ
pub const SUCCESS_MESSAGE: &str = "Successfully inserted data!";

/// API Gatewayプロキシ統合のリクエストイベント
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayRequest {
    /// HTTPメソッド
    #[serde(default)]
    pub http_method: Option<String>,
    /// リクエストボディ（未指定・空文字列の場合あり）
    #[serde(default)]
    pub body: Option<String>,
    /// リクエストコンテキスト
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

/// リクエストコンテキスト
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RequestContext {
    #[serde(default)]
    pub identity: Option<RequestIdentity>,
}

/// 呼び出し元の識別情報
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestIdentity {
    #[serde(default)]
    pub source_ip: Option<String>,
}

impl ApiGatewayRequest {
    /// 空でないボディを取得
    pub fn payload(&self) -> Option<&str> {
        self.body.as_deref().filter(|body| !body.is_empty())
    }

    /// 送信元IPを取得
    pub fn source_ip(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.identity.as_ref())
            .and_then(|identity| identity.source_ip.as_deref())
    }
}

/// レスポンスボディ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageBody {
    pub message: String,
}

/// API Gatewayプロキシ統合のレスポンス
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayResponse {
    /// HTTPステータスコード
    pub status_code: u16,
    /// レスポンスヘッダー
    pub headers: BTreeMap<String, String>,
    /// JSON文字列化されたボディ
    pub body: String,
}

impl ApiGatewayResponse {
    /// `{"message": ...}`形式のJSONレスポンスを作成
    pub fn message(status_code: u16, message: impl Into<String>) -> Self {
        let body = MessageBody {
            message: message.into(),
        };

        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            status_code,
            headers,
            // String フィールドのみの構造体なのでシリアライズは失敗しない
            body: serde_json::to_string(&body).unwrap_or_default(),
        }
    }

    /// 書き込み成功レスポンス
    pub fn success() -> Self {
        Self::message(200, SUCCESS_MESSAGE)
    }
}

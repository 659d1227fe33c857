/// 書き込みハンドラー
///
/// API Gatewayからのリクエストを1件のレコードとして保存し、JSONレスポンスを返す。
/// ボディがあればそれを検証して保存し、なければデフォルトのレコードを生成して保存する。
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::{ApiGatewayRequest, ApiGatewayResponse, PayloadError, Record, RecordPayload};
use crate::infrastructure::{PayloadErrorPolicy, RecordRepository, RepositoryError};

/// 書き込みハンドラーのエラー型
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IngestError {
    /// ボディがJSONオブジェクトとしてパースできない
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// 必須フィールドが欠落
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// フィールドの型または値が不正
    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// ストレージへの書き込みに失敗
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<PayloadError> for IngestError {
    fn from(err: PayloadError) -> Self {
        match err {
            PayloadError::Malformed(msg) => IngestError::MalformedPayload(msg),
            PayloadError::MissingField(field) => IngestError::MissingField(field),
            PayloadError::InvalidField { field, reason } => {
                IngestError::InvalidField { field, reason }
            }
        }
    }
}

impl From<RepositoryError> for IngestError {
    fn from(err: RepositoryError) -> Self {
        IngestError::StorageUnavailable(err.to_string())
    }
}

impl IngestError {
    /// 呼び出し元の入力に起因するエラーか
    pub fn is_client_error(&self) -> bool {
        !matches!(self, IngestError::StorageUnavailable(_))
    }

    /// エラーに対応するHTTPステータスコード
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() { 400 } else { 500 }
    }
}

/// リクエストを1件のレコードとして保存するハンドラー
///
/// リポジトリは複数の呼び出しで共有される長寿命のハンドルとして注入する。
pub struct IngestHandler<RR>
where
    RR: RecordRepository,
{
    /// レコードリポジトリ
    record_repo: RR,
    /// 書き込み先テーブル名（ログ出力用）
    table_name: String,
    /// 不正なペイロードの扱い
    payload_error_policy: PayloadErrorPolicy,
}

impl<RR> IngestHandler<RR>
where
    RR: RecordRepository,
{
    /// 新しいIngestHandlerを作成（不正なペイロードはエラーとして返す）
    pub fn new(record_repo: RR, table_name: impl Into<String>) -> Self {
        Self::with_policy(record_repo, table_name, PayloadErrorPolicy::default())
    }

    /// 不正なペイロードの扱いを指定してIngestHandlerを作成
    pub fn with_policy(
        record_repo: RR,
        table_name: impl Into<String>,
        payload_error_policy: PayloadErrorPolicy,
    ) -> Self {
        Self {
            record_repo,
            table_name: table_name.into(),
            payload_error_policy,
        }
    }

    /// リクエストを処理
    ///
    /// # 処理フロー
    /// 1. リクエスト情報をログ出力
    /// 2. ボディがあればパース・検証してレコードを作成、なければデフォルトレコードを生成
    /// 3. レコードをリポジトリに書き込み
    /// 4. 200レスポンスを返却
    ///
    /// `PayloadErrorPolicy::Reject`の場合、入力起因のエラーは400レスポンスとして返す。
    /// ストレージエラーは常に`Err`として返す。
    pub async fn handle(
        &self,
        request: &ApiGatewayRequest,
        request_id: &str,
    ) -> Result<ApiGatewayResponse, IngestError> {
        info!(
            request_id = request_id,
            table_name = %self.table_name,
            http_method = request.http_method.as_deref(),
            source_ip = request.source_ip(),
            "Processing request"
        );

        let result = match request.payload() {
            Some(body) => self.insert_payload(body, request_id).await,
            None => self.insert_default(request_id).await,
        };

        match result {
            Ok(()) => Ok(ApiGatewayResponse::success()),
            Err(err)
                if err.is_client_error()
                    && self.payload_error_policy == PayloadErrorPolicy::Reject =>
            {
                warn!(
                    request_id = request_id,
                    error = %err,
                    "Rejected invalid payload"
                );
                Ok(ApiGatewayResponse::message(err.status_code(), err.to_string()))
            }
            Err(err) => {
                error!(
                    request_id = request_id,
                    error = %err,
                    "Failed to process request"
                );
                Err(err)
            }
        }
    }

    /// ボディのレコードを検証して書き込む
    async fn insert_payload(&self, body: &str, request_id: &str) -> Result<(), IngestError> {
        let payload = RecordPayload::parse(body)?;

        info!(
            request_id = request_id,
            item = %serde_json::Value::Object(payload.clone()),
            "Received payload"
        );

        let record = RecordPayload::to_record(&payload)?;
        self.record_repo.put(&record).await?;

        info!(
            request_id = request_id,
            item_id = %record.id,
            "Data inserted successfully"
        );

        Ok(())
    }

    /// デフォルトのレコードを生成して書き込む
    async fn insert_default(&self, request_id: &str) -> Result<(), IngestError> {
        info!(request_id = request_id, "Received request without payload");

        let record = Record::with_generated_id();
        self.record_repo.put(&record).await?;

        info!(
            request_id = request_id,
            item_id = %record.id,
            "Default data inserted successfully"
        );

        Ok(())
    }
}

/// DynamoDBにレコードを書き込むリポジトリ
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use thiserror::Error;

use crate::domain::Record;

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// DynamoDBへの書き込みに失敗（ネットワーク、スロットリング、権限不足など）
    #[error("Write error: {0}")]
    WriteError(String),
}

/// レコード永続化用トレイト
///
/// 実際のDynamoDB実装とテスト用モックを差し替えられるようにする。
/// 複数の呼び出しから同時に使用されるため`Send + Sync`を要求する。
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// レコードを書き込む
    ///
    /// 同じIDのレコードが既に存在する場合は上書きする（upsert）。
    async fn put(&self, record: &Record) -> Result<(), RepositoryError>;
}

/// RecordRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoRecordRepository {
    /// DynamoDBクライアント（内部で接続を共有するためcloneは安価）
    client: DynamoDbClient,
    /// 書き込み先テーブル名
    table_name: String,
}

impl DynamoRecordRepository {
    /// 新しいDynamoRecordRepositoryを作成
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// 書き込み先テーブル名を取得
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// RecordをDynamoDBのアイテムに変換
    ///
    /// `year`は数値型(N)、`title`と`id`は文字列型(S)として保存する。
    pub fn to_item(record: &Record) -> HashMap<String, AttributeValue> {
        HashMap::from([
            ("year".to_string(), AttributeValue::N(record.year.as_str().to_string())),
            ("title".to_string(), AttributeValue::S(record.title.clone())),
            ("id".to_string(), AttributeValue::S(record.id.clone())),
        ])
    }

    /// SDKエラーを原因の連鎖まで含めたWriteErrorに変換
    ///
    /// `SdkError`の`Display`は"service error"のみのため、
    /// スロットリング・権限不足・ネットワーク障害を区別できるよう連鎖全体を残す。
    fn write_error<E: std::error::Error>(err: E) -> RepositoryError {
        RepositoryError::WriteError(DisplayErrorContext(&err).to_string())
    }
}

#[async_trait]
impl RecordRepository for DynamoRecordRepository {
    async fn put(&self, record: &Record) -> Result<(), RepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(Self::to_item(record)))
            .send()
            .await
            .map_err(Self::write_error)?;

        Ok(())
    }
}

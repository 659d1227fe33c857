/// 環境変数からの設定読み込みとDynamoDBクライアントの構築
///
/// 環境変数:
/// - TABLE_NAME: 書き込み先DynamoDBテーブル名（必須）
/// - STORAGE_MAX_ATTEMPTS: AWS SDKの標準リトライにおける最大試行回数（任意）
/// - INVALID_PAYLOAD_POLICY: 不正なペイロードの扱い `propagate` | `reject`（任意）
use aws_config::retry::RetryConfig;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;

pub const TABLE_NAME_VAR: &str = "TABLE_NAME";
pub const STORAGE_MAX_ATTEMPTS_VAR: &str = "STORAGE_MAX_ATTEMPTS";
pub const INVALID_PAYLOAD_POLICY_VAR: &str = "INVALID_PAYLOAD_POLICY";

/// 設定読み込みのエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for environment variable {name}: {value}")]
    InvalidEnvVar { name: String, value: String },
}

/// 不正なペイロード（パース失敗・フィールド欠落）の扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayloadErrorPolicy {
    /// エラーをLambdaの実行エラーとしてそのまま返す（呼び出し側で5xxに変換される）
    #[default]
    Propagate,
    /// 400レスポンスに変換して返す
    Reject,
}

impl PayloadErrorPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "propagate" => Some(Self::Propagate),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// ハンドラーの設定値
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSettings {
    /// 書き込み先テーブル名
    pub table_name: String,
    /// ストレージ書き込みの最大試行回数（Noneの場合はSDKのデフォルト）
    pub storage_max_attempts: Option<u32>,
    /// 不正なペイロードの扱い
    pub payload_error_policy: PayloadErrorPolicy,
}

impl IngestSettings {
    /// 任意のキー参照関数から設定を読み込む
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let table_name = lookup(TABLE_NAME_VAR)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(TABLE_NAME_VAR.to_string()))?;

        let storage_max_attempts = match lookup(STORAGE_MAX_ATTEMPTS_VAR) {
            Some(value) => Some(
                value
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|attempts| *attempts > 0)
                    .ok_or_else(|| ConfigError::InvalidEnvVar {
                        name: STORAGE_MAX_ATTEMPTS_VAR.to_string(),
                        value: value.clone(),
                    })?,
            ),
            None => None,
        };

        let payload_error_policy = match lookup(INVALID_PAYLOAD_POLICY_VAR) {
            Some(value) => {
                PayloadErrorPolicy::parse(&value).ok_or_else(|| ConfigError::InvalidEnvVar {
                    name: INVALID_PAYLOAD_POLICY_VAR.to_string(),
                    value: value.clone(),
                })?
            }
            None => PayloadErrorPolicy::default(),
        };

        Ok(Self {
            table_name,
            storage_max_attempts,
            payload_error_policy,
        })
    }

    /// プロセスの環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// DynamoDBクライアントと設定値
#[derive(Debug, Clone)]
pub struct DynamoDbConfig {
    /// DynamoDBクライアントインスタンス
    client: DynamoDbClient,
    /// 設定値
    settings: IngestSettings,
}

impl DynamoDbConfig {
    /// 環境からAWS設定と設定値を読み込み、DynamoDBクライアントを作成
    ///
    /// AWS認証情報とリージョンはaws-configにより自動読み込みされる。
    pub async fn from_env() -> Result<Self, ConfigError> {
        let settings = IngestSettings::from_env()?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(max_attempts) = settings.storage_max_attempts {
            loader = loader.retry_config(RetryConfig::standard().with_max_attempts(max_attempts));
        }
        let aws_config = loader.load().await;

        let client = DynamoDbClient::new(&aws_config);

        Ok(Self { client, settings })
    }

    /// 明示的な値で新しいDynamoDbConfigを作成（テスト用）
    pub fn new(client: DynamoDbClient, settings: IngestSettings) -> Self {
        Self { client, settings }
    }

    /// DynamoDBクライアントへの参照を取得
    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    /// 設定値を取得
    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// テーブル名を取得
    pub fn table_name(&self) -> &str {
        &self.settings.table_name
    }
}

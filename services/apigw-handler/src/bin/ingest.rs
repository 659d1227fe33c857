/// API Gateway → DynamoDB 書き込みLambdaエントリポイント
///
/// API Gatewayプロキシ統合のリクエストを受け取り、
/// 1件のレコードをDynamoDBに書き込んでJSONレスポンスを返却する。
use std::sync::Arc;

use apigw_handler::application::IngestHandler;
use apigw_handler::domain::{ApiGatewayRequest, ApiGatewayResponse};
use apigw_handler::infrastructure::{DynamoDbConfig, DynamoRecordRepository, init_logging};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // 設定とDynamoDBクライアントはコールドスタート時に一度だけ作成し、
    // warm start時の呼び出しで再利用する
    let config = match DynamoDbConfig::from_env().await {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "設定読み込み失敗");
            return Err(err.into());
        }
    };

    let record_repo =
        DynamoRecordRepository::new(config.client().clone(), config.table_name().to_string());
    let handler = Arc::new(IngestHandler::with_policy(
        record_repo,
        config.table_name(),
        config.settings().payload_error_policy,
    ));

    info!(
        table_name = config.table_name(),
        payload_error_policy = ?config.settings().payload_error_policy,
        storage_max_attempts = config.settings().storage_max_attempts,
        "Lambda関数を初期化"
    );

    let func = service_fn(move |event: LambdaEvent<ApiGatewayRequest>| {
        let handler = Arc::clone(&handler);
        async move { handle_event(&handler, event).await }
    });
    lambda_runtime::run(func).await?;
    Ok(())
}

/// Lambda関数のメインハンドラー
///
/// 入力起因のエラーもストレージエラーも、`IngestHandler`がレスポンスに
/// 変換しなかったものはLambdaの実行エラーとして返す。
async fn handle_event(
    handler: &IngestHandler<DynamoRecordRepository>,
    event: LambdaEvent<ApiGatewayRequest>,
) -> Result<ApiGatewayResponse, Error> {
    let response = handler
        .handle(&event.payload, &event.context.request_id)
        .await?;
    Ok(response)
}

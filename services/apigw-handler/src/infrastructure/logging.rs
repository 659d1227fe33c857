/// ログ基盤モジュール
///
/// Lambda環境向けの構造化ログ設定を提供する。
/// 1イベントにつき1行のJSONを出力し、`level`・`message`と
/// 呼び出し側が渡したフィールドを同じオブジェクトのトップレベルに展開する。
use std::sync::Once;

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// ログサブスクライバー初期化用の同期プリミティブ
static INIT: Once = Once::new();

/// JSON形式のログレイヤーを作成する
///
/// フィールドはイベントのトップレベルに展開される（`flatten_event`）。
pub fn json_layer<S, W>(make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .flatten_event(true)
        .with_current_span(false)
        .with_writer(make_writer)
}

/// Lambda環境向けのログサブスクライバーを初期化する
///
/// 環境変数`RUST_LOG`またはデフォルトのログレベル（info）でフィルタリングを行う。
/// 複数回呼び出しても安全で、最初の呼び出しのみ初期化を実行する。
///
/// # 使用例
/// ```ignore
/// use apigw_handler::infrastructure::init_logging;
///
/// init_logging();
/// tracing::info!("Lambda function started");
/// ```
pub fn init_logging() {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        // 他のサブスクライバーが既に登録されている場合は何もしない
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer(std::io::stdout))
            .try_init();
    });
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    });
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::Value;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// ログ出力をメモリに溜めるライター
    #[derive(Clone, Default)]
    pub struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl BufferWriter {
        /// 出力された各行をJSONとしてパースして返す
        pub fn lines(&self) -> Vec<Value> {
            let buffer = self.0.lock().unwrap();
            String::from_utf8_lossy(&buffer)
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    impl Write for BufferWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = BufferWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// JSONレイヤーを使うサブスクライバーを作成
    pub fn capture_subscriber(writer: BufferWriter) -> impl Subscriber + Send + Sync {
        tracing_subscriber::registry()
            .with(EnvFilter::new("info"))
            .with(json_layer(writer))
    }

    #[test]
    fn test_init_logging_idempotent() {
        // 複数回呼び出してもパニックしない
        init_test_logging();
        init_test_logging();
        init_logging();
        init_logging();
    }

    /// 1回のログ呼び出しが1行のJSONになり、フィールドがトップレベルに展開される
    #[test]
    fn test_json_line_merges_fields() {
        let writer = BufferWriter::default();

        tracing::subscriber::with_default(capture_subscriber(writer.clone()), || {
            tracing::info!(
                request_id = "req-123",
                table_name = "movies",
                http_method = "POST",
                "Processing request"
            );
        });

        let lines = writer.lines();
        assert_eq!(lines.len(), 1);

        let line = &lines[0];
        assert_eq!(line["level"], "INFO");
        assert_eq!(line["message"], "Processing request");
        assert_eq!(line["request_id"], "req-123");
        assert_eq!(line["table_name"], "movies");
        assert_eq!(line["http_method"], "POST");
    }

    /// 数値・真偽値フィールドは型を保って出力される
    #[test]
    fn test_json_line_keeps_primitive_types() {
        let writer = BufferWriter::default();

        tracing::subscriber::with_default(capture_subscriber(writer.clone()), || {
            tracing::warn!(year = 1999_i64, retried = false, "typed fields");
        });

        let line = &writer.lines()[0];
        assert_eq!(line["level"], "WARN");
        assert_eq!(line["year"], 1999);
        assert_eq!(line["retried"], false);
    }

    /// フィルターレベル未満のログは出力されない
    #[test]
    fn test_json_layer_respects_filter() {
        let writer = BufferWriter::default();

        tracing::subscriber::with_default(capture_subscriber(writer.clone()), || {
            tracing::debug!("filtered out");
            tracing::error!(error = "boom", "kept");
        });

        let lines = writer.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "ERROR");
        assert_eq!(lines[0]["error"], "boom");
    }
}

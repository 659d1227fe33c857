// アプリケーション層モジュール
pub mod ingest_handler;

// 再エクスポート
pub use ingest_handler::{IngestError, IngestHandler};

// Domain layer modules
pub mod api_gateway;
pub mod record;
pub mod record_payload;

// Re-exports
pub use api_gateway::{ApiGatewayRequest, ApiGatewayResponse, MessageBody, SUCCESS_MESSAGE};
pub use record::{DEFAULT_TITLE, DEFAULT_YEAR, Record, Year};
pub use record_payload::{PayloadError, RecordPayload};

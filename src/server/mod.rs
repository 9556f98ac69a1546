pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{build_payload, parse_query_params, parse_request, ParsedRequest};
pub use response::{encode_error, encode_invocation, write_response, EncodedResponse};
pub use service::{health_endpoint, metrics_endpoint, FunctionService};

mod test_claims;
mod test_config;
mod test_keys;
mod test_logging;
mod test_server;
mod test_server_response;
mod test_server_state;

pub use test_claims::*;
pub use test_config::*;
pub use test_keys::*;
pub use test_logging::*;
pub use test_server::*;
pub use test_server_response::*;

// Tool registry, validation, dispatch and the stdio transport
pub mod dispatcher;
pub mod handler;
pub mod invoker;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod transport;

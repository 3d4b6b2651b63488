pub mod dispatcher;
pub mod filter;
pub mod httpx;
pub mod orchestrator;
pub mod sink;
pub mod source;
pub mod synthesize;

pub mod cases;
pub mod config;
pub mod dispatch;
pub mod exception;
pub mod handler;
pub mod param;
pub mod request;
pub mod response;
pub mod util;

pub use cases::{Case, CaseContext, CASES};
pub use config::Config;
pub use dispatch::dispatch;
pub use exception::Exception;
pub use handler::Content;
pub use param::{HttpRequestMethod, HttpVersion};
pub use request::Request;
pub use response::Response;

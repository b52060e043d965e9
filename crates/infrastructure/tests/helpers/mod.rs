mod http_server_mock;
mod mock_fetcher;
mod scripts;

pub use http_server_mock::*;
pub use mock_fetcher::*;
pub use scripts::*;

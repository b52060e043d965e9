pub mod bridge;
pub mod reqwest_fetcher;

pub use bridge::FetchBridge;
pub use reqwest_fetcher::ReqwestFetcher;

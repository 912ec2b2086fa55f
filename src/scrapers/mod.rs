pub mod finnhub_rest; // REST client for the upstream market-data API

pub use finnhub_rest::FinnhubClient;

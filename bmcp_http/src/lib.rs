pub mod binance;
pub mod client;
pub mod errors;
pub mod exchange;
pub mod signer;
#[cfg(feature = "test-util")]
pub mod testing;
pub mod types;

pub use binance::BinanceClient;
pub use binance::BinanceClientBuilder;
pub use client::HttpClient;
pub use client::HttpClientConfig;
pub use errors::ExchangeError;
pub use errors::ExchangeErrorKind;
pub use errors::Result;
pub use exchange::ExchangeClient;
pub use exchange::ExchangeFuture;
pub use signer::RequestSigner;
pub use types::IncomeQuery;
pub use types::OrderRequest;
pub use types::OrderSide;
pub use types::OrderType;

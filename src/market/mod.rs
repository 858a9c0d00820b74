pub mod mock;
pub mod types;
pub mod yahoo;

use anyhow::Result;

use mock::MockMarketData;
use types::DailyQuotes;
use yahoo::YahooClient;

/// The data source behind the fetch contract. The mock variant shares the
/// exact pipeline downstream of the fetch with the live one.
pub enum DataSource {
    Yahoo(YahooClient),
    Mock(MockMarketData),
}

impl DataSource {
    pub fn fetch_daily(&self, symbol: &str, period: &str) -> Result<DailyQuotes> {
        match self {
            Self::Yahoo(client) => client.fetch_daily(symbol, period),
            Self::Mock(source) => source.fetch_daily(symbol, period),
        }
    }
}

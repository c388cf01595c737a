use std::fmt;

use serde::Serialize;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub const ALL: [OrderSide; 2] = [OrderSide::Buy, OrderSide::Sell];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spot order types accepted by `POST /api/v3/order`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
    StopLoss,
    StopLossLimit,
    TakeProfit,
    TakeProfitLimit,
    LimitMaker,
}

impl OrderType {
    pub const ALL: [OrderType; 7] = [
        OrderType::Limit,
        OrderType::Market,
        OrderType::StopLoss,
        OrderType::StopLossLimit,
        OrderType::TakeProfit,
        OrderType::TakeProfitLimit,
        OrderType::LimitMaker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
            OrderType::StopLoss => "STOP_LOSS",
            OrderType::StopLossLimit => "STOP_LOSS_LIMIT",
            OrderType::TakeProfit => "TAKE_PROFIT",
            OrderType::TakeProfitLimit => "TAKE_PROFIT_LIMIT",
            OrderType::LimitMaker => "LIMIT_MAKER",
        }
    }

    /// Types that rest on the book at a limit price
    pub fn requires_price(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLossLimit | OrderType::TakeProfitLimit | OrderType::LimitMaker)
    }

    /// Types for which Binance expects a `timeInForce`
    pub fn requires_time_in_force(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLossLimit | OrderType::TakeProfitLimit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New spot order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: f64,
    pub price: Option<f64>,
    pub time_in_force: Option<String>,
}

impl OrderRequest {
    /// Query parameters in the order Binance documents them
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("symbol", self.symbol.clone()),
            ("side", self.side.as_str().to_string()),
            ("type", self.order_type.as_str().to_string()),
            ("quantity", self.quantity.to_string()),
        ];

        if let Some(price) = self.price {
            params.push(("price", price.to_string()));
        }

        match &self.time_in_force {
            Some(tif) => params.push(("timeInForce", tif.clone())),
            None if self.order_type.requires_time_in_force() => params.push(("timeInForce", "GTC".to_string())),
            None => {}
        }

        params
    }
}

/// Futures income history filter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncomeQuery {
    pub symbol: Option<String>,
    pub income_type: Option<String>,
    pub limit: Option<u32>,
}

impl IncomeQuery {
    /// Realized PnL entries, optionally for one symbol
    pub fn realized_pnl(symbol: Option<String>, limit: Option<u32>) -> Self {
        Self { symbol, income_type: Some("REALIZED_PNL".to_string()), limit }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(symbol) = &self.symbol {
            params.push(("symbol", symbol.clone()));
        }
        if let Some(income_type) = &self.income_type {
            params.push(("incomeType", income_type.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_type_strings() {
        let names: Vec<_> = OrderType::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, ["LIMIT", "MARKET", "STOP_LOSS", "STOP_LOSS_LIMIT", "TAKE_PROFIT", "TAKE_PROFIT_LIMIT", "LIMIT_MAKER"]);
        assert_eq!(serde_json::to_value(OrderType::StopLossLimit).unwrap(), "STOP_LOSS_LIMIT");
    }

    #[test]
    fn test_limit_order_params_default_gtc() {
        let order = OrderRequest {
            symbol: "BTCUSDT".into(),
            side: OrderSide::Buy,
            order_type: OrderType::Limit,
            quantity: 0.001,
            price: Some(50000.0),
            time_in_force: None,
        };

        let params = order.params();
        assert!(params.contains(&("timeInForce", "GTC".to_string())));
        assert!(params.contains(&("price", "50000".to_string())));
        assert!(params.contains(&("quantity", "0.001".to_string())));
    }

    #[test]
    fn test_market_order_params() {
        let order = OrderRequest {
            symbol: "ETHUSDT".into(),
            side: OrderSide::Sell,
            order_type: OrderType::Market,
            quantity: 0.1,
            price: None,
            time_in_force: None,
        };

        let params = order.params();
        assert_eq!(params.len(), 4);
        assert!(params.contains(&("side", "SELL".to_string())));
    }

    #[test]
    fn test_requires_price() {
        assert!(OrderType::LimitMaker.requires_price());
        assert!(!OrderType::Market.requires_price());
        assert!(!OrderType::LimitMaker.requires_time_in_force());
    }

    #[test]
    fn test_income_query() {
        let query = IncomeQuery::realized_pnl(Some("BTCUSDT".into()), Some(50));
        assert_eq!(query.params(), vec![("symbol", "BTCUSDT".into()), ("incomeType", "REALIZED_PNL".into()), ("limit", "50".into())]);
    }
}

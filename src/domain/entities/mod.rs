pub mod ai_answer;
pub mod asset_quote;
pub mod market_overview;
pub mod news_item;
pub mod price_chart;
pub mod search_result;
pub mod stock_quote;

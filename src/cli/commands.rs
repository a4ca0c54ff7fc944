use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "finboard", about = "Market data client for the finboard backend")]
pub struct Cli {
    /// Print pretty JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask the AI assistant a finance question
    Ask {
        /// Question text (1-500 characters)
        query: String,
    },
    /// Top cryptocurrencies by market cap
    Crypto {
        #[arg(long, default_value = "100")]
        limit: usize,
    },
    /// Bitcoin snapshot
    Bitcoin,
    /// Financial news
    News {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// Free-text finance search
    Search {
        query: String,
    },
    /// Backend health probe
    Health,
    /// Stock quotes
    Stocks,
    /// Crypto, stocks and forex overview
    Market,
    /// Historical price chart for one coin
    Chart {
        /// CoinGecko-style id (e.g. bitcoin, ethereum)
        coin_id: String,
        #[arg(long, default_value = "30")]
        days: u32,
    },
    /// Live crypto list through the cache, refreshed on an interval
    Watch {
        #[arg(long, default_value = "10")]
        limit: usize,
        #[arg(long, default_value = "60")]
        interval_secs: u64,
        /// Stop after this many updates (runs until Ctrl-C when omitted)
        #[arg(long)]
        updates: Option<usize>,
    },
}

pub mod binance_rest;
pub mod binance_stream;
pub mod csv_parser;
pub mod history;
pub mod live_feed;
pub mod symbol_store;

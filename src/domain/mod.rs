//! Core domain types and logic: language front end, evaluator, market-data
//! environment, indicator library and strategy ledger.

pub mod account;
pub mod ast;
pub mod catalog;
pub mod config;
pub mod config_validation;
pub mod drawing;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod indicator;
pub mod lexer;
pub mod metrics;
pub mod notification;
pub mod ohlcv;
pub mod parser;
pub mod position;
pub mod registry;
pub mod runtime;
pub mod series;
pub mod token;
pub mod value;

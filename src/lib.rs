//! Bank statement extraction library.
//!
//! The flow for one statement is: acquire text ([`ocr`]), match transaction
//! lines ([`statement`]), lay them out as a table and write a workbook
//! ([`sheet`]). [`pipeline`] ties the steps to an upload directory and
//! [`server`] exposes them over HTTP.

pub mod cli;
pub mod config;
pub mod ocr;
pub mod pipeline;
pub mod server;
pub mod sheet;
pub mod statement;

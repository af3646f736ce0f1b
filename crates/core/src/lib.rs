#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod intake;
pub mod query;
pub mod record;
pub mod schema;
pub mod storage;

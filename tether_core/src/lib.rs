#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod cobs;
pub mod config;
pub mod crc;
pub mod parser;
pub mod serialize;

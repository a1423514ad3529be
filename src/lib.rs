pub mod cli;
pub mod libris;

pub mod indexer;
pub mod request;
pub mod tokenization;

pub mod corpus;
pub mod corpus_error;
pub mod segment;
pub mod transcript;

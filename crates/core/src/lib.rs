pub mod audio;
pub mod corpus;
pub mod matching;
pub mod navigation;
pub mod pipeline;
pub mod shared;

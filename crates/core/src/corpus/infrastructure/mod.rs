pub mod json_corpus_loader;

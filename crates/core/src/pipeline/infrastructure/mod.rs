pub mod threaded_streaming_pipeline;

pub mod event_sink;

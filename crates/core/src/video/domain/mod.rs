pub mod capture_device;
pub mod image_encoder;
pub mod image_reader;
pub mod image_writer;

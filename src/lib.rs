//! A small gRPC service showing the four interaction patterns: unary,
//! server streaming, client streaming, and bidirectional streaming.

pub mod pb {
    tonic::include_proto!("patterns");

    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("patterns_descriptor");
}

mod service;

pub use service::{PatternsService, QUIT_COMMAND};

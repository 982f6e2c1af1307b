fn main() {
    let out_dir = std::path::PathBuf::from(std::env::var("OUT_DIR").unwrap());
    tonic_build::configure()
        .file_descriptor_set_path(out_dir.join("patterns_descriptor.bin"))
        .compile(&["proto/patterns.proto"], &["proto"])
        .unwrap();
}

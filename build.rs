use std::{env, error::Error};

fn main() -> Result<(), Box<dyn Error>> {
    built::write_built_file()?;

    // Use the vendored protoc so builds don't depend on a system install.
    let protoc = protoc_bin_vendored::protoc_bin_path()?;
    env::set_var("PROTOC", protoc);
    let well_known = protoc_bin_vendored::include_path()?;
    let proto_dir = env::current_dir()?.join("proto");

    println!("cargo:rerun-if-changed=proto/simplebank.proto");

    tonic_build::configure()
        .build_client(false)
        .build_server(true)
        .compile_protos(
            &[proto_dir.join("simplebank.proto")],
            &[proto_dir, well_known],
        )?;

    Ok(())
}

const PROTOS: &[&str] = &[
    "../../../proto/auth/v1/auth.proto",
    "../../../proto/product/v1/product.proto",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    for proto in PROTOS {
        println!("cargo:rerun-if-changed={proto}");
    }

    // Server stubs back the auth and product services, client stubs back the
    // relay and the user service's catalogue client.
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(PROTOS, &["../../../proto"])?;

    Ok(())
}

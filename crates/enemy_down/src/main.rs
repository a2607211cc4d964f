#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    lib_enemy_down::init().await?;
    // A pending stdin read would keep the runtime from shutting down.
    std::process::exit(0)
}

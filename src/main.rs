#[tokio::main]
async fn main() {
    encontro::start_server().await;
}

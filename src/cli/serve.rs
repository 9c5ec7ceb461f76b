use crate::api;
use crate::core::AppConfig;

pub async fn run(host: String, port: String) {
    let config = AppConfig::default();
    println!("Kora server: http://{}:{}", host, port);
    api::serve(host, port, config).await;
}

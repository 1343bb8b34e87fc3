#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    jbr_website_server::run().await
}

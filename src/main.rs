use backend::settings::get_settings;
use backend::startup::{Application, StartupError};
use backend::telemetry::{get_subscriber, init_subscriber};
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenv().ok();

    let settings = get_settings()?;

    let subscriber = get_subscriber(settings.debug);
    init_subscriber(subscriber);

    let application = Application::build(settings, None).await?;

    tracing::event!(target: "backend", tracing::Level::INFO, "Listening on http://127.0.0.1:{}/",
        application.port());

    application.run_until_stopped().await?;
    Ok(())
}

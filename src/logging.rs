use once_cell::sync::Lazy;
pub use slog::*;

fn wrap<D: Drain<Err = Never, Ok = ()> + Send + 'static>(drain: D) -> Fuse<slog_async::Async> {
    slog_async::Async::default(slog_envlogger::new(drain)).fuse()
}

pub static DEFAULT: Lazy<Logger> = Lazy::new(|| {
    let format = std::env::var("LOG_FORMAT").unwrap_or_default();
    let drain = match format.as_str() {
        "json" => wrap(slog_json::Json::default(std::io::stdout()).fuse()),
        _ => {
            let decorator = slog_term::TermDecorator::new().build();
            wrap(slog_term::FullFormat::new(decorator).build().fuse())
        }
    };

    Logger::root(
        drain,
        o!(
            "version" => env!("CARGO_PKG_VERSION"),
        ),
    )
});

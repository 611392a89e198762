use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Middleware для логирования HTTP запросов: длительность, статус, метод,
/// путь и строка запроса
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let duration = start.elapsed();
    if response.status().is_success() {
        tracing::info!(
            "{:>5}ms | {} {:>6} {}",
            duration.as_millis(),
            status,
            method,
            uri
        );
    } else {
        tracing::warn!(
            "{:>5}ms | {} {:>6} {}",
            duration.as_millis(),
            status,
            method,
            uri
        );
    }

    response
}

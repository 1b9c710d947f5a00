use http::Method;
use http::header::{ACCEPT, CONTENT_TYPE};
use micro_body::content_type::ContentKind;
use micro_body::stream::{JsonFormat, Stream, StructuredStream};
use micro_message::{Message, MethodMask, Request, Response};
use serde_json::json;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let allowed = MethodMask::POST | MethodMask::PUT;
    info!(%allowed, "accepting body methods");

    let json_request: Request = http::Request::builder()
        .method(Method::POST)
        .uri("/users?notify=1")
        .header(CONTENT_TYPE, "application/json; charset=utf-8")
        .body(r#"{"name": "ada", "roles": ["admin"]}"#)
        .expect("valid request")
        .into();

    let form_request: Request = http::Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(ACCEPT, "text/html")
        .header(CONTENT_TYPE, mime::APPLICATION_WWW_FORM_URLENCODED.as_ref())
        .body("user=ada&remember=on")
        .expect("valid request")
        .into();

    let native_request = Request::new(Method::PUT, "/settings".parse().expect("valid uri"))
        .with_header(CONTENT_TYPE, ContentKind::Native.mime_type())
        .expect("valid header")
        .with_body(StructuredStream::new(json!({"theme": "dark"})));

    let yaml_request: Request = http::Request::builder()
        .method(Method::POST)
        .header(CONTENT_TYPE, "text/yaml")
        .body("name: ada")
        .expect("valid request")
        .into();

    for mut request in [json_request, form_request, native_request, yaml_request] {
        if !allowed.contains(request.method()) {
            info!(method = %request.method(), "skipping request");
            continue;
        }

        let target = request.request_target().to_owned();
        let kind = request.content_kind();
        match request.parsed_body() {
            Ok(Some(body)) => info!(%target, ?kind, %body, "parsed request body"),
            Ok(None) => info!(%target, ?kind, "request has no decodable body"),
            Err(e) => error!(%target, ?kind, cause = %e, "failed to parse request body"),
        }
    }

    let mut response = Response::structured(json!({"status": "ok", "count": 3}), JsonFormat::Pretty);
    let rendered = response.to_full_string();
    info!(status = %response.status(), size = ?response.body().size(), "response body:\n{rendered}");
}

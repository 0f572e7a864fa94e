//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::{
    extract::Form,
    http::{header::SET_COOKIE, HeaderMap},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

use req_fetch::{install_on, FetchConfig};

/// Serve `app` on an ephemeral local port, with peer addresses available.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await;
    });
    addr
}

fn header_text(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// How long the backend's `/slow` route holds its response.
pub const SLOW_RESPONSE: Duration = Duration::from_secs(2);

/// Start the upstream the front app talks to.
pub async fn start_backend() -> SocketAddr {
    let app = Router::new()
        .route("/ok", get(|| async { "OK" }))
        .route(
            "/ips",
            get(|headers: HeaderMap| async move { header_text(&headers, "x-forwarded-for") }),
        )
        .route(
            "/cookie",
            get(|headers: HeaderMap| async move { header_text(&headers, "cookie") }),
        )
        .route(
            "/json",
            post(|Json(body): Json<HashMap<String, String>>| async move {
                body.get("hello").cloned().unwrap_or_default()
            }),
        )
        .route(
            "/urlencoded",
            post(|Form(body): Form<HashMap<String, String>>| async move {
                body.get("hello").cloned().unwrap_or_default()
            }),
        )
        .route(
            "/echo",
            post(|headers: HeaderMap, body: String| async move {
                format!("{}|{}", header_text(&headers, "content-type"), body)
            }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(SLOW_RESPONSE).await;
                "slow"
            }),
        )
        .route(
            "/set-cookie",
            get(|| async {
                let mut headers = HeaderMap::new();
                headers.append(
                    SET_COOKIE,
                    "hello=world; Max-Age=3600; Domain=example.com; Path=/helloworld"
                        .parse()
                        .unwrap(),
                );
                headers.append(SET_COOKIE, "abc=123; Path=/abc123".parse().unwrap());
                (headers, "OK").into_response()
            }),
        );

    serve(app).await
}

/// Install the fetch middleware on `routes` and serve it.
pub async fn start_front(config: FetchConfig, routes: Router) -> SocketAddr {
    let app = install_on(routes, config).unwrap();
    serve(app).await
}

pub fn backend_url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

#![cfg(feature = "inmem-store")]

mod common;

use actix_web::{test, App};
use common::{setup_env, MockMediaStore};
use mosaic::repo::inmem::InMemRepo;
use mosaic::{config, AppState, SecurityHeaders};
use serial_test::serial;
use std::sync::Arc;

macro_rules! app {
    ($headers:expr) => {
        test::init_service(
            App::new()
                .wrap($headers)
                .app_data(actix_web::web::Data::new(AppState {
                    repo: Arc::new(InMemRepo::new()),
                    media_store: Arc::new(MockMediaStore::ok()),
                }))
                .configure(config),
        )
        .await
    };
}

#[actix_web::test]
#[serial]
async fn baseline_headers_are_applied() {
    setup_env();
    std::env::remove_var("S3_PUBLIC_BASE");
    let app = app!(SecurityHeaders::from_env());

    let req = test::TestRequest::get().uri("/healthz").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let headers = resp.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("referrer-policy").unwrap(), "no-referrer");
    // without a configured media base the CSP falls back to any https origin
    let csp = headers.get("content-security-policy").unwrap().to_str().unwrap();
    assert!(csp.contains("img-src 'self' data: https:"));
    assert!(csp.contains("media-src 'self' https:"));
}

#[actix_web::test]
#[serial]
async fn csp_whitelists_the_media_origin() {
    setup_env();
    std::env::set_var("S3_PUBLIC_BASE", "https://cdn.example.com/mosaic-media");
    let app = app!(SecurityHeaders::from_env());
    std::env::remove_var("S3_PUBLIC_BASE");

    let req = test::TestRequest::get().uri("/healthz").to_request();
    let resp = test::call_service(&app, req).await;
    let csp = resp
        .headers()
        .get("content-security-policy")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(csp.contains("img-src 'self' data: https://cdn.example.com/mosaic-media"));
    assert!(csp.contains("media-src 'self' https://cdn.example.com/mosaic-media"));
}

#[actix_web::test]
#[serial]
async fn hsts_is_opt_in() {
    setup_env();

    let app = app!(SecurityHeaders::from_env().with_hsts(true));
    let req = test::TestRequest::get().uri("/healthz").to_request();
    let resp = test::call_service(&app, req).await;
    let sts = resp.headers().get("strict-transport-security").unwrap();
    assert!(sts.to_str().unwrap().contains("max-age="));

    let app = app!(SecurityHeaders::from_env().with_hsts(false));
    let req = test::TestRequest::get().uri("/healthz").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.headers().get("strict-transport-security").is_none());
}

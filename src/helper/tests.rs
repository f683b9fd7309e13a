// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! End-to-end scenarios over the Given/When/Get vocabulary

use std::time::Duration;

use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::error::Error;
use crate::network::test_support::FixedTransport;
use crate::network::{InterceptSpec, RulePrecedence};
use crate::runner::HelperConfig;

const INDEX_URL: &str = "https://app.test/index.html";

const INDEX: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Test utils</title>
  <style>
    button { background-color: blue; }
    [data-hook='button'] { background-color: rgb(255, 0, 0); }
  </style>
</head>
<body>
  <h1 data-hook="header">My First Heading</h1>
  <p data-hook="paragraph">My First Paragraph</p>
  <img data-hook="image" src="w3schools.jpg" alt="W3Schools.com">

  <form action="index.html" method="get">
    <input type="text" data-hook="name-input" name="fname" value="John">
    <input type="text" data-hook="last-name-input" name="lname" value="Doe">
    <input type="submit" data-hook="submit" value="Submit">
  </form>

  <button data-hook="button" disabled>Click me</button>

  <select data-hook="select" name="cars">
    <option value="volvo">Volvo</option>
    <option value="saab">Saab</option>
    <option value="opel">Opel</option>
  </select>

  <div data-hook="radio-group">
    <input type="radio" data-hook="radio" name="lang" value="html">
    <input type="radio" data-hook="radio" name="lang" value="css">
    <input type="radio" data-hook="radio" name="lang" value="js">
  </div>

  <input type="checkbox" data-hook="checkbox" name="v1" value="Bike">
  <input type="checkbox" data-hook="checkbox" name="v2" value="Car">
  <input type="checkbox" data-hook="checkbox" name="v3" value="Boat">
</body>
</html>"#;

fn config(timeout_ms: u64) -> HelperConfig {
    HelperConfig::new()
        .timeout(Duration::from_millis(timeout_ms))
        .poll_interval(Duration::from_millis(5))
        .env_var("env1", "value1")
}

fn context(timeout_ms: u64) -> TestContext {
    crate::init_test_logging();
    TestContext::with_transport(config(timeout_ms), FixedTransport::new("unmocked"))
}

/// Context with the index page mocked and visited
async fn index_context() -> TestContext {
    let ctx = context(250);
    ctx.given()
        .intercept_and_mock_response(InterceptSpec::new("**/index.html*").text(INDEX))
        .unwrap();
    ctx.when().visit(INDEX_URL).await.unwrap();
    ctx
}

// Interception and aliased exchanges

#[tokio::test]
async fn test_intercept_and_mock_response() {
    let ctx = context(1000);
    ctx.given()
        .intercept_and_mock_response(
            InterceptSpec::new("**/shellygo/whatever").response(json!({ "shelly": "go" })),
        )
        .unwrap();

    let response = ctx
        .when()
        .fetch("GET", "https://shellygo.test/shellygo/whatever")
        .await
        .unwrap();
    assert!(response.mocked);
    assert_eq!(response.json::<serde_json::Value>().unwrap(), json!({ "shelly": "go" }));
}

#[tokio::test]
async fn test_query_param_waits_for_exchange() {
    let ctx = context(1000);
    let when = ctx.when();
    let pending = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        when.fetch("GET", "https://shellygo.test/shellygo/whatever?shelly=go")
            .await
    });

    ctx.given()
        .intercept_and_mock_response(
            InterceptSpec::new("**/shellygo/whatever**")
                .response(json!({ "shelly": "go" }))
                .alias("shellygo"),
        )
        .unwrap();

    let value = ctx.get().request_query_param("shellygo", "shelly").await.unwrap();
    assert_eq!(value.as_deref(), Some("go"));
    assert_eq!(
        ctx.get().request_query_param("shellygo", "absent").await.unwrap(),
        None
    );
    assert_ok!(pending.await.unwrap());
}

#[tokio::test]
async fn test_post_body_and_header() {
    let ctx = context(1000);
    ctx.given()
        .intercept_and_mock_response(
            InterceptSpec::new("**/x")
                .method("POST")
                .response(json!({ "shelly": "go" }))
                .alias("postX"),
        )
        .unwrap();

    let request = ctx
        .page()
        .request(reqwest::Method::POST, "https://api.test/v1/x")
        .unwrap()
        .json(&json!({ "a": 1 }))
        .unwrap()
        .header("shelly", "go");
    ctx.when().send(request).await.unwrap();

    let get = ctx.get();
    assert_eq!(get.request_body("postX").await.unwrap(), json!({ "a": 1 }));
    assert_eq!(
        get.request_header("postX", "Shelly").await.unwrap().as_deref(),
        Some("go")
    );
    let headers = get.request_headers("postX").await.unwrap();
    assert_eq!(headers.get("shelly").map(String::as_str), Some("go"));
    assert_eq!(
        headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
    assert_eq!(get.response_body("postX").await.unwrap(), json!({ "shelly": "go" }));
    assert_eq!(
        get.request_header("postX", "x-missing").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_last_registered_rule_wins() {
    let ctx = context(1000);
    let given = ctx.given();
    given
        .intercept_and_mock_response(InterceptSpec::new("**/y").response(json!({ "n": 1 })).alias("y1"))
        .unwrap();
    given
        .intercept_and_mock_response(InterceptSpec::new("**/y").response(json!({ "n": 2 })).alias("y2"))
        .unwrap();

    let response = ctx.when().fetch("GET", "https://api.test/y").await.unwrap();
    assert_eq!(response.json::<serde_json::Value>().unwrap(), json!({ "n": 2 }));

    // Both aliases observe the exchange
    let get = ctx.get();
    assert_eq!(get.response_body("y1").await.unwrap(), json!({ "n": 2 }));
    assert_eq!(get.response_body("y2").await.unwrap(), json!({ "n": 2 }));
}

#[tokio::test]
async fn test_first_registered_precedence() {
    let ctx = TestContext::with_transport(
        config(1000).precedence(RulePrecedence::FirstRegistered),
        FixedTransport::new("unmocked"),
    );
    let given = ctx.given();
    given
        .intercept_and_mock_response(InterceptSpec::new("**/y").response(json!({ "n": 1 })))
        .unwrap();
    given
        .intercept_and_mock_response(InterceptSpec::new("**/y").response(json!({ "n": 2 })))
        .unwrap();

    let response = ctx.when().fetch("GET", "https://api.test/y").await.unwrap();
    assert_eq!(response.json::<serde_json::Value>().unwrap(), json!({ "n": 1 }));
}

#[tokio::test]
async fn test_unresolved_alias_times_out() {
    let ctx = context(60);
    ctx.given()
        .intercept_and_mock_response(InterceptSpec::new("**/never").response(json!(1)).alias("never"))
        .unwrap();

    let err = ctx.get().request_body("never").await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.alias(), Some("never"));
    assert!(err.to_string().contains("@never"));

    // Undeclared aliases wait the same way
    let err = ctx.get().exchange("undeclared").await.unwrap_err();
    assert!(matches!(err, Error::AliasNotResolved { ref alias, waited_ms } if alias == "undeclared" && waited_ms >= 60));
}

#[tokio::test]
async fn test_latest_exchange_wins_and_reads_are_stable() {
    let ctx = context(1000);
    ctx.given()
        .intercept_and_mock_response(InterceptSpec::new("**/search*").response(json!([])).alias("search"))
        .unwrap();

    let when = ctx.when();
    when.fetch("GET", "https://api.test/search?q=first").await.unwrap();
    when.fetch("GET", "https://api.test/search?q=second").await.unwrap();

    let get = ctx.get();
    let first_read = get.exchange("search").await.unwrap();
    let second_read = get.exchange("search").await.unwrap();
    assert_eq!(first_read, second_read);
    assert_eq!(first_read.request.query_param("q"), Some("second"));
    assert_eq!(get.interception_count("search"), 2);
    assert_eq!(get.exchanges("search").len(), 2);
}

#[tokio::test]
async fn test_times_limits_rule() {
    let ctx = context(1000);
    ctx.given()
        .intercept_and_mock_response(InterceptSpec::new("**/once").text("mocked").times(1))
        .unwrap();

    let when = ctx.when();
    let first = when.fetch("GET", "https://api.test/once").await.unwrap();
    let second = when.fetch("GET", "https://api.test/once").await.unwrap();
    assert_eq!(first.text().unwrap(), "mocked");
    assert_eq!(second.text().unwrap(), "unmocked");
}

#[tokio::test]
async fn test_non_json_body_names_alias() {
    let ctx = context(1000);
    ctx.given()
        .intercept_and_mock_response(InterceptSpec::new("**/form").method("POST").alias("form"))
        .unwrap();

    let request = ctx
        .page()
        .request(reqwest::Method::POST, "https://api.test/form")
        .unwrap()
        .form([("a", "b")]);
    ctx.when().send(request).await.unwrap();

    let err = ctx.get().request_body("form").await.unwrap_err();
    assert!(matches!(err, Error::BodyParse { ref alias, .. } if alias == "form"));
}

#[tokio::test]
async fn test_non_utf8_body_fails_to_parse() {
    let ctx = context(1000);
    ctx.given()
        .intercept_and_mock_response(InterceptSpec::new("**/u").method("POST").alias("u"))
        .unwrap();

    let request = ctx
        .page()
        .request(reqwest::Method::POST, "https://api.test/u")
        .unwrap()
        .body(&b"{\"a\":\"\xff\"}"[..])
        .header("content-type", "application/json");
    ctx.when().send(request).await.unwrap();

    let err = ctx.get().request_body("u").await.unwrap_err();
    assert!(matches!(err, Error::BodyParse { ref alias, .. } if alias == "u"));
}

#[tokio::test]
async fn test_invalid_registrations() {
    let ctx = context(1000);
    let given = ctx.given();
    assert!(matches!(
        given.intercept_and_mock_response(InterceptSpec::new("")),
        Err(Error::InvalidPattern { .. })
    ));
    assert!(matches!(
        given.intercept_and_mock_response(InterceptSpec::new("**/x").method("YEET")),
        Err(Error::InvalidMethod(_))
    ));
    assert_eq!(ctx.network().registry().rule_count(), 0);
}

#[tokio::test]
async fn test_remove_intercept() {
    let ctx = context(1000);
    let handle = ctx
        .given()
        .intercept_and_mock_response(InterceptSpec::new("**/gone").text("mocked"))
        .unwrap();
    assert!(ctx.given().remove_intercept(&handle));

    let response = ctx.when().fetch("GET", "https://api.test/gone").await.unwrap();
    assert_eq!(response.text().unwrap(), "unmocked");
}

#[tokio::test]
async fn test_wait_for_response() {
    let ctx = context(1000);
    ctx.given()
        .intercept_and_mock_response(InterceptSpec::new("**/slow").response(json!("ok")).alias("slow"))
        .unwrap();

    let when = ctx.when();
    let background = when.clone();
    tokio::spawn(async move { background.fetch("GET", "https://api.test/slow").await });

    let exchange = when.wait_for_response("slow").await.unwrap();
    assert!(exchange.mocked);
    assert_eq!(exchange.status(), Some(200));
}

#[tokio::test]
async fn test_passthrough_observed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/echo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "real": true })))
        .mount(&server)
        .await;

    let ctx = TestContext::start(config(2000)).unwrap();
    ctx.given()
        .intercept_and_mock_response(InterceptSpec::new("**/api/echo*").alias("echo"))
        .unwrap();

    let response = ctx
        .when()
        .fetch("GET", &format!("{}/api/echo?x=1", server.uri()))
        .await
        .unwrap();
    assert!(!response.mocked);

    let get = ctx.get();
    assert_eq!(get.response_body("echo").await.unwrap(), json!({ "real": true }));
    assert_eq!(get.request_query_param("echo", "x").await.unwrap().as_deref(), Some("1"));
    assert!(!get.exchange("echo").await.unwrap().mocked);
}

// Page actions and readers

#[tokio::test]
async fn test_current_location() {
    let ctx = index_context().await;
    assert_eq!(ctx.get().current_location().unwrap(), INDEX_URL);
}

#[tokio::test]
async fn test_type_input() {
    let ctx = index_context().await;
    let when = ctx.when();
    when.clear("name-input", 0).await.unwrap();
    when.type_text("name-input", "shelly", 0).await.unwrap();
    assert_eq!(ctx.get().input_value("name-input", 0).await.unwrap(), "shelly");
}

#[tokio::test]
async fn test_click_submit_reloads_page() {
    let ctx = index_context().await;
    ctx.given()
        .intercept_and_mock_response(InterceptSpec::new("**/index.html*").alias("submit"))
        .unwrap();

    let when = ctx.when();
    when.clear("name-input", 0).await.unwrap();
    when.type_text("name-input", "shelly", 0).await.unwrap();
    when.click("submit", 0).await.unwrap();

    let get = ctx.get();
    assert_eq!(get.input_value("name-input", 0).await.unwrap(), "John");
    assert_eq!(
        get.request_query_param("submit", "fname").await.unwrap().as_deref(),
        Some("shelly")
    );
    assert_eq!(
        get.request_query_param("submit", "lname").await.unwrap().as_deref(),
        Some("Doe")
    );
}

#[tokio::test]
async fn test_initial_inputs() {
    let ctx = index_context().await;
    let get = ctx.get();
    assert_eq!(get.input_value("last-name-input", 0).await.unwrap(), "Doe");
    assert_eq!(get.input_value("select", 0).await.unwrap(), "volvo");
}

#[tokio::test]
async fn test_select_option_by_text_and_value() {
    let ctx = index_context().await;
    let when = ctx.when();
    when.select_option("select", "Saab", 0).await.unwrap();
    assert_eq!(ctx.get().input_value("select", 0).await.unwrap(), "saab");
    when.select_option("select", "opel", 0).await.unwrap();
    assert_eq!(ctx.get().input_value("select", 0).await.unwrap(), "opel");

    let err = when.select_option("select", "Tesla", 0).await.unwrap_err();
    assert!(matches!(err, Error::Action { .. }));
}

#[tokio::test]
async fn test_toggle_radio_within_container() {
    let ctx = index_context().await;
    ctx.when().within("radio-group").await.unwrap().toggle(1).await.unwrap();

    let get = ctx.get();
    assert!(get.is_element_checked("radio", 1).await.unwrap());
    assert!(!get.is_element_checked("radio", 0).await.unwrap());
}

#[tokio::test]
async fn test_toggle_radio_by_selector_unchecks_group() {
    let ctx = index_context().await;
    let when = ctx.when();
    when.toggle_radio_by_selector("radio", 0).await.unwrap();
    when.toggle_radio_by_selector("radio", 2).await.unwrap();

    let get = ctx.get();
    assert!(get.is_element_checked("radio", 2).await.unwrap());
    assert!(!get.is_element_checked("radio", 0).await.unwrap());
}

#[tokio::test]
async fn test_check_and_uncheck() {
    let ctx = index_context().await;
    let when = ctx.when();
    let get = ctx.get();

    when.check("checkbox", 1).await.unwrap();
    assert!(get.is_element_checked("checkbox", 1).await.unwrap());

    when.check("checkbox", 2).await.unwrap();
    when.uncheck("checkbox", 2).await.unwrap();
    assert!(!get.is_element_checked("checkbox", 2).await.unwrap());

    // Click toggles a checkbox
    when.click("checkbox", 0).await.unwrap();
    assert!(get.is_element_checked("checkbox", 0).await.unwrap());
    when.click("checkbox", 0).await.unwrap();
    assert!(!get.is_element_checked("checkbox", 0).await.unwrap());
}

#[tokio::test]
async fn test_element_readers() {
    let ctx = index_context().await;
    let get = ctx.get();

    let style = get.elements_computed_style("button", 0).await.unwrap();
    assert_eq!(style.get("backgroundColor"), Some("rgb(255, 0, 0)"));
    assert_eq!(
        get.elements_attribute("image", "src", 0).await.unwrap().as_deref(),
        Some("w3schools.jpg")
    );
    assert_eq!(get.elements_text("header", 0).await.unwrap(), "My First Heading");
    assert_eq!(get.number_of_elements("radio").await.unwrap(), 3);
    assert!(get.is_element_disabled("button", 0).await.unwrap());
    assert!(!get.is_element_disabled("submit", 0).await.unwrap());
    assert_eq!(get.env("env1").as_deref(), Some("value1"));
}

#[tokio::test]
async fn test_element_lookup_and_existence() {
    let ctx = index_context().await;
    let get = ctx.get();

    let paragraph = get.element_by_text("My First Paragraph").await.unwrap();
    assert_eq!(paragraph.local_name(), "p");
    assert!(get.element_exists("paragraph").await.unwrap());
    assert!(!get.element_exists("non-existent").await.unwrap());

    let err = get.elements_text("non-existent", 0).await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.selector_name(), Some("[data-hook='non-existent']"));
    assert_err!(get.number_of_elements("non-existent").await);
}

#[tokio::test]
async fn test_scoped_queries() {
    let ctx = index_context().await;
    let group = ctx.get().within("radio-group").await.unwrap();
    assert_eq!(group.number_of_elements("radio").await.unwrap(), 3);
    assert!(!group.element_exists("header").await.unwrap());
}

#[tokio::test]
async fn test_actions_on_unusable_elements() {
    let ctx = index_context().await;
    let when = ctx.when();

    let err = when.click("button", 0).await.unwrap_err();
    assert!(matches!(err, Error::Action { ref reason, .. } if reason.contains("disabled")));
    assert!(matches!(
        when.type_text("checkbox", "x", 0).await,
        Err(Error::Action { .. })
    ));
    assert!(matches!(
        when.check("header", 0).await,
        Err(Error::Action { .. })
    ));
    assert!(matches!(
        when.uncheck("radio", 0).await,
        Err(Error::Action { .. })
    ));
}

#[tokio::test]
async fn test_set_content_without_network() {
    let ctx = context(100);
    ctx.when()
        .set_content(r#"<ul><li data-hook="item">a</li><li data-hook="item">b</li></ul>"#)
        .unwrap();
    assert_eq!(ctx.get().number_of_elements("item").await.unwrap(), 2);
    assert_eq!(ctx.get().elements_text("item", 1).await.unwrap(), "b");
    assert_eq!(ctx.network().exchange_count(), 0);
}

// Spies and stubs

#[tokio::test]
async fn test_spy_on_function() {
    let ctx = context(100);
    let spy = ctx.given().spy_on("func", |param: i32| param + 1);
    assert_eq!(spy.call(3), 4);
    assert!(spy.called_with(&3));

    let handle = ctx.get().spy("func").unwrap();
    assert_eq!(handle.call_count(), 1);
    assert!(handle.called_with(&3));
    assert_eq!(handle.calls::<i32>(), Some(vec![3]));
    assert_eq!(handle.kind(), SpyKind::Spy);
}

#[tokio::test]
async fn test_stub_function() {
    let ctx = context(100);
    let stub = ctx.given().stub::<(), i32>("func").returns(7);
    assert_eq!(stub.call(()), 7);

    let unconfigured = ctx.given().stub::<&str, String>("other");
    assert_eq!(unconfigured.call("x"), "");
    assert_eq!(ctx.get().spy("other").unwrap().kind(), SpyKind::Stub);
}

// Lifecycle

#[tokio::test]
async fn test_teardown_isolates_tests() {
    let helper = TestHelper::new(config(50));
    let first = helper.start_with_transport(FixedTransport::new("unmocked"));
    first
        .given()
        .intercept_and_mock_response(InterceptSpec::new("**/z").response(json!(1)).alias("z"))
        .unwrap();
    first.given().spy_on("f", |x: u8| x);
    first.when().fetch("GET", "https://api.test/z").await.unwrap();
    assert_eq!(first.get().interception_count("z"), 1);

    let get = first.get();
    first.teardown();
    assert_eq!(get.interception_count("z"), 0);
    assert!(get.spy("f").is_none());
    assert!(first.network().registry().rules().is_empty());
    assert!(first.page().url().is_none());
    drop(first);

    let second = helper.start_with_transport(FixedTransport::new("unmocked"));
    assert_eq!(second.get().interception_count("z"), 0);
    let response = second.when().fetch("GET", "https://api.test/z").await.unwrap();
    assert_eq!(response.text().unwrap(), "unmocked");
    assert!(second.get().exchange("z").await.unwrap_err().is_timeout());
}

use schemaform::prelude::*;
use serde_json::{Value, json};

use crate::fixtures::{flows, flows_without_flow, table_schema};

fn open_deferred(values: Value) -> Form {
    Form::open(
        table_schema(),
        &values,
        FormOptions::default().with_deferred_loading(true),
    )
    .expect("form opens")
}

#[test]
fn requests_are_queued_until_completed() {
    let mut form = open_deferred(json!({"url": "flows.csv", "column": "flow"}));
    assert!(form.has_pending_requests());
    assert!(!form.field("column").expect("column").is_enabled());

    let tickets = form.take_pending_requests();
    assert_eq!(tickets.len(), 1);
    let ticket = tickets.into_iter().next().expect("ticket");
    assert_eq!(ticket.source, "url");
    assert_eq!(ticket.request.location, "flows.csv");

    let report = form
        .complete_request(ticket, Ok(flows()))
        .expect("completion applies")
        .expect("not stale");
    assert!(report.warnings.is_empty());
    assert!(!form.has_pending_requests());
    let column = form.field("column").expect("column");
    assert!(column.is_enabled());
    assert_eq!(column.get_value(), json!("flow"), "initial load keeps the selection");
}

#[test]
fn superseded_completion_is_discarded() {
    let mut form = open_deferred(json!({"url": "flows.csv", "column": "flow"}));
    let first = form.take_pending_requests().pop().expect("first ticket");

    form.set_value("url", json!("flows_v2.csv")).expect("edit");
    let second = form.take_pending_requests().pop().expect("second ticket");
    assert!(second.generation > first.generation);

    let stale = form
        .complete_request(first, Ok(flows()))
        .expect("completion handled");
    assert!(stale.is_none());
    assert!(form.resource("url").is_none());

    let report = form
        .complete_request(second, Ok(flows_without_flow()))
        .expect("completion applies")
        .expect("fresh ticket");
    assert_eq!(report.warnings_for("column").count(), 1);
    assert_eq!(form.resource("url"), Some(&flows_without_flow()));
}

#[test]
fn failed_completion_sets_producer_error() {
    let mut form = open_deferred(json!({"url": "flows.csv"}));
    let ticket = form.take_pending_requests().pop().expect("ticket");
    let report = form
        .complete_request(ticket, Err(anyhow::anyhow!("file is locked")))
        .expect("completion applies")
        .expect("not stale");
    assert_eq!(report.errors.len(), 1);
    let error = form.field("url").and_then(|field| field.error()).expect("error");
    assert!(error.contains("file is locked"), "{error}");
}

#[test]
fn completion_after_close_is_discarded() {
    let mut form = open_deferred(json!({"url": "flows.csv"}));
    let ticket = form.take_pending_requests().pop().expect("ticket");
    form.close();
    assert_eq!(form.phase(), FormPhase::Closed);
    let outcome = form
        .complete_request(ticket, Ok(flows()))
        .expect("completion handled");
    assert!(outcome.is_none());
    assert_eq!(form.fields().count(), 0);
}

#[test]
fn completion_for_removed_section_is_discarded() {
    let mut form = open_deferred(json!({"url": "flows.csv"}));
    let ticket = form.take_pending_requests().pop().expect("ticket");
    form.remove_section("data").expect("section removed");
    let outcome = form
        .complete_request(ticket, Ok(flows()))
        .expect("completion handled");
    assert!(outcome.is_none());
}

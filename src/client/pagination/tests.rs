use super::*;
use crate::client::fake::FakeTransport;

const LIST_JOBS: &str = "query ListJobs($first: Int, $after: String) { jobs { edges { cursor node { name } } } }";

fn page(items: &[&str], offset: usize) -> Value {
    let edges: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, name)| json!({ "cursor": format!("c{}", offset + i), "node": { "name": name } }))
        .collect();
    json!({ "jobs": { "edges": edges } })
}

fn scripted(pages: Vec<Vec<&'static str>>) -> FakeTransport {
    FakeTransport::new(move |_query, variables| {
        let offset = match variables["after"].as_str() {
            None => 0,
            Some(cursor) => cursor.trim_start_matches('c').parse::<usize>().unwrap() + 1,
        };
        let mut seen = 0;
        for items in &pages {
            if seen == offset {
                return Ok(page(items, offset));
            }
            seen += items.len();
        }
        Ok(page(&[], offset))
    })
}

#[test]
fn yields_all_pages_in_order_then_stops() {
    let transport = scripted(vec![vec!["a", "b"], vec!["c"], vec!["d", "e"]]);
    let calls = transport.calls();

    let names: Vec<String> = Paginated::new(&transport, LIST_JOBS, "jobs", Value::Null)
        .map(|item| item.unwrap()["name"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    // Three data pages plus the terminating empty page.
    assert_eq!(calls.borrow().len(), 4);
}

#[test]
fn pages_are_fetched_lazily() {
    let transport = scripted(vec![vec!["a", "b"], vec!["c"]]);
    let calls = transport.calls();

    let mut pages = Paginated::new(&transport, LIST_JOBS, "jobs", Value::Null);
    assert!(calls.borrow().is_empty());

    pages.next();
    pages.next();
    assert_eq!(calls.borrow().len(), 1);

    pages.next();
    assert_eq!(calls.borrow().len(), 2);
}

#[test]
fn cursor_and_page_size_are_sent() {
    let transport = scripted(vec![vec!["a"], vec!["b"]]);
    let calls = transport.calls();

    let _: Vec<_> = Paginated::new(&transport, LIST_JOBS, "jobs", json!({ "status": "running" }))
        .page_size(10)
        .collect();

    let calls = calls.borrow();
    assert_eq!(calls[0].variables["first"], json!(10));
    assert_eq!(calls[0].variables["after"], Value::Null);
    assert_eq!(calls[0].variables["status"], json!("running"));
    assert_eq!(calls[1].variables["after"], json!("c0"));
}

#[test]
fn empty_first_page_yields_nothing() {
    let transport = scripted(vec![]);
    assert_eq!(Paginated::new(&transport, LIST_JOBS, "jobs", Value::Null).count(), 0);
}

#[test]
fn errors_are_yielded_once_and_end_iteration() {
    let transport = FakeTransport::new(|_, _| Err(PlexusError::Transport("connection reset".into())));
    let results: Vec<_> = Paginated::new(&transport, LIST_JOBS, "jobs", Value::Null).collect();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_err());
}

#[test]
fn nested_connection_paths_are_followed() {
    let transport = FakeTransport::new(|_, variables| {
        if variables["after"].is_null() {
            Ok(json!({ "group": { "datasets": { "edges": [{ "cursor": "x", "node": { "name": "mnist" } }] } } }))
        } else {
            Ok(json!({ "group": { "datasets": { "edges": [] } } }))
        }
    });
    let items: Vec<_> = Paginated::new(&transport, "query Datasets { }", "group.datasets", Value::Null)
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(items, vec![json!({ "name": "mnist" })]);
}

#[test]
fn missing_connection_is_an_error() {
    let transport = FakeTransport::new(|_, _| Ok(json!({ "other": {} })));
    let first = Paginated::new(&transport, LIST_JOBS, "jobs", Value::Null).next().unwrap();
    assert!(matches!(first, Err(PlexusError::Graphql(_))));
}

#[test]
fn edges_without_cursor_stop_after_one_page() {
    let transport = FakeTransport::new(|_, _| Ok(json!({ "jobs": { "edges": [{ "node": 1 }] } })));
    let items: Vec<_> = Paginated::new(&transport, LIST_JOBS, "jobs", Value::Null).collect();
    assert_eq!(items.len(), 1);
}

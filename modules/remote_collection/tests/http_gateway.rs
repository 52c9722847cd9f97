use std::sync::Arc;

use console_kit::{Session, TracedClient};
use httpmock::prelude::*;
use serde::Deserialize;
use serde_json::json;

use remote_collection::{
    FetchError, HttpPageTransport, Identified, PageRequest, PageTransport, Phase, QueryKey,
    RemoteCollection, SearchSpec, SortSpec,
};

#[derive(Clone, Debug, Deserialize, PartialEq)]
struct Group {
    id: u64,
    name: String,
}

impl Identified for Group {
    type Id = u64;
    fn id(&self) -> u64 {
        self.id
    }
}

fn groups(range: std::ops::Range<u64>) -> Vec<serde_json::Value> {
    range
        .map(|id| json!({ "id": id, "name": format!("G-{id}") }))
        .collect()
}

fn transport(server: &MockServer, token: Option<&str>) -> HttpPageTransport {
    let mut session = Session::new(&server.url("/api/")).unwrap();
    if let Some(t) = token {
        session = session.with_bearer_token(t);
    }
    HttpPageTransport::new(TracedClient::default(), session)
}

#[tokio::test]
async fn sends_sort_search_and_paging_parameters() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/api/groups")
            .query_param("page", "2")
            .query_param("pageSize", "10")
            .query_param("sortField", "name")
            .query_param("sortDirection", "desc")
            .query_param("searchField", "faculty")
            .query_param("searchValue", "Physics & Math")
            .header("authorization", "Bearer abc")
            .header_exists("traceparent");
        then.status(200)
            .json_body(json!({ "items": groups(10..12), "total": 12 }));
    });

    let key = QueryKey::new("/groups")
        .with_sort(Some(SortSpec::desc("name")))
        .with_search(SearchSpec::normalized("faculty", "Physics & Math"));
    let req = PageRequest::new(key, 2, 10).unwrap();

    let t = transport(&server, Some("abc"));
    let page = PageTransport::<Group>::fetch_page(&t, &req).await.unwrap();

    m.assert();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].name, "G-10");
    assert!(!page.has_next_page());
    assert_eq!(page.page_info.total, Some(12));
}

#[tokio::test]
async fn maps_statuses_to_fetch_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/staff");
        then.status(401).body("token expired");
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/exam-sessions");
        then.status(403)
            .header("content-type", "application/problem+json")
            .json_body(json!({
                "type": "about:blank",
                "title": "Forbidden",
                "status": 403,
                "detail": "Missing exam permission",
                "code": "ACCESS_DENIED"
            }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/rooms");
        then.status(503).body("maintenance");
    });

    let t = transport(&server, None);
    let fetch = |endpoint: &str| {
        let req = PageRequest::new(QueryKey::new(endpoint), 1, 20).unwrap();
        let t = t.clone();
        async move { PageTransport::<Group>::fetch_page(&t, &req).await }
    };

    let auth = fetch("/staff").await.unwrap_err();
    assert_eq!(
        auth,
        FetchError::Auth {
            status: 401,
            detail: "token expired".into()
        }
    );

    let denied = fetch("/exam-sessions").await.unwrap_err();
    assert!(denied.is_access_denied());
    assert_eq!(
        denied,
        FetchError::terminal(403, "Missing exam permission (ACCESS_DENIED)")
    );

    let down = fetch("/rooms").await.unwrap_err();
    assert!(down.is_retryable());
    assert_eq!(down.status(), Some(503));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/computers");
        then.status(200).body("<html>login</html>");
    });

    let t = transport(&server, None);
    let req = PageRequest::new(QueryKey::new("/computers"), 1, 20).unwrap();
    let err = PageTransport::<Group>::fetch_page(&t, &req).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_server_is_transient() {
    let session = Session::new("http://127.0.0.1:9/").unwrap();
    let t = HttpPageTransport::new(TracedClient::default(), session);
    let req = PageRequest::new(QueryKey::new("/groups"), 1, 20).unwrap();
    let err = PageTransport::<Group>::fetch_page(&t, &req).await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn collection_scrolls_over_http_using_cursors() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/api/teachers")
            .query_param("page", "1")
            .query_param("pageSize", "3");
        then.status(200).json_body(json!({
            "data": groups(0..3),
            "page_info": { "next_cursor": "t3" }
        }));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/api/teachers")
            .query_param("page", "2")
            .query_param("cursor", "t3");
        then.status(200)
            .json_body(json!({ "items": groups(3..4), "hasNextPage": false }));
    });

    let t: Arc<dyn PageTransport<Group>> = Arc::new(transport(&server, Some("tok")));
    let c = RemoteCollection::new(t, "/teachers", 3).unwrap();

    c.fetch_next_page().await.unwrap();
    c.fetch_next_page().await.unwrap();

    first.assert();
    second.assert();
    let view = c.view();
    assert_eq!(view.items.len(), 4);
    assert_eq!(view.phase, Phase::Exhausted);
    assert_eq!(
        view.items.iter().map(|g| g.id).collect::<Vec<_>>(),
        vec![0, 1, 2, 3]
    );
}

#[tokio::test]
async fn transport_from_config() {
    let api = runtime::ApiConfig::default();
    let session = Session::new(&api.base_url).unwrap();
    let t = HttpPageTransport::from_config(&api, session).unwrap();
    assert_eq!(t.session().base_url().as_str(), "http://127.0.0.1:8000/api/");
}

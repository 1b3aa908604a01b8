//! Shared payloads and a scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::dial::transport::{DialTransport, HttpResponse, TransportResult};

// ─────────────────────────────────────────────────────────────────────────────
// Payloads
// ─────────────────────────────────────────────────────────────────────────────

/// A device descriptor body in the shape real devices return.
pub const DESCRIPTOR_XML: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <deviceType>urn:dial-multiscreen-org:device:dial:1</deviceType>
    <friendlyName>Living Room TV</friendlyName>
    <manufacturer>Example</manufacturer>
    <modelName>ExampleCast</modelName>
  </device>
</root>"#;

/// Rendered header block carrying the application endpoint.
pub const DESCRIPTOR_HEADERS: &str =
    "content-type: text/xml\r\napplication-url: http://10.0.0.5:8060/apps/\r\n";

/// A bind-session response with the length-framed array envelope the real
/// endpoint streams, carrying SID, gsessionid, and a list id.
pub const BIND_RESPONSE_FULL: &str = concat!(
    "266\n",
    "[[0,[\"c\",\"23CE45F0AA8B1DD2\",\"\",8]]\n",
    ",[1,[\"S\",\"g7H2kP0q_XcR4mV9TlZw\"]]\n",
    ",[2,[\"loungeStatus\",{}]]\n",
    ",[3,[\"playlistModified\",{\"listId\":\"PLAK9321\"}]]\n",
    "]",
);

/// A bind-session response without a playlist event.
pub const BIND_RESPONSE_NO_LIST: &str = concat!(
    "120\n",
    "[[0,[\"c\",\"9FA0B11C22D33E44\",\"\",8]]\n",
    ",[1,[\"S\",\"aaBBccDDeeFF0011\"]]\n",
    "]",
);

/// A token-batch answer for a single screen.
pub const TOKEN_BATCH_JSON: &str =
    r#"{"screens":[{"screenId":"ABC123","loungeToken":"AGdO5p_token_value","expiration":1700000000000}]}"#;

/// An app-status body reporting `running` with the given screen id.
pub fn running_status_body(screen_id: &str) -> String {
    format!(
        "<service xmlns=\"urn:dial-multiscreen-org:schemas:dial\">\
         <name>YouTube</name><state>running</state>\
         <screenId>{screen_id}</screenId></service>"
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock Transport
// ─────────────────────────────────────────────────────────────────────────────

/// A request observed by the mock, for assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub body: String,
}

struct Route {
    url_fragment: String,
    response: HttpResponse,
}

struct MockState {
    routes: Vec<Route>,
    scripted: VecDeque<HttpResponse>,
    requests: Vec<RecordedRequest>,
}

/// Scripted [`DialTransport`] for unit tests.
///
/// Requests are answered by the first route whose URL fragment matches, then
/// by the scripted queue in order, then with an empty 404. Every request is
/// recorded.
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                routes: Vec::new(),
                scripted: VecDeque::new(),
                requests: Vec::new(),
            }),
        }
    }

    /// Answers every request whose URL contains `url_fragment`.
    pub fn route(&self, url_fragment: &str, status: u16, body: String) {
        self.route_with_headers(url_fragment, status, String::new(), body);
    }

    /// Like [`Self::route`] but with a rendered header block.
    pub fn route_with_headers(
        &self,
        url_fragment: &str,
        status: u16,
        header_block: String,
        body: String,
    ) {
        self.state.lock().unwrap().routes.push(Route {
            url_fragment: url_fragment.to_string(),
            response: HttpResponse {
                status,
                header_block,
                body,
            },
        });
    }

    /// Queues a response answered once, in order, when no route matches.
    pub fn script(&self, status: u16, body: String) {
        self.state.lock().unwrap().scripted.push_back(HttpResponse {
            status,
            header_block: String::new(),
            body,
        });
    }

    /// All requests observed so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    fn answer(&self, method: &'static str, url: &str, body: String) -> HttpResponse {
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method,
            url: url.to_string(),
            body,
        });
        if let Some(route) = state.routes.iter().find(|r| url.contains(&r.url_fragment)) {
            return route.response.clone();
        }
        state.scripted.pop_front().unwrap_or(HttpResponse {
            status: 404,
            header_block: String::new(),
            body: String::new(),
        })
    }
}

#[async_trait]
impl DialTransport for MockTransport {
    async fn get(
        &self,
        url: &str,
        _headers: &[(&str, &str)],
        _timeout: Duration,
    ) -> TransportResult<HttpResponse> {
        Ok(self.answer("GET", url, String::new()))
    }

    async fn post(
        &self,
        url: &str,
        _headers: &[(&str, &str)],
        body: String,
        _timeout: Duration,
    ) -> TransportResult<HttpResponse> {
        Ok(self.answer("POST", url, body))
    }
}

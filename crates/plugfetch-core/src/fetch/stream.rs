//! Single streaming GET against one mirror.
//!
//! Header blocks are tracked per response (redirect hops each send their own);
//! the body is only written once the final block reports HTTP 200.

use std::cell::RefCell;
use std::str;

use super::sink::DownloadSink;
use crate::http::{FetchError, HttpClient};

/// Parse state for the response currently being received.
#[derive(Default)]
struct ResponseHead {
    status: Option<u32>,
    content_length: Option<u64>,
}

impl ResponseHead {
    /// Feed one raw header line. Returns true when the line ends a header block.
    fn feed(&mut self, line: &str) -> bool {
        let line = line.trim_end();
        if line.is_empty() {
            return true;
        }
        if line.starts_with("HTTP/") {
            *self = ResponseHead::default();
            self.status = line
                .split_whitespace()
                .nth(1)
                .and_then(|code| code.parse::<u32>().ok());
            return false;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                self.content_length = value.trim().parse::<u64>().ok();
            }
        }
        false
    }
}

struct StreamState<'s> {
    head: ResponseHead,
    sink: &'s mut DownloadSink,
    failure: Option<FetchError>,
}

/// GET `url` and stream a 200 body into `sink`. On `Ok` the sink holds the
/// complete body (call `DownloadSink::finish`); on `Err` the caller abandons it.
pub fn stream_to_sink(
    client: &HttpClient,
    url: &str,
    sink: &mut DownloadSink,
) -> Result<(), FetchError> {
    let state = RefCell::new(StreamState {
        head: ResponseHead::default(),
        sink,
        failure: None,
    });

    let mut easy = client.easy(url)?;
    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            let Ok(line) = str::from_utf8(data) else {
                return true;
            };
            let mut st = state.borrow_mut();
            if !st.head.feed(line) || st.head.status != Some(200) || st.sink.has_begun() {
                return true;
            }
            let content_length = st.head.content_length;
            match st.sink.begin(content_length) {
                Ok(()) => true,
                Err(e) => {
                    st.failure = Some(e);
                    false
                }
            }
        })?;
        transfer.write_function(|data| {
            let mut st = state.borrow_mut();
            if !st.sink.has_begun() {
                // Body of a redirect or error response: drain and ignore.
                return Ok(data.len());
            }
            match st.sink.write_chunk(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    tracing::warn!("staging write failed: {}", e);
                    st.failure = Some(e);
                    Ok(0) // abort transfer
                }
            }
        })?;
        transfer.perform()
    };

    let StreamState {
        head,
        sink,
        failure,
    } = state.into_inner();
    if let Some(e) = failure {
        return Err(e);
    }
    performed?;

    let code = easy.response_code()?;
    if code != 200 {
        return Err(FetchError::Status(code));
    }
    if !sink.has_begun() {
        sink.begin(head.content_length)?;
    }
    Ok(())
}

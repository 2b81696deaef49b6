use httpspan::{
    parse_request, parse_response, parse_with_config, Document, DocumentKind, ParseError,
    ParseStatus, ParserConfig, Version,
};

const GET_REQUEST: &[u8] = b"GET /uri/abc HTTP/1.1\r\n\
Accept: XAccept\r\n\
Host: domain.com\r\n\
Connection: Keep-Alive\r\n\
\r\n";

const POST_REQUEST: &[u8] = b"POST /uri/abc HTTP/1.1\r\n\
Accept: XAccept\r\n\
Host: domain.com\r\n\
User-Agent: gtest.proxy\r\n\
Content-Length: 3\r\n\
\r\nabc";

const CHUNKED_REQUEST: &[u8] = b"POST /upload HTTP/1.1\r\n\
Transfer-Encoding: chunked\r\n\
\r\n\
3\r\nabc\r\n\
2;ext=1\r\nde\r\n\
0\r\n\
\r\n";

const OK_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
Accept: XAccept\r\n\
Host: domain.com\r\n\
Connection: Keep-Alive\r\n\
Content-Length: 0\r\n\
\r\n";

const NOT_FOUND_RESPONSE: &[u8] = b"HTTP/1.1 404 Not Found\r\n\
Accept: XAccept\r\n\
Host: domain.com\r\n\
User-Agent: gtest.proxy\r\n\
\r\n";

const BODY_RESPONSE: &[u8] = b"HTTP/1.0 201 Created\r\n\
Content-Length: 5\r\n\
\r\nhello";

/// Feed every part and return the status of the last call.
fn feed<'a>(doc: &mut Document<'a>, parts: &[&'a [u8]]) -> Result<ParseStatus, ParseError> {
    let mut last = ParseStatus::Progress(0);
    for &part in parts {
        last = doc.parse(part)?;
    }
    Ok(last)
}

// =========================================================================
// Request-line parsing
// =========================================================================

#[test]
fn simple_get_request() {
    let raw = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let req = parse_request(raw).expect("should parse");
    assert_eq!(req.kind(), DocumentKind::Request);
    assert_eq!(req.method(), "GET");
    assert_eq!(req.uri(), "/");
    assert_eq!(req.version(), Version::HTTP_11);
    assert_eq!(req.headers().len(), 1);
    assert_eq!(req.field("Host").unwrap(), "example.com");
    assert!(req.body().is_none());
    assert!(req.is_done());
}

#[test]
fn request_fields_are_reported_in_order() {
    let mut doc = Document::request();
    assert_eq!(
        doc.parse(GET_REQUEST).unwrap(),
        ParseStatus::Done(GET_REQUEST.len())
    );
    assert_eq!(doc.method(), "GET");
    assert_eq!(doc.uri(), "/uri/abc");

    let names: Vec<String> = doc.headers().iter().map(|h| h.name.to_string()).collect();
    assert_eq!(names, ["Accept", "Host", "Connection"]);
    assert_eq!(doc.field("Connection").unwrap(), "Keep-Alive");
}

#[test]
fn get_with_query_string() {
    let raw = b"GET /api/users?page=1&limit=10 HTTP/1.1\r\nAccept: application/json\r\n\r\n";
    let req = parse_request(raw).expect("should parse");
    assert_eq!(req.uri(), "/api/users?page=1&limit=10");
    assert_eq!(req.field("Accept").unwrap(), "application/json");
}

#[test]
fn http_10_version() {
    let raw = b"GET /legacy HTTP/1.0\r\nHost: old.example.com\r\n\r\n";
    let req = parse_request(raw).expect("should parse");
    assert_eq!(req.version(), Version::HTTP_10);
}

#[test]
fn any_token_is_a_method() {
    for method in ["GET", "HEAD", "POST", "PUT", "DELETE", "OPTIONS", "PATCH", "PURGE", "M-SEARCH"] {
        let raw = format!("{method} / HTTP/1.1\r\nHost: h\r\n\r\n");
        let req = parse_request(raw.as_bytes())
            .unwrap_or_else(|e| panic!("{method} should parse: {e}"));
        assert_eq!(req.method(), method);
    }
}

#[test]
fn leading_spaces_before_request_line_are_skipped() {
    let raw = b"  GET / HTTP/1.1\r\n\r\n";
    let mut doc = Document::request();
    assert_eq!(doc.parse(raw).unwrap(), ParseStatus::Done(raw.len()));
    assert_eq!(doc.method(), "GET");
}

#[test]
fn method_glued_to_uri_is_rejected() {
    let raw = b"POST/uri/abc HTTP/1.1\r\n\
Accept: XAccept\r\n\
Host: domain.com\r\n\
User-Agent: gtest.proxy\r\n\
\r\n";
    let mut doc = Document::request();
    let err = doc.parse(raw).unwrap_err();
    assert!(matches!(err, ParseError::InvalidMethod(_)));
    assert!(err.is_malformed());
    assert_eq!(doc.parse_error(), Some(&err));
    assert!(!doc.is_done());
}

#[test]
fn uri_must_start_with_slash() {
    let raw = b"GET uri HTTP/1.1\r\n\r\n";
    let err = parse_request(raw).unwrap_err();
    assert!(matches!(err, ParseError::InvalidUri(_)));
}

#[test]
fn missing_version_is_http_09() {
    let raw = b"POST /uri/abcHTTP/1.1\r\n\
Accept: XAccept\r\n\
Host: domain.com\r\n\
User-Agent: gtest.proxy\r\n\
\r\n";
    let mut doc = Document::request();
    assert_eq!(doc.parse(raw).unwrap(), ParseStatus::Done(raw.len()));
    assert_eq!(doc.version(), Version::HTTP_09);
    assert_eq!(doc.uri(), "/uri/abcHTTP/1.1");
    assert_eq!(doc.headers().len(), 3);
}

#[test]
fn http_09_can_be_disabled() {
    let config = ParserConfig {
        allow_http09: false,
        ..ParserConfig::default()
    };
    let err = parse_with_config(b"GET /\r\n\r\n", DocumentKind::Request, config).unwrap_err();
    assert!(matches!(err, ParseError::InvalidVersion(_)));
}

#[test]
fn malformed_version_is_rejected() {
    let err = parse_request(b"GET / HTTP/1.1x\r\n\r\n").unwrap_err();
    assert!(matches!(err, ParseError::InvalidVersion(_)));

    let err = parse_request(b"GET / HTTQ/1.1\r\n\r\n").unwrap_err();
    assert!(matches!(err, ParseError::InvalidVersion(_)));
}

#[test]
fn bare_lf_is_rejected() {
    let err = parse_request(b"GET / HTTP/1.1\nHost: x\n\n").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnexpectedByte {
            expected: "CR before LF",
            found: b'\n',
        }
    );
}

// =========================================================================
// Header parsing
// =========================================================================

#[test]
fn empty_header_value() {
    let raw = b"GET / HTTP/1.1\r\nX-Empty: \r\n\r\n";
    let req = parse_request(raw).expect("should parse");
    assert_eq!(req.field("X-Empty").unwrap(), "");
}

#[test]
fn header_value_with_interior_spaces() {
    let raw = b"GET / HTTP/1.1\r\nUser-Agent: Mozilla/5.0 (X11; Linux x86_64)\r\n\r\n";
    let req = parse_request(raw).expect("should parse");
    assert_eq!(req.field("User-Agent").unwrap(), "Mozilla/5.0 (X11; Linux x86_64)");
}

#[test]
fn strict_separator_rejects_missing_space() {
    let err = parse_request(b"GET / HTTP/1.1\r\nHost:example.com\r\n\r\n").unwrap_err();
    assert!(matches!(err, ParseError::InvalidHeader(_)));

    let err = parse_request(b"GET / HTTP/1.1\r\nHost:  example.com\r\n\r\n").unwrap_err();
    assert!(matches!(err, ParseError::InvalidHeader(_)));
}

#[test]
fn lenient_separator_trims_whitespace() {
    let config = ParserConfig {
        lenient_field_separator: true,
        ..ParserConfig::default()
    };
    let raw = b"GET / HTTP/1.1\r\nHost:example.com\r\nX-Pad: \t padded \t\r\n\r\n";
    let req = parse_with_config(raw, DocumentKind::Request, config).expect("should parse");
    assert_eq!(req.field("Host").unwrap(), "example.com");
    assert_eq!(req.field("X-Pad").unwrap(), "padded");
}

#[test]
fn header_without_colon_is_rejected() {
    let err = parse_request(b"GET / HTTP/1.1\r\nNoColonHere\r\n\r\n").unwrap_err();
    assert!(matches!(err, ParseError::InvalidHeader(_)));
}

#[test]
fn duplicate_headers_are_kept_in_order() {
    let raw = b"GET / HTTP/1.1\r\nAccept: text/html\r\nAccept: application/json\r\n\r\n";
    let req = parse_request(raw).expect("should parse");
    let values: Vec<String> = req.headers().get_all("Accept").map(ToString::to_string).collect();
    assert_eq!(values, ["text/html", "application/json"]);
    assert_eq!(req.field("Accept").unwrap(), "text/html");
}

#[test]
fn field_lookup_is_exact_and_ignore_case_is_explicit() {
    let req = parse_request(GET_REQUEST).expect("should parse");
    assert!(req.field("host").is_none());
    assert_eq!(req.headers().get_ignore_case("host").unwrap(), "domain.com");
}

#[test]
fn too_many_headers() {
    let config = ParserConfig {
        max_headers: 2,
        ..ParserConfig::default()
    };
    let err = parse_with_config(GET_REQUEST, DocumentKind::Request, config).unwrap_err();
    assert_eq!(err, ParseError::TooManyHeaders(2));
}

#[test]
fn line_too_long_in_one_fragment() {
    let config = ParserConfig {
        max_line_len: 32,
        ..ParserConfig::default()
    };
    let raw = b"GET / HTTP/1.1\r\nX-Long: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n\r\n";
    let err = parse_with_config(raw, DocumentKind::Request, config).unwrap_err();
    assert_eq!(err, ParseError::LineTooLong(32));
}

#[test]
fn line_too_long_while_waiting_for_terminator() {
    let config = ParserConfig {
        max_line_len: 32,
        ..ParserConfig::default()
    };
    let first: &[u8] = b"GET / HTTP/1.1\r\nX-Long: aaaaaaaaaaaaaaaa";
    let second: &[u8] = b"aaaaaaaaaaaaaaaaaaaaaaaa";
    let mut doc = Document::with_config(DocumentKind::Request, config);
    assert_eq!(doc.parse(first).unwrap(), ParseStatus::Progress(first.len()));
    assert_eq!(doc.parse(second).unwrap_err(), ParseError::LineTooLong(32));
}

// =========================================================================
// Body framing
// =========================================================================

#[test]
fn post_with_content_length_body() {
    let mut doc = Document::request();
    assert_eq!(
        doc.parse(POST_REQUEST).unwrap(),
        ParseStatus::Done(POST_REQUEST.len())
    );
    assert_eq!(doc.method(), "POST");
    assert_eq!(doc.field("Content-Length").unwrap(), "3");
    assert_eq!(doc.body().unwrap(), "abc");
    assert!(doc.body().unwrap().is_borrowed());
}

#[test]
fn chunked_body_is_decoded() {
    let req = parse_request(CHUNKED_REQUEST).expect("should parse");
    assert_eq!(req.body().unwrap(), "abcde");
    assert!(req.body().unwrap().is_owned());
}

#[test]
fn differing_content_lengths_are_rejected() {
    let raw = b"POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: 4\r\n\r\nabcd";
    let err = parse_request(raw).unwrap_err();
    assert!(matches!(err, ParseError::InvalidContentLength(_)));
}

#[test]
fn body_over_limit_is_rejected() {
    let config = ParserConfig {
        max_body_size: 4,
        ..ParserConfig::default()
    };
    let raw = b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\n0123456789";
    let err = parse_with_config(raw, DocumentKind::Request, config).unwrap_err();
    assert_eq!(err, ParseError::BodyTooLarge(4));
}

#[test]
fn disabled_framing_stops_at_blank_line() {
    let config = ParserConfig {
        frame_bodies: false,
        ..ParserConfig::default()
    };
    let mut doc = Document::with_config(DocumentKind::Request, config);
    assert_eq!(
        doc.parse(POST_REQUEST).unwrap(),
        ParseStatus::Done(POST_REQUEST.len() - 3)
    );
    assert!(doc.body().is_none());
}

#[test]
fn pipelined_requests_report_the_boundary() {
    let mut stream = GET_REQUEST.to_vec();
    stream.extend_from_slice(POST_REQUEST);

    let mut doc = Document::request();
    let first = doc.parse(&stream).unwrap();
    assert_eq!(first, ParseStatus::Done(GET_REQUEST.len()));
    assert_eq!(doc.method(), "GET");

    let rest = &stream[first.consumed()..];
    assert_eq!(doc.parse(rest).unwrap(), ParseStatus::Done(POST_REQUEST.len()));
    assert_eq!(doc.method(), "POST");
    assert_eq!(doc.body().unwrap(), "abc");
}

// =========================================================================
// Responses
// =========================================================================

#[test]
fn response_with_zero_length_is_done() {
    let mut doc = Document::response();
    assert_eq!(
        doc.parse(OK_RESPONSE).unwrap(),
        ParseStatus::Done(OK_RESPONSE.len())
    );
    assert_eq!(doc.status(), 200);
    assert_eq!(doc.reason(), "OK");
    assert_eq!(doc.version(), Version::HTTP_11);
    assert_eq!(doc.headers().len(), 4);
    assert!(doc.body().is_none());
}

#[test]
fn response_without_framing_needs_eof() {
    let mut doc = Document::response();
    assert_eq!(
        doc.parse(NOT_FOUND_RESPONSE).unwrap(),
        ParseStatus::Progress(NOT_FOUND_RESPONSE.len())
    );
    assert!(!doc.is_done());
    assert_eq!(doc.status(), 404);
    assert_eq!(doc.reason(), "Not Found");

    assert!(doc.parse_eof());
    assert!(doc.is_done());
    assert!(doc.body().is_none());
}

#[test]
fn close_delimited_body_accumulates_until_eof() {
    let head: &[u8] = b"HTTP/1.0 200 OK\r\n\r\nhello ";
    let tail: &[u8] = b"world";
    let mut doc = Document::response();
    assert_eq!(doc.parse(head).unwrap(), ParseStatus::Progress(head.len()));
    assert_eq!(doc.parse(tail).unwrap(), ParseStatus::Progress(tail.len()));
    assert!(doc.parse_eof());
    assert_eq!(doc.body().unwrap(), "hello world");
}

#[test]
fn response_with_length_body() {
    let res = parse_response(BODY_RESPONSE).expect("should parse");
    assert_eq!(res.status(), 201);
    assert_eq!(res.reason(), "Created");
    assert_eq!(res.version(), Version::HTTP_10);
    assert_eq!(res.body().unwrap(), "hello");
}

#[test]
fn bodiless_status_ignores_content_length() {
    let raw = b"HTTP/1.1 304 Not Modified\r\nContent-Length: 42\r\n\r\n";
    let mut doc = Document::response();
    assert_eq!(doc.parse(raw).unwrap(), ParseStatus::Done(raw.len()));
    assert!(doc.body().is_none());
}

#[test]
fn version_glued_to_status_is_rejected() {
    let err = parse_response(b"HTTP/1.1200 OK\r\n\r\n").unwrap_err();
    assert!(matches!(err, ParseError::InvalidVersion(_)));
}

#[test]
fn status_glued_to_reason_is_rejected() {
    let err = parse_response(b"HTTP/1.1 200OK\r\n\r\n").unwrap_err();
    assert!(matches!(err, ParseError::InvalidStatusCode(_)));
}

#[test]
fn non_numeric_status_is_rejected() {
    let err = parse_response(b"HTTP/1.1 2x0 OK\r\n\r\n").unwrap_err();
    assert!(matches!(err, ParseError::InvalidStatusCode(_)));
}

#[test]
fn status_below_100_is_rejected() {
    for raw in [
        &b"HTTP/1.1 099 X\r\nContent-Length: 0\r\n\r\n"[..],
        &b"HTTP/1.1 000 X\r\nContent-Length: 0\r\n\r\n"[..],
    ] {
        for split in 0..raw.len() {
            let err = parse_split(DocumentKind::Response, &ParserConfig::default(), raw, split)
                .unwrap_err();
            assert!(
                matches!(err, ParseError::InvalidStatusCode(_)),
                "split at {split}: {err:?}"
            );
        }
    }
}

#[test]
fn empty_reason_is_rejected_by_default() {
    let raw = b"HTTP/1.1 200\r\nContent-Length: 0\r\n\r\n";
    assert_eq!(parse_response(raw).unwrap_err(), ParseError::EmptyReason);

    let raw = b"HTTP/1.1 200 \r\nContent-Length: 0\r\n\r\n";
    assert_eq!(parse_response(raw).unwrap_err(), ParseError::EmptyReason);
}

#[test]
fn empty_reason_can_be_allowed() {
    let config = ParserConfig {
        allow_empty_reason: true,
        ..ParserConfig::default()
    };
    for raw in [
        &b"HTTP/1.1 200\r\nContent-Length: 0\r\n\r\n"[..],
        &b"HTTP/1.1 200 \r\nContent-Length: 0\r\n\r\n"[..],
    ] {
        let res = parse_with_config(raw, DocumentKind::Response, config.clone())
            .expect("should parse");
        assert_eq!(res.status(), 200);
        assert_eq!(res.reason(), "");
    }
}

// =========================================================================
// Incremental parsing
// =========================================================================

#[test]
fn missing_final_crlf_then_completed() {
    let partial: &[u8] = b"POST /uri/abc HTTP/1.1\r\n\
Accept: XAccept\r\n\
Host: domain.com\r\n\
User-Agent: gtest.proxy\r\n";
    let mut doc = Document::request();
    assert_eq!(doc.parse(partial).unwrap(), ParseStatus::Progress(partial.len()));
    assert!(!doc.is_done());
    assert_eq!(doc.parse(b"\r\n").unwrap(), ParseStatus::Done(2));
    assert_eq!(doc.headers().len(), 3);
    assert_eq!(doc.field("User-Agent").unwrap(), "gtest.proxy");
}

#[test]
fn every_two_way_split_parses_the_same() {
    let fixtures = [
        (DocumentKind::Request, GET_REQUEST),
        (DocumentKind::Request, POST_REQUEST),
        (DocumentKind::Request, CHUNKED_REQUEST),
        (DocumentKind::Response, OK_RESPONSE),
        (DocumentKind::Response, BODY_RESPONSE),
    ];

    for (kind, data) in fixtures {
        let mut whole = Document::new(kind);
        assert!(whole.parse(data).unwrap().is_done());

        for split in 0..data.len() {
            let (head, tail) = data.split_at(split);
            let mut doc = Document::new(kind);
            assert_eq!(
                doc.parse(head).unwrap(),
                ParseStatus::Progress(split),
                "split at {split}"
            );
            assert_eq!(
                doc.parse(tail).unwrap(),
                ParseStatus::Done(data.len() - split),
                "split at {split}"
            );
            assert_eq!(
                doc.serialize_to_vec().unwrap(),
                whole.serialize_to_vec().unwrap(),
                "split at {split}"
            );
            assert_eq!(doc.body(), whole.body(), "split at {split}");
        }
    }
}

/// Feed `data` cut in two at `split`; the first error wins.
fn parse_split(
    kind: DocumentKind,
    config: &ParserConfig,
    data: &[u8],
    split: usize,
) -> Result<ParseStatus, ParseError> {
    let (head, tail) = data.split_at(split);
    let mut doc = Document::with_config(kind, config.clone());
    assert_eq!(doc.parse(head)?, ParseStatus::Progress(split), "split at {split}");
    doc.parse(tail)
}

fn repeat(prefix: &str, byte: char, count: usize, suffix: &str) -> Vec<u8> {
    format!("{prefix}{}{suffix}", byte.to_string().repeat(count)).into_bytes()
}

#[test]
fn line_limit_holds_at_every_split() {
    let config = ParserConfig {
        max_line_len: 32,
        ..ParserConfig::default()
    };
    // Each pair is a message whose longest token is exactly the limit, and the
    // same message one byte over.
    let cases = [
        (
            DocumentKind::Request,
            repeat("GET / HTTP/1.1\r\nX-Long: ", 'a', 24, "\r\n\r\n"),
            repeat("GET / HTTP/1.1\r\nX-Long: ", 'a', 25, "\r\n\r\n"),
        ),
        (
            DocumentKind::Request,
            repeat("", 'A', 32, " / HTTP/1.1\r\n\r\n"),
            repeat("", 'A', 33, " / HTTP/1.1\r\n\r\n"),
        ),
        (
            DocumentKind::Request,
            repeat("GET /", 'u', 31, " HTTP/1.1\r\n\r\n"),
            repeat("GET /", 'u', 32, " HTTP/1.1\r\n\r\n"),
        ),
        (
            DocumentKind::Request,
            repeat("GET /", 'u', 31, "\r\n\r\n"),
            repeat("GET /", 'u', 32, "\r\n\r\n"),
        ),
        (
            DocumentKind::Response,
            repeat("HTTP/1.1 200 ", 'R', 32, "\r\nContent-Length: 0\r\n\r\n"),
            repeat("HTTP/1.1 200 ", 'R', 33, "\r\nContent-Length: 0\r\n\r\n"),
        ),
    ];

    for (kind, fits, over) in &cases {
        for split in 0..fits.len() {
            assert_eq!(
                parse_split(*kind, &config, fits, split),
                Ok(ParseStatus::Done(fits.len() - split)),
                "{:?} split at {split}",
                String::from_utf8_lossy(fits)
            );
        }
        for split in 0..over.len() {
            assert_eq!(
                parse_split(*kind, &config, over, split),
                Err(ParseError::LineTooLong(32)),
                "{:?} split at {split}",
                String::from_utf8_lossy(over)
            );
        }
    }
}

#[test]
fn default_line_limit_ignores_where_the_terminator_is_cut() {
    let config = ParserConfig::default();
    let fits = repeat("GET / HTTP/1.1\r\nX-Long: ", 'a', 8184, "\r\n\r\n");
    let over = repeat("GET / HTTP/1.1\r\nX-Long: ", 'a', 8185, "\r\n\r\n");

    // Cut just before, inside and just after the CRLF closing the long line.
    for back in 3..=6 {
        let split = fits.len() - back;
        assert_eq!(
            parse_split(DocumentKind::Request, &config, &fits, split),
            Ok(ParseStatus::Done(back)),
            "split at {split}"
        );
        let split = over.len() - back;
        assert_eq!(
            parse_split(DocumentKind::Request, &config, &over, split),
            Err(ParseError::LineTooLong(8192)),
            "split at {split}"
        );
    }
}

#[test]
fn long_method_is_rejected_in_one_fragment() {
    let raw = repeat("", 'A', 9000, " / HTTP/1.1\r\n\r\n");
    assert_eq!(
        parse_request(&raw).unwrap_err(),
        ParseError::LineTooLong(8192)
    );
    assert_eq!(
        parse_split(DocumentKind::Request, &ParserConfig::default(), &raw, 8500),
        Err(ParseError::LineTooLong(8192))
    );
}

#[test]
fn byte_by_byte_feeding() {
    let mut doc = Document::request();
    let (last, rest) = POST_REQUEST.split_last().unwrap();
    for byte in rest.chunks(1) {
        assert_eq!(doc.parse(byte).unwrap(), ParseStatus::Progress(1));
    }
    assert_eq!(
        doc.parse(std::slice::from_ref(last)).unwrap(),
        ParseStatus::Done(1)
    );
    assert_eq!(doc.method(), "POST");
    assert_eq!(doc.uri(), "/uri/abc");
    assert_eq!(doc.headers().len(), 4);
    assert_eq!(doc.body().unwrap(), "abc");
}

#[test]
fn split_tokens_are_owned_and_the_rest_borrowed() {
    let first: &[u8] = b"GET /uri/abc HTTP/1.1\r\nAcc";
    let second: &[u8] = b"ept: XAccept\r\nHost: domain.com\r\n\r\n";
    let mut doc = Document::request();
    assert_eq!(
        feed(&mut doc, &[first, second]).unwrap(),
        ParseStatus::Done(second.len())
    );

    assert!(doc.method().is_borrowed());
    assert!(doc.uri().is_borrowed());

    let accept = doc.headers().iter().next().unwrap();
    assert_eq!(accept.name, "Accept");
    assert!(accept.name.is_owned());
    assert!(accept.value.is_owned());

    let host = doc.headers().iter().nth(1).unwrap();
    assert_eq!(host.value, "domain.com");
    assert!(host.value.is_borrowed());
}

#[test]
fn split_body_is_joined() {
    let first: &[u8] = b"POST / HTTP/1.1\r\nContent-Length: 6\r\n\r\nabc";
    let second: &[u8] = b"def";
    let mut doc = Document::request();
    assert_eq!(
        feed(&mut doc, &[first, second]).unwrap(),
        ParseStatus::Done(3)
    );
    assert_eq!(doc.body().unwrap(), "abcdef");
}

#[test]
fn empty_fragments_are_harmless() {
    let mut doc = Document::request();
    assert_eq!(doc.parse(b"").unwrap(), ParseStatus::Progress(0));
    assert_eq!(doc.parse(b"GET / HT").unwrap(), ParseStatus::Progress(8));
    assert_eq!(doc.parse(b"").unwrap(), ParseStatus::Progress(0));
    assert_eq!(doc.parse(b"TP/1.1\r\n\r\n").unwrap(), ParseStatus::Done(10));
    assert_eq!(doc.version(), Version::HTTP_11);
}

// =========================================================================
// Document reuse
// =========================================================================

#[test]
fn same_document_parses_repeatedly() {
    let mut doc = Document::request();
    for round in 0..10 {
        let data = if round % 2 == 0 { GET_REQUEST } else { POST_REQUEST };
        assert_eq!(doc.parse(data).unwrap(), ParseStatus::Done(data.len()));
        assert!(doc.is_done());
        if round % 2 == 0 {
            assert_eq!(doc.method(), "GET");
            assert!(doc.body().is_none());
            assert_eq!(doc.headers().len(), 3);
        } else {
            assert_eq!(doc.method(), "POST");
            assert_eq!(doc.body().unwrap(), "abc");
            assert_eq!(doc.headers().len(), 4);
        }
    }
}

#[test]
fn error_is_sticky_until_next_parse() {
    let mut doc = Document::response();
    assert!(doc.parse(b"HTTP/1.1200 OK\r\n\r\n").is_err());
    assert!(doc.parse_error().is_some());
    assert!(!doc.parse_eof());
    assert!(!doc.is_done());

    assert_eq!(
        doc.parse(OK_RESPONSE).unwrap(),
        ParseStatus::Done(OK_RESPONSE.len())
    );
    assert!(doc.parse_error().is_none());
    assert_eq!(doc.status(), 200);
}

#[test]
fn reset_discards_partial_message() {
    let mut doc = Document::request();
    assert!(!doc.parse(b"GET /partial HTTP/1.1\r\nHo").unwrap().is_done());
    doc.reset();
    assert!(doc.headers().is_empty());
    assert!(doc.method().is_empty());

    assert_eq!(
        doc.parse(GET_REQUEST).unwrap(),
        ParseStatus::Done(GET_REQUEST.len())
    );
    assert_eq!(doc.uri(), "/uri/abc");
}

#[test]
fn parse_eof_on_incomplete_request_is_false() {
    let mut doc = Document::request();
    doc.parse(b"GET / HTTP/1.1\r\n").unwrap();
    assert!(!doc.parse_eof());
}

// =========================================================================
// One-shot helpers
// =========================================================================

#[test]
fn one_shot_request_reports_incomplete() {
    let err = parse_request(b"GET / HTTP/1.1\r\nHost: x\r\n").unwrap_err();
    assert_eq!(err, ParseError::Incomplete);
    assert!(!err.is_malformed());
}

#[test]
fn one_shot_response_treats_end_as_eof() {
    let res = parse_response(NOT_FOUND_RESPONSE).expect("should parse");
    assert_eq!(res.status(), 404);
    assert!(res.is_done());
}

#[test]
fn error_messages_are_readable() {
    let err = parse_request(b"GET / HTTP/1.1\r\nBad Header: x\r\n\r\n").unwrap_err();
    assert_eq!(err.to_string(), "invalid header line: 'Bad Header: x'");
}

// =========================================================================
// Edge cases
// =========================================================================

#[test]
fn large_body_content_length() {
    let body = "X".repeat(100_000);
    let raw = format!(
        "POST / HTTP/1.1\r\n\
         Host: h\r\n\
         Content-Length: {}\r\n\r\n\
         {}",
        body.len(),
        body
    );
    let req = parse_request(raw.as_bytes()).unwrap();
    assert_eq!(req.body().unwrap().as_str(), Some(body.as_str()));
}

#[test]
fn many_headers_within_limit() {
    let mut raw = String::from("GET / HTTP/1.1\r\n");
    for i in 0..100 {
        raw.push_str(&format!("X-Header-{i}: value-{i}\r\n"));
    }
    raw.push_str("\r\n");
    let req = parse_request(raw.as_bytes()).unwrap();
    assert_eq!(req.headers().len(), 100);
    assert_eq!(req.field("X-Header-99").unwrap(), "value-99");
}

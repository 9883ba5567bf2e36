//! Shared helpers for tests that need a local HTTP endpoint.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

/// Spawns a `tiny_http` server on an ephemeral port and returns its base URL.
///
/// The handler runs for every incoming request; the server thread lives for
/// the rest of the test process.
pub fn serve<F>(handler: F) -> String
where
    F: Fn(tiny_http::Request) + Send + 'static,
{
    let server = tiny_http::Server::http("127.0.0.1:0").expect("bind test server");
    let addr = server.server_addr().to_ip().expect("test server address");

    thread::spawn(move || {
        for request in server.incoming_requests() {
            handler(request);
        }
    });

    format!("http://{}", addr)
}

/// A bodyless response with the given status code.
pub fn status_response(status: u16) -> tiny_http::Response<std::io::Empty> {
    tiny_http::Response::empty(status)
}

/// A 302 redirect to `location` (absolute or relative).
pub fn redirect_response(location: &str) -> tiny_http::Response<std::io::Empty> {
    status_response(302).with_header(
        tiny_http::Header::from_bytes(&b"Location"[..], location.as_bytes())
            .expect("valid Location header"),
    )
}

/// Serves a single response whose Content-Length promises more bytes than
/// are actually sent, then closes the connection mid-stream.
pub fn serve_truncated(body: &[u8], claimed_len: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("test listener address");
    let body = body.to_vec();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request_head = [0u8; 2048];
            let _ = stream.read(&mut request_head);

            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                claimed_len
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
            // Dropping the stream closes the socket before the promised
            // bytes arrive.
        }
    });

    format!("http://{}", addr)
}

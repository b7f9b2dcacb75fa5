//! Fixtures for handler tests: an `App` without a window and a canned HTTP server

use super::App;
use crate::api::ApiClient;
use crate::db::Database;
use crate::settings::Settings;
use crate::types::{Role, User};
use eframe::egui;
use rstest::fixture;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

pub(crate) use super::toast::ToastKind;

/// Nothing listens here; requests spawned by handlers are never applied anyway
const UNREACHABLE_API: &str = "http://127.0.0.1:9";

/// App over an in-memory database. The runtime is current-thread and never
/// driven, so background requests stay queued.
#[fixture]
pub(crate) fn app() -> App {
    let db = Database::open_in_memory().expect("db");
    let api = ApiClient::new(UNREACHABLE_API, None).expect("client");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    App::from_parts(
        egui::Context::default(),
        db,
        api,
        Settings::default(),
        std::env::temp_dir(),
        runtime,
    )
}

pub(crate) fn user(role: Role) -> User {
    User {
        sub: "u1".into(),
        email: "mia@slooze.xyz".into(),
        role,
        country: "INDIA".into(),
        name: "Mia".into(),
    }
}

pub(crate) fn user_json(role: &str) -> String {
    format!(r#"{{"sub":"u1","email":"mia@slooze.xyz","role":"{role}","country":"INDIA","name":"Mia"}}"#)
}

/// Raw HTTP/1.1 response with a JSON body
pub(crate) fn response(status: &str, headers: &[&str], body: &str) -> String {
    let mut out = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        body.len()
    );
    for header in headers {
        out.push_str(header);
        out.push_str("\r\n");
    }
    out.push_str("\r\n");
    out.push_str(body);
    out
}

/// Answer one connection per canned response, in order. Returns the base URL.
pub(crate) fn serve(responses: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    thread::spawn(move || {
        for canned in responses {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            read_request(&stream);
            stream.write_all(canned.as_bytes()).ok();
            stream.flush().ok();
        }
    });
    format!("http://{addr}")
}

fn read_request(stream: &TcpStream) {
    let mut reader = BufReader::new(stream);
    let mut length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0; length];
    reader.read_exact(&mut body).ok();
}

/// Current-thread runtime for driving a single async call in a test
pub(crate) fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
        .block_on(future)
}

use std::net::TcpListener;
use std::thread;
use std::time::Duration;

/// Accepts TCP connections and never answers, returns the listening port
pub fn launch_silent_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let mut open_connections = Vec::new();
        for stream in listener.incoming() {
            // Keep the connection open, without sending anything
            open_connections.push(stream);
            thread::sleep(Duration::from_millis(10));
        }
    });
    port
}

/// A local port nothing listens on
pub fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

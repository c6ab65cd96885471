//! Shared helpers for integration tests: a one-shot loopback HTTP server
//! and gzip tarball builders.

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

/// A canned HTTP response served by the loopback test server
pub struct CannedResponse {
    pub status: u16,
    pub body: Vec<u8>,
    /// Content-Length to declare; defaults to the body length. Declaring
    /// more than is sent makes the client observe a truncated body.
    pub declared_len: Option<usize>,
}

impl CannedResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        CannedResponse {
            status: 200,
            body: body.into(),
            declared_len: None,
        }
    }

    pub fn status(status: u16) -> Self {
        CannedResponse {
            status,
            body: Vec::new(),
            declared_len: None,
        }
    }

    pub fn truncated(body: impl Into<Vec<u8>>, declared_len: usize) -> Self {
        CannedResponse {
            status: 200,
            body: body.into(),
            declared_len: Some(declared_len),
        }
    }
}

/// Serve the given responses in order, one per connection, on a loopback
/// port, and return the base URL. Connections beyond the scripted list are
/// refused because the listener is dropped with the serving thread.
pub fn serve(responses: Vec<CannedResponse>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");

    thread::spawn(move || {
        for response in responses {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            read_request_head(&mut stream);

            let reason = if response.status == 200 { "OK" } else { "Error" };
            let declared = response.declared_len.unwrap_or(response.body.len());
            let head = format!(
                "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                response.status, reason, declared
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&response.body);
        }
    });

    format!("http://{}", addr)
}

/// Read until the end of the request headers so the client sees its request
/// accepted before the response arrives.
fn read_request_head(stream: &mut TcpStream) {
    let mut buf = [0u8; 1024];
    let mut seen = Vec::new();
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                seen.extend_from_slice(&buf[..n]);
                if seen.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            },
            Err(_) => break,
        }
    }
}

/// One entry of a test archive
pub enum ArchiveEntry {
    Dir {
        path: &'static str,
        mode: u32,
    },
    File {
        path: &'static str,
        mode: u32,
        content: Vec<u8>,
    },
    Symlink {
        path: &'static str,
        target: &'static str,
    },
    /// A regular-file entry whose recorded name is written raw, bypassing
    /// path validation, to simulate a crafted archive.
    RawName {
        name: &'static [u8],
        content: Vec<u8>,
    },
    /// An entry type the extractor does not handle
    Fifo {
        path: &'static str,
    },
}

/// Build a gzip-compressed tar archive from the given entries
pub fn build_archive(entries: Vec<ArchiveEntry>) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in entries {
        match entry {
            ArchiveEntry::Dir { path, mode } => {
                let mut header = tar::Header::new_gnu();
                header.set_entry_type(tar::EntryType::Directory);
                header.set_size(0);
                header.set_mode(mode);
                builder
                    .append_data(&mut header, path, std::io::empty())
                    .expect("append dir entry");
            },
            ArchiveEntry::File {
                path,
                mode,
                content,
            } => {
                let mut header = tar::Header::new_gnu();
                header.set_size(content.len() as u64);
                header.set_mode(mode);
                builder
                    .append_data(&mut header, path, content.as_slice())
                    .expect("append file entry");
            },
            ArchiveEntry::Symlink { path, target } => {
                let mut header = tar::Header::new_gnu();
                header.set_entry_type(tar::EntryType::Symlink);
                header.set_size(0);
                header.set_mode(0o777);
                builder
                    .append_link(&mut header, path, target)
                    .expect("append symlink entry");
            },
            ArchiveEntry::RawName { name, content } => {
                let mut header = tar::Header::new_gnu();
                {
                    let raw = header.as_old_mut();
                    raw.name[..name.len()].copy_from_slice(name);
                }
                header.set_size(content.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder
                    .append(&header, content.as_slice())
                    .expect("append raw-name entry");
            },
            ArchiveEntry::Fifo { path } => {
                let mut header = tar::Header::new_gnu();
                header.set_entry_type(tar::EntryType::Fifo);
                header.set_size(0);
                header.set_mode(0o644);
                builder
                    .append_data(&mut header, path, std::io::empty())
                    .expect("append fifo entry");
            },
        }
    }

    let encoder = builder.into_inner().expect("finish tar");
    encoder.finish().expect("finish gzip")
}

/// Build an archive shaped like a Go release: VERSION file plus entry-point
/// scripts that answer a version query.
pub fn build_toolchain_archive(version: &str) -> Vec<u8> {
    let tagged = format!("go{}", version);
    let script = format!("#!/bin/sh\necho \"go version {} linux/amd64\"\n", tagged);

    build_archive(vec![
        ArchiveEntry::Dir {
            path: "go",
            mode: 0o755,
        },
        ArchiveEntry::File {
            path: "go/VERSION",
            mode: 0o644,
            content: format!("{}\ntime 2026-01-01T00:00:00Z\n", tagged).into_bytes(),
        },
        ArchiveEntry::Dir {
            path: "go/bin",
            mode: 0o755,
        },
        ArchiveEntry::File {
            path: "go/bin/go",
            mode: 0o755,
            content: script.clone().into_bytes(),
        },
        ArchiveEntry::File {
            path: "go/bin/gofmt",
            mode: 0o755,
            content: script.into_bytes(),
        },
    ])
}

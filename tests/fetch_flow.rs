//! End-to-end: HTTP/1.1 transport, in-memory cache and model fetcher against
//! a local listener.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::BytesMut;
use cachefetch::cache::{CacheStore, MemoryCache};
use cachefetch::client::Http1Client;
use cachefetch::fetch::{FetchError, FetchService};
use cachefetch::fetcher::ModelFetcher;
use cachefetch::http::Request;
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    id: i64,
    name: String,
}

/// Answers every connection with `reply` and counts connections.
async fn serve(reply: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&hits);
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = BytesMut::with_capacity(1024);
                while !buf.ends_with(b"\r\n\r\n") {
                    match stream.read_buf(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(_) => {}
                    }
                }
                let _ = stream.write_all(reply.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), hits)
}

fn fetcher() -> (ModelFetcher, Arc<MemoryCache>) {
    let cache = Arc::new(MemoryCache::new());
    let service = FetchService::new(Arc::new(Http1Client::new()), cache.clone());
    (ModelFetcher::new(service), cache)
}

#[tokio::test]
async fn second_fetch_comes_from_cache() {
    let (base, hits) =
        serve("HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 19\r\n\r\n{\"id\":1,\"name\":\"x\"}")
            .await;
    let url = format!("{base}/item/1");
    let (fetcher, cache) = fetcher();

    let first: Option<Item> = fetcher.fetch_model_object(&url).await.unwrap();
    let second: Option<Item> = fetcher.fetch_model_object(&url).await.unwrap();

    let expected = Item {
        id: 1,
        name: "x".into(),
    };
    assert_eq!(first.as_ref(), Some(&expected));
    assert_eq!(second, Some(expected));
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let stored = cache.lookup(&Request::get(&url).unwrap()).unwrap();
    assert_eq!(
        stored.response().headers().get("content-type"),
        Some("application/json")
    );
}

#[tokio::test]
async fn not_found_is_refetched_every_time() {
    let (base, hits) = serve("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n").await;
    let url = format!("{base}/item/404");
    let (fetcher, cache) = fetcher();

    for _ in 0..2 {
        let bytes = fetcher.source().request(&url).await.unwrap();
        assert!(bytes.is_empty());
    }

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(cache.lookup(&Request::get(&url).unwrap()).is_none());
}

#[tokio::test]
async fn invalid_url_never_reaches_the_network() {
    let (fetcher, cache) = fetcher();
    let err = fetcher
        .fetch_model_object::<Item>("not a url")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl(_)));
    assert_eq!(cache.entry_count(), 0);
}

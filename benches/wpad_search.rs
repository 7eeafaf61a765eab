use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use wpadscout::dns::{DnsTransport, DnsWpadSearch, TriedNames};
use wpadscout::wpad::parse;

/// Resolves nothing, so every reduction runs to the top-level label.
struct EmptyDns;

#[async_trait]
impl DnsTransport for EmptyDns {
    async fn lookup_addresses(&self, _name: &str) -> anyhow::Result<Vec<IpAddr>> {
        Ok(vec![])
    }

    async fn lookup_ptr(&self, _name: &str) -> anyhow::Result<Vec<String>> {
        Ok(vec![])
    }
}

fn bench_pac_parse(c: &mut Criterion) {
    let mut body = String::from("function FindProxyForURL(url, host) {\n");
    for i in 0..200u32 {
        body.push_str(&format!(
            "  if (dnsDomainIs(host, \".site{}.example\")) return \"PROXY 10.0.{}.{}:3128; DIRECT\";\n",
            i,
            i >> 8,
            i & 0xff
        ));
    }
    body.push_str("  return \"DIRECT\";\n}\n");

    c.bench_function("pac_parse_200_directives", |b| {
        b.iter(|| {
            black_box(parse(black_box(&body)));
        });
    });
}

fn bench_reduce_search(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let search = DnsWpadSearch::new(Arc::new(EmptyDns), Duration::from_secs(1));

    c.bench_function("dns_reduce_search_6_labels", |b| {
        b.iter(|| {
            let mut tried = TriedNames::new();
            runtime.block_on(async {
                black_box(
                    search
                        .reduce_search("a.b.c.d.example.com", &mut tried)
                        .await,
                );
            });
        });
    });
}

criterion_group!(benches, bench_pac_parse, bench_reduce_search);
criterion_main!(benches);

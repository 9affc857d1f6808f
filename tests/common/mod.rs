// Shared test helpers
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use tcstatus::{Aggregator, Credentials, Dispatcher, HostExpander, HttpFetcher, SortField};

pub fn worker(uri: &str, time: u64, remote_addr: &str) -> String {
    format!(
        r#"<worker stage="S" requestProcessingTime="{}" requestBytesSent="0" requestBytesReceived="0" remoteAddr="{}" virtualHost="localhost" method="GET" currentUri="{}" currentQueryString="?" protocol="HTTP/1.1" />"#,
        time, remote_addr, uri
    )
}

pub fn idle_worker() -> String {
    r#"<worker stage="R" requestProcessingTime="0" requestBytesSent="0" requestBytesReceived="0" remoteAddr="?" virtualHost="?" method="?" currentUri="?" currentQueryString="?" protocol="?" />"#.to_string()
}

pub fn status_document(workers: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><?xml-stylesheet type="text/xsl" href="/manager/xform.xsl" ?><status><jvm><memory free="1" total="2" max="3"/></jvm><connector name="http-nio-8080"><threadInfo maxThreads="200" currentThreadCount="10" currentThreadsBusy="{}"/><workers>{}</workers></connector></status>"#,
        workers.len(),
        workers.concat()
    )
}

pub fn aggregator(hosts: Vec<String>, timeout: Duration, credentials: Option<Credentials>) -> Aggregator {
    Aggregator::new(
        hosts,
        SortField::Host,
        HostExpander::default(),
        Dispatcher::new(4, timeout, None),
        Arc::new(HttpFetcher::new(timeout, credentials).unwrap()),
    )
}

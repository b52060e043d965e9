#![allow(dead_code)]
use ferrous_hooks_domain::{RecordData, ResourceRecord};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;

pub struct ResourceRecordBuilder {
    name: Arc<str>,
    ttl: u32,
    data: RecordData,
}

impl ResourceRecordBuilder {
    pub fn new() -> Self {
        Self {
            name: "example.com.".into(),
            ttl: 300,
            data: RecordData::A(Ipv4Addr::new(192, 0, 2, 1)),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.into();
        self
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn address(mut self, ip: &str) -> Self {
        self.data = RecordData::A(Ipv4Addr::from_str(ip).unwrap());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.data = RecordData::TXT(text.to_string());
        self
    }

    pub fn build(self) -> ResourceRecord {
        ResourceRecord::new(self.name, self.ttl, self.data)
    }
}

impl Default for ResourceRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

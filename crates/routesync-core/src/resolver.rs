//! System DNS resolver
//!
//! Uses `hickory-resolver` with the host's `/etc/resolv.conf` and hosts
//! file. Failures carry a typed kind, so "the name has no addresses" is told
//! apart from "the lookup could not be made" without reading messages.

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError as LookupError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::system_conf::read_system_conf;
use std::net::IpAddr;
use tracing::{debug, warn};

use crate::error::ResolveError;
use crate::traits::Resolver;

/// Resolver backed by the host's DNS configuration
#[derive(Clone)]
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl std::fmt::Debug for SystemResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemResolver").finish_non_exhaustive()
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemResolver {
    /// Read the system configuration, falling back to hickory's defaults
    ///
    /// Both A and AAAA records are always asked for.
    pub fn new() -> Self {
        let (config, mut opts) = match read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                warn!("Cannot read system DNS configuration, using defaults: {}", e);
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl Resolver for SystemResolver {
    async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>, ResolveError> {
        let lookup = self
            .inner
            .lookup_ip(name)
            .await
            .map_err(|e| classify(name, &e))?;

        let mut ips: Vec<IpAddr> = Vec::new();
        for ip in lookup.iter() {
            if !ips.contains(&ip) {
                ips.push(ip);
            }
        }

        if ips.is_empty() {
            return Err(ResolveError::NotFound(name.to_string()));
        }

        debug!("Resolved {} to {:?}", name, ips);
        Ok(ips)
    }
}

/// NXDOMAIN and empty answers mean the name has no addresses; a failing
/// server or transport is a lookup failure
fn classify(name: &str, err: &LookupError) -> ResolveError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. }
            if *response_code != ResponseCode::ServFail =>
        {
            ResolveError::NotFound(name.to_string())
        }
        _ => ResolveError::Lookup {
            name: name.to_string(),
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_resolver::proto::op::Query;
    use hickory_resolver::proto::rr::{Name, RecordType};

    fn no_records(name: &str, response_code: ResponseCode) -> LookupError {
        let query = Query::query(Name::from_ascii(name).unwrap(), RecordType::A);
        LookupError::from(ResolveErrorKind::NoRecordsFound {
            query: Box::new(query),
            soa: None,
            negative_ttl: None,
            response_code,
            trusted: true,
        })
    }

    #[tokio::test]
    async fn localhost_resolves() {
        let ips = SystemResolver::new().resolve("localhost").await.unwrap();
        assert!(!ips.is_empty());
        assert!(ips.iter().all(|ip| ip.is_loopback()));
    }

    #[tokio::test]
    async fn reserved_tld_does_not_resolve() {
        let result = SystemResolver::new()
            .resolve("invalid-domain-name.invalid")
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn nxdomain_is_not_found() {
        let err = no_records("name-does-not-resolve.invalid.", ResponseCode::NXDomain);
        assert_eq!(
            classify("name-does-not-resolve.invalid", &err),
            ResolveError::NotFound("name-does-not-resolve.invalid".to_string())
        );
    }

    #[test]
    fn empty_answer_is_not_found() {
        let err = no_records("example.com.", ResponseCode::NoError);
        assert!(matches!(classify("example.com", &err), ResolveError::NotFound(_)));
    }

    #[test]
    fn server_and_transport_failures_are_lookup_errors() {
        let servfail = no_records("example.com.", ResponseCode::ServFail);
        assert!(matches!(
            classify("example.com", &servfail),
            ResolveError::Lookup { .. }
        ));

        let timeout = LookupError::from(ResolveErrorKind::Timeout);
        assert!(matches!(
            classify("example.com", &timeout),
            ResolveError::Lookup { .. }
        ));
    }
}

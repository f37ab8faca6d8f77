//! Recommended DNS records for pointing a domain at Vercel.

use serde::Serialize;

pub const VERCEL_CNAME_TARGET: &str = "cname.vercel-dns.com";
pub const VERCEL_APEX_IP: &str = "76.76.21.21";

/// Subdomains get a CNAME, apex domains an A record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DnsRecommendation {
    Cname {
        cnames: Vec<String>,
    },
    ARecord {
        #[serde(rename = "aValues")]
        a_values: Vec<String>,
    },
}

impl DnsRecommendation {
    /// Picks the record kind for `domain` and returns it along with the subdomain label.
    pub fn for_domain(domain: &str) -> (Self, Option<String>) {
        match subdomain_of(domain) {
            Some(label) => (
                Self::Cname {
                    cnames: vec![VERCEL_CNAME_TARGET.to_string()],
                },
                Some(label),
            ),
            None => (
                Self::ARecord {
                    a_values: vec![VERCEL_APEX_IP.to_string()],
                },
                None,
            ),
        }
    }
}

/// Returns the labels left of the registrable domain, or `None` for an apex
/// domain or a name the Public Suffix List cannot split.
///
/// Only ICANN suffixes count: `foo.vercel.app` has subdomain `foo`.
pub fn subdomain_of(domain: &str) -> Option<String> {
    let suffix = icann_suffix(domain)?;
    let rest = domain.strip_suffix(suffix)?.strip_suffix('.')?;
    let (label, _registrable) = rest.rsplit_once('.')?;
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

/// Longest suffix of `name` matched by an ICANN rule (or the default rule).
fn icann_suffix(name: &str) -> Option<&str> {
    let mut candidate = name;
    loop {
        let suffix = psl::suffix(candidate.as_bytes())?;
        let matched = &candidate[candidate.len() - suffix.as_bytes().len()..];
        match suffix.typ() {
            // Private rules extend an ICANN one; drop a label and look again.
            Some(psl::Type::Private) => match matched.split_once('.') {
                Some((_, parent)) => candidate = parent,
                None => return Some(matched),
            },
            _ => return Some(matched),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdomain_gets_cname() {
        let (rec, sub) = DnsRecommendation::for_domain("blog.example.com");
        assert_eq!(sub.as_deref(), Some("blog"));
        assert_eq!(
            rec,
            DnsRecommendation::Cname {
                cnames: vec!["cname.vercel-dns.com".to_string()]
            }
        );
    }

    #[test]
    fn apex_gets_a_record() {
        let (rec, sub) = DnsRecommendation::for_domain("example.com");
        assert_eq!(sub, None);
        assert_eq!(
            rec,
            DnsRecommendation::ARecord {
                a_values: vec!["76.76.21.21".to_string()]
            }
        );
    }

    #[test]
    fn multi_label_suffixes() {
        assert_eq!(subdomain_of("example.co.uk"), None);
        assert_eq!(subdomain_of("shop.example.co.uk").as_deref(), Some("shop"));
        assert_eq!(subdomain_of("a.b.example.com").as_deref(), Some("a.b"));
    }

    #[test]
    fn private_suffixes_are_not_registrable_roots() {
        assert_eq!(subdomain_of("foo.vercel.app").as_deref(), Some("foo"));
        assert_eq!(subdomain_of("my.github.io").as_deref(), Some("my"));
        assert_eq!(subdomain_of("shop.blogspot.com").as_deref(), Some("shop"));
        assert_eq!(subdomain_of("vercel.app"), None);

        let (rec, sub) = DnsRecommendation::for_domain("foo.vercel.app");
        assert_eq!(sub.as_deref(), Some("foo"));
        assert!(matches!(rec, DnsRecommendation::Cname { .. }));
    }

    #[test]
    fn bare_suffix_has_no_subdomain() {
        assert_eq!(subdomain_of("com"), None);
        assert_eq!(subdomain_of("co.uk"), None);
    }

    #[test]
    fn serializes_only_one_field() {
        let (rec, _) = DnsRecommendation::for_domain("www.example.com");
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json, serde_json::json!({"cnames": ["cname.vercel-dns.com"]}));

        let (rec, _) = DnsRecommendation::for_domain("example.com");
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json, serde_json::json!({"aValues": ["76.76.21.21"]}));
    }
}

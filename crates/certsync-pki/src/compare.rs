//! Comparison of a decoded CSR, or a private key, against the desired
//! certificate spec.

use std::collections::BTreeSet;
use std::net::IpAddr;

use certsync_core::models::certificate::{CertificateSpec, KeyAlgorithm};

use crate::csr::ParsedCsr;
use crate::key::KeyMaterial;

/// Names of the certificate fields whose CSR encoding differs from `spec`.
///
/// SAN lists and organizations compare as sets. Key algorithm and size
/// are only checked when `spec` pins them. An empty result means the
/// CSR satisfies `spec`.
pub fn spec_mismatches(csr: &ParsedCsr, spec: &CertificateSpec) -> Vec<&'static str> {
    let mut fields = Vec::new();

    if csr.common_name.as_deref() != spec.common_name.as_deref() {
        fields.push("commonName");
    }
    if !same_set(&csr.organizations, spec.organizations()) {
        fields.push("subject.organizations");
    }
    if !same_set(&csr.dns_names, &spec.dns_names) {
        fields.push("dnsNames");
    }
    let spec_ips: Vec<String> = spec.ip_addresses.iter().map(|ip| canonical_ip(ip)).collect();
    if !same_set(&csr.ip_addresses, &spec_ips) {
        fields.push("ipAddresses");
    }
    if !same_set(&csr.uris, &spec.uris) {
        fields.push("uris");
    }
    if !same_set(&csr.email_addresses, &spec.email_addresses) {
        fields.push("emailAddresses");
    }

    fields.extend(private_key_mismatch(csr.key_algorithm, csr.key_size, spec));
    fields
}

/// The `privateKey` field `key` fails to satisfy, if `spec` pins one.
///
/// A key that fails here can never produce a CSR that
/// [`spec_mismatches`] accepts.
pub fn key_mismatches(key: &KeyMaterial, spec: &CertificateSpec) -> Option<&'static str> {
    private_key_mismatch(Some(key.algorithm()), key.key_size(), spec)
}

fn private_key_mismatch(
    algorithm: Option<KeyAlgorithm>,
    size: Option<u32>,
    spec: &CertificateSpec,
) -> Option<&'static str> {
    let pinned = spec.private_key.as_ref()?;
    let wanted = pinned.algorithm?;
    if algorithm != Some(wanted) {
        Some("privateKey.algorithm")
    } else if wanted != KeyAlgorithm::Ed25519 && pinned.size.is_some() && size != pinned.size {
        Some("privateKey.size")
    } else {
        None
    }
}

fn same_set(a: &[String], b: &[String]) -> bool {
    a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}

fn canonical_ip(ip: &str) -> String {
    ip.parse::<IpAddr>()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| ip.to_string())
}

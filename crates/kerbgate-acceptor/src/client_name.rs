use core::fmt;
use std::io;
use std::net::IpAddr;

/// Identity string recorded for the peer in the audit trail.
///
/// Either the peer's hostname, cross-checked against its forward records,
/// or the dotted address when resolution degraded. Never influences the
/// authentication outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientLabel {
    label: String,
    verified: bool,
}

impl ClientLabel {
    fn verified(name: String) -> Self {
        Self {
            label: name,
            verified: true,
        }
    }

    fn address_only(addr: IpAddr) -> Self {
        Self {
            label: addr.to_string(),
            verified: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }

    /// `true` when the label is a hostname whose forward records listed
    /// the peer address.
    pub fn is_verified(&self) -> bool {
        self.verified
    }
}

impl fmt::Display for ClientLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Name service used to resolve the peer; a trait so tests can substitute
/// a scripted resolver.
pub trait NameResolver {
    /// Reverse lookup: address to candidate hostname.
    fn reverse(&self, addr: IpAddr) -> io::Result<String>;

    /// Forward lookup: hostname to the addresses it is listed for.
    fn forward(&self, name: &str) -> io::Result<Vec<IpAddr>>;
}

kerbgate_pdu::assert_obj_safe!(NameResolver);

/// [`NameResolver`] backed by the system's resolver library.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemResolver;

impl NameResolver for SystemResolver {
    fn reverse(&self, addr: IpAddr) -> io::Result<String> {
        dns_lookup::lookup_addr(&addr)
    }

    fn forward(&self, name: &str) -> io::Result<Vec<IpAddr>> {
        dns_lookup::lookup_host(name)
    }
}

/// Resolves the audit label for a peer address.
///
/// Distrust distant nameservers: a hostname obtained by reverse lookup is
/// only trusted once a forward lookup of that hostname lists the peer
/// address again. Every degradation falls back to the dotted address and
/// is logged; none is fatal, and none affects authentication.
pub fn resolve_client(resolver: &dyn NameResolver, addr: IpAddr) -> ClientLabel {
    let name = match resolver.reverse(addr) {
        Ok(name) => name,
        Err(e) => {
            warn!(%addr, error = %e, "unable to resolve a name for the client");
            return ClientLabel::address_only(addr);
        }
    };

    match resolver.forward(&name) {
        Ok(addrs) if addrs.contains(&addr) => ClientLabel::verified(name),
        Ok(_) => {
            warn!(%addr, name, "client address not listed for its host name");
            ClientLabel::address_only(addr)
        }
        Err(e) => {
            warn!(%addr, name, error = %e, "client resolves to an unknown host name");
            ClientLabel::address_only(addr)
        }
    }
}

use core::fmt;
use std::io::{Read, Write};
use std::net::SocketAddr;

use kerbgate_acceptor::{resolve_client, Acceptor, AuthPolicy, AuthProvider, NameResolver};

use crate::framed::Framed;
use crate::sealed::SealedChannel;
use crate::{accept, ChannelError, ChannelErrorExt as _, ChannelResult};

/// Failure from the administration command dispatcher.
///
/// Fatal to the connection: the loop does not continue past a request the
/// dispatcher could not answer.
#[derive(Debug)]
pub struct DispatchError {
    reason: String,
}

impl DispatchError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for DispatchError {}

/// Interpreter of unsealed administration requests, consumed once per
/// received frame. Key-database semantics are entirely its business.
pub trait CommandDispatcher: Send {
    fn dispatch(&mut self, request: &[u8]) -> Result<Vec<u8>, DispatchError>;
}

kerbgate_pdu::assert_obj_safe!(CommandDispatcher);

/// Runs a complete administration session over `stream`.
///
/// Resolves the client's audit label, requires an authenticated current
/// ticket exchange, then loops: receive a sealed request, dispatch it,
/// send back the sealed response. Ends when the client closes the stream
/// at a frame boundary; every detected failure ends the session
/// immediately. The authentication handle is released exactly once on
/// every path out of here.
pub fn serve_admin<S>(
    stream: S,
    peer: SocketAddr,
    resolver: &dyn NameResolver,
    provider: &mut dyn AuthProvider,
    dispatcher: &mut dyn CommandDispatcher,
) -> ChannelResult<()>
where
    S: Read + Write,
{
    // The audit label must exist before any authentication decision is
    // logged.
    let client = resolve_client(resolver, peer.ip());

    info!(client = client.as_str(), addr = %peer.ip(), port = peer.port(), "servicing administration request");

    let mut framed = Framed::new(stream);
    let mut acceptor = Acceptor::new(AuthPolicy::Required, peer);

    let session = match accept(&mut framed, &mut acceptor, provider) {
        Ok(session) => session,
        Err(e) => {
            warn!(client = client.as_str(), addr = %peer.ip(), error = format_args!("{}", e.report()), "administration handshake failed");
            return Err(ChannelError::acceptor(e));
        }
    };

    let mut channel = SealedChannel::bind(framed, &session)?;
    let handle = channel.handle();

    let result = admin_loop(&mut channel, provider, dispatcher);

    // Exactly once, success and failure alike.
    provider.release(handle);

    match &result {
        Ok(()) => info!(client = client.as_str(), "administration session closed"),
        Err(e) => warn!(
            client = client.as_str(),
            addr = %peer.ip(),
            error = format_args!("{}", e.report()),
            "administration session failed"
        ),
    }

    result
}

fn admin_loop<S>(
    channel: &mut SealedChannel<S>,
    provider: &mut dyn AuthProvider,
    dispatcher: &mut dyn CommandDispatcher,
) -> ChannelResult<()>
where
    S: Read + Write,
{
    while let Some(request) = channel.recv(provider)? {
        trace!(length = request.len(), "dispatch request");

        let response = dispatcher
            .dispatch(&request)
            .map_err(|e| ChannelError::dispatch("dispatch request", e))?;

        channel.send(provider, &response)?;
    }

    Ok(())
}

/// Maps a finished administration session to the process exit status of
/// the daemons: 0 for a graceful close, 1 for any fatal authentication,
/// framing, sealing or dispatch failure.
pub fn exit_code(result: &ChannelResult<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

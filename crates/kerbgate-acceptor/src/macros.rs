/// Creates an `AcceptorError` with `General` kind
///
/// Shorthand for
/// ```rust
/// <kerbgate_acceptor::AcceptorError as kerbgate_acceptor::AcceptorErrorExt>::general(context)
/// ```
#[macro_export]
macro_rules! general_err {
    ( $context:expr $(,)? ) => {{
        <$crate::AcceptorError as $crate::AcceptorErrorExt>::general($context)
    }};
}

/// Creates an `AcceptorError` with `Custom` kind and a source error attached to it
///
/// Shorthand for
/// ```rust
/// <kerbgate_acceptor::AcceptorError as kerbgate_acceptor::AcceptorErrorExt>::custom(context, source)
/// ```
#[macro_export]
macro_rules! custom_err {
    ( $context:expr, $source:expr $(,)? ) => {{
        <$crate::AcceptorError as $crate::AcceptorErrorExt>::custom($context, $source)
    }};
}

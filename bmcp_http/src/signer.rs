use std::fmt;

/// Produces the `signature` parameter for signed endpoints.
///
/// The client hands over the exact query string it is about to send
/// (including `timestamp` and `recvWindow`) and appends the returned value.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, payload: &str) -> String;
}

impl<F> RequestSigner for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn sign(&self, payload: &str) -> String {
        self(payload)
    }
}

impl fmt::Debug for dyn RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestSigner")
    }
}

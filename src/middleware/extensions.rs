use crate::security::nonce::RequestNonce;
use actix_web::HttpMessage;

/// Handler-side access to the nonce the middleware issued for this request.
pub trait CspExtensions {
    fn get_nonce(&self) -> Option<String>;
}

impl<T> CspExtensions for T
where
    T: HttpMessage,
{
    fn get_nonce(&self) -> Option<String> {
        self.extensions()
            .get::<RequestNonce>()
            .map(|nonce| nonce.0.clone())
    }
}

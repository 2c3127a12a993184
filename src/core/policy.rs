use crate::constants::{
    BASE_URI, CONNECT_SRC, DEFAULT_BUFFER_CAPACITY, DEFAULT_REPORT_ENDPOINT, DEFAULT_SRC,
    DEV_WEBSOCKET_ORIGIN, FRAME_ANCESTORS, HEADER_CSP, IMG_SRC, MIN_NONCE_LENGTH, OBJECT_SRC,
    REPORT_TO, SCRIPT_SRC, SEMICOLON_SPACE, STYLE_SRC, WORKER_SRC,
};
use crate::core::directive::Directive;
use crate::core::source::Source;
use crate::error::PortalError;
use crate::utils::BufferWriter;
use actix_web::http::header::{HeaderName, HeaderValue};
use bytes::BytesMut;
use indexmap::IndexMap;
use std::borrow::Cow;

/// An ordered set of CSP directives, rendered fresh for every response.
#[derive(Debug, Clone, Default)]
pub struct CspPolicy {
    directives: IndexMap<Cow<'static, str>, Directive>,
    report_to: Option<Cow<'static, str>>,
    estimated_size: usize,
}

impl CspPolicy {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_directive(&mut self, directive: Directive) -> &mut Self {
        let size_delta = directive.estimated_size();
        let name = directive.name().to_owned();
        self.directives.insert(Cow::Owned(name), directive);
        self.estimated_size += size_delta;
        self
    }

    pub fn set_report_to(&mut self, endpoint: impl Into<Cow<'static, str>>) -> &mut Self {
        let endpoint = endpoint.into();
        let old_size = self
            .report_to
            .as_ref()
            .map_or(0, |e| e.len() + REPORT_TO.len() + 1);
        let new_size = endpoint.len() + REPORT_TO.len() + 1;
        self.estimated_size = self.estimated_size - old_size + new_size;
        self.report_to = Some(endpoint);
        self
    }

    #[inline]
    pub fn header_name(&self) -> HeaderName {
        HeaderName::from_static(HEADER_CSP)
    }

    pub fn header_value(&self) -> Result<HeaderValue, PortalError> {
        let capacity = self.estimated_size.max(DEFAULT_BUFFER_CAPACITY);
        let mut buffer = BytesMut::with_capacity(capacity);

        let mut first = true;
        for directive in self.directives.values() {
            if !first {
                buffer.extend_from_slice(SEMICOLON_SPACE);
            }
            directive.write_to_buffer(&mut buffer);
            first = false;
        }

        if let Some(endpoint) = &self.report_to {
            if !first {
                buffer.extend_from_slice(SEMICOLON_SPACE);
            }
            buffer.extend_from_slice(REPORT_TO.as_bytes());
            buffer.extend_from_slice(b" ");
            buffer.extend_from_slice(endpoint.as_bytes());
        }

        HeaderValue::from_maybe_shared(buffer.freeze())
            .map_err(|_| PortalError::Header("Failed to create header value".to_string()))
    }

    pub fn validate(&self) -> Result<(), PortalError> {
        for directive in self.directives.values() {
            directive.validate()?;
        }
        Ok(())
    }

    #[inline]
    pub fn get_directive(&self, name: &str) -> Option<&Directive> {
        self.directives.get(name)
    }

    #[inline]
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.directives.values()
    }

    #[inline]
    pub fn report_to(&self) -> Option<&str> {
        self.report_to.as_deref()
    }

    #[inline]
    pub fn contains_nonce(&self) -> bool {
        self.directives.values().any(|d| d.contains_nonce())
    }
}

#[derive(Debug, Default)]
pub struct CspPolicyBuilder {
    policy: CspPolicy,
}

impl CspPolicyBuilder {
    #[inline]
    pub fn new() -> Self {
        Self {
            policy: CspPolicy::new(),
        }
    }

    #[inline]
    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.policy.add_directive(directive);
        self
    }

    fn directive(self, name: &'static str, sources: impl IntoIterator<Item = Source>) -> Self {
        let mut directive = Directive::new(name);
        directive.add_sources(sources);
        self.with_directive(directive)
    }

    pub fn default_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.directive(DEFAULT_SRC, sources)
    }

    pub fn script_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.directive(SCRIPT_SRC, sources)
    }

    pub fn style_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.directive(STYLE_SRC, sources)
    }

    pub fn img_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.directive(IMG_SRC, sources)
    }

    pub fn connect_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.directive(CONNECT_SRC, sources)
    }

    pub fn object_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.directive(OBJECT_SRC, sources)
    }

    pub fn worker_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.directive(WORKER_SRC, sources)
    }

    pub fn frame_ancestors(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.directive(FRAME_ANCESTORS, sources)
    }

    pub fn base_uri(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.directive(BASE_URI, sources)
    }

    #[inline]
    pub fn report_to(mut self, endpoint: impl Into<Cow<'static, str>>) -> Self {
        self.policy.set_report_to(endpoint);
        self
    }

    pub fn build(self) -> Result<CspPolicy, PortalError> {
        self.policy.validate()?;
        Ok(self.policy)
    }

    #[inline]
    pub fn build_unchecked(self) -> CspPolicy {
        self.policy
    }
}

/// Builds the portal's fixed directive set for one response.
///
/// `script-src` and `style-src` carry the per-request nonce; a nonce shorter
/// than the length guard is treated as absent, in which case development
/// builds fall back to `'unsafe-inline'` so error pages and the live-reload
/// client still run. `connect-src` admits the local WebSocket origin only in
/// development.
pub fn portal_policy(nonce: Option<&str>, is_development: bool) -> CspPolicy {
    let usable_nonce = nonce.filter(|n| n.len() >= MIN_NONCE_LENGTH);

    let mut inline_sources: Vec<Source> = vec![Source::Self_, Source::ReportSample];
    match usable_nonce {
        Some(nonce) => inline_sources.push(Source::Nonce(Cow::Owned(nonce.to_owned()))),
        None if is_development => inline_sources.push(Source::UnsafeInline),
        None => {}
    }

    let mut connect_sources: Vec<Source> = vec![Source::Self_];
    if is_development {
        connect_sources.push(Source::Host(Cow::Borrowed(DEV_WEBSOCKET_ORIGIN)));
    }
    connect_sources.push(Source::Scheme(Cow::Borrowed("data")));

    CspPolicyBuilder::new()
        .default_src([Source::Self_])
        .script_src(inline_sources.clone())
        .style_src(inline_sources)
        .img_src([
            Source::Self_,
            Source::Scheme(Cow::Borrowed("data")),
            Source::Scheme(Cow::Borrowed("blob")),
        ])
        .connect_src(connect_sources)
        .object_src([Source::None])
        .worker_src([Source::Self_, Source::Scheme(Cow::Borrowed("blob"))])
        .frame_ancestors([Source::None])
        .base_uri([Source::Self_])
        .report_to(DEFAULT_REPORT_ENDPOINT)
        .build_unchecked()
}

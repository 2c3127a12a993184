use crate::constants::{
    NONCE_PREFIX, NONE_SOURCE, REPORT_SAMPLE_SOURCE, SELF_SOURCE, SUFFIX_QUOTE,
    UNSAFE_INLINE_SOURCE,
};
use crate::utils::BufferWriter;
use bytes::BytesMut;
use std::{borrow::Cow, fmt};

/// A single value in a CSP directive's source list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    None,
    Self_,
    UnsafeInline,
    ReportSample,
    Host(Cow<'static, str>),
    Scheme(Cow<'static, str>),
    Nonce(Cow<'static, str>),
}

impl Source {
    #[inline(always)]
    pub const fn is_none(&self) -> bool {
        matches!(self, Source::None)
    }

    #[inline(always)]
    pub const fn is_self(&self) -> bool {
        matches!(self, Source::Self_)
    }

    #[inline(always)]
    pub const fn is_unsafe_inline(&self) -> bool {
        matches!(self, Source::UnsafeInline)
    }

    #[inline]
    pub fn estimated_size(&self) -> usize {
        match self {
            Source::None => NONE_SOURCE.len(),
            Source::Self_ => SELF_SOURCE.len(),
            Source::UnsafeInline => UNSAFE_INLINE_SOURCE.len(),
            Source::ReportSample => REPORT_SAMPLE_SOURCE.len(),
            Source::Host(host) => host.len(),
            Source::Scheme(scheme) => scheme.len() + 1,
            Source::Nonce(nonce) => NONCE_PREFIX.len() + nonce.len() + SUFFIX_QUOTE.len(),
        }
    }

    #[inline]
    pub fn contains_nonce(&self) -> bool {
        matches!(self, Source::Nonce(_))
    }

    #[inline]
    pub fn host(&self) -> Option<&str> {
        match self {
            Source::Host(host) => Some(host),
            _ => None,
        }
    }

    #[inline]
    pub fn scheme(&self) -> Option<&str> {
        match self {
            Source::Scheme(scheme) => Some(scheme),
            _ => None,
        }
    }

    #[inline]
    pub fn nonce(&self) -> Option<&str> {
        match self {
            Source::Nonce(nonce) => Some(nonce),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::None => f.write_str(NONE_SOURCE),
            Source::Self_ => f.write_str(SELF_SOURCE),
            Source::UnsafeInline => f.write_str(UNSAFE_INLINE_SOURCE),
            Source::ReportSample => f.write_str(REPORT_SAMPLE_SOURCE),
            Source::Host(host) => f.write_str(host),
            Source::Scheme(scheme) => write!(f, "{}:", scheme),
            Source::Nonce(nonce) => write!(f, "{}{}{}", NONCE_PREFIX, nonce, SUFFIX_QUOTE),
        }
    }
}

impl BufferWriter for Source {
    fn write_to_buffer(&self, buffer: &mut BytesMut) {
        match self {
            Source::None => buffer.extend_from_slice(NONE_SOURCE.as_bytes()),
            Source::Self_ => buffer.extend_from_slice(SELF_SOURCE.as_bytes()),
            Source::UnsafeInline => buffer.extend_from_slice(UNSAFE_INLINE_SOURCE.as_bytes()),
            Source::ReportSample => buffer.extend_from_slice(REPORT_SAMPLE_SOURCE.as_bytes()),
            Source::Host(host) => buffer.extend_from_slice(host.as_bytes()),
            Source::Scheme(scheme) => {
                buffer.extend_from_slice(scheme.as_bytes());
                buffer.extend_from_slice(b":");
            }
            Source::Nonce(nonce) => {
                buffer.reserve(NONCE_PREFIX.len() + nonce.len() + SUFFIX_QUOTE.len());
                buffer.extend_from_slice(NONCE_PREFIX.as_bytes());
                buffer.extend_from_slice(nonce.as_bytes());
                buffer.extend_from_slice(SUFFIX_QUOTE.as_bytes());
            }
        }
    }
}

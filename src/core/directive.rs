use crate::error::PortalError;
use crate::core::source::Source;
use crate::utils::BufferWriter;
use bytes::BytesMut;
use smallvec::SmallVec;
use std::{borrow::Cow, fmt};

/// One CSP directive: a name and an ordered, deduplicated source list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    name: Cow<'static, str>,
    sources: SmallVec<[Source; 4]>,
}

impl Default for Directive {
    fn default() -> Self {
        Self {
            name: Cow::Borrowed(""),
            sources: SmallVec::new(),
        }
    }
}

impl Directive {
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            sources: SmallVec::new(),
        }
    }

    /// `'none'` is exclusive: adding it clears the list, and adding any
    /// other source displaces it.
    pub fn add_source(&mut self, source: Source) -> &mut Self {
        if source.is_none() {
            self.sources.clear();
            self.sources.push(source);
        } else if !self.sources.is_empty() && self.sources[0].is_none() {
            self.sources.clear();
            self.sources.push(source);
        } else if !self.sources.iter().any(|s| s == &source) {
            self.sources.push(source);
        }
        self
    }

    pub fn add_sources<I>(&mut self, sources: I) -> &mut Self
    where
        I: IntoIterator<Item = Source>,
    {
        for source in sources {
            self.add_source(source);
        }
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn validate(&self) -> Result<(), PortalError> {
        if self.sources.len() > 1 && self.sources.iter().any(|s| s.is_none()) {
            return Err(PortalError::Validation(format!(
                "Directive '{}' contains 'none' with other sources",
                self.name
            )));
        }

        for source in &self.sources {
            match source {
                Source::Host(host) if host.is_empty() => {
                    return Err(PortalError::Validation(format!(
                        "Directive '{}' contains empty host",
                        self.name
                    )));
                }
                Source::Scheme(scheme) if scheme.is_empty() => {
                    return Err(PortalError::Validation(format!(
                        "Directive '{}' contains empty scheme",
                        self.name
                    )));
                }
                Source::Nonce(nonce) if nonce.is_empty() => {
                    return Err(PortalError::Validation(format!(
                        "Directive '{}' contains empty nonce",
                        self.name
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    #[inline]
    pub fn estimated_size(&self) -> usize {
        let mut size = self.name.len();

        if !self.sources.is_empty() {
            size += 1;
            size += self
                .sources
                .iter()
                .map(|s| s.estimated_size())
                .sum::<usize>();
            size += self.sources.len().saturating_sub(1);
        }

        size
    }

    #[inline]
    pub fn contains_nonce(&self) -> bool {
        self.sources.iter().any(|s| s.contains_nonce())
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;

        for source in &self.sources {
            f.write_str(" ")?;
            write!(f, "{}", source)?;
        }

        Ok(())
    }
}

impl BufferWriter for Directive {
    fn write_to_buffer(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(self.name.as_bytes());

        for source in &self.sources {
            buffer.extend_from_slice(b" ");
            source.write_to_buffer(buffer);
        }
    }
}
